//! Initializer-based treasury, deployable behind an `UpgradeableProxy`.
//!
//! Logic meant to be pointed at by a proxy cannot rely on its constructor:
//! the constructor writes the logic account's storage, not the proxy's. All
//! setup happens in `initialize`, which runs once per storage.

use alloy_primitives::Address;
use alloy_sol_types::{sol, SolCall};

use crate::{
    access::{initializable::initializer, only_owner, ownable},
    config::address_registry,
    error::LedgerResult,
    ledger::Contract,
    parameters::{DEV_KEY, WITHDRAW_KEY},
    state::{decode_calls, unknown_selector, CallContext, SlotActions, SlotKey, WordValue},
    token_utils::{invoke_withdraw, maybe_transfer_all},
};

use super::COLLABORATOR_SLOT;

sol! {
    interface ITreasuryV2 {
        function initialize(address registry) external;
        function withdraw(address property) external;
        function transferDev() external;
        function transferProperty(address token, address nextTreasury) external;
        function registry() external view returns (address);
        function version() external pure returns (string);
    }
}

use ITreasuryV2::ITreasuryV2Calls as Calls;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreasuryVersion {
    V2,
    L2,
}

impl TreasuryVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            TreasuryVersion::V2 => "V2",
            TreasuryVersion::L2 => "L2",
        }
    }
}

fn registry_address<S: SlotActions + ?Sized>(storage: &S) -> Address {
    Address::decode(&storage.sload(&COLLABORATOR_SLOT.get_key()))
}

pub struct TreasuryV2 {
    pub version: TreasuryVersion,
}

impl TreasuryV2 {
    pub fn v2() -> Self {
        TreasuryV2 {
            version: TreasuryVersion::V2,
        }
    }

    pub fn l2() -> Self {
        TreasuryV2 {
            version: TreasuryVersion::L2,
        }
    }
}

impl Contract for TreasuryV2 {
    fn name(&self) -> &'static str {
        match self.version {
            TreasuryVersion::V2 => "TreasuryV2",
            TreasuryVersion::L2 => "TreasuryL2",
        }
    }

    fn call(&self, ctx: &mut CallContext<'_>, input: &[u8]) -> LedgerResult<Vec<u8>> {
        let Some(call) = decode_calls::<Calls>(input)? else {
            return ownable::dispatch(ctx, input)?.ok_or_else(|| unknown_selector(input));
        };

        let output = match call {
            Calls::initialize(call) => {
                initializer(ctx)?;
                ownable::init_owner(ctx);
                ctx.sstore(&COLLABORATOR_SLOT.get_key(), &call.registry.encode());

                Vec::new()
            }
            Calls::withdraw(call) => {
                let registry = registry_address(ctx);
                let supplier = address_registry::lookup(ctx, registry, WITHDRAW_KEY)?;
                invoke_withdraw(ctx, supplier, call.property)?;

                Vec::new()
            }
            Calls::transferDev(_) => {
                only_owner(ctx)?;

                let registry = registry_address(ctx);
                let dev = address_registry::lookup(ctx, registry, DEV_KEY)?;
                let owner = ownable::owner(ctx);
                let amount = maybe_transfer_all(ctx, dev, owner)?;

                tracing::info!(%owner, %amount, "dev balance transferred");
                Vec::new()
            }
            Calls::transferProperty(call) => {
                only_owner(ctx)?;

                let amount = maybe_transfer_all(ctx, call.token, call.nextTreasury)?;

                tracing::info!(
                    token = %call.token,
                    next_treasury = %call.nextTreasury,
                    %amount,
                    "property transferred"
                );
                Vec::new()
            }
            Calls::registry(_) => {
                ITreasuryV2::registryCall::abi_encode_returns(&(registry_address(ctx),))
            }
            Calls::version(_) => {
                ITreasuryV2::versionCall::abi_encode_returns(&(self.version.as_str().to_string(),))
            }
        };

        Ok(output)
    }
}
