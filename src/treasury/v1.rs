//! First treasury version: constructor-configured, single owner.

use alloy_primitives::Address;
use alloy_sol_types::{sol, sol_data, SolCall, SolType};

use crate::{
    access::{only_owner, ownable},
    config::config,
    error::{LedgerError, LedgerResult},
    ledger::Contract,
    parameters::{DEV_KEY, WITHDRAW_KEY},
    state::{
        decode_calls, unknown_selector, CallContext, FixedSlot, SlotActions, SlotKey, WordValue,
        COLLABORATOR_KEY_SEED,
    },
    token_utils::{invoke_withdraw, maybe_transfer_all},
};

sol! {
    interface ITreasury {
        function withdraw(address property) external;
        function transfer() external returns (bool);
        function configAddress() external view returns (address);
    }
}

use ITreasury::ITreasuryCalls as Calls;

/// Slot of the config address
pub(crate) const COLLABORATOR_SLOT: FixedSlot = FixedSlot(COLLABORATOR_KEY_SEED);

type ConstructorParams = (sol_data::Address,);

pub fn constructor_args(config: Address) -> Vec<u8> {
    ConstructorParams::abi_encode_params(&(config,))
}

fn config_address<S: SlotActions + ?Sized>(storage: &S) -> Address {
    Address::decode(&storage.sload(&COLLABORATOR_SLOT.get_key()))
}

pub struct Treasury;

impl Contract for Treasury {
    fn name(&self) -> &'static str {
        "Treasury"
    }

    fn construct(&self, ctx: &mut CallContext<'_>, args: &[u8]) -> LedgerResult<()> {
        let (config,) = ConstructorParams::abi_decode_params(args, true)
            .map_err(|_| LedgerError::InvalidCalldata)?;

        ownable::init_owner(ctx);
        ctx.sstore(&COLLABORATOR_SLOT.get_key(), &config.encode());

        Ok(())
    }

    fn call(&self, ctx: &mut CallContext<'_>, input: &[u8]) -> LedgerResult<Vec<u8>> {
        let Some(call) = decode_calls::<Calls>(input)? else {
            return ownable::dispatch(ctx, input)?.ok_or_else(|| unknown_selector(input));
        };

        let output = match call {
            Calls::withdraw(call) => {
                let config_contract = config_address(ctx);
                let supplier = config::lookup(ctx, config_contract, WITHDRAW_KEY)?;
                invoke_withdraw(ctx, supplier, call.property)?;

                Vec::new()
            }
            Calls::transfer(_) => {
                only_owner(ctx)?;

                let config_contract = config_address(ctx);
                let dev = config::lookup(ctx, config_contract, DEV_KEY)?;
                let owner = ownable::owner(ctx);
                let amount = maybe_transfer_all(ctx, dev, owner)?;

                tracing::info!(%owner, %amount, "treasury balance transferred");
                ITreasury::transferCall::abi_encode_returns(&(true,))
            }
            Calls::configAddress(_) => {
                ITreasury::configAddressCall::abi_encode_returns(&(config_address(ctx),))
            }
        };

        Ok(output)
    }
}
