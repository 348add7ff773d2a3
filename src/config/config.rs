//! Named address lookup kept in an `EternalStorage`, so a replacement
//! config can take over the entries.

use alloy_primitives::Address;
use alloy_sol_types::{sol, SolCall};

use crate::{
    access::{only_owner, ownable},
    error::LedgerResult,
    ledger::Contract,
    state::{decode_calls, keccak_key, unknown_selector, CallContext, ContextActions},
    storage::{CapabilityPolicy, StorageCapability},
};

sol! {
    interface IConfig {
        function createStorage() external;
        function getStorageAddress() external view returns (address);
        function set(string key, address value) external;
        function get(string key) external view returns (address);
    }
}

use IConfig::IConfigCalls as Calls;

const CAPABILITY: StorageCapability = StorageCapability {
    policy: CapabilityPolicy::SingleOwner,
};

/// Resolve `key` in the config at `config`
pub fn lookup(ctx: &mut CallContext<'_>, config: Address, key: &str) -> LedgerResult<Address> {
    let result = ctx.call_sol(config, &IConfig::getCall { key: key.into() })?;

    Ok(result._0)
}

pub struct Config;

impl Contract for Config {
    fn name(&self) -> &'static str {
        "Config"
    }

    fn construct(&self, ctx: &mut CallContext<'_>, _args: &[u8]) -> LedgerResult<()> {
        ownable::init_owner(ctx);

        Ok(())
    }

    fn call(&self, ctx: &mut CallContext<'_>, input: &[u8]) -> LedgerResult<Vec<u8>> {
        let Some(call) = decode_calls::<Calls>(input)? else {
            return ownable::dispatch(ctx, input)?.ok_or_else(|| unknown_selector(input));
        };

        let output = match call {
            Calls::createStorage(_) => {
                CAPABILITY.create_storage(ctx)?;
                Vec::new()
            }
            Calls::getStorageAddress(_) => {
                let address = StorageCapability::get_storage_address(ctx)?;
                IConfig::getStorageAddressCall::abi_encode_returns(&(address,))
            }
            Calls::set(call) => {
                only_owner(ctx)?;
                StorageCapability::eternal_storage(ctx)?.set_address(
                    ctx,
                    keccak_key(&call.key),
                    call.value,
                )?;

                tracing::info!(
                    config = %ctx.address(),
                    key = %call.key,
                    value = %call.value,
                    "config set"
                );
                Vec::new()
            }
            Calls::get(call) => {
                let value = StorageCapability::eternal_storage(ctx)?
                    .get_address(ctx, keccak_key(&call.key))?;
                IConfig::getCall::abi_encode_returns(&(value,))
            }
        };

        Ok(output)
    }
}
