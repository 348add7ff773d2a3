use alloy_primitives::Address;
use alloy_sol_types::{sol, SolCall};

use crate::{
    access::{only_owner, ownable},
    error::LedgerResult,
    ledger::Contract,
    state::{
        decode_calls, unknown_selector, CallContext, ContextActions, RegistryEntryKey, SlotActions,
        SlotKey, WordValue,
    },
};

sol! {
    interface IAddressRegistry {
        function setRegistry(string key, address value) external;
        function registries(string key) external view returns (address);
    }
}

use IAddressRegistry::IAddressRegistryCalls as Calls;

/// Resolve `key` in the registry at `registry`
pub fn lookup(ctx: &mut CallContext<'_>, registry: Address, key: &str) -> LedgerResult<Address> {
    let result = ctx.call_sol(registry, &IAddressRegistry::registriesCall { key: key.into() })?;

    Ok(result._0)
}

/// Owner-managed map from names to addresses
pub struct AddressRegistry;

impl Contract for AddressRegistry {
    fn name(&self) -> &'static str {
        "AddressRegistry"
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
            Calls::setRegistry(call) => {
                only_owner(ctx)?;
                ctx.sstore(&RegistryEntryKey(&call.key).get_key(), &call.value.encode());

                tracing::info!(
                    registry = %ctx.address(),
                    key = %call.key,
                    value = %call.value,
                    "registry set"
                );
                Vec::new()
            }
            Calls::registries(call) => {
                let value = Address::decode(&ctx.sload(&RegistryEntryKey(&call.key).get_key()));
                IAddressRegistry::registriesCall::abi_encode_returns(&(value,))
            }
        };

        Ok(output)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{error::LedgerError, ledger::Ledger};
    use alloy_primitives::address;

    const DEPLOYER: Address = address!("1000000000000000000000000000000000000001");
    const USER: Address = address!("3000000000000000000000000000000000000003");

    #[test]
    fn test_set_registry() {
        let mut ledger = Ledger::new();
        let registry = ledger.deploy(DEPLOYER, AddressRegistry, &[]).unwrap();
        let withdraw = Address::repeat_byte(0x77);

        let set = IAddressRegistry::setRegistryCall {
            key: "Withdraw".into(),
            value: withdraw,
        };

        let result = ledger.transact_sol(USER, registry, &set);
        assert_eq!(result.err(), Some(LedgerError::CallerNotCurrentOwner));

        ledger.transact_sol(DEPLOYER, registry, &set).unwrap();

        let value = ledger
            .transact_sol(
                USER,
                registry,
                &IAddressRegistry::registriesCall {
                    key: "Withdraw".into(),
                },
            )
            .unwrap()
            ._0;
        assert_eq!(value, withdraw);

        let unset = ledger
            .transact_sol(USER, registry, &IAddressRegistry::registriesCall { key: "Dev".into() })
            .unwrap()
            ._0;
        assert_eq!(unset, Address::ZERO);
    }
}
