//! Upgrade admin for transparent proxies, owned by its deployer.

use alloy_primitives::{Address, Bytes};
use alloy_sol_types::{sol, SolCall};

use crate::{
    access::{only_owner_as_admin, ownable},
    error::LedgerResult,
    ledger::Contract,
    state::{decode_calls, unknown_selector, CallContext},
};

use super::ITransparentProxy;

sol! {
    interface IProxyAdmin {
        function getProxyImplementation(address proxy) external view returns (address);
        function getProxyAdmin(address proxy) external view returns (address);
        function changeProxyAdmin(address proxy, address newAdmin) external;
        function upgrade(address proxy, address implementation) external;
        function upgradeAndCall(address proxy, address implementation, bytes data) external;
    }
}

use IProxyAdmin::IProxyAdminCalls as Calls;

pub struct ProxyAdmin;

impl ProxyAdmin {
    fn get_proxy_implementation(
        ctx: &mut CallContext<'_>,
        proxy: Address,
    ) -> LedgerResult<Address> {
        Ok(ctx
            .call_sol(proxy, &ITransparentProxy::implementationCall {})?
            ._0)
    }

    fn get_proxy_admin(ctx: &mut CallContext<'_>, proxy: Address) -> LedgerResult<Address> {
        Ok(ctx.call_sol(proxy, &ITransparentProxy::adminCall {})?._0)
    }

    fn change_proxy_admin(
        ctx: &mut CallContext<'_>,
        proxy: Address,
        new_admin: Address,
    ) -> LedgerResult<()> {
        only_owner_as_admin(ctx)?;
        ctx.call_sol(proxy, &ITransparentProxy::changeAdminCall { newAdmin: new_admin })?;

        Ok(())
    }

    fn upgrade(
        ctx: &mut CallContext<'_>,
        proxy: Address,
        implementation: Address,
    ) -> LedgerResult<()> {
        only_owner_as_admin(ctx)?;
        ctx.call_sol(
            proxy,
            &ITransparentProxy::upgradeToCall {
                newImplementation: implementation,
            },
        )?;

        Ok(())
    }

    fn upgrade_and_call(
        ctx: &mut CallContext<'_>,
        proxy: Address,
        implementation: Address,
        data: Bytes,
    ) -> LedgerResult<()> {
        only_owner_as_admin(ctx)?;
        ctx.call_sol(
            proxy,
            &ITransparentProxy::upgradeToAndCallCall {
                newImplementation: implementation,
                data,
            },
        )?;

        Ok(())
    }
}

impl Contract for ProxyAdmin {
    fn name(&self) -> &'static str {
        "ProxyAdmin"
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
            Calls::getProxyImplementation(call) => {
                let implementation = Self::get_proxy_implementation(ctx, call.proxy)?;
                IProxyAdmin::getProxyImplementationCall::abi_encode_returns(&(implementation,))
            }
            Calls::getProxyAdmin(call) => {
                let admin = Self::get_proxy_admin(ctx, call.proxy)?;
                IProxyAdmin::getProxyAdminCall::abi_encode_returns(&(admin,))
            }
            Calls::changeProxyAdmin(call) => {
                Self::change_proxy_admin(ctx, call.proxy, call.newAdmin)?;
                Vec::new()
            }
            Calls::upgrade(call) => {
                Self::upgrade(ctx, call.proxy, call.implementation)?;
                Vec::new()
            }
            Calls::upgradeAndCall(call) => {
                Self::upgrade_and_call(ctx, call.proxy, call.implementation, call.data)?;
                Vec::new()
            }
        };

        Ok(output)
    }
}
