//! Transparent upgradeable proxy.
//!
//! The proxy is a stable identity. Its storage and address never change
//! while the logic bound to it does. Calls from anyone but the proxy admin
//! run the bound logic's code against the proxy's storage, with the original
//! caller as `msg_sender`. The admin only reaches the management functions.

use alloy_primitives::{b256, Address, Bytes, B256};
use alloy_sol_types::{sol, sol_data, SolCall, SolType};

use crate::{
    error::{LedgerError, LedgerResult},
    ledger::Contract,
    require,
    state::{decode_calls, CallContext, ContextActions, SlotActions, WordValue},
};

sol! {
    interface ITransparentProxy {
        event Upgraded(address indexed implementation);
        event AdminChanged(address previousAdmin, address newAdmin);

        function implementation() external returns (address);
        function admin() external returns (address);
        function upgradeTo(address newImplementation) external;
        function upgradeToAndCall(address newImplementation, bytes data) external;
        function changeAdmin(address newAdmin) external;
    }
}

use ITransparentProxy::ITransparentProxyCalls as Calls;

/// keccak256("eip1967.proxy.implementation") - 1
pub const IMPLEMENTATION_SLOT: B256 =
    b256!("360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbc");

/// keccak256("eip1967.proxy.admin") - 1
pub const ADMIN_SLOT: B256 =
    b256!("b53127684a568b3173ae13b9f8a6016e243e63b6e8ee1178d6a717850b5d6103");

/// Constructor parameters `(logic, admin, data)`
type ConstructorParams = (sol_data::Address, sol_data::Address, sol_data::Bytes);

/// Encode constructor arguments for `UpgradeableProxy`. A non-empty `data`
/// is delegate-called into the logic during construction, typically an
/// initializer.
pub fn constructor_args(logic: Address, admin: Address, data: &[u8]) -> Vec<u8> {
    ConstructorParams::abi_encode_params(&(logic, admin, Bytes::copy_from_slice(data)))
}

pub fn implementation<S: SlotActions + ?Sized>(storage: &S) -> Address {
    Address::decode(&storage.sload(&IMPLEMENTATION_SLOT.0))
}

pub fn admin<S: SlotActions + ?Sized>(storage: &S) -> Address {
    Address::decode(&storage.sload(&ADMIN_SLOT.0))
}

fn upgrade_to(ctx: &mut CallContext<'_>, new_implementation: Address) -> LedgerResult<()> {
    require!(
        ctx.has_code(new_implementation),
        LedgerError::NotAContract(new_implementation)
    );

    ctx.sstore(&IMPLEMENTATION_SLOT.0, &new_implementation.encode());

    tracing::info!(proxy = %ctx.address(), implementation = %new_implementation, "upgraded");
    ctx.emit(ITransparentProxy::Upgraded {
        implementation: new_implementation,
    });

    Ok(())
}

fn upgrade_to_and_call(
    ctx: &mut CallContext<'_>,
    new_implementation: Address,
    data: &[u8],
) -> LedgerResult<()> {
    upgrade_to(ctx, new_implementation)?;

    if !data.is_empty() {
        ctx.delegate_call(new_implementation, data)?;
    }

    Ok(())
}

fn change_admin(ctx: &mut CallContext<'_>, new_admin: Address) -> LedgerResult<()> {
    require!(new_admin != Address::ZERO, LedgerError::NewAdminIsZeroAddress);

    let previous_admin = admin(ctx);
    ctx.sstore(&ADMIN_SLOT.0, &new_admin.encode());

    tracing::info!(proxy = %ctx.address(), %previous_admin, %new_admin, "proxy admin changed");
    ctx.emit(ITransparentProxy::AdminChanged {
        previousAdmin: previous_admin,
        newAdmin: new_admin,
    });

    Ok(())
}

pub struct UpgradeableProxy;

impl Contract for UpgradeableProxy {
    fn name(&self) -> &'static str {
        "UpgradeableProxy"
    }

    fn construct(&self, ctx: &mut CallContext<'_>, args: &[u8]) -> LedgerResult<()> {
        let (logic, admin, data) = ConstructorParams::abi_decode_params(args, true)
            .map_err(|_| LedgerError::InvalidCalldata)?;

        upgrade_to_and_call(ctx, logic, &data)?;
        change_admin(ctx, admin)
    }

    fn call(&self, ctx: &mut CallContext<'_>, input: &[u8]) -> LedgerResult<Vec<u8>> {
        if ctx.msg_sender() != admin(ctx) {
            let logic = implementation(ctx);
            return ctx.delegate_call(logic, input);
        }

        let call = decode_calls::<Calls>(input)?.ok_or(LedgerError::AdminCannotFallback)?;

        let output = match call {
            Calls::implementation(_) => {
                ITransparentProxy::implementationCall::abi_encode_returns(&(implementation(ctx),))
            }
            Calls::admin(_) => ITransparentProxy::adminCall::abi_encode_returns(&(admin(ctx),)),
            Calls::upgradeTo(call) => {
                upgrade_to(ctx, call.newImplementation)?;
                Vec::new()
            }
            Calls::upgradeToAndCall(call) => {
                upgrade_to_and_call(ctx, call.newImplementation, &call.data)?;
                Vec::new()
            }
            Calls::changeAdmin(call) => {
                change_admin(ctx, call.newAdmin)?;
                Vec::new()
            }
        };

        Ok(output)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        access::admin::{IRoleRegistry, RoleRegistry},
        ledger::Ledger,
    };
    use alloy_primitives::{address, keccak256, U256};

    const DEPLOYER: Address = address!("1000000000000000000000000000000000000001");
    const PROXY_ADMIN: Address = address!("2000000000000000000000000000000000000002");
    const USER: Address = address!("3000000000000000000000000000000000000003");

    fn eip1967_slot(name: &str) -> B256 {
        B256::from(U256::from_be_bytes(keccak256(name).0) - U256::from(1))
    }

    #[test]
    fn test_eip1967_slots() {
        assert_eq!(IMPLEMENTATION_SLOT, eip1967_slot("eip1967.proxy.implementation"));
        assert_eq!(ADMIN_SLOT, eip1967_slot("eip1967.proxy.admin"));
    }

    #[test]
    fn test_logic_must_be_a_contract() {
        let mut ledger = Ledger::new();
        let nobody = Address::repeat_byte(0x42);

        let result = ledger.deploy(
            DEPLOYER,
            UpgradeableProxy,
            &constructor_args(nobody, PROXY_ADMIN, &[]),
        );
        assert_eq!(result, Err(LedgerError::NotAContract(nobody)));
    }

    #[test]
    fn test_forwarding_uses_proxy_storage() {
        let mut ledger = Ledger::new();
        let logic = ledger.deploy(DEPLOYER, RoleRegistry, &[]).unwrap();
        let proxy = ledger
            .deploy(DEPLOYER, UpgradeableProxy, &constructor_args(logic, PROXY_ADMIN, &[]))
            .unwrap();

        // The logic's constructor never ran against the proxy storage
        let is_admin = ledger
            .transact_sol(USER, proxy, &IRoleRegistry::isAdminCall { account: DEPLOYER })
            .unwrap()
            ._0;
        assert!(!is_admin);

        let is_admin = ledger
            .transact_sol(USER, logic, &IRoleRegistry::isAdminCall { account: DEPLOYER })
            .unwrap()
            ._0;
        assert!(is_admin);
    }

    #[test]
    fn test_admin_management() {
        let mut ledger = Ledger::new();
        let logic = ledger.deploy(DEPLOYER, RoleRegistry, &[]).unwrap();
        let next_logic = ledger.deploy(DEPLOYER, RoleRegistry, &[]).unwrap();
        let proxy = ledger
            .deploy(DEPLOYER, UpgradeableProxy, &constructor_args(logic, PROXY_ADMIN, &[]))
            .unwrap();

        let current = ledger
            .transact_sol(PROXY_ADMIN, proxy, &ITransparentProxy::implementationCall {})
            .unwrap()
            ._0;
        assert_eq!(current, logic);

        // Only the admin reaches management functions, everyone else hits the
        // logic, which has no such selector
        let result = ledger.transact_sol(
            USER,
            proxy,
            &ITransparentProxy::upgradeToCall {
                newImplementation: next_logic,
            },
        );
        assert!(matches!(result.err(), Some(LedgerError::UnknownSelector(_))));

        ledger
            .transact_sol(
                PROXY_ADMIN,
                proxy,
                &ITransparentProxy::upgradeToCall {
                    newImplementation: next_logic,
                },
            )
            .unwrap();
        assert_eq!(implementation_of(&ledger, proxy), next_logic);

        // The admin cannot fall through to the logic
        let result = ledger.transact_sol(
            PROXY_ADMIN,
            proxy,
            &IRoleRegistry::isAdminCall { account: DEPLOYER },
        );
        assert_eq!(result.err(), Some(LedgerError::AdminCannotFallback));

        let result = ledger.transact_sol(
            PROXY_ADMIN,
            proxy,
            &ITransparentProxy::changeAdminCall {
                newAdmin: Address::ZERO,
            },
        );
        assert_eq!(result.err(), Some(LedgerError::NewAdminIsZeroAddress));

        ledger
            .transact_sol(
                PROXY_ADMIN,
                proxy,
                &ITransparentProxy::changeAdminCall { newAdmin: USER },
            )
            .unwrap();
        let admin = ledger
            .transact_sol(USER, proxy, &ITransparentProxy::adminCall {})
            .unwrap()
            ._0;
        assert_eq!(admin, USER);
    }

    fn implementation_of(ledger: &Ledger, proxy: Address) -> Address {
        Address::decode(&ledger.storage_at(proxy, &IMPLEMENTATION_SLOT.0))
    }
}
