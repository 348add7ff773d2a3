//! Admin-governed role registry.
//!
//! The admin set starts with the deployer. Admins add and remove members of
//! both the admin set and the storage owner set. Nothing stops the last
//! admin from removing itself, after which every admin-gated operation is
//! locked.

use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolCall};

use crate::{
    error::LedgerResult,
    ledger::Contract,
    state::{decode_calls, unknown_selector, CallContext, ContextActions},
};

use super::{only_admin, Role, RoleSet};

sol! {
    interface IRoleRegistry {
        event RoleGranted(uint8 indexed role, address indexed account, address indexed sender);
        event RoleRevoked(uint8 indexed role, address indexed account, address indexed sender);

        function isAdmin(address account) external view returns (bool);
        function addAdmin(address account) external;
        function deleteAdmin(address account) external;

        function isStorageOwner(address account) external view returns (bool);
        function addStorageOwner(address account) external;
        function deleteStorageOwner(address account) external;

        function getValueOnlyAdmin() external view returns (uint256);
    }
}

use IRoleRegistry::IRoleRegistryCalls;

/// Seed a role set with the caller. Used at genesis only.
pub fn grant_to_sender(ctx: &mut CallContext<'_>, role: Role) {
    let sender = ctx.msg_sender();
    grant(ctx, role, sender);
}

fn grant(ctx: &mut CallContext<'_>, role: Role, account: Address) {
    if RoleSet(role).insert(ctx, account) {
        tracing::info!(contract = %ctx.address(), ?role, %account, "role granted");
        ctx.emit(IRoleRegistry::RoleGranted {
            role: role.id(),
            account,
            sender: ctx.msg_sender(),
        });
    }
}

fn revoke(ctx: &mut CallContext<'_>, role: Role, account: Address) {
    if RoleSet(role).remove(ctx, account) {
        tracing::info!(contract = %ctx.address(), ?role, %account, "role revoked");
        ctx.emit(IRoleRegistry::RoleRevoked {
            role: role.id(),
            account,
            sender: ctx.msg_sender(),
        });
    }
}

pub fn add_member(ctx: &mut CallContext<'_>, role: Role, account: Address) -> LedgerResult<()> {
    only_admin(ctx)?;
    grant(ctx, role, account);

    Ok(())
}

pub fn delete_member(ctx: &mut CallContext<'_>, role: Role, account: Address) -> LedgerResult<()> {
    only_admin(ctx)?;
    revoke(ctx, role, account);

    Ok(())
}

/// Handle `IRoleRegistry` calls against the roles of the executing contract.
/// Returns None for other selectors.
pub fn dispatch(ctx: &mut CallContext<'_>, input: &[u8]) -> LedgerResult<Option<Vec<u8>>> {
    let Some(call) = decode_calls::<IRoleRegistryCalls>(input)? else {
        return Ok(None);
    };

    let output = match call {
        IRoleRegistryCalls::isAdmin(call) => {
            let is_admin = RoleSet::ADMINS.contains(ctx, call.account);
            IRoleRegistry::isAdminCall::abi_encode_returns(&(is_admin,))
        }
        IRoleRegistryCalls::addAdmin(call) => {
            add_member(ctx, Role::Admin, call.account)?;
            Vec::new()
        }
        IRoleRegistryCalls::deleteAdmin(call) => {
            delete_member(ctx, Role::Admin, call.account)?;
            Vec::new()
        }
        IRoleRegistryCalls::isStorageOwner(call) => {
            let is_storage_owner = RoleSet::STORAGE_OWNERS.contains(ctx, call.account);
            IRoleRegistry::isStorageOwnerCall::abi_encode_returns(&(is_storage_owner,))
        }
        IRoleRegistryCalls::addStorageOwner(call) => {
            add_member(ctx, Role::StorageOwner, call.account)?;
            Vec::new()
        }
        IRoleRegistryCalls::deleteStorageOwner(call) => {
            delete_member(ctx, Role::StorageOwner, call.account)?;
            Vec::new()
        }
        IRoleRegistryCalls::getValueOnlyAdmin(_) => {
            only_admin(ctx)?;
            IRoleRegistry::getValueOnlyAdminCall::abi_encode_returns(&(U256::from(1),))
        }
    };

    Ok(Some(output))
}

/// Standalone role registry contract
pub struct RoleRegistry;

impl Contract for RoleRegistry {
    fn name(&self) -> &'static str {
        "RoleRegistry"
    }

    fn construct(&self, ctx: &mut CallContext<'_>, _args: &[u8]) -> LedgerResult<()> {
        grant_to_sender(ctx, Role::Admin);

        Ok(())
    }

    fn call(&self, ctx: &mut CallContext<'_>, input: &[u8]) -> LedgerResult<Vec<u8>> {
        dispatch(ctx, input)?.ok_or_else(|| unknown_selector(input))
    }
}
