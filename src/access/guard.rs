//! Authorization predicates, checked at the top of each guarded operation.

use crate::{
    error::{LedgerError, LedgerResult},
    require,
    state::ContextActions,
};

use super::{ownable, RoleSet};

/// Caller must be the Ownable owner
pub fn only_owner<C: ContextActions + ?Sized>(ctx: &C) -> LedgerResult<()> {
    require!(
        ownable::owner(ctx) == ctx.msg_sender(),
        LedgerError::CallerNotCurrentOwner
    );

    Ok(())
}

/// Caller must be in the admin set
pub fn only_admin<C: ContextActions + ?Sized>(ctx: &C) -> LedgerResult<()> {
    require!(
        RoleSet::ADMINS.contains(ctx, ctx.msg_sender()),
        LedgerError::AdminOnly
    );

    Ok(())
}

/// Caller must be in the storage owner set
pub fn only_storage_owner<C: ContextActions + ?Sized>(ctx: &C) -> LedgerResult<()> {
    require!(
        RoleSet::STORAGE_OWNERS.contains(ctx, ctx.msg_sender()),
        LedgerError::StorageOwnerOnly
    );

    Ok(())
}

/// Owner check of contracts whose owner acts as an administrator, such as
/// the proxy admin
pub fn only_owner_as_admin<C: ContextActions + ?Sized>(ctx: &C) -> LedgerResult<()> {
    only_owner(ctx).map_err(|_| LedgerError::AdminOnly)
}
