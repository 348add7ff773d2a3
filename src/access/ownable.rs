//! Single owner of a contract, kept in the contract's own storage.

use alloy_primitives::Address;
use alloy_sol_types::{sol, SolCall};

use crate::{
    error::{LedgerError, LedgerResult},
    require,
    state::{
        decode_calls, CallContext, ContextActions, FixedSlot, SlotActions, SlotKey, WordValue,
        OWNER_KEY_SEED,
    },
};

use super::only_owner;

sol! {
    interface IOwnable {
        event OwnershipTransferred(address indexed previousOwner, address indexed newOwner);

        function owner() external view returns (address);

        function transferOwnership(address newOwner) external;
    }
}

pub const OWNER_SLOT: FixedSlot = FixedSlot(OWNER_KEY_SEED);

pub fn owner<S: SlotActions + ?Sized>(storage: &S) -> Address {
    Address::decode(&storage.sload(&OWNER_SLOT.get_key()))
}

fn set_owner(ctx: &mut CallContext<'_>, new_owner: Address) {
    let previous_owner = owner(ctx);
    ctx.sstore(&OWNER_SLOT.get_key(), &new_owner.encode());

    tracing::info!(contract = %ctx.address(), %previous_owner, %new_owner, "ownership transferred");
    ctx.emit(IOwnable::OwnershipTransferred {
        previousOwner: previous_owner,
        newOwner: new_owner,
    });
}

/// Make the caller the owner. Called from constructors and initializers.
pub fn init_owner(ctx: &mut CallContext<'_>) {
    let sender = ctx.msg_sender();
    set_owner(ctx, sender);
}

pub fn transfer_ownership(ctx: &mut CallContext<'_>, new_owner: Address) -> LedgerResult<()> {
    only_owner(ctx)?;
    require!(new_owner != Address::ZERO, LedgerError::NewOwnerIsZeroAddress);

    set_owner(ctx, new_owner);

    Ok(())
}

/// Handle `IOwnable` calls. Returns None for other selectors.
pub fn dispatch(ctx: &mut CallContext<'_>, input: &[u8]) -> LedgerResult<Option<Vec<u8>>> {
    let Some(call) = decode_calls::<IOwnable::IOwnableCalls>(input)? else {
        return Ok(None);
    };

    let output = match call {
        IOwnable::IOwnableCalls::owner(_) => {
            IOwnable::ownerCall::abi_encode_returns(&(owner(ctx),))
        }
        IOwnable::IOwnableCalls::transferOwnership(call) => {
            transfer_ownership(ctx, call.newOwner)?;
            Vec::new()
        }
    };

    Ok(Some(output))
}
