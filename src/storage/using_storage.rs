//! Consumer-side reference to an `EternalStorage`.
//!
//! A consumer either creates its store once or attaches to an existing one
//! for migration. Both are only possible while it has no store, and there is
//! no way to detach afterwards.

use std::sync::Arc;

use alloy_primitives::Address;

use crate::{
    access::{only_owner, only_storage_owner},
    error::{LedgerError, LedgerResult},
    require,
    state::{CallContext, ContextActions, FixedSlot, SlotActions, SlotKey, STORAGE_REF_KEY_SEED},
};

use super::{EternalStorage, StoreHandle};

const STORAGE_REF_SLOT: FixedSlot = FixedSlot(STORAGE_REF_KEY_SEED);

/// Who may create, attach and hand off a consumer's store
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CapabilityPolicy {
    /// The consumer's Ownable owner
    SingleOwner,

    /// Members of the consumer's storage owner set
    StorageOwnerSet,
}

impl CapabilityPolicy {
    pub fn authorize<C: ContextActions + ?Sized>(&self, ctx: &C) -> LedgerResult<()> {
        match self {
            CapabilityPolicy::SingleOwner => only_owner(ctx),
            CapabilityPolicy::StorageOwnerSet => only_storage_owner(ctx),
        }
    }
}

/// The packed capability record. Slot layout:
///
/// | has_storage (1) | unused (11) | address (20) |
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StorageRef {
    pub has_storage: bool,
    pub address: Address,
}

impl StorageRef {
    pub fn read_from_slot<S: SlotActions + ?Sized>(storage: &S) -> Self {
        Self::decode(&storage.sload(&STORAGE_REF_SLOT.get_key()))
    }

    pub fn decode(slot: &[u8; 32]) -> Self {
        StorageRef {
            has_storage: slot[0] != 0,
            address: Address::from_slice(&slot[12..32]),
        }
    }

    pub fn encode(&self) -> [u8; 32] {
        let mut encoded_data = [0u8; 32];

        encoded_data[0] = self.has_storage as u8;
        encoded_data[12..32].copy_from_slice(self.address.as_slice());

        encoded_data
    }

    pub fn write_to_slot<S: SlotActions + ?Sized>(&self, storage: &mut S) {
        storage.sstore(&STORAGE_REF_SLOT.get_key(), &self.encode());
    }
}

/// Store operations of a consumer under one policy
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StorageCapability {
    pub policy: CapabilityPolicy,
}

impl StorageCapability {
    pub fn new(policy: CapabilityPolicy) -> Self {
        StorageCapability { policy }
    }

    pub fn has_storage<S: SlotActions + ?Sized>(storage: &S) -> bool {
        StorageRef::read_from_slot(storage).has_storage
    }

    /// Handle to the attached store, or `StorageNotSet`
    pub fn eternal_storage<S: SlotActions + ?Sized>(storage: &S) -> LedgerResult<StoreHandle> {
        let storage_ref = StorageRef::read_from_slot(storage);
        require!(storage_ref.has_storage, LedgerError::StorageNotSet);

        Ok(StoreHandle::new(storage_ref.address))
    }

    pub fn get_storage_address<S: SlotActions + ?Sized>(storage: &S) -> LedgerResult<Address> {
        Ok(Self::eternal_storage(storage)?.address)
    }

    /// Deploy a new store owned by this consumer
    pub fn create_storage(&self, ctx: &mut CallContext<'_>) -> LedgerResult<Address> {
        self.policy.authorize(ctx)?;
        require!(!Self::has_storage(ctx), LedgerError::StorageAlreadySet);

        let address = ctx.deploy(Arc::new(EternalStorage), &[])?;
        StorageRef {
            has_storage: true,
            address,
        }
        .write_to_slot(ctx);

        tracing::info!(consumer = %ctx.address(), store = %address, "storage created");

        Ok(address)
    }

    /// Attach an existing store. Writes fail with `NotOwner` until the
    /// store's current owner hands it over.
    pub fn set_storage(&self, ctx: &mut CallContext<'_>, address: Address) -> LedgerResult<()> {
        self.policy.authorize(ctx)?;
        require!(!Self::has_storage(ctx), LedgerError::StorageAlreadySet);

        StorageRef {
            has_storage: true,
            address,
        }
        .write_to_slot(ctx);

        tracing::info!(consumer = %ctx.address(), store = %address, "storage attached");

        Ok(())
    }

    /// Hand the attached store to `new_owner`
    pub fn change_owner(&self, ctx: &mut CallContext<'_>, new_owner: Address) -> LedgerResult<()> {
        self.policy.authorize(ctx)?;

        Self::eternal_storage(ctx)?.change_owner(ctx, new_owner)
    }
}
