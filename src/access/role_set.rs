//! Membership sets kept in a contract's own storage. Each member is one slot
//! keyed by `ROLE_KEY_SEED ‖ role ‖ account`.

use alloy_primitives::Address;

use crate::state::{RoleKey, SlotActions, SlotKey};

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Admin = 0,
    StorageOwner = 1,
}

impl Role {
    pub fn id(&self) -> u8 {
        *self as u8
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoleSet(pub Role);

impl RoleSet {
    pub const ADMINS: RoleSet = RoleSet(Role::Admin);
    pub const STORAGE_OWNERS: RoleSet = RoleSet(Role::StorageOwner);

    fn key(&self, account: Address) -> [u8; 32] {
        RoleKey {
            role: self.0.id(),
            account,
        }
        .get_key()
    }

    pub fn contains<S: SlotActions + ?Sized>(&self, storage: &S, account: Address) -> bool {
        storage.sload(&self.key(account))[31] != 0
    }

    /// Add a member. Returns false if it was already present.
    pub fn insert<S: SlotActions + ?Sized>(&self, storage: &mut S, account: Address) -> bool {
        if self.contains(storage, account) {
            return false;
        }

        let mut word = [0u8; 32];
        word[31] = 1;
        storage.sstore(&self.key(account), &word);

        true
    }

    /// Remove a member. Returns false if it was not present.
    pub fn remove<S: SlotActions + ?Sized>(&self, storage: &mut S, account: Address) -> bool {
        if !self.contains(storage, account) {
            return false;
        }

        storage.sstore(&self.key(account), &[0u8; 32]);

        true
    }
}
