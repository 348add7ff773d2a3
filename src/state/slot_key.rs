use alloy_primitives::{keccak256, Address, B256};

/// Seeds for the fixed slots a contract keeps in its own storage. A seed is
/// the first byte of the key, so slots of different kinds never overlap.
pub const OWNER_KEY_SEED: u8 = 0;
pub const ROLE_KEY_SEED: u8 = 1;
pub const STORAGE_REF_KEY_SEED: u8 = 2;
pub const INITIALIZED_KEY_SEED: u8 = 3;
pub const COLLABORATOR_KEY_SEED: u8 = 4;
pub const REGISTRY_ENTRY_KEY_SEED: u8 = 5;

pub trait SlotKey {
    fn get_key(&self) -> [u8; 32];
}

/// A singleton slot identified only by its seed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedSlot(pub u8);

impl SlotKey for FixedSlot {
    fn get_key(&self) -> [u8; 32] {
        let mut key = [0u8; 32];
        key[0] = self.0;

        key
    }
}

/// Membership of `account` in the role set `role`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoleKey {
    pub role: u8,
    pub account: Address,
}

impl SlotKey for RoleKey {
    fn get_key(&self) -> [u8; 32] {
        let mut key = [0u8; 32];

        key[0] = ROLE_KEY_SEED;
        key[1] = self.role;
        key[2..22].copy_from_slice(self.account.as_slice());

        key
    }
}

/// Named entry of an address registry. Names have arbitrary length so
/// they are hashed together with the seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegistryEntryKey<'a>(pub &'a str);

impl SlotKey for RegistryEntryKey<'_> {
    fn get_key(&self) -> [u8; 32] {
        let mut bytes = Vec::with_capacity(1 + self.0.len());
        bytes.push(REGISTRY_ENTRY_KEY_SEED);
        bytes.extend_from_slice(self.0.as_bytes());

        keccak256(&bytes).0
    }
}

/// Hash a string key into the 32-byte key space shared with raw hash keys
pub fn keccak_key(name: &str) -> B256 {
    keccak256(name.as_bytes())
}
