//! SSTORE and SLOAD backing for one account.
//!
//! Storage is independent of endian format. Bytes are read in the exact
//! format as they are stored. Zero words are dropped on write, so a slot that
//! was never written and a slot that was cleared are indistinguishable.

use std::collections::HashMap;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlotStorage {
    inner: HashMap<[u8; 32], [u8; 32]>,
}

pub trait SlotActions {
    fn sstore(&mut self, key: &[u8; 32], value: &[u8; 32]);

    fn sload(&self, key: &[u8; 32]) -> [u8; 32];
}

impl SlotStorage {
    pub fn new() -> Self {
        SlotStorage {
            inner: HashMap::new(),
        }
    }

    /// Number of non-zero slots
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl SlotActions for SlotStorage {
    fn sstore(&mut self, key: &[u8; 32], value: &[u8; 32]) {
        if *value == [0u8; 32] {
            self.inner.remove(key);
        } else {
            self.inner.insert(*key, *value);
        }
    }

    fn sload(&self, key: &[u8; 32]) -> [u8; 32] {
        *self.inner.get(key).unwrap_or(&[0u8; 32])
    }
}
