//! Typed values on top of 32-byte slots.
//!
//! Every value type has its own namespace: the physical slot of a typed key
//! is `keccak256(discriminator ‖ key)`, so a uint and a string written under
//! the same key never collide. Strings longer than a word spill into data
//! slots at `keccak256(length_slot ‖ index)`.

use alloy_primitives::{keccak256, Address, B256, I256, U256};

use super::{SlotActions, SlotKey};

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotKind {
    Uint = 0,
    Int = 1,
    Address = 2,
    Bool = 3,
    Bytes = 4,
    String = 5,
}

impl SlotKind {
    pub fn discriminator(&self) -> u8 {
        *self as u8
    }
}

/// Key of a typed slot
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypedSlotKey {
    pub kind: SlotKind,
    pub key: B256,
}

impl SlotKey for TypedSlotKey {
    fn get_key(&self) -> [u8; 32] {
        let mut bytes = [0u8; 33];
        bytes[0] = self.kind.discriminator();
        bytes[1..33].copy_from_slice(self.key.as_slice());

        keccak256(bytes).0
    }
}

/// A value that can live in a typed slot. Unset slots read as the zero value.
pub trait SlotValue: Sized {
    const KIND: SlotKind;

    fn read_from_slot<S: SlotActions + ?Sized>(storage: &S, key: &B256) -> Self;

    fn write_to_slot<S: SlotActions + ?Sized>(&self, storage: &mut S, key: &B256);

    /// Reset the slot to the zero value
    fn clear_slot<S: SlotActions + ?Sized>(storage: &mut S, key: &B256);

    fn slot_key(key: &B256) -> [u8; 32] {
        TypedSlotKey {
            kind: Self::KIND,
            key: *key,
        }
        .get_key()
    }
}

/// Values that fit in a single word
pub trait WordValue: Sized {
    const WORD_KIND: SlotKind;

    fn decode(word: &[u8; 32]) -> Self;

    fn encode(&self) -> [u8; 32];
}

impl<T: WordValue> SlotValue for T {
    const KIND: SlotKind = T::WORD_KIND;

    fn read_from_slot<S: SlotActions + ?Sized>(storage: &S, key: &B256) -> Self {
        T::decode(&storage.sload(&Self::slot_key(key)))
    }

    fn write_to_slot<S: SlotActions + ?Sized>(&self, storage: &mut S, key: &B256) {
        storage.sstore(&Self::slot_key(key), &self.encode());
    }

    fn clear_slot<S: SlotActions + ?Sized>(storage: &mut S, key: &B256) {
        storage.sstore(&Self::slot_key(key), &[0u8; 32]);
    }
}

impl WordValue for U256 {
    const WORD_KIND: SlotKind = SlotKind::Uint;

    fn decode(word: &[u8; 32]) -> Self {
        U256::from_be_bytes(*word)
    }

    fn encode(&self) -> [u8; 32] {
        self.to_be_bytes::<32>()
    }
}

impl WordValue for I256 {
    const WORD_KIND: SlotKind = SlotKind::Int;

    // Two's complement, same as the EVM word
    fn decode(word: &[u8; 32]) -> Self {
        I256::from_raw(U256::from_be_bytes(*word))
    }

    fn encode(&self) -> [u8; 32] {
        self.into_raw().to_be_bytes::<32>()
    }
}

impl WordValue for Address {
    const WORD_KIND: SlotKind = SlotKind::Address;

    // Big endian- the 20 address bytes sit at the end of the word
    fn decode(word: &[u8; 32]) -> Self {
        Address::from_slice(&word[12..32])
    }

    fn encode(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[12..32].copy_from_slice(self.as_slice());

        word
    }
}

impl WordValue for bool {
    const WORD_KIND: SlotKind = SlotKind::Bool;

    fn decode(word: &[u8; 32]) -> Self {
        word[31] != 0
    }

    fn encode(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[31] = *self as u8;

        word
    }
}

impl WordValue for B256 {
    const WORD_KIND: SlotKind = SlotKind::Bytes;

    fn decode(word: &[u8; 32]) -> Self {
        B256::from(*word)
    }

    fn encode(&self) -> [u8; 32] {
        self.0
    }
}

fn string_data_key(length_key: &[u8; 32], index: u64) -> [u8; 32] {
    let mut bytes = [0u8; 40];
    bytes[0..32].copy_from_slice(length_key);
    bytes[32..40].copy_from_slice(&index.to_be_bytes());

    keccak256(bytes).0
}

fn word_count(len: usize) -> u64 {
    len.div_ceil(32) as u64
}

fn read_string_length<S: SlotActions + ?Sized>(storage: &S, length_key: &[u8; 32]) -> usize {
    let len = U256::from_be_bytes(storage.sload(length_key));

    // Lengths are only ever written by write_to_slot() from a usize
    usize::try_from(len).unwrap_or(0)
}

impl SlotValue for String {
    const KIND: SlotKind = SlotKind::String;

    fn read_from_slot<S: SlotActions + ?Sized>(storage: &S, key: &B256) -> Self {
        let length_key = Self::slot_key(key);
        let len = read_string_length(storage, &length_key);

        let mut bytes = Vec::with_capacity(len);
        for index in 0..word_count(len) {
            bytes.extend_from_slice(&storage.sload(&string_data_key(&length_key, index)));
        }
        bytes.truncate(len);

        String::from_utf8_lossy(&bytes).into_owned()
    }

    fn write_to_slot<S: SlotActions + ?Sized>(&self, storage: &mut S, key: &B256) {
        // Clear the tail of a longer previous value first
        Self::clear_slot(storage, key);

        let length_key = Self::slot_key(key);
        storage.sstore(&length_key, &U256::from(self.len()).to_be_bytes::<32>());

        for (index, chunk) in self.as_bytes().chunks(32).enumerate() {
            let mut word = [0u8; 32];
            word[0..chunk.len()].copy_from_slice(chunk);

            storage.sstore(&string_data_key(&length_key, index as u64), &word);
        }
    }

    fn clear_slot<S: SlotActions + ?Sized>(storage: &mut S, key: &B256) {
        let length_key = Self::slot_key(key);
        let len = read_string_length(storage, &length_key);

        for index in 0..word_count(len) {
            storage.sstore(&string_data_key(&length_key, index), &[0u8; 32]);
        }
        storage.sstore(&length_key, &[0u8; 32]);
    }
}
