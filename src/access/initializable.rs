use crate::{
    error::{LedgerError, LedgerResult},
    require,
    state::{FixedSlot, SlotActions, SlotKey, INITIALIZED_KEY_SEED},
};

const INITIALIZED_SLOT: FixedSlot = FixedSlot(INITIALIZED_KEY_SEED);

pub fn is_initialized<S: SlotActions + ?Sized>(storage: &S) -> bool {
    storage.sload(&INITIALIZED_SLOT.get_key())[31] != 0
}

/// Mark the contract initialized. Fails if this already happened, so the
/// initializer body after it runs at most once per storage.
pub fn initializer<S: SlotActions + ?Sized>(storage: &mut S) -> LedgerResult<()> {
    require!(!is_initialized(storage), LedgerError::AlreadyInitialized);

    let mut word = [0u8; 32];
    word[31] = 1;
    storage.sstore(&INITIALIZED_SLOT.get_key(), &word);

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::state::SlotStorage;

    #[test]
    fn test_initializer_runs_once() {
        let mut storage = SlotStorage::new();
        assert!(!is_initialized(&storage));

        assert_eq!(initializer(&mut storage), Ok(()));
        assert!(is_initialized(&storage));

        assert_eq!(initializer(&mut storage), Err(LedgerError::AlreadyInitialized));
    }
}
