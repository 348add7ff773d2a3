// Registry names under which collaborators are looked up

/// Reward supplier paying out to the treasury
pub const WITHDRAW_KEY: &str = "Withdraw";

/// Reward token held by the treasury
pub const DEV_KEY: &str = "Dev";

/// Demonstration slot of the storage consumers, hashed with keccak256
pub const UINT_SLOT_NAME: &str = "uint";

// Ledger limits

/// Frames nested deeper than this fail. Frames nest on the native stack, so
/// this stays below the EVM limit of 1024 to fit a default 2 MiB thread.
pub const MAX_CALL_DEPTH: usize = 256;
