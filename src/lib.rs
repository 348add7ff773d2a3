//! Upgrade-safe persistent state for ledger contracts.
//!
//! Contracts keep their data in an `EternalStorage` that outlives any version
//! of their logic, hand it to a successor with an explicit ownership
//! transfer, and sit behind an `UpgradeableProxy` so their address survives
//! logic upgrades. Everything runs on an in-process `Ledger`.

pub mod access;
pub mod config;
pub mod error;
pub mod ledger;
pub mod parameters;
pub mod proxy;
pub mod state;
pub mod storage;
pub mod token_utils;
pub mod treasury;

#[cfg(test)]
mod test_utils;

pub use error::{LedgerError, LedgerResult};
pub use ledger::{Contract, Ledger, LedgerConfig};
