pub mod v1;
pub mod v2;

pub use v1::{ITreasury, Treasury};
pub use v2::{ITreasuryV2, TreasuryV2, TreasuryVersion};

pub(crate) use v1::COLLABORATOR_SLOT;
