pub mod context;
pub mod slot_key;
pub mod slot_storage;
pub mod typed_slot;

pub use context::*;
pub use slot_key::*;
pub use slot_storage::*;
pub use typed_slot::*;
