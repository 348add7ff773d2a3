pub mod consumer;
pub mod eternal_storage;
pub mod using_storage;

pub use consumer::*;
pub use eternal_storage::*;
pub use using_storage::*;
