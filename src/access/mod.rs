pub mod admin;
pub mod guard;
pub mod initializable;
pub mod ownable;
pub mod role_set;

pub use guard::*;
pub use role_set::*;
