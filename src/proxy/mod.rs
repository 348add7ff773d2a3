pub mod proxy_admin;
pub mod upgradeable_proxy;

pub use proxy_admin::*;
pub use upgradeable_proxy::*;
