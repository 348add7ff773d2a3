pub mod address_registry;
pub mod config;

pub use address_registry::{AddressRegistry, IAddressRegistry};
pub use config::{Config, IConfig};
