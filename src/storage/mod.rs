pub mod config;
pub mod local_store;

pub use config::{Config, ConfigError};
pub use local_store::{LocalStore, StoreError};
