//! intake-config
//!
//! Deployment settings for the intake tool: endpoints, table ids, notification
//! recipients and validation tunables, plus disk persistence helpers.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::Config;
