//! intake-core
//!
//! Step definitions, validation, form state and submission mapping for the
//! transaction intake form.
//! Depends on intake-domain. No CLI, no terminal I/O, no concrete network or
//! filesystem access (collaborators are reached through traits).

pub mod address;
pub mod error;
pub mod format;
pub mod gateway;
pub mod steps;
pub mod store;
pub mod submission;
pub mod time;
pub mod validation;

pub use address::*;
pub use error::{CoreError, GatewayError};
pub use gateway::*;
pub use steps::*;
pub use store::*;
pub use submission::*;
pub use time::*;
pub use validation::*;
