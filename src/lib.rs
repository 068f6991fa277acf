//! Closing Intake collects real-estate transaction details through a gated,
//! multi-step wizard and delivers them to the records table, the cover-sheet
//! generator and the notification mailer.

pub mod cli;
pub mod errors;
pub mod gateway;
pub mod utils;

pub use intake_config;
pub use intake_core;
pub use intake_domain;
pub use intake_storage_json;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup debug log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::debug!("Closing Intake tracing initialized.");
    });
}
