//! Concrete collaborators for the submission pipeline.

pub mod http;

pub use http::{GatewaySettings, HttpGateway, AIRTABLE_KEY_ENV};
