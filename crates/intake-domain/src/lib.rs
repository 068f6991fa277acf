//! intake-domain
//!
//! Pure domain models for the transaction intake form (roles, clients, form
//! sections, field keys and typed field updates).
//! No I/O, no validation rules, no network. Only data types and core enums.

pub mod address;
pub mod client;
pub mod common;
pub mod fields;
pub mod form;
pub mod role;
pub mod sections;

pub use address::*;
pub use client::*;
pub use common::*;
pub use fields::*;
pub use form::*;
pub use role::*;
pub use sections::*;
