//! Lookup orchestration for the map screen: a tap goes in, a classified
//! weather reading (or a short error message) and warning state come out.

pub mod bridge;
pub mod error_mapping;
pub mod models;
pub mod services;

pub use models::lookup_model::{LookupModel, WarningState};
pub use services::{LookupServiceMessage, LookupServices};
