//! Invoice record types, builders, validation and the JSON document format.
//!
//! The types mirror the iFirma `fakturakraj` request schema; Rust field names
//! are English, the serialized names are the API's.

mod builder;
pub mod decimal;
mod document;
mod error;
mod types;
mod validation;

pub use builder::*;
pub use decimal::parse_locale_decimal;
pub use document::*;
pub use error::*;
pub use types::*;
pub use validation::*;
