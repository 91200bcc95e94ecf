//! # pretix-ifirma
//!
//! Turns pretix order exports into iFirma domestic invoices and uploads
//! them through the iFirma API.
//!
//! The work happens in two independent steps:
//! 1. [`convert`] reads the `;`-separated export (comma decimals), groups
//!    rows by order and writes `ifirma_invoices.json`.
//! 2. [`upload`] reads that document and POSTs each invoice, signed with
//!    HMAC-SHA1, reporting successes and failures per record.
//!
//! All monetary values use [`rust_decimal::Decimal`] and are written as
//! exact JSON numbers.
//!
//! ## Quick Start
//!
//! ```rust
//! use pretix_ifirma::convert::Converter;
//! use rust_decimal_macros::dec;
//!
//! let report = Converter::default()
//!     .convert_str("1001;Jan Kowalski;Bilet;1;123,45;23\n1002;;Bilet;1;10,00;23\n")
//!     .unwrap();
//!
//! assert_eq!(report.records.len(), 1);
//! assert_eq!(report.skipped.len(), 1);
//! assert_eq!(report.records[0].positions[0].unit_price, dec!(123.45));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` | Invoice record types, builders, validation, JSON document |
//! | `convert` | CSV export conversion |
//! | `upload` | Signed HTTP upload |
//! | `cli` (default) | `ifirma-convert` and `ifirma-upload` binaries |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "convert")]
pub mod convert;

#[cfg(feature = "upload")]
pub mod upload;

#[cfg(feature = "cli")]
pub mod cli;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
