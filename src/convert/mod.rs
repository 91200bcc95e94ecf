//! CSV export → iFirma invoice records.
//!
//! Reads a `;`-delimited export with comma decimals, groups rows by order
//! identifier and writes one invoice per order to a JSON document.
//! Malformed rows are skipped and reported, never fatal.
//!
//! # Example
//!
//! ```
//! use pretix_ifirma::convert::*;
//! use rust_decimal_macros::dec;
//!
//! let report = Converter::default()
//!     .convert_str("1001;Jan Kowalski;Bilet;1;123,45;23\n")
//!     .unwrap();
//!
//! let invoice = &report.records[0];
//! assert_eq!(invoice.contractor.name, "Jan Kowalski");
//! assert_eq!(invoice.positions[0].unit_price, dec!(123.45));
//! assert_eq!(invoice.positions[0].vat().unwrap().percent(), dec!(23));
//! ```

mod config;
mod converter;
mod group;
mod row;

pub use config::{ConverterConfig, ConverterConfigBuilder};
pub use converter::{ConversionReport, Converter};
pub use group::{OrderGroup, OrderGroups};
pub use row::{Buyer, CsvLayout, OrderItem, OrderRow, PretixColumns, RowError};
