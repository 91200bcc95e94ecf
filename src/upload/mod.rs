//! Signed upload of invoice records to the iFirma API.
//!
//! Each record is rendered as compact JSON, signed with HMAC-SHA1 and sent
//! in its own POST. Records read from a document are sent as stored,
//! including keys the record type does not know. A rejected, undecodable or
//! undeliverable record is reported and the pass moves on; nothing is
//! retried.
//!
//! # Example
//!
//! ```ignore
//! use pretix_ifirma::upload::*;
//!
//! let config = UploaderConfig::from_env()?;
//! let report = Uploader::new(&config)?.upload_file("ifirma_invoices.json")?;
//! println!("{} sent, {} failed", report.succeeded(), report.failed());
//! ```

mod config;
mod signing;
mod transport;
mod uploader;

pub use config::{
    Credentials, DEFAULT_KEY_NAME, DEFAULT_TIMEOUT, DEFAULT_URL, KeyEncoding, UploaderConfig,
};
pub use signing::{AUTH_HEADER, RequestSigner, hmac_sha1_hex};
pub use transport::{HttpResponse, HttpTransport, SignedRequest, Transport};
pub use uploader::{
    ApiResponse, RecordResult, UploadOutcome, UploadReport, Uploader, parse_api_response,
};
