//! The intermediate JSON document handed from the converter to the uploader.

use std::fs;
use std::path::Path;

use serde_json::Value;

use super::error::IfirmaError;
use super::types::InvoiceRecord;

/// Default file name of the intermediate document.
pub const DEFAULT_DOCUMENT_PATH: &str = "ifirma_invoices.json";

/// Write all records as one pretty-printed JSON array, replacing any
/// existing file.
pub fn write_document(path: impl AsRef<Path>, records: &[InvoiceRecord]) -> Result<(), IfirmaError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json).map_err(|e| IfirmaError::io(path.display().to_string(), e))
}

/// One element of the document.
///
/// `body` is the element re-rendered as compact JSON with its keys, key
/// order and number text unchanged, so fields the record type does not
/// model survive the trip to the API. `record` is the typed view used for
/// validation, or the reason the element does not decode.
#[derive(Debug, Clone)]
pub struct DocumentEntry {
    pub body: String,
    pub record: Result<InvoiceRecord, String>,
}

impl DocumentEntry {
    fn from_value(value: &Value) -> Result<Self, IfirmaError> {
        let body = serde_json::to_string(value)?;
        let record = serde_json::from_str::<InvoiceRecord>(&body).map_err(|e| e.to_string());
        Ok(Self { body, record })
    }

    /// Order code or buyer name of the element, read without decoding the
    /// whole record. Empty when neither is present.
    pub fn identifier(&self) -> String {
        match &self.record {
            Ok(record) => record.identifier().to_string(),
            Err(_) => serde_json::from_str::<Value>(&self.body)
                .ok()
                .and_then(|v| {
                    [v.pointer("/Uwagi"), v.pointer("/Kontrahent/Nazwa")]
                        .into_iter()
                        .flatten()
                        .filter_map(Value::as_str)
                        .map(str::trim)
                        .find(|s| !s.is_empty())
                        .map(str::to_string)
                })
                .unwrap_or_default(),
        }
    }
}

/// Read the JSON array written by [`write_document`].
///
/// Only an unreadable file or a top level that is not a JSON array is an
/// error; elements that do not decode are returned with their reason.
pub fn read_document(path: impl AsRef<Path>) -> Result<Vec<DocumentEntry>, IfirmaError> {
    let path = path.as_ref();
    let text =
        fs::read_to_string(path).map_err(|e| IfirmaError::io(path.display().to_string(), e))?;
    let elements: Vec<Value> = serde_json::from_str(&text)?;
    elements.iter().map(DocumentEntry::from_value).collect()
}

/// Compact request body for a single record. This exact string is both
/// signed and sent.
pub fn request_body(record: &InvoiceRecord) -> Result<String, IfirmaError> {
    Ok(serde_json::to_string(record)?)
}
