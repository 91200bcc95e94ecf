use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::core::{
    DocumentEntry, IfirmaError, InvoiceRecord, read_document, request_body, validate_record,
};

use super::config::UploaderConfig;
use super::signing::{AUTH_HEADER, RequestSigner};
use super::transport::{HttpTransport, SignedRequest, Transport};

/// The envelope iFirma wraps every answer in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiResponse {
    /// 0 means success; anything else is an error code.
    #[serde(rename = "Kod")]
    pub code: i64,
    #[serde(rename = "Informacja", default)]
    pub message: Option<String>,
}

#[derive(Deserialize)]
struct ApiEnvelope {
    response: ApiResponse,
}

/// Parse the `{"response": {"Kod": .., "Informacja": ..}}` envelope.
/// Returns `None` for bodies in any other shape.
pub fn parse_api_response(body: &str) -> Option<ApiResponse> {
    serde_json::from_str::<ApiEnvelope>(body)
        .ok()
        .map(|e| e.response)
}

/// Final state of one record.
#[derive(Debug)]
pub enum UploadOutcome {
    /// Accepted; holds the response body.
    Sent(String),
    Failed(IfirmaError),
}

/// One record's identifier and outcome.
#[derive(Debug)]
pub struct RecordResult {
    pub record_id: String,
    pub outcome: UploadOutcome,
}

/// Per-record results of an upload pass, in input order.
#[derive(Debug, Default)]
pub struct UploadReport {
    pub results: Vec<RecordResult>,
}

impl UploadReport {
    pub fn succeeded(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, UploadOutcome::Sent(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    /// Identifiers and errors of the records that failed.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &IfirmaError)> {
        self.results.iter().filter_map(|r| match &r.outcome {
            UploadOutcome::Failed(e) => Some((r.record_id.as_str(), e)),
            UploadOutcome::Sent(_) => None,
        })
    }

    /// True when every record was sent.
    pub fn all_sent(&self) -> bool {
        self.failed() == 0
    }
}

/// Sends invoice records one by one, never stopping on a failed record.
#[derive(Debug)]
pub struct Uploader<T = HttpTransport> {
    signer: RequestSigner,
    url: String,
    transport: T,
}

impl Uploader<HttpTransport> {
    /// Uploader over HTTP using the configured timeout.
    pub fn new(config: &UploaderConfig) -> Result<Self, IfirmaError> {
        let transport = HttpTransport::new(config.timeout)?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> Uploader<T> {
    pub fn with_transport(config: &UploaderConfig, transport: T) -> Result<Self, IfirmaError> {
        Ok(Self {
            signer: RequestSigner::new(&config.credentials)?,
            url: config.credentials.url.clone(),
            transport,
        })
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Serialize and sign one record.
    pub fn build_request(&self, record: &InvoiceRecord) -> Result<SignedRequest, IfirmaError> {
        self.sign_body(request_body(record)?)
    }

    fn sign_body(&self, body: String) -> Result<SignedRequest, IfirmaError> {
        let headers = vec![
            ("Accept", "application/json".to_string()),
            ("Content-Type", "application/json; charset=UTF-8".to_string()),
            (AUTH_HEADER, self.signer.authentication_header(&body)?),
        ];
        Ok(SignedRequest {
            url: self.url.clone(),
            headers,
            body,
        })
    }

    /// Validate, sign and send one record. Returns the response body.
    ///
    /// # Errors
    ///
    /// `InvalidRecord` when validation fails (nothing is sent),
    /// `Network` when no response arrived, `ApiRejection` for a non-2xx
    /// status or a non-zero `Kod` in the response envelope.
    pub fn upload_record(&self, record: &InvoiceRecord) -> Result<String, IfirmaError> {
        self.send_checked(record, request_body(record)?)
    }

    /// Like [`Uploader::upload_record`], but sends the element exactly as it
    /// is stored in the document.
    pub fn upload_entry(&self, entry: &DocumentEntry) -> Result<String, IfirmaError> {
        let record = entry
            .record
            .as_ref()
            .map_err(|reason| IfirmaError::InvalidRecord(reason.clone()))?;
        self.send_checked(record, entry.body.clone())
    }

    fn send_checked(&self, record: &InvoiceRecord, body: String) -> Result<String, IfirmaError> {
        let errors = validate_record(record);
        if !errors.is_empty() {
            let joined: Vec<String> = errors.iter().map(ToString::to_string).collect();
            return Err(IfirmaError::InvalidRecord(joined.join("; ")));
        }

        let request = self.sign_body(body)?;
        let response = self.transport.post(&request)?;

        if !response.is_success() {
            return Err(IfirmaError::ApiRejection {
                status: response.status,
                body: response.body,
            });
        }
        if let Some(api) = parse_api_response(&response.body) {
            if api.code != 0 {
                return Err(IfirmaError::ApiRejection {
                    status: response.status,
                    body: response.body,
                });
            }
        }
        Ok(response.body)
    }

    /// Upload every record in order. Failures are logged and collected.
    pub fn upload_all(&self, records: &[InvoiceRecord]) -> UploadReport {
        let attempts = records
            .iter()
            .map(|r| (r.identifier().to_string(), self.upload_record(r)));
        collect_report(attempts)
    }

    /// Upload every document element in order. Elements that do not decode
    /// fail on their own; the rest are still sent.
    pub fn upload_entries(&self, entries: &[DocumentEntry]) -> UploadReport {
        let attempts = entries
            .iter()
            .map(|e| (e.identifier(), self.upload_entry(e)));
        collect_report(attempts)
    }

    /// Read the JSON document at `path` and upload its records.
    ///
    /// # Errors
    ///
    /// Fails only when the document cannot be read or parsed.
    pub fn upload_file(&self, path: impl AsRef<Path>) -> Result<UploadReport, IfirmaError> {
        let entries = read_document(path)?;
        info!(count = entries.len(), "loaded invoices");
        Ok(self.upload_entries(&entries))
    }
}

/// Log each attempt and gather the outcomes. Attempts run lazily, one at a
/// time, as the iterator is drained.
fn collect_report<I>(attempts: I) -> UploadReport
where
    I: Iterator<Item = (String, Result<String, IfirmaError>)>,
{
    let mut report = UploadReport::default();
    for (i, (id, result)) in attempts.enumerate() {
        let record_id = if id.is_empty() {
            format!("#{}", i + 1)
        } else {
            id
        };
        let outcome = match result {
            Ok(body) => {
                info!(record = %record_id, response = %body, "invoice sent");
                UploadOutcome::Sent(body)
            }
            Err(err) => {
                warn!(record = %record_id, error = %err, "invoice upload failed");
                UploadOutcome::Failed(err)
            }
        };
        report.results.push(RecordResult { record_id, outcome });
    }

    info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        "upload finished"
    );
    report
}
