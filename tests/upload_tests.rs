#![cfg(feature = "upload")]

use std::cell::RefCell;
use std::collections::VecDeque;

use chrono::NaiveDate;
use pretix_ifirma::core::*;
use pretix_ifirma::upload::*;
use rust_decimal_macros::dec;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Records every request and answers from a queue (200 + Kod 0 when empty).
#[derive(Default)]
struct ScriptedTransport {
    responses: RefCell<VecDeque<Result<HttpResponse, IfirmaError>>>,
    requests: RefCell<Vec<SignedRequest>>,
}

impl ScriptedTransport {
    fn answering(responses: Vec<Result<HttpResponse, IfirmaError>>) -> Self {
        Self {
            responses: RefCell::new(responses.into()),
            requests: RefCell::default(),
        }
    }
}

impl Transport for ScriptedTransport {
    fn post(&self, request: &SignedRequest) -> Result<HttpResponse, IfirmaError> {
        self.requests.borrow_mut().push(request.clone());
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(ok()))
    }
}

fn ok() -> HttpResponse {
    HttpResponse {
        status: 200,
        body: r#"{"response":{"Kod":0,"Informacja":"Faktura została wystawiona"}}"#.into(),
    }
}

fn status(code: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status: code,
        body: body.into(),
    }
}

fn config() -> UploaderConfig {
    UploaderConfig::new(Credentials::new("secret", "jan"))
}

fn record(order: &str) -> InvoiceRecord {
    InvoiceRecordBuilder::new(
        NaiveDate::from_ymd_opt(2025, 3, 23).unwrap(),
        ContractorBuilder::new("Jan Kowalski").build(),
    )
    .remarks(order)
    .add_position(PositionBuilder::new("Bilet", dec!(1), dec!(123.45), VatRate::Standard).build())
    .build()
    .unwrap()
}

fn uploader(transport: ScriptedTransport) -> Uploader<ScriptedTransport> {
    Uploader::with_transport(&config(), transport).unwrap()
}

// ---------------------------------------------------------------------------
// Signing
// ---------------------------------------------------------------------------

#[test]
fn signature_is_deterministic() {
    let up = uploader(ScriptedTransport::default());
    let a = up.build_request(&record("1001")).unwrap();
    let b = up.build_request(&record("1001")).unwrap();
    assert_eq!(a.body, b.body);
    assert_eq!(a.headers, b.headers);
}

#[test]
fn signature_covers_url_user_key_name_and_body() {
    let up = uploader(ScriptedTransport::default());
    let request = up.build_request(&record("1001")).unwrap();

    let expected = hmac_sha1_hex(
        b"secret",
        &format!("{DEFAULT_URL}janfaktura{}", request.body),
    )
    .unwrap();
    let auth = request
        .headers
        .iter()
        .find(|(name, _)| *name == AUTH_HEADER)
        .map(|(_, value)| value.clone())
        .unwrap();
    assert_eq!(auth, format!("IAPIS user=jan, hmac-sha1={expected}"));
}

#[test]
fn different_bodies_sign_differently() {
    let up = uploader(ScriptedTransport::default());
    let a = up.build_request(&record("1001")).unwrap();
    let b = up.build_request(&record("1002")).unwrap();
    assert_ne!(a.headers[2].1, b.headers[2].1);
}

#[test]
fn request_headers_and_body() {
    let up = uploader(ScriptedTransport::default());
    let request = up.build_request(&record("1001")).unwrap();
    assert_eq!(request.url, DEFAULT_URL);
    assert!(request.headers.contains(&("Accept", "application/json".to_string())));
    assert!(
        request
            .headers
            .contains(&("Content-Type", "application/json; charset=UTF-8".to_string()))
    );
    assert_eq!(request.body, request_body(&record("1001")).unwrap());
    assert!(request.body.contains("\"CenaJednostkowa\":123.45"));
}

// ---------------------------------------------------------------------------
// Best-effort batch
// ---------------------------------------------------------------------------

#[test]
fn all_records_sent() {
    let up = uploader(ScriptedTransport::default());
    let report = up.upload_all(&[record("1"), record("2"), record("3")]);
    assert_eq!(report.succeeded(), 3);
    assert_eq!(report.failed(), 0);
    assert!(report.all_sent());
    assert_eq!(up.transport().requests.borrow().len(), 3);
}

#[test]
fn http_error_does_not_stop_batch() {
    let transport = ScriptedTransport::answering(vec![
        Ok(ok()),
        Ok(status(400, r#"{"response":{"Kod":201,"Informacja":"Nieprawidłowe dane"}}"#)),
        Ok(status(500, "Internal Server Error")),
        Ok(ok()),
    ]);
    let up = uploader(transport);
    let records = [record("1"), record("2"), record("3"), record("4")];
    let report = up.upload_all(&records);

    assert_eq!(up.transport().requests.borrow().len(), 4);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 2);
    assert!(!report.all_sent());

    let failed: Vec<&str> = report.failures().map(|(id, _)| id).collect();
    assert_eq!(failed, ["2", "3"]);

    let (_, err) = report.failures().next().unwrap();
    match err {
        IfirmaError::ApiRejection { status, body } => {
            assert_eq!(*status, 400);
            assert!(body.contains("Nieprawidłowe dane"));
        }
        other => panic!("expected API rejection, got {other:?}"),
    }
}

#[test]
fn nonzero_kod_is_rejection() {
    let transport = ScriptedTransport::answering(vec![Ok(status(
        200,
        r#"{"response":{"Kod":400,"Informacja":"Brak uprawnień"}}"#,
    ))]);
    let up = uploader(transport);
    let report = up.upload_all(&[record("1"), record("2")]);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.succeeded(), 1);
    assert!(matches!(
        report.results[0].outcome,
        UploadOutcome::Failed(IfirmaError::ApiRejection { status: 200, .. })
    ));
}

#[test]
fn network_failure_does_not_stop_batch() {
    let transport = ScriptedTransport::answering(vec![
        Err(IfirmaError::Network("connection refused".into())),
        Ok(ok()),
    ]);
    let up = uploader(transport);
    let report = up.upload_all(&[record("1"), record("2")]);
    assert!(matches!(
        report.results[0].outcome,
        UploadOutcome::Failed(IfirmaError::Network(_))
    ));
    assert!(matches!(report.results[1].outcome, UploadOutcome::Sent(_)));
}

#[test]
fn invalid_record_is_not_sent() {
    let mut bad = record("1");
    bad.positions[0].vat_rate = dec!(0.19);
    let up = uploader(ScriptedTransport::default());
    let report = up.upload_all(&[bad, record("2")]);

    assert_eq!(up.transport().requests.borrow().len(), 1);
    assert!(matches!(
        report.results[0].outcome,
        UploadOutcome::Failed(IfirmaError::InvalidRecord(_))
    ));
    assert_eq!(report.succeeded(), 1);
}

#[test]
fn non_json_success_body_counts_as_sent() {
    let transport = ScriptedTransport::answering(vec![Ok(status(201, "created"))]);
    let up = uploader(transport);
    let report = up.upload_all(&[record("1")]);
    assert!(report.all_sent());
    assert!(matches!(&report.results[0].outcome, UploadOutcome::Sent(body) if body == "created"));
}

#[test]
fn record_without_remarks_uses_buyer_name() {
    let mut r = record("");
    r.remarks.clear();
    let transport = ScriptedTransport::answering(vec![Ok(status(500, ""))]);
    let report = uploader(transport).upload_all(&[r]);
    assert_eq!(report.results[0].record_id, "Jan Kowalski");
}

#[test]
fn empty_batch() {
    let report = uploader(ScriptedTransport::default()).upload_all(&[]);
    assert_eq!(report.succeeded(), 0);
    assert_eq!(report.failed(), 0);
    assert!(report.all_sent());
}

// ---------------------------------------------------------------------------
// Document input
// ---------------------------------------------------------------------------

#[test]
fn upload_file_reads_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(DEFAULT_DOCUMENT_PATH);
    write_document(&path, &[record("1"), record("2")]).unwrap();

    let up = uploader(ScriptedTransport::default());
    let report = up.upload_file(&path).unwrap();
    assert_eq!(report.succeeded(), 2);

    // the bytes sent are the compact form of what was written
    let sent = up.transport().requests.borrow()[0].body.clone();
    assert_eq!(sent, request_body(&record("1")).unwrap());
}

#[test]
fn upload_file_sends_unmodelled_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(DEFAULT_DOCUMENT_PATH);
    let mut value = serde_json::to_value(record("1")).unwrap();
    value["Kontrahent"]["NIP"] = serde_json::json!("1234567890");
    value["Kontrahent"]["OsobaFizyczna"] = serde_json::json!(false);
    std::fs::write(&path, serde_json::to_string_pretty(&[value]).unwrap()).unwrap();

    let up = uploader(ScriptedTransport::default());
    let report = up.upload_file(&path).unwrap();
    assert!(report.all_sent());

    let request = up.transport().requests.borrow()[0].clone();
    assert!(request.body.contains("\"NIP\":\"1234567890\""));
    let expected = hmac_sha1_hex(
        b"secret",
        &format!("{DEFAULT_URL}janfaktura{}", request.body),
    )
    .unwrap();
    assert!(request.headers[2].1.ends_with(&expected));
}

#[test]
fn undecodable_element_fails_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(DEFAULT_DOCUMENT_PATH);
    let mut bad = serde_json::to_value(record("1")).unwrap();
    bad["Pozycje"][0]["Ilosc"] = serde_json::json!("jeden");
    let good = serde_json::to_value(record("2")).unwrap();
    std::fs::write(&path, serde_json::to_string_pretty(&[bad, good]).unwrap()).unwrap();

    let up = uploader(ScriptedTransport::default());
    let report = up.upload_file(&path).unwrap();

    assert_eq!(report.failed(), 1);
    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.results[0].record_id, "1");
    assert!(matches!(
        &report.results[0].outcome,
        UploadOutcome::Failed(IfirmaError::InvalidRecord(reason)) if reason.contains("jeden")
    ));
    // only the good element reached the wire
    let requests = up.transport().requests.borrow();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].body.contains("\"Uwagi\":\"2\""));
}

#[test]
fn upload_file_top_level_object_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("object.json");
    std::fs::write(&path, serde_json::to_string(&record("1")).unwrap()).unwrap();
    let up = uploader(ScriptedTransport::default());
    assert!(matches!(up.upload_file(&path).unwrap_err(), IfirmaError::Json(_)));
    assert!(up.transport().requests.borrow().is_empty());
}

#[test]
fn upload_file_missing_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let up = uploader(ScriptedTransport::default());
    let err = up.upload_file(dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, IfirmaError::Io { .. }));
    assert!(up.transport().requests.borrow().is_empty());
}

#[test]
fn upload_file_malformed_json_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "[{\"Status\":").unwrap();
    let err = uploader(ScriptedTransport::default())
        .upload_file(&path)
        .unwrap_err();
    assert!(matches!(err, IfirmaError::Json(_)));
}

// ---------------------------------------------------------------------------
// Response envelope
// ---------------------------------------------------------------------------

#[test]
fn parse_envelope() {
    let api = parse_api_response(r#"{"response":{"Kod":0,"Informacja":"OK","Identyfikator":123}}"#)
        .unwrap();
    assert_eq!(api.code, 0);
    assert_eq!(api.message.as_deref(), Some("OK"));

    assert!(parse_api_response("<html>").is_none());
    assert!(parse_api_response(r#"{"other":1}"#).is_none());
}
