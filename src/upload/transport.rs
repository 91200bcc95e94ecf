use std::time::Duration;

use crate::core::IfirmaError;

/// A request ready to go on the wire. The body is exactly the string
/// that was signed.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

/// Status and body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends signed requests. Implemented over HTTP by [`HttpTransport`];
/// tests substitute their own.
pub trait Transport {
    /// Deliver `request` and return whatever the server answered.
    ///
    /// # Errors
    ///
    /// `IfirmaError::Network` when no response was received.
    fn post(&self, request: &SignedRequest) -> Result<HttpResponse, IfirmaError>;
}

/// Blocking HTTP transport with an explicit timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, IfirmaError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IfirmaError::Network(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn post(&self, request: &SignedRequest) -> Result<HttpResponse, IfirmaError> {
        let mut builder = self.client.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value.as_str());
        }

        let resp = builder
            .body(request.body.clone().into_bytes())
            .send()
            .map_err(|e| IfirmaError::Network(e.to_string()))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .map_err(|e| IfirmaError::Network(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}
