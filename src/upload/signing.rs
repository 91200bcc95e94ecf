//! Request signing for the iFirma API.
//!
//! The signing string is `url + username + key_name + body`; the header
//! carries its HMAC-SHA1 digest as lowercase hex.

use std::fmt;

use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::core::IfirmaError;

use super::config::{Credentials, KeyEncoding};

type HmacSha1 = Hmac<Sha1>;

/// Name of the authentication header.
pub const AUTH_HEADER: &str = "Authentication";

/// HMAC-SHA1 of `message` under `key`, hex encoded.
pub fn hmac_sha1_hex(key: &[u8], message: &str) -> Result<String, IfirmaError> {
    let mut mac = HmacSha1::new_from_slice(key)
        .map_err(|e| IfirmaError::Config(format!("unusable API key: {e}")))?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Signs request bodies for one set of credentials.
#[derive(Clone)]
pub struct RequestSigner {
    key: Vec<u8>,
    username: String,
    key_name: String,
    url: String,
}

impl fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSigner")
            .field("key", &"<redacted>")
            .field("username", &self.username)
            .field("key_name", &self.key_name)
            .field("url", &self.url)
            .finish()
    }
}

impl RequestSigner {
    /// # Errors
    ///
    /// Returns `IfirmaError::Config` when a hex-encoded key does not decode.
    pub fn new(credentials: &Credentials) -> Result<Self, IfirmaError> {
        let key = match credentials.key_encoding {
            KeyEncoding::Raw => credentials.api_key.as_bytes().to_vec(),
            KeyEncoding::Hex => hex::decode(credentials.api_key.trim()).map_err(|e| {
                IfirmaError::Config(format!("IFIRMA_API_KEY is not valid hex: {e}"))
            })?,
        };
        Ok(Self {
            key,
            username: credentials.username.clone(),
            key_name: credentials.key_name.clone(),
            url: credentials.url.clone(),
        })
    }

    /// Canonical text the digest is computed over.
    pub fn signing_string(&self, body: &str) -> String {
        format!("{}{}{}{}", self.url, self.username, self.key_name, body)
    }

    /// Hex HMAC-SHA1 of the signing string for `body`.
    pub fn sign(&self, body: &str) -> Result<String, IfirmaError> {
        hmac_sha1_hex(&self.key, &self.signing_string(body))
    }

    /// Value of the `Authentication` header for `body`.
    pub fn authentication_header(&self, body: &str) -> Result<String, IfirmaError> {
        Ok(format!(
            "IAPIS user={}, hmac-sha1={}",
            self.username,
            self.sign(body)?
        ))
    }
}
