use std::fmt;
use std::time::Duration;

use crate::core::IfirmaError;

/// Default endpoint for domestic invoices.
pub const DEFAULT_URL: &str = "https://www.ifirma.pl/iapi/fakturakraj.json";
/// Default API key name.
pub const DEFAULT_KEY_NAME: &str = "faktura";
/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// How the API key string turns into HMAC key bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyEncoding {
    /// Use the UTF-8 bytes of the key as given.
    #[default]
    Raw,
    /// The key is hex; decode it first (the form shown in the iFirma panel).
    Hex,
}

impl KeyEncoding {
    fn parse(value: &str) -> Result<Self, IfirmaError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "raw" => Ok(Self::Raw),
            "hex" => Ok(Self::Hex),
            other => Err(IfirmaError::Config(format!(
                "IFIRMA_KEY_ENCODING must be 'raw' or 'hex', got '{other}'"
            ))),
        }
    }
}

/// API credentials. Held in memory only; `Debug` never prints the key.
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub username: String,
    pub key_name: String,
    pub url: String,
    pub key_encoding: KeyEncoding,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("username", &self.username)
            .field("key_name", &self.key_name)
            .field("url", &self.url)
            .field("key_encoding", &self.key_encoding)
            .finish()
    }
}

impl Credentials {
    /// Credentials with the default key name, endpoint and raw key encoding.
    pub fn new(api_key: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            username: username.into(),
            key_name: DEFAULT_KEY_NAME.into(),
            url: DEFAULT_URL.into(),
            key_encoding: KeyEncoding::Raw,
        }
    }

    pub fn key_name(mut self, key_name: impl Into<String>) -> Self {
        self.key_name = key_name.into();
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn key_encoding(mut self, encoding: KeyEncoding) -> Self {
        self.key_encoding = encoding;
        self
    }
}

/// Everything the uploader needs, resolved once at start-up.
///
/// | Variable | Required | Default |
/// |----------|----------|---------|
/// | `IFIRMA_API_KEY` | yes | |
/// | `IFIRMA_USERNAME` | yes | |
/// | `IFIRMA_KEY_NAME` | no | `faktura` |
/// | `IFIRMA_URL` | no | `https://www.ifirma.pl/iapi/fakturakraj.json` |
/// | `IFIRMA_TIMEOUT_SECS` | no | `300` |
/// | `IFIRMA_KEY_ENCODING` | no | `raw` |
#[derive(Debug, Clone)]
pub struct UploaderConfig {
    pub credentials: Credentials,
    pub timeout: Duration,
}

impl UploaderConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, IfirmaError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IfirmaError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = get("IFIRMA_API_KEY").ok_or(IfirmaError::MissingCredential("IFIRMA_API_KEY"))?;
        let username =
            get("IFIRMA_USERNAME").ok_or(IfirmaError::MissingCredential("IFIRMA_USERNAME"))?;

        let mut credentials = Credentials::new(api_key.trim(), username.trim());
        if let Some(key_name) = get("IFIRMA_KEY_NAME") {
            credentials = credentials.key_name(key_name.trim());
        }
        if let Some(url) = get("IFIRMA_URL") {
            credentials = credentials.url(url.trim());
        }
        if let Some(encoding) = get("IFIRMA_KEY_ENCODING") {
            credentials = credentials.key_encoding(KeyEncoding::parse(&encoding)?);
        }

        let mut config = Self::new(credentials);
        if let Some(secs) = get("IFIRMA_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                IfirmaError::Config(format!(
                    "IFIRMA_TIMEOUT_SECS must be a whole number of seconds, got '{secs}'"
                ))
            })?;
            config = config.timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}
