//! # Rule Sources
//!
//! A [`RuleSource`] produces the raw bytes of a rule document. It is the
//! only place where rule loading touches the network or the filesystem.
//!
//! | Adapter | Reads from |
//! |---------|-----------|
//! | [`HttpRuleSource`] | HTTP(S) GET via `reqwest` |
//! | [`FileRuleSource`] | local file via `tokio::fs` |
//! | [`StaticRuleSource`] | bytes held in memory (tests, embedding) |
//!
//! [`RuleLocation`] decides between HTTP and file from a single location
//! string, so a URL is never opened as a path and a path is never fetched
//! as a URL. [`AnyRuleSource`] wraps the chosen adapter for callers that
//! pick at runtime.
//!
//! ## Timeout & Retry
//!
//! The HTTP adapter applies a per-request timeout. The overall load deadline
//! is enforced by [`crate::RuleStore::load`]. Retries are NOT built in;
//! callers own retry policy.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::RuleError;

/// Capability that fetches the raw bytes of a rule document.
///
/// Implementations must be `Send + Sync` so a loaded source can be shared
/// across tasks.
pub trait RuleSource: Send + Sync {
    /// Human-readable origin (URL or path) for diagnostics.
    fn origin(&self) -> String;

    /// Fetch the document bytes.
    fn fetch(&self) -> impl Future<Output = Result<Vec<u8>, RuleError>> + Send;
}

// ─── HTTP ───────────────────────────────────────────────────────────────

/// Fetches a rule document with an HTTP GET.
#[derive(Debug, Clone)]
pub struct HttpRuleSource {
    client: reqwest::Client,
    url: Url,
}

impl HttpRuleSource {
    /// Create an HTTP source with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Fetch`] if the HTTP client cannot be built.
    pub fn new(url: Url, request_timeout: Duration) -> Result<Self, RuleError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| RuleError::Fetch {
                origin: url.to_string(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client, url })
    }

    /// The URL this source fetches.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl RuleSource for HttpRuleSource {
    fn origin(&self) -> String {
        self.url.to_string()
    }

    async fn fetch(&self) -> Result<Vec<u8>, RuleError> {
        let origin = self.origin();
        tracing::debug!(url = %self.url, "fetching rule document");

        let resp = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| RuleError::Fetch {
                origin: origin.clone(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RuleError::HttpStatus {
                origin,
                status: status.as_u16(),
            });
        }

        let body = resp.bytes().await.map_err(|e| RuleError::Fetch {
            origin: origin.clone(),
            reason: format!("failed to read response body: {e}"),
        })?;
        Ok(body.to_vec())
    }
}

// ─── File ───────────────────────────────────────────────────────────────

/// Reads a rule document from the local filesystem.
#[derive(Debug, Clone)]
pub struct FileRuleSource {
    path: PathBuf,
}

impl FileRuleSource {
    /// Create a file source.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RuleSource for FileRuleSource {
    fn origin(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<Vec<u8>, RuleError> {
        tracing::debug!(path = %self.path.display(), "reading rule document");
        tokio::fs::read(&self.path).await.map_err(|e| RuleError::Fetch {
            origin: self.origin(),
            reason: if e.kind() == std::io::ErrorKind::NotFound {
                "file not found".to_string()
            } else {
                e.to_string()
            },
        })
    }
}

// ─── In-memory ──────────────────────────────────────────────────────────

/// Serves a fixed document from memory.
#[derive(Debug, Clone)]
pub struct StaticRuleSource {
    origin: String,
    bytes: Vec<u8>,
}

impl StaticRuleSource {
    /// Create an in-memory source.
    pub fn new(origin: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            origin: origin.into(),
            bytes: bytes.into(),
        }
    }
}

impl RuleSource for StaticRuleSource {
    fn origin(&self) -> String {
        self.origin.clone()
    }

    async fn fetch(&self) -> Result<Vec<u8>, RuleError> {
        Ok(self.bytes.clone())
    }
}

// ─── Location & runtime choice ──────────────────────────────────────────

/// Where a rule document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleLocation {
    /// Fetched over HTTP(S).
    Url(Url),
    /// Read from the local filesystem.
    File(PathBuf),
}

impl RuleLocation {
    /// Interpret a location string.
    ///
    /// `http://` and `https://` become [`RuleLocation::Url`]; `file://` URLs
    /// and anything else become [`RuleLocation::File`].
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidLocation`] for blank input, unparseable
    /// URLs, and `file://` URLs that do not name a local path.
    pub fn parse(raw: &str) -> Result<Self, RuleError> {
        let trimmed = raw.trim();
        let invalid = |reason: String| RuleError::InvalidLocation {
            location: trimmed.to_string(),
            reason,
        };

        if trimmed.is_empty() {
            return Err(invalid("location is empty".to_string()));
        }

        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            let url = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
            return Ok(Self::Url(url));
        }
        if lower.starts_with("file://") {
            let url = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
            let path = url
                .to_file_path()
                .map_err(|()| invalid("file URL does not name a local path".to_string()))?;
            return Ok(Self::File(path));
        }
        Ok(Self::File(PathBuf::from(trimmed)))
    }
}

impl std::fmt::Display for RuleLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{url}"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A rule source chosen at runtime from a [`RuleLocation`].
#[derive(Debug, Clone)]
pub enum AnyRuleSource {
    /// HTTP(S) source.
    Http(HttpRuleSource),
    /// Local file source.
    File(FileRuleSource),
}

impl AnyRuleSource {
    /// Build the adapter for `location`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Fetch`] if the HTTP client cannot be built.
    pub fn from_location(
        location: RuleLocation,
        request_timeout: Duration,
    ) -> Result<Self, RuleError> {
        match location {
            RuleLocation::Url(url) => Ok(Self::Http(HttpRuleSource::new(url, request_timeout)?)),
            RuleLocation::File(path) => Ok(Self::File(FileRuleSource::new(path))),
        }
    }
}

impl RuleSource for AnyRuleSource {
    fn origin(&self) -> String {
        match self {
            Self::Http(s) => s.origin(),
            Self::File(s) => s.origin(),
        }
    }

    async fn fetch(&self) -> Result<Vec<u8>, RuleError> {
        match self {
            Self::Http(s) => s.fetch().await,
            Self::File(s) => s.fetch().await,
        }
    }
}
