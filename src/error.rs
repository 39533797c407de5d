//! Error types for the md-backtranslate library.
//!
//! Three layers of failure, from widest to narrowest:
//!
//! * [`AugmentError`] is **fatal**: the run cannot proceed at all (document
//!   missing, conversion failed, bad configuration, output not writable).
//!   Returned as `Err(AugmentError)` from the top-level `augment*` functions.
//!
//! * [`RoundTripError`] is **non-fatal**: one intermediate language failed
//!   after a chunk exhausted its retries. Stored in
//!   [`crate::output::AugmentationOutput::failures`]; the `original` variant
//!   and every other language are unaffected.
//!
//! * [`TranslateError`]: a single attempt against the translation service.
//!   The retry policy decides from [`TranslateError::is_retryable`] whether to
//!   try again; once it gives up the last error is wrapped in [`ChunkError`].

use crate::retry::Retryable;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the md-backtranslate library.
///
/// Language-level failures use [`RoundTripError`] and are stored in
/// [`crate::output::AugmentationOutput`] rather than propagated here.
#[derive(Debug, Error)]
pub enum AugmentError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Document not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The document could not be turned into Markdown text.
    #[error("Document conversion failed: {detail}")]
    ConversionFailed { detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// A language code is not a 2-letter ISO 639-1 code.
    #[error("Invalid language code '{code}': expected a 2-letter ISO 639-1 code such as 'es'")]
    InvalidLanguage { code: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No translation backend could be constructed.
    #[error("Translator '{provider}' is not configured.\n{hint}")]
    TranslatorNotConfigured { provider: String, hint: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest could not be serialised.
    #[error("Failed to serialise manifest: {0}")]
    ManifestFailed(#[from] serde_json::Error),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A single failed attempt against the translation service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TranslateError {
    /// Network failure, rate limit or server error; worth retrying.
    #[error("transient translation failure: {0}")]
    Transient(String),

    /// The request itself is wrong (unsupported language pair, bad key).
    #[error("translation rejected: {0}")]
    Permanent(String),

    /// The call did not finish within the configured per-call budget.
    #[error("translation call timed out after {secs}s")]
    Timeout { secs: u64 },
}

impl TranslateError {
    pub fn is_retryable(&self) -> bool {
        !matches!(self, TranslateError::Permanent(_))
    }
}

impl Retryable for TranslateError {
    fn is_retryable(&self) -> bool {
        TranslateError::is_retryable(self)
    }
}

/// Every transport failure is transient. A client-side timeout keeps the
/// reqwest message, since the error does not carry the configured duration.
impl From<reqwest::Error> for TranslateError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TranslateError::Transient(format!("HTTP request timed out: {e}"))
        } else {
            TranslateError::Transient(format!("network error: {e}"))
        }
    }
}

/// Terminal failure for one chunk after the retry policy gave up.
#[derive(Debug, Clone, Error)]
#[error("chunk failed after {attempts} attempt(s): {source}")]
pub struct ChunkError {
    pub attempts: u32,
    #[source]
    pub source: TranslateError,
}

/// A non-fatal error for a single intermediate language.
///
/// Stored alongside [`crate::output::AugmentationOutput`] when a round-trip
/// fails. The run continues with the remaining languages.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum RoundTripError {
    /// A chunk exhausted its retries; the whole round-trip was abandoned.
    #[error("{from} → {to}: chunk {chunk}/{chunks} failed after {attempts} attempt(s): {detail}")]
    ChunkFailed {
        from: String,
        to: String,
        chunk: usize,
        chunks: usize,
        attempts: u32,
        detail: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_failed_display() {
        let e = RoundTripError::ChunkFailed {
            from: "pt".into(),
            to: "es".into(),
            chunk: 2,
            chunks: 5,
            attempts: 3,
            detail: "HTTP 503".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("pt → es"), "got: {msg}");
        assert!(msg.contains("2/5"), "got: {msg}");
        assert!(msg.contains("3 attempt"), "got: {msg}");
    }

    #[test]
    fn permanent_errors_are_not_retryable() {
        assert!(!TranslateError::Permanent("bad pair".into()).is_retryable());
        assert!(TranslateError::Transient("503".into()).is_retryable());
        assert!(TranslateError::Timeout { secs: 5 }.is_retryable());
    }

    #[test]
    fn chunk_error_display_includes_source() {
        let e = ChunkError {
            attempts: 3,
            source: TranslateError::Transient("rate limited".into()),
        };
        assert!(e.to_string().contains("rate limited"));
    }

    #[tokio::test]
    async fn http_client_timeout_is_transient() {
        // A server that accepts the connection and never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(std::time::Duration::from_secs(30)).await;
        });

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(100))
            .build()
            .unwrap();
        let err = client.get(format!("http://{addr}/")).send().await.unwrap_err();
        assert!(err.is_timeout());

        let e = TranslateError::from(err);
        assert!(matches!(e, TranslateError::Transient(_)), "got: {e:?}");
        assert!(e.is_retryable());
        assert!(!e.to_string().contains("after 0s"), "got: {e}");
        server.abort();
    }

    #[test]
    fn invalid_language_display() {
        let e = AugmentError::InvalidLanguage { code: "spa".into() };
        assert!(e.to_string().contains("'spa'"));
    }
}
