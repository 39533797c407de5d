//! Document source: turn an input file into Markdown text.
//!
//! Augmentation works on Markdown, but the documents people feed a RAG system
//! often arrive as PDFs. Conversion sits behind [`DocumentConverter`] so the
//! runner never knows where its text came from:
//!
//! - [`MarkdownConverter`]: `.md`, `.markdown`, `.txt` and anything else
//!   that is valid UTF-8
//! - `PdfConverter` (feature `pdf`): delegates to `edgequake-pdf2md`, which
//!   renders each page and has a vision model transcribe it
//!
//! [`load_document`] reads the file and maps I/O failures to the dedicated
//! fatal errors; [`converter_for_path`] picks a converter by extension.

use crate::error::AugmentError;
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info};

/// Convert raw document bytes into Markdown.
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    async fn convert(&self, bytes: &[u8]) -> Result<String, AugmentError>;

    /// Name used in logs.
    fn name(&self) -> &str;
}

/// Accepts UTF-8 text as-is, apart from a leading BOM and CRLF line endings.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownConverter;

#[async_trait]
impl DocumentConverter for MarkdownConverter {
    async fn convert(&self, bytes: &[u8]) -> Result<String, AugmentError> {
        if bytes.starts_with(b"%PDF") {
            return Err(AugmentError::ConversionFailed {
                detail: "input is a PDF; rebuild with the `pdf` feature to convert it".into(),
            });
        }

        let text = std::str::from_utf8(bytes).map_err(|e| AugmentError::ConversionFailed {
            detail: format!("input is not valid UTF-8 text (byte {})", e.valid_up_to()),
        })?;

        let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
        Ok(text.replace("\r\n", "\n"))
    }

    fn name(&self) -> &str {
        "markdown"
    }
}

/// PDF → Markdown through `edgequake-pdf2md`.
#[cfg(feature = "pdf")]
#[derive(Debug, Clone, Default)]
pub struct PdfConverter {
    config: edgequake_pdf2md::ConversionConfig,
}

#[cfg(feature = "pdf")]
impl PdfConverter {
    pub fn new(config: edgequake_pdf2md::ConversionConfig) -> Self {
        Self { config }
    }
}

#[cfg(feature = "pdf")]
#[async_trait]
impl DocumentConverter for PdfConverter {
    async fn convert(&self, bytes: &[u8]) -> Result<String, AugmentError> {
        if !bytes.starts_with(b"%PDF") {
            return Err(AugmentError::ConversionFailed {
                detail: "input does not start with the %PDF signature".into(),
            });
        }
        let output = edgequake_pdf2md::convert::convert_from_bytes(bytes, &self.config)
            .await
            .map_err(|e| AugmentError::ConversionFailed {
                detail: e.to_string(),
            })?;
        info!(
            "Converted PDF: {}/{} pages",
            output.stats.processed_pages, output.stats.total_pages
        );
        Ok(output.markdown)
    }

    fn name(&self) -> &str {
        "pdf"
    }
}

/// Pick a converter from the file extension.
///
/// `.pdf` needs the `pdf` feature; without it the Markdown converter is
/// returned and rejects the file with a hint.
pub fn converter_for_path(path: &Path) -> Box<dyn DocumentConverter> {
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));

    #[cfg(feature = "pdf")]
    if is_pdf {
        return Box::new(PdfConverter::default());
    }

    #[cfg(not(feature = "pdf"))]
    let _ = is_pdf;

    Box::new(MarkdownConverter)
}

/// Read `path` and convert it with `converter`.
pub async fn load_document(
    path: &Path,
    converter: &dyn DocumentConverter,
) -> Result<String, AugmentError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => AugmentError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => AugmentError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => AugmentError::ConversionFailed {
            detail: format!("failed to read '{}': {e}", path.display()),
        },
    })?;

    debug!(
        "Read {} bytes from {} ({} converter)",
        bytes.len(),
        path.display(),
        converter.name()
    );
    converter.convert(&bytes).await
}
