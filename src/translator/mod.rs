//! The translation capability and its providers.
//!
//! The pipeline only ever talks to [`Translator`]; which service sits behind
//! it is decided once, when the run starts. Three providers ship with the
//! crate:
//!
//! - [`GoogleTranslator`]: Google Translate over HTTP (Cloud API with a key,
//!   the public web endpoint without one)
//! - [`LlmTranslator`]: any chat model reachable through `edgequake-llm`
//! - [`IdentityTranslator`]: returns its input; for dry runs that check the
//!   markup plumbing without a network

mod google;
mod llm;

pub use google::GoogleTranslator;
pub use llm::LlmTranslator;

use crate::config::Language;
use crate::error::TranslateError;
use async_trait::async_trait;

/// Translate one piece of text between two languages.
///
/// Implementations report each failed call once; retrying is the caller's
/// job. Use [`TranslateError::Transient`] for anything worth another attempt
/// and [`TranslateError::Permanent`] for requests that can never succeed.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, TranslateError>;

    /// Name used in logs.
    fn name(&self) -> &str;
}

/// Returns every input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTranslator;

#[async_trait]
impl Translator for IdentityTranslator {
    async fn translate(
        &self,
        text: &str,
        _source: Language,
        _target: Language,
    ) -> Result<String, TranslateError> {
        Ok(text.to_string())
    }

    fn name(&self) -> &str {
        "identity"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn identity_returns_input() {
        let t: Arc<dyn Translator> = Arc::new(IdentityTranslator);
        let out = t
            .translate("[B]olá[/B]", Language::PORTUGUESE, Language::SPANISH)
            .await
            .unwrap();
        assert_eq!(out, "[B]olá[/B]");
        assert_eq!(t.name(), "identity");
    }

    #[test]
    fn identity_keeps_whitespace() {
        let out = tokio_test::block_on(IdentityTranslator.translate(
            "  linha\n\n",
            Language::PORTUGUESE,
            Language::ENGLISH,
        ))
        .unwrap();
        assert_eq!(out, "  linha\n\n");
    }
}
