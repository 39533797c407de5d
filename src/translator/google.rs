//! Google Translate over HTTP.
//!
//! Two endpoints are supported:
//!
//! * **Cloud Translation v2**: used when an API key is configured
//!   (`GOOGLE_TRANSLATE_API_KEY`). Stable, billed, documented.
//! * **Public web endpoint** (`translate_a/single?client=gtx`): used without
//!   a key. This is the endpoint free translation libraries scrape; it is
//!   rate limited aggressively, which is why the pipeline paces requests and
//!   retries with backoff.
//!
//! HTTP 429 and 5xx are reported as transient; any other 4xx as permanent.

use crate::config::Language;
use crate::error::{AugmentError, TranslateError};
use crate::translator::Translator;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

const CLOUD_URL: &str = "https://translation.googleapis.com/language/translate/v2";
const WEB_URL: &str = "https://translate.googleapis.com/translate_a/single";

#[derive(Clone)]
pub struct GoogleTranslator {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl GoogleTranslator {
    /// Create a translator; `None` or an empty key selects the public endpoint.
    pub fn new(api_key: Option<String>) -> Result<Self, AugmentError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| AugmentError::TranslatorNotConfigured {
                provider: "google".into(),
                hint: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    /// Read the optional API key from `GOOGLE_TRANSLATE_API_KEY`.
    pub fn from_env() -> Result<Self, AugmentError> {
        Self::new(std::env::var("GOOGLE_TRANSLATE_API_KEY").ok())
    }

    pub fn uses_cloud_api(&self) -> bool {
        self.api_key.is_some()
    }

    async fn translate_cloud(
        &self,
        key: &str,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, TranslateError> {
        let body = json!({
            "q": text,
            "source": source.code(),
            "target": target.code(),
            "format": "text"
        });

        let response = self
            .client
            .post(CLOUD_URL)
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await?;

        let json = read_json(response).await?;
        parse_cloud_response(&json).ok_or_else(|| {
            TranslateError::Transient(
                "Invalid API response: missing 'data.translations[0].translatedText'".into(),
            )
        })
    }

    async fn translate_web(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, TranslateError> {
        let response = self
            .client
            .post(WEB_URL)
            .query(&[
                ("client", "gtx"),
                ("sl", source.code()),
                ("tl", target.code()),
                ("dt", "t"),
            ])
            .form(&[("q", text)])
            .send()
            .await?;

        let json = read_json(response).await?;
        parse_web_response(&json).ok_or_else(|| {
            TranslateError::Transient("Invalid response from translate endpoint".into())
        })
    }
}

impl std::fmt::Debug for GoogleTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTranslator")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, TranslateError> {
        if text.is_empty() {
            return Ok(String::new());
        }
        debug!("google {}→{}: {} chars", source, target, text.chars().count());
        match &self.api_key {
            Some(key) => self.translate_cloud(key, text, source, target).await,
            None => self.translate_web(text, source, target).await,
        }
    }

    fn name(&self) -> &str {
        if self.uses_cloud_api() {
            "google-cloud"
        } else {
            "google-web"
        }
    }
}

async fn read_json(response: reqwest::Response) -> Result<Value, TranslateError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(classify_status(status, &body));
    }
    response
        .json()
        .await
        .map_err(|e| TranslateError::Transient(format!("Failed to parse response: {e}")))
}

fn classify_status(status: StatusCode, body: &str) -> TranslateError {
    let snippet: String = body.chars().take(200).collect();
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        TranslateError::Transient(format!("HTTP {status}: {snippet}"))
    } else {
        TranslateError::Permanent(format!("HTTP {status}: {snippet}"))
    }
}

/// `{"data": {"translations": [{"translatedText": "..."}]}}`
fn parse_cloud_response(json: &Value) -> Option<String> {
    json["data"]["translations"][0]["translatedText"]
        .as_str()
        .map(str::to_string)
}

/// `[[["translated", "original", ...], ["more", "..."]], ...]`: the
/// translation comes back split into sentences that must be concatenated.
fn parse_web_response(json: &Value) -> Option<String> {
    let sentences = json.get(0)?.as_array()?;
    let mut out = String::new();
    for sentence in sentences {
        if let Some(part) = sentence.get(0).and_then(Value::as_str) {
            out.push_str(part);
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_selects_web_endpoint() {
        let t = GoogleTranslator::new(Some("  ".into())).unwrap();
        assert!(!t.uses_cloud_api());
        assert_eq!(t.name(), "google-web");
    }

    #[test]
    fn key_selects_cloud_api() {
        let t = GoogleTranslator::new(Some("abc".into())).unwrap();
        assert!(t.uses_cloud_api());
        assert_eq!(t.name(), "google-cloud");
    }

    #[test]
    fn debug_hides_key() {
        let t = GoogleTranslator::new(Some("secret-key".into())).unwrap();
        let dbg = format!("{t:?}");
        assert!(!dbg.contains("secret-key"));
        assert!(dbg.contains("***"));
    }

    #[test]
    fn parse_cloud() {
        let json = json!({"data": {"translations": [{"translatedText": "[B]hola[/B]"}]}});
        assert_eq!(parse_cloud_response(&json).as_deref(), Some("[B]hola[/B]"));
        assert!(parse_cloud_response(&json!({"data": {}})).is_none());
    }

    #[test]
    fn parse_web_concatenates_sentences() {
        let json = json!([
            [["Hola mundo. ", "Olá mundo. ", null], ["Adiós.", "Tchau.", null]],
            null,
            "pt"
        ]);
        assert_eq!(
            parse_web_response(&json).as_deref(),
            Some("Hola mundo. Adiós.")
        );
        assert!(parse_web_response(&json!({"error": 1})).is_none());
    }

    #[test]
    fn status_classification() {
        assert!(classify_status(StatusCode::TOO_MANY_REQUESTS, "").is_retryable());
        assert!(classify_status(StatusCode::BAD_GATEWAY, "").is_retryable());
        assert!(!classify_status(StatusCode::BAD_REQUEST, "bad lang").is_retryable());
        assert!(!classify_status(StatusCode::FORBIDDEN, "").is_retryable());
    }

    #[tokio::test]
    async fn empty_text_skips_network() {
        let t = GoogleTranslator::new(None).unwrap();
        let out = t
            .translate("", Language::PORTUGUESE, Language::SPANISH)
            .await
            .unwrap();
        assert!(out.is_empty());
    }
}
