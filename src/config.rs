//! Configuration types for back-translation runs.
//!
//! All run behaviour is controlled through [`AugmentConfig`], built via its
//! [`AugmentConfigBuilder`]. The config is constructed once per invocation and
//! never mutated afterwards; the pipeline receives it by reference instead of
//! reading settings from the environment.

use crate::error::AugmentError;
use crate::progress::ProgressCallback;
use crate::retry::RetryPolicy;
use crate::translator::Translator;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for a back-translation augmentation run.
///
/// Built via [`AugmentConfig::builder()`] or using [`AugmentConfig::default()`].
///
/// # Example
/// ```rust
/// use md_backtranslate::AugmentConfig;
///
/// let config = AugmentConfig::builder()
///     .languages(["es", "it"])
///     .chunk_size(4000)
///     .max_retries(3)
///     .build()
///     .unwrap();
/// assert_eq!(config.languages.len(), 2);
/// ```
#[derive(Clone)]
pub struct AugmentConfig {
    /// Language the document is written in. Default: `pt`.
    pub source_language: Language,

    /// Intermediate languages, in output order. Default: `es`, `it`.
    pub languages: Vec<Language>,

    /// Maximum characters per translation request. Default: 4000.
    ///
    /// Free translation endpoints reject requests around 5 000 characters;
    /// 1 000–5 000 is the useful range. Smaller chunks mean more requests and
    /// more sentence boundaries the service cannot see across.
    pub chunk_size: usize,

    /// Attempts per chunk, including the first. Default: 3.
    pub max_retries: u32,

    /// Delay before the first retry in milliseconds; doubles afterwards. Default: 1000.
    pub retry_backoff_ms: u64,

    /// Pause between consecutive chunk requests in milliseconds. Default: 500.
    pub pacing_ms: u64,

    /// Per-call timeout in seconds; 0 disables it. Default: 60.
    pub api_timeout_secs: u64,

    /// Intermediate languages processed at once. Default: 1 (sequential).
    pub concurrency: usize,

    /// Heuristic used to re-join lines broken by the translation service.
    pub line_merge: LineMerge,

    /// Translator name ("google", "identity", or an LLM provider such as "openai").
    /// If None along with `translator`, Google Translate is used.
    pub provider_name: Option<String>,

    /// Model for LLM-backed translation.
    pub model: Option<String>,

    /// Pre-constructed translator. Takes precedence over `provider_name`.
    pub translator: Option<Arc<dyn Translator>>,

    /// Receives per-language and per-chunk events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            source_language: Language::PORTUGUESE,
            languages: vec![Language::SPANISH, Language::ITALIAN],
            chunk_size: 4000,
            max_retries: 3,
            retry_backoff_ms: 1000,
            pacing_ms: 500,
            api_timeout_secs: 60,
            concurrency: 1,
            line_merge: LineMerge::default(),
            provider_name: None,
            model: None,
            translator: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for AugmentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AugmentConfig")
            .field("source_language", &self.source_language)
            .field("languages", &self.languages)
            .field("chunk_size", &self.chunk_size)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("pacing_ms", &self.pacing_ms)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("concurrency", &self.concurrency)
            .field("line_merge", &self.line_merge)
            .field("provider_name", &self.provider_name)
            .field("model", &self.model)
            .field("translator", &self.translator.as_ref().map(|t| t.name().to_string()))
            .finish()
    }
}

impl AugmentConfig {
    /// Create a new builder for `AugmentConfig`.
    pub fn builder() -> AugmentConfigBuilder {
        AugmentConfigBuilder {
            config: Self::default(),
            languages: None,
            source_language: None,
        }
    }

    /// Retry policy derived from `max_retries` and `retry_backoff_ms`.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.retry_backoff_ms))
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    /// `None` when timeouts are disabled.
    pub fn api_timeout(&self) -> Option<Duration> {
        (self.api_timeout_secs > 0).then(|| Duration::from_secs(self.api_timeout_secs))
    }
}

/// Builder for [`AugmentConfig`].
///
/// Language codes are parsed in [`build`](AugmentConfigBuilder::build) so a
/// malformed code surfaces as [`AugmentError::InvalidLanguage`].
pub struct AugmentConfigBuilder {
    config: AugmentConfig,
    languages: Option<Vec<String>>,
    source_language: Option<String>,
}

impl fmt::Debug for AugmentConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AugmentConfigBuilder")
            .field("config", &self.config)
            .field("languages", &self.languages)
            .field("source_language", &self.source_language)
            .finish()
    }
}

impl AugmentConfigBuilder {
    pub fn source_language(mut self, code: impl Into<String>) -> Self {
        self.source_language = Some(code.into());
        self
    }

    pub fn languages<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = Some(codes.into_iter().map(Into::into).collect());
        self
    }

    pub fn chunk_size(mut self, n: usize) -> Self {
        self.config.chunk_size = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn pacing_ms(mut self, ms: u64) -> Self {
        self.config.pacing_ms = ms;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn line_merge(mut self, mode: LineMerge) -> Self {
        self.config.line_merge = mode;
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.config.translator = Some(translator);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(mut self) -> Result<AugmentConfig, AugmentError> {
        if let Some(code) = self.source_language.take() {
            self.config.source_language = code.parse()?;
        }
        if let Some(codes) = self.languages.take() {
            self.config.languages = codes
                .iter()
                .map(|c| c.parse())
                .collect::<Result<Vec<Language>, _>>()?;
        }

        let c = &self.config;
        if c.chunk_size == 0 {
            return Err(AugmentError::InvalidConfig(
                "Chunk size must be ≥ 1 character".into(),
            ));
        }
        if c.max_retries == 0 {
            return Err(AugmentError::InvalidConfig(
                "Retries must be ≥ 1 (the first attempt counts)".into(),
            ));
        }
        for (i, lang) in c.languages.iter().enumerate() {
            if *lang == c.source_language {
                return Err(AugmentError::InvalidConfig(format!(
                    "Intermediate language '{lang}' is the source language"
                )));
            }
            if c.languages[..i].contains(lang) {
                return Err(AugmentError::InvalidConfig(format!(
                    "Language '{lang}' is listed twice"
                )));
            }
        }
        Ok(self.config)
    }
}

// ── Language ─────────────────────────────────────────────────────────────

/// A 2-letter ISO 639-1 language code, stored lower-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Language([u8; 2]);

impl Language {
    pub const PORTUGUESE: Language = Language(*b"pt");
    pub const SPANISH: Language = Language(*b"es");
    pub const ITALIAN: Language = Language(*b"it");
    pub const ENGLISH: Language = Language(*b"en");

    pub fn code(&self) -> &str {
        // Only ASCII letters are ever stored.
        std::str::from_utf8(&self.0).unwrap_or("??")
    }

    /// English name for the languages we know about.
    pub fn english_name(&self) -> Option<&'static str> {
        let name = match &self.0 {
            b"pt" => "portuguese",
            b"es" => "spanish",
            b"it" => "italian",
            b"en" => "english",
            b"fr" => "french",
            b"de" => "german",
            b"nl" => "dutch",
            b"ca" => "catalan",
            b"ro" => "romanian",
            b"gl" => "galician",
            b"pl" => "polish",
            b"ru" => "russian",
            b"ja" => "japanese",
            b"zh" => "chinese",
            b"ko" => "korean",
            b"ar" => "arabic",
            _ => return None,
        };
        Some(name)
    }

    /// Key of this language's entry in the augmentation set,
    /// e.g. `spanish_augmented`.
    pub fn variant_name(&self) -> String {
        format!("{}_augmented", self.english_name().unwrap_or(self.code()))
    }
}

impl FromStr for Language {
    type Err = AugmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.as_bytes() {
            [a, b] if a.is_ascii_alphabetic() && b.is_ascii_alphabetic() => {
                Ok(Language([a.to_ascii_lowercase(), b.to_ascii_lowercase()]))
            }
            _ => Err(AugmentError::InvalidLanguage {
                code: trimmed.to_string(),
            }),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for Language {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How the decoder re-joins lines that the translation service broke apart.
///
/// Translation services sometimes insert a line break in the middle of a
/// sentence. Joining those back is a heuristic: any rule that merges broken
/// sentences will also merge some genuine two-line content.
///
/// | Mode | Merges |
/// |------|--------|
/// | `Off` | nothing |
/// | `MidSentence` | a line ending in a letter/digit with a following line starting lower-case, skipping headings, list items, quotes and table rows (default) |
/// | `Aggressive` | any `word\nword` pair, including across blank lines |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineMerge {
    Off,
    #[default]
    MidSentence,
    Aggressive,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let c = AugmentConfig::default();
        assert_eq!(c.source_language, Language::PORTUGUESE);
        assert_eq!(c.languages, vec![Language::SPANISH, Language::ITALIAN]);
        assert_eq!(c.chunk_size, 4000);
        assert_eq!(c.max_retries, 3);
        assert_eq!(c.retry_backoff_ms, 1000);
        assert_eq!(c.pacing_ms, 500);
        assert_eq!(c.line_merge, LineMerge::MidSentence);
    }

    #[test]
    fn language_parsing() {
        assert_eq!("ES".parse::<Language>().unwrap(), Language::SPANISH);
        assert_eq!(" it ".parse::<Language>().unwrap(), Language::ITALIAN);
        assert!("spa".parse::<Language>().is_err());
        assert!("e1".parse::<Language>().is_err());
        assert!("".parse::<Language>().is_err());
    }

    #[test]
    fn variant_names() {
        assert_eq!(Language::SPANISH.variant_name(), "spanish_augmented");
        assert_eq!(Language::ITALIAN.variant_name(), "italian_augmented");
        assert_eq!("xx".parse::<Language>().unwrap().variant_name(), "xx_augmented");
    }

    #[test]
    fn builder_rejects_zero_chunk_size() {
        let err = AugmentConfig::builder().chunk_size(0).build().unwrap_err();
        assert!(matches!(err, AugmentError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_zero_retries() {
        assert!(AugmentConfig::builder().max_retries(0).build().is_err());
    }

    #[test]
    fn builder_rejects_bad_language() {
        let err = AugmentConfig::builder()
            .languages(["es", "italian"])
            .build()
            .unwrap_err();
        assert!(matches!(err, AugmentError::InvalidLanguage { .. }));
    }

    #[test]
    fn builder_rejects_duplicates_and_source() {
        assert!(AugmentConfig::builder().languages(["es", "es"]).build().is_err());
        assert!(AugmentConfig::builder().languages(["pt"]).build().is_err());
        assert!(AugmentConfig::builder()
            .source_language("en")
            .languages(["pt"])
            .build()
            .is_ok());
    }

    #[test]
    fn retry_policy_from_config() {
        let c = AugmentConfig::builder()
            .max_retries(4)
            .retry_backoff_ms(250)
            .build()
            .unwrap();
        let p = c.retry_policy();
        assert_eq!(p.max_attempts, 4);
        assert_eq!(p.delay_for(2), Duration::from_millis(500));
    }

    #[test]
    fn zero_timeout_disables_it() {
        let c = AugmentConfig::builder().api_timeout_secs(0).build().unwrap();
        assert!(c.api_timeout().is_none());
    }

    #[test]
    fn language_serde_roundtrip_as_string() {
        let json = serde_json::to_string(&Language::SPANISH).unwrap();
        assert_eq!(json, "\"es\"");
        let back: Language = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Language::SPANISH);
    }
}
