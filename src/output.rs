//! Result types returned by the augmentation entry points.

use crate::config::Language;
use crate::error::RoundTripError;
use serde::{Deserialize, Serialize};

/// Key of the untouched input in every [`AugmentationSet`].
pub const ORIGINAL: &str = "original";

/// One named text in an [`AugmentationSet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// `original` or `<language>_augmented`.
    pub name: String,
    /// Intermediate language; `None` for `original`.
    pub language: Option<Language>,
    pub text: String,
}

/// Ordered mapping of variant name → text.
///
/// `original` is always first, followed by one entry per successful language
/// in configured order. Names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AugmentationSet {
    variants: Vec<Variant>,
}

impl AugmentationSet {
    pub(crate) fn new(original: impl Into<String>) -> Self {
        Self {
            variants: vec![Variant {
                name: ORIGINAL.to_string(),
                language: None,
                text: original.into(),
            }],
        }
    }

    /// Append a language variant. A second variant for the same language
    /// replaces the first.
    pub(crate) fn push(&mut self, language: Language, text: String) {
        let name = language.variant_name();
        if let Some(existing) = self.variants.iter_mut().find(|v| v.name == name) {
            existing.text = text;
            return;
        }
        self.variants.push(Variant {
            name,
            language: Some(language),
            text,
        });
    }

    pub fn original(&self) -> &str {
        self.variants.first().map_or("", |v| v.text.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.variants
            .iter()
            .find(|v| v.name == name)
            .map(|v| v.text.as_str())
    }

    /// Variant produced through `language`, if it succeeded.
    pub fn for_language(&self, language: Language) -> Option<&str> {
        self.variants
            .iter()
            .find(|v| v.language == Some(language))
            .map(|v| v.text.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variants.iter().map(|v| v.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variant> {
        self.variants.iter()
    }

    /// Number of variants, `original` included.
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Always false: `original` is always present.
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

impl<'a> IntoIterator for &'a AugmentationSet {
    type Item = &'a Variant;
    type IntoIter = std::slice::Iter<'a, Variant>;

    fn into_iter(self) -> Self::IntoIter {
        self.variants.iter()
    }
}

/// An intermediate language that produced no variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageFailure {
    pub language: Language,
    pub error: RoundTripError,
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AugmentationStats {
    pub languages_requested: usize,
    pub languages_succeeded: usize,
    pub languages_failed: usize,
    /// Characters in the original text.
    pub source_chars: usize,
    pub total_duration_ms: u64,
}

/// Everything one run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AugmentationOutput {
    pub set: AugmentationSet,
    /// In configured language order.
    pub failures: Vec<LanguageFailure>,
    pub stats: AugmentationStats,
}

impl AugmentationOutput {
    /// True when every requested language produced a variant.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
