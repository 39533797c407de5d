//! Augmentation entry points.
//!
//! [`augment_with`] is the runner: it takes a ready translator and never
//! fails. A language that cannot be round-tripped is recorded in
//! [`AugmentationOutput::failures`] and the run moves on; `original` is
//! always present. The other entry points only add the steps around it:
//!
//! | Function | Adds |
//! |----------|------|
//! | [`augment`] | translator resolution from the config |
//! | [`augment_document`] | reading and converting an input file |
//! | [`augment_to_dir`] | writing the variants and `metadata.json` |
//! | [`augment_sync`] | a private tokio runtime |

use crate::config::{AugmentConfig, Language};
use crate::error::{AugmentError, RoundTripError};
use crate::output::{AugmentationOutput, AugmentationSet, AugmentationStats, LanguageFailure};
use crate::persist::{self, Manifest};
use crate::pipeline::{roundtrip, source};
use crate::progress::{AugmentProgressCallback, NoopProgressCallback};
use crate::translator::{GoogleTranslator, IdentityTranslator, LlmTranslator, Translator};
use edgequake_llm::{LLMProvider, ProviderFactory};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Default model when an LLM provider is named without one.
pub const DEFAULT_LLM_MODEL: &str = "gpt-4.1-nano";

/// Produce the augmentation set for `text`, resolving the translator from
/// `config`.
///
/// # Errors
/// Only [`AugmentError::TranslatorNotConfigured`]: once a translator exists,
/// per-language failures are reported in the output instead.
///
/// # Example
/// ```rust,no_run
/// use md_backtranslate::{augment, AugmentConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = AugmentConfig::builder().languages(["es", "it"]).build()?;
/// let output = augment("# Título\n\nUm texto **importante**.", &config).await?;
/// for variant in &output.set {
///     println!("== {} ==\n{}", variant.name, variant.text);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn augment(text: &str, config: &AugmentConfig) -> Result<AugmentationOutput, AugmentError> {
    let translator = resolve_translator(config)?;
    info!("Using translator '{}'", translator.name());
    Ok(augment_with(translator.as_ref(), text, config).await)
}

/// Run every configured language through `translator`.
///
/// Languages run one at a time unless `config.concurrency > 1`; either way
/// the variants come back in configured order.
pub async fn augment_with(
    translator: &dyn Translator,
    text: &str,
    config: &AugmentConfig,
) -> AugmentationOutput {
    let start = Instant::now();
    let noop = NoopProgressCallback;
    let progress: &dyn AugmentProgressCallback = match &config.progress_callback {
        Some(cb) => cb.as_ref(),
        None => &noop,
    };

    let requested = config.languages.len();
    info!(
        "Augmenting {} chars through {} language(s): {:?}",
        text.chars().count(),
        requested,
        config.languages.iter().map(Language::code).collect::<Vec<_>>()
    );
    progress.on_run_start(&config.languages);

    let outcomes: Vec<(Language, Result<String, RoundTripError>)> =
        stream::iter(config.languages.iter().copied().map(move |language| async move {
            progress.on_language_start(language);
            let result = roundtrip::round_trip(translator, text, language, config).await;
            match &result {
                Ok(variant) => progress.on_language_complete(language, variant.chars().count()),
                Err(e) => {
                    warn!("Language '{}' abandoned: {}", language, e);
                    progress.on_language_error(language, &e.to_string());
                }
            }
            (language, result)
        }))
        .buffered(config.concurrency.max(1))
        .collect()
        .await;

    let mut set = AugmentationSet::new(text);
    let mut failures = Vec::new();
    for (language, result) in outcomes {
        match result {
            Ok(variant) => set.push(language, variant),
            Err(error) => failures.push(LanguageFailure { language, error }),
        }
    }

    let stats = AugmentationStats {
        languages_requested: requested,
        languages_succeeded: requested - failures.len(),
        languages_failed: failures.len(),
        source_chars: text.chars().count(),
        total_duration_ms: start.elapsed().as_millis() as u64,
    };

    info!(
        "Augmentation complete: {}/{} language(s), {}ms",
        stats.languages_succeeded, requested, stats.total_duration_ms
    );
    progress.on_run_complete(requested, stats.languages_succeeded);

    AugmentationOutput {
        set,
        failures,
        stats,
    }
}

/// Load `path` (Markdown, or PDF with the `pdf` feature) and augment it.
pub async fn augment_document(
    path: impl AsRef<Path>,
    config: &AugmentConfig,
) -> Result<AugmentationOutput, AugmentError> {
    let path = path.as_ref();
    info!("Loading document: {}", path.display());
    let converter = source::converter_for_path(path);
    let text = source::load_document(path, converter.as_ref()).await?;
    augment(&text, config).await
}

/// Augment `path` and persist the variants under a fresh
/// `augmentation_YYYYMMDD_HHMMSS/` directory inside `output_root`.
///
/// Returns the run directory and the manifest that was written.
pub async fn augment_to_dir(
    path: impl AsRef<Path>,
    output_root: impl AsRef<Path>,
    config: &AugmentConfig,
) -> Result<(PathBuf, Manifest), AugmentError> {
    let output = augment_document(path, config).await?;
    let root = output_root.as_ref().to_path_buf();

    tokio::task::spawn_blocking(move || {
        let dir = persist::create_output_directory(&root)?;
        let manifest = persist::save_variants(&output.set, &dir)?;
        Ok((dir, manifest))
    })
    .await
    .map_err(|e| AugmentError::Internal(format!("persist task failed: {e}")))?
}

/// Synchronous wrapper around [`augment`].
///
/// Creates a temporary tokio runtime internally; do not call from inside one.
pub fn augment_sync(text: &str, config: &AugmentConfig) -> Result<AugmentationOutput, AugmentError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| AugmentError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(augment(text, config))
}

// ── Translator resolution ────────────────────────────────────────────────

/// Resolve the translator, from most-specific to least-specific.
///
/// 1. **Pre-built translator** (`config.translator`), used as-is.
/// 2. **Named provider** (`config.provider_name`):
///    - `google`: Google Translate; Cloud API when `GOOGLE_TRANSLATE_API_KEY`
///      is set, the public endpoint otherwise
///    - `identity` / `none`: no translation (dry run)
///    - `llm`: an LLM provider auto-detected from the environment
///    - anything else: an `edgequake-llm` provider of that name (`openai`,
///      `anthropic`, `gemini`, `ollama`…) with `config.model`
/// 3. **Default**: Google Translate.
pub fn resolve_translator(config: &AugmentConfig) -> Result<Arc<dyn Translator>, AugmentError> {
    if let Some(ref translator) = config.translator {
        return Ok(Arc::clone(translator));
    }

    let Some(ref name) = config.provider_name else {
        return Ok(Arc::new(GoogleTranslator::from_env()?));
    };

    match name.to_ascii_lowercase().as_str() {
        "google" => Ok(Arc::new(GoogleTranslator::from_env()?)),
        "identity" | "none" => Ok(Arc::new(IdentityTranslator)),
        "llm" => {
            let (provider, label) = detect_llm_provider(config)?;
            Ok(Arc::new(LlmTranslator::new(provider, label)))
        }
        other => {
            let model = config.model.as_deref().unwrap_or(DEFAULT_LLM_MODEL);
            let provider = create_llm_provider(other, model)?;
            Ok(Arc::new(LlmTranslator::new(provider, format!("{other}/{model}"))))
        }
    }
}

fn create_llm_provider(name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, AugmentError> {
    ProviderFactory::create_llm_provider(name, model).map_err(|e| {
        AugmentError::TranslatorNotConfigured {
            provider: name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// `EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL` when both are set, else
/// whatever provider the factory finds an API key for.
fn detect_llm_provider(
    config: &AugmentConfig,
) -> Result<(Arc<dyn LLMProvider>, String), AugmentError> {
    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            let model = config.model.clone().unwrap_or(model);
            let provider = create_llm_provider(&prov, &model)?;
            return Ok((provider, format!("{prov}/{model}")));
        }
    }

    let (provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| AugmentError::TranslatorNotConfigured {
            provider: "llm".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or use --provider google.\n\
                Error: {}",
                e
            ),
        })?;
    Ok((provider, "llm".to_string()))
}
