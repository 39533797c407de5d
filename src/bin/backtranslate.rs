//! CLI binary for md-backtranslate.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `AugmentConfig` and prints or saves the variants.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use md_backtranslate::{
    augment_document, create_output_directory, save_variants, AugmentConfig,
    AugmentProgressCallback, AugmentationOutput, Language, LineMerge, Manifest, ProgressCallback,
};
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// One bar counting translation passes (two per language), with the current
/// chunk in the message. Per-language results are printed above the bar.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Start time per intermediate language.
    start_times: Mutex<HashMap<Language, Instant>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Loading document…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
        })
    }

    fn activate_bar(&self, passes: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>2}/{len} passes  {msg}  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(passes as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Translating");
        self.bar.reset_eta();
    }

    fn elapsed_secs(&self, language: Language) -> f64 {
        self.start_times
            .lock()
            .map(|mut m| m.remove(&language))
            .ok()
            .flatten()
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl AugmentProgressCallback for CliProgressCallback {
    fn on_run_start(&self, languages: &[Language]) {
        self.activate_bar(languages.len() * 2);
        let codes: Vec<&str> = languages.iter().map(Language::code).collect();
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Back-translating through {}…", codes.join(", ")))
        ));
    }

    fn on_language_start(&self, language: Language) {
        if let Ok(mut m) = self.start_times.lock() {
            m.insert(language, Instant::now());
        }
    }

    fn on_pass_start(&self, from: Language, to: Language, chunks: usize) {
        self.bar.set_message(format!("{from}→{to} 0/{chunks}"));
        if chunks == 0 {
            self.bar.inc(1);
        }
    }

    fn on_chunk_complete(&self, from: Language, to: Language, chunk: usize, chunks: usize) {
        self.bar.set_message(format!("{from}→{to} {chunk}/{chunks}"));
        if chunk == chunks {
            self.bar.inc(1);
        }
    }

    fn on_language_complete(&self, language: Language, chars: usize) {
        let secs = self.elapsed_secs(language);
        self.bar.println(format!(
            "  {} {:<22}  {:<12}  {}",
            green("✓"),
            language.variant_name(),
            dim(&format!("{chars:>6} chars")),
            dim(&format!("{secs:.1}s")),
        ));
    }

    fn on_language_error(&self, language: Language, error: &str) {
        let secs = self.elapsed_secs(language);

        // Truncate very long error messages to keep output tidy.
        let msg: String = if error.chars().count() > 80 {
            let head: String = error.chars().take(79).collect();
            format!("{head}\u{2026}")
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} {:<22}  {}  {}",
            red("✗"),
            language.variant_name(),
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
    }

    fn on_run_complete(&self, requested: usize, succeeded: usize) {
        let failed = requested.saturating_sub(succeeded);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} variant(s) produced",
                green("✔"),
                bold(&succeeded.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} languages succeeded  ({} failed)",
                if failed == requested {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&succeeded.to_string()),
                requested,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Print the original and the Spanish/Italian variants
  backtranslate notes.md

  # Save variants + metadata.json under output/augmentation_<timestamp>/
  backtranslate notes.md -o output

  # English source, French and German paraphrases
  backtranslate --source en --languages fr,de README.md -o output

  # Translate with an LLM instead of Google
  backtranslate --provider openai --model gpt-4.1-mini notes.md

  # Dry run: check that markup survives encode/decode
  backtranslate --provider identity notes.md

  # JSON output (variants, failures, stats)
  backtranslate --json notes.md > variants.json

PROVIDERS:
  google      Google Translate (default). Cloud API when GOOGLE_TRANSLATE_API_KEY
              is set, the public web endpoint otherwise.
  openai, anthropic, gemini, ollama, …
              Any edgequake-llm provider; --model picks the model
              (default gpt-4.1-nano).
  llm         First LLM provider found in the environment.
  identity    No translation.

ENVIRONMENT VARIABLES:
  GOOGLE_TRANSLATE_API_KEY  Google Cloud Translation API key
  OPENAI_API_KEY            OpenAI API key
  ANTHROPIC_API_KEY         Anthropic API key
  GEMINI_API_KEY            Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER    Provider for --provider llm
  EDGEQUAKE_MODEL           Model for --provider llm
  BACKTRANSLATE_*           Every flag, e.g. BACKTRANSLATE_LANGUAGES=es,fr

NOTES:
  The keyless Google endpoint throttles bursts. Keep --pacing-ms at 500 or
  more and --concurrency at 1 unless you use the Cloud API.
"#;

/// Markup-preserving back-translation for RAG data augmentation.
#[derive(Parser, Debug)]
#[command(
    name = "backtranslate",
    version,
    about = "Paraphrase Markdown documents by back-translation, keeping their structure",
    long_about = "Translate a Markdown document into one or more intermediate languages and \
back again, producing paraphrased variants for retrieval-augmented generation. Headings, \
lists, emphasis, inline code and links are protected during translation.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Markdown file (or PDF when built with the `pdf` feature).
    input: PathBuf,

    /// Save variants under DIR/augmentation_<timestamp>/ instead of printing them.
    #[arg(short, long, env = "BACKTRANSLATE_OUTPUT", value_name = "DIR")]
    output: Option<PathBuf>,

    /// Intermediate languages, comma separated 2-letter codes.
    #[arg(long, env = "BACKTRANSLATE_LANGUAGES", default_value = "es,it")]
    languages: String,

    /// Language of the input document.
    #[arg(long, env = "BACKTRANSLATE_SOURCE", default_value = "pt")]
    source: String,

    /// Maximum characters per translation request (1000–5000).
    #[arg(long, env = "BACKTRANSLATE_CHUNK_SIZE", default_value_t = 4000,
          value_parser = clap::value_parser!(u32).range(1000..=5000))]
    chunk_size: u32,

    /// Attempts per chunk, including the first.
    #[arg(long, env = "BACKTRANSLATE_MAX_RETRIES", default_value_t = 3,
          value_parser = clap::value_parser!(u32).range(1..=10))]
    max_retries: u32,

    /// Delay before the first retry in milliseconds; doubles each retry.
    #[arg(long, env = "BACKTRANSLATE_RETRY_BACKOFF_MS", default_value_t = 1000)]
    retry_backoff_ms: u64,

    /// Pause between chunk requests in milliseconds.
    #[arg(long, env = "BACKTRANSLATE_PACING_MS", default_value_t = 500)]
    pacing_ms: u64,

    /// Per-request timeout in seconds (0 = none).
    #[arg(long, env = "BACKTRANSLATE_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Translator: google, identity, llm, or an LLM provider name.
    #[arg(long, env = "BACKTRANSLATE_PROVIDER")]
    provider: Option<String>,

    /// Model for LLM providers (default gpt-4.1-nano).
    #[arg(long, env = "BACKTRANSLATE_MODEL")]
    model: Option<String>,

    /// Languages processed at once.
    #[arg(short, long, env = "BACKTRANSLATE_CONCURRENCY", default_value_t = 1)]
    concurrency: usize,

    /// How lines broken by the translator are re-joined.
    #[arg(long, env = "BACKTRANSLATE_LINE_MERGE", value_enum, default_value = "mid-sentence")]
    line_merge: LineMergeArg,

    /// Output structured JSON (variants, failures, stats) instead of Markdown.
    #[arg(long, env = "BACKTRANSLATE_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "BACKTRANSLATE_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "BACKTRANSLATE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "BACKTRANSLATE_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum LineMergeArg {
    Off,
    MidSentence,
    Aggressive,
}

impl From<LineMergeArg> for LineMerge {
    fn from(v: LineMergeArg) -> Self {
        match v {
            LineMergeArg::Off => LineMerge::Off,
            LineMergeArg::MidSentence => LineMerge::MidSentence,
            LineMergeArg::Aggressive => LineMerge::Aggressive,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new();
        Some(cb as Arc<dyn AugmentProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Run augmentation ─────────────────────────────────────────────────
    let output = augment_document(&cli.input, &config)
        .await
        .context("Augmentation failed")?;

    if let Some(ref root) = cli.output {
        let dir = create_output_directory(root).context("Failed to create output directory")?;
        let manifest = save_variants(&output.set, &dir).context("Failed to save variants")?;

        if !cli.quiet {
            print_failures(&output);
            print_summary_table(&manifest);
            eprintln!(
                "{}  {}/{} languages  {}ms  →  {}",
                if output.is_complete() {
                    green("✔")
                } else {
                    cyan("⚠")
                },
                output.stats.languages_succeeded,
                output.stats.languages_requested,
                output.stats.total_duration_ms,
                bold(&dir.display().to_string()),
            );
        }
    } else {
        if cli.json {
            let json =
                serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
            println!("{json}");
        } else {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            for variant in &output.set {
                writeln!(handle, "<!-- ===== {} ===== -->", variant.name)
                    .context("Failed to write to stdout")?;
                handle
                    .write_all(variant.text.as_bytes())
                    .context("Failed to write to stdout")?;
                if !variant.text.ends_with('\n') {
                    handle.write_all(b"\n").ok();
                }
                handle.write_all(b"\n").ok();
            }
        }

        if !cli.quiet && !cli.json {
            print_failures(&output);
            if !show_progress {
                eprintln!(
                    "Produced {}/{} variants in {}ms",
                    output.stats.languages_succeeded,
                    output.stats.languages_requested,
                    output.stats.total_duration_ms
                );
            }
        }
    }

    Ok(())
}

/// Map CLI args to `AugmentConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<AugmentConfig> {
    let languages = parse_languages(&cli.languages)?;

    let mut builder = AugmentConfig::builder()
        .source_language(cli.source.as_str())
        .languages(languages)
        .chunk_size(cli.chunk_size as usize)
        .max_retries(cli.max_retries)
        .retry_backoff_ms(cli.retry_backoff_ms)
        .pacing_ms(cli.pacing_ms)
        .api_timeout_secs(cli.api_timeout)
        .concurrency(cli.concurrency)
        .line_merge(cli.line_merge.clone().into());

    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.as_str());
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model.as_str());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Split `--languages` ("es,it", "es it") into codes; validation happens in
/// the config builder.
fn parse_languages(s: &str) -> Result<Vec<String>> {
    let codes: Vec<String> = s
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_lowercase)
        .collect();

    if codes.is_empty() {
        anyhow::bail!("At least one intermediate language is required (e.g. --languages es,it)");
    }
    Ok(codes)
}

fn print_failures(output: &AugmentationOutput) {
    for failure in &output.failures {
        eprintln!(
            "{} {} was not produced: {}",
            red("✗"),
            bold(&failure.language.variant_name()),
            failure.error
        );
    }
}

fn print_summary_table(manifest: &Manifest) {
    eprintln!();
    eprintln!("  {:<24}  {:>9}  {}", bold("Variant"), bold("Size"), bold("Path"));
    eprintln!("  {}", dim(&"─".repeat(72)));
    for (name, path) in &manifest.files {
        let path = path.as_str().unwrap_or_default();
        let kb = std::fs::metadata(path)
            .map(|m| m.len() as f64 / 1024.0)
            .unwrap_or(0.0);
        eprintln!("  {:<24}  {:>6.1} KB  {}", name, kb, dim(path));
    }
    eprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_language_lists() {
        assert_eq!(parse_languages("es,it").unwrap(), vec!["es", "it"]);
        assert_eq!(parse_languages(" ES , fr de").unwrap(), vec!["es", "fr", "de"]);
        assert!(parse_languages(" , ").is_err());
    }

    #[test]
    fn cli_maps_to_config() {
        let cli = Cli::parse_from([
            "backtranslate",
            "doc.md",
            "--languages",
            "fr,de",
            "--source",
            "en",
            "--chunk-size",
            "1500",
            "--line-merge",
            "off",
            "--provider",
            "identity",
        ]);
        let config = build_config(&cli, None).unwrap();
        assert_eq!(config.source_language, Language::ENGLISH);
        assert_eq!(config.languages.len(), 2);
        assert_eq!(config.chunk_size, 1500);
        assert_eq!(config.line_merge, LineMerge::Off);
        assert_eq!(config.provider_name.as_deref(), Some("identity"));
    }

    #[test]
    fn chunk_size_out_of_range_is_rejected() {
        assert!(Cli::try_parse_from(["backtranslate", "doc.md", "--chunk-size", "50"]).is_err());
    }
}
