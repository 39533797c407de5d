//! Translation through a chat model.
//!
//! Each chunk is sent as a single user turn after a system message that
//! names the language pair and lists the pseudo-tags to copy verbatim
//! (see [`crate::prompts`]). Provider errors are treated as transient: the
//! `edgequake-llm` error type does not tell rate limits apart from bad
//! requests, and the retry budget is small.

use crate::config::Language;
use crate::error::TranslateError;
use crate::prompts::translation_system_prompt;
use crate::translator::Translator;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use std::sync::Arc;
use tracing::debug;

pub struct LlmTranslator {
    provider: Arc<dyn LLMProvider>,
    label: String,
    temperature: f32,
    max_tokens: usize,
}

impl LlmTranslator {
    /// Wrap a provider. `label` is only used in logs (e.g. `"openai/gpt-4.1-nano"`).
    pub fn new(provider: Arc<dyn LLMProvider>, label: impl Into<String>) -> Self {
        Self {
            provider,
            label: label.into(),
            temperature: 0.1,
            max_tokens: 4096,
        }
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.temperature = t;
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.max_tokens = n;
        self
    }

    fn options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            ..Default::default()
        }
    }
}

impl std::fmt::Debug for LlmTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmTranslator")
            .field("label", &self.label)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

#[async_trait]
impl Translator for LlmTranslator {
    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, TranslateError> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let messages = vec![
            ChatMessage::system(translation_system_prompt(source, target)),
            ChatMessage::user(text),
        ];

        let response = self
            .provider
            .chat(&messages, Some(&self.options()))
            .await
            .map_err(|e| TranslateError::Transient(format!("{e}")))?;

        debug!(
            "{} {}→{}: {} input tokens, {} output tokens",
            self.label, source, target, response.prompt_tokens, response.completion_tokens
        );

        let out = strip_wrapping_fence(&response.content);
        if out.trim().is_empty() {
            return Err(TranslateError::Transient("model returned empty text".into()));
        }
        Ok(out.to_string())
    }

    fn name(&self) -> &str {
        &self.label
    }
}

/// Remove a single code fence wrapping the whole reply, which some models add
/// despite being told not to.
fn strip_wrapping_fence(s: &str) -> &str {
    let trimmed = s.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return s;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return s;
    };
    // Drop the info string (```text, ```markdown) on the opening line.
    match body.split_once('\n') {
        Some((_, inner)) => inner.trim_end_matches('\n'),
        None => body,
    }
}
