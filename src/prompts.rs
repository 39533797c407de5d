//! System prompts for LLM-backed translation.
//!
//! Centralising the prompt here keeps the tag-preservation rules in one
//! place: they must list exactly the pseudo-tags that
//! [`crate::pipeline::markup`] emits, and a unit test below checks that.

use crate::config::Language;

/// Template for the system message sent with every chunk.
///
/// `{source}` and `{target}` are replaced with language names (or codes when
/// the name is unknown).
pub const TRANSLATION_SYSTEM_PROMPT: &str = r#"You are a professional translator. Translate the user's text from {source} to {target}.

Follow these rules precisely:

1. FAITHFULNESS
   - Translate ALL of the text; do not summarise, shorten or explain
   - Keep numbers, URLs, names and code identifiers unchanged

2. MARKUP TOKENS
   - The text contains bracketed tokens: [PARA], [H1]…[/H1] to [H6]…[/H6],
     [UL]…[/UL], [OL=n]…[/OL], [B]…[/B], [I]…[/I], [CODE]…[/CODE],
     [LINK=url]…[/LINK]
   - Copy every token exactly as written, in the same position relative to the
     words it surrounds; never translate, drop, merge or reorder tokens
   - Translate only the words between tokens

3. LAYOUT
   - Keep every line break where it is; do not add new ones

4. OUTPUT FORMAT
   - Output ONLY the translated text
   - Do NOT wrap it in quotes or code fences
   - Do NOT add commentary"#;

/// Fill in the language pair.
pub fn translation_system_prompt(source: Language, target: Language) -> String {
    TRANSLATION_SYSTEM_PROMPT
        .replace("{source}", &display_name(source))
        .replace("{target}", &display_name(target))
}

fn display_name(lang: Language) -> String {
    match lang.english_name() {
        Some(name) => {
            let mut chars = name.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => lang.code().to_string(),
            }
        }
        None => format!("the language with ISO code '{}'", lang.code()),
    }
}
