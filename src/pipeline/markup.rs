//! Markup encoding: Markdown constructs ⇄ translation-safe pseudo-tags.
//!
//! Translation services reorder, drop or "correct" Markdown punctuation
//! (`#`, `*`, `` ` ``, `[..](..)`). Square-bracketed upper-case tokens such as
//! `[H1]` or `[B]` survive almost every service verbatim, so each construct is
//! swapped for an open/close pair before translation and swapped back after.
//!
//! ## Rule table
//!
//! Every construct is one [`MarkupRule`]: a matcher and template for encoding,
//! and a matcher and template for decoding. [`encode`] and [`decode_tags`] walk the
//! same table in the same order:
//!
//! | # | Rule | Markdown | Encoded |
//! |---|------|----------|---------|
//! | 1 | `para` | blank line | `\n[PARA]\n` |
//! | 2 | `h1`…`h6` | `## text` | `[H2]text[/H2]` |
//! | 3 | `ul` | `- text` / `* text` | `[UL]text[/UL]` |
//! | 4 | `ol` | `3. text` | `[OL=3]text[/OL]` |
//! | 5 | `bold` | `**text**` | `[B]text[/B]` |
//! | 6 | `italic` | `*text*` | `[I]text[/I]` |
//! | 7 | `code` | `` `text` `` | `[CODE]text[/CODE]` |
//! | 8 | `link` | `[label](url)` | `[LINK=url]label[/LINK]` |
//!
//! Order matters on the way in: list bullets must be consumed before the
//! italic rule sees a lone `*`, and bold must run before italic.
//!
//! Adding a construct means adding a row to [`RULES`]; nothing else changes.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

/// One reversible Markdown ⇄ pseudo-tag substitution.
pub struct MarkupRule {
    pub name: &'static str,
    encode_re: Regex,
    encode_to: String,
    decode_re: Regex,
    decode_to: String,
}

impl MarkupRule {
    fn new(
        name: &'static str,
        encode_re: &str,
        encode_to: impl Into<String>,
        decode_re: &str,
        decode_to: impl Into<String>,
    ) -> Self {
        Self {
            name,
            encode_re: Regex::new(encode_re).expect("markup encode regex"),
            encode_to: encode_to.into(),
            decode_re: Regex::new(decode_re).expect("markup decode regex"),
            decode_to: decode_to.into(),
        }
    }

    pub fn encode<'a>(&self, text: &'a str) -> Cow<'a, str> {
        self.encode_re.replace_all(text, self.encode_to.as_str())
    }

    pub fn decode<'a>(&self, text: &'a str) -> Cow<'a, str> {
        self.decode_re.replace_all(text, self.decode_to.as_str())
    }
}

const HEADING_NAMES: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// The rule table, in application order.
pub static RULES: Lazy<Vec<MarkupRule>> = Lazy::new(|| {
    let mut rules = Vec::with_capacity(13);

    rules.push(MarkupRule::new(
        "para",
        r"\n\s*\n",
        "\n[PARA]\n",
        r"\n?[ \t]*\[PARA\][ \t]*\n?",
        "\n\n",
    ));

    for (i, name) in HEADING_NAMES.iter().enumerate() {
        let level = i + 1;
        let hashes = "#".repeat(level);
        rules.push(MarkupRule::new(
            name,
            &format!(r"(?m)^{hashes} ([^\n]+)$"),
            format!("[H{level}]${{1}}[/H{level}]"),
            &format!(r"(?s)\[H{level}\](.*?)\[/H{level}\]"),
            format!("{hashes} ${{1}}"),
        ));
    }

    rules.push(MarkupRule::new(
        "ul",
        r"(?m)^([ \t]*)[-*] ([^\n]+)$",
        "${1}[UL]${2}[/UL]",
        r"(?s)\[UL\](.*?)\[/UL\]",
        "- ${1}",
    ));
    rules.push(MarkupRule::new(
        "ol",
        r"(?m)^([ \t]*)(\d+)\. ([^\n]+)$",
        "${1}[OL=${2}]${3}[/OL]",
        r"(?s)\[OL=(\d+)\](.*?)\[/OL\]",
        "${1}. ${2}",
    ));
    rules.push(MarkupRule::new(
        "bold",
        r"\*\*([^*\n]+)\*\*",
        "[B]${1}[/B]",
        r"(?s)\[B\](.*?)\[/B\]",
        "**${1}**",
    ));
    rules.push(MarkupRule::new(
        "italic",
        r"\*([^*\n]+)\*",
        "[I]${1}[/I]",
        r"(?s)\[I\](.*?)\[/I\]",
        "*${1}*",
    ));
    rules.push(MarkupRule::new(
        "code",
        r"`([^`\n]+)`",
        "[CODE]${1}[/CODE]",
        r"(?s)\[CODE\](.*?)\[/CODE\]",
        "`${1}`",
    ));
    rules.push(MarkupRule::new(
        "link",
        r"\[([^\]\n]+)\]\(([^)\s\]]+)\)",
        "[LINK=${2}]${1}[/LINK]",
        r"(?s)\[LINK=(.*?)\](.*?)\[/LINK\]",
        "[${2}](${1})",
    ));

    rules
});

/// Matches any pseudo-tag the rule table can emit.
pub static ANY_PSEUDO_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[/?(?:PARA|H[1-6]|UL|OL(?:=\d+)?|B|I|CODE|LINK(?:=[^\]]*)?)\]")
        .expect("pseudo-tag regex")
});

/// Replace every recognised construct with its pseudo-tag pair.
///
/// Total: text without markup passes through unchanged.
pub fn encode(text: &str) -> String {
    RULES
        .iter()
        .fold(text.to_string(), |acc, rule| rule.encode(&acc).into_owned())
}

/// Inverse substitutions only, without any cleanup.
///
/// For text produced by [`encode`] and not touched since, this restores the
/// input exactly (modulo blank-line whitespace and `*` bullets, which come
/// back as `\n\n` and `-`).
pub fn decode_tags(text: &str) -> String {
    RULES
        .iter()
        .fold(text.to_string(), |acc, rule| rule.decode(&acc).into_owned())
}

/// Count pseudo-tags still present in `text`.
pub fn leftover_tags(text: &str) -> usize {
    ANY_PSEUDO_TAG.find_iter(text).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str) -> &'static MarkupRule {
        RULES.iter().find(|r| r.name == name).expect("rule exists")
    }

    #[test]
    fn worked_example_encodes() {
        let input = "# Title\n\nSome **bold** text.";
        assert_eq!(
            encode(input),
            "[H1]Title[/H1]\n[PARA]\nSome [B]bold[/B] text."
        );
    }

    #[test]
    fn worked_example_decodes() {
        let encoded = "[H1]Title[/H1]\n[PARA]\nSome [B]bold[/B] text.";
        assert_eq!(decode_tags(encoded), "# Title\n\nSome **bold** text.");
    }

    #[test]
    fn each_rule_is_its_own_inverse() {
        let samples = [
            ("para", "one\n\ntwo"),
            ("h1", "# Heading"),
            ("h2", "## Heading"),
            ("h3", "### Heading"),
            ("h4", "#### Heading"),
            ("h5", "##### Heading"),
            ("h6", "###### Heading"),
            ("ul", "- item\n  - nested"),
            ("ol", "1. first\n2. second\n10. tenth"),
            ("bold", "a **strong** word"),
            ("italic", "an *emphasised* word"),
            ("code", "run `make test` now"),
            ("link", "see [the docs](https://example.org/a?b=c)"),
        ];
        for (name, sample) in samples {
            let r = rule(name);
            let encoded = r.encode(sample);
            assert_ne!(encoded, sample, "{name} should change {sample:?}");
            assert_eq!(r.decode(&encoded), sample, "{name} inverse failed");
        }
    }

    #[test]
    fn heading_levels_match_exact_count() {
        assert_eq!(encode("## Sub"), "[H2]Sub[/H2]");
        assert_eq!(encode("###### Deep"), "[H6]Deep[/H6]");
        // Seven hashes is not a heading.
        assert_eq!(encode("####### Nope"), "####### Nope");
        // A hash inside a line is not a heading.
        assert_eq!(encode("issue # 12"), "issue # 12");
    }

    #[test]
    fn bullets_consumed_before_italic() {
        assert_eq!(encode("* item with *stress*"), "[UL]item with [I]stress[/I][/UL]");
    }

    #[test]
    fn ordered_list_keeps_number() {
        assert_eq!(encode("3. third"), "[OL=3]third[/OL]");
        assert_eq!(decode_tags("[OL=3]third[/OL]"), "3. third");
    }

    #[test]
    fn star_bullet_normalises_to_dash() {
        assert_eq!(decode_tags(&encode("* item")), "- item");
    }

    #[test]
    fn link_inside_emphasis() {
        let input = "*[x](http://a.b)*";
        let encoded = encode(input);
        assert_eq!(encoded, "[I][LINK=http://a.b]x[/LINK][/I]");
        assert_eq!(decode_tags(&encoded), input);
    }

    #[test]
    fn paragraph_decode_tolerates_spacing() {
        assert_eq!(decode_tags("one [PARA] two"), "one\n\ntwo");
        assert_eq!(decode_tags("one\n [PARA] \ntwo"), "one\n\ntwo");
    }

    #[test]
    fn tags_spanning_lines_decode() {
        assert_eq!(decode_tags("[B]split\nbold[/B]"), "**split\nbold**");
    }

    #[test]
    fn plain_text_untouched() {
        let input = "Nothing to see here. Just sentences.";
        assert_eq!(encode(input), input);
        assert_eq!(leftover_tags(&encode(input)), 0);
    }

    #[test]
    fn leftover_counting() {
        assert_eq!(leftover_tags("[UL]item and [OL=2] and [/LINK]"), 3);
        assert_eq!(leftover_tags("[not a tag]"), 0);
    }
}
