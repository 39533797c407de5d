//! Decoding: pseudo-tags → Markdown, plus cleanup of translation artefacts.
//!
//! ## Why is cleanup necessary?
//!
//! After a round trip through a translation service the pseudo-tags mostly
//! survive, but the text around them does not always come back intact:
//!
//! - Windows-style `\r\n` line endings
//! - zero-width spaces and soft hyphens injected into words
//! - a list tag whose partner was dropped, or whose content was replaced by a
//!   literal `$1`
//! - runs of blank lines where paragraph tokens were duplicated
//! - a sentence split across two lines mid-phrase
//!
//! Each rule below is a pure `&str → String` pass and independently testable.
//!
//! ## Rule Order
//!
//! `$1` list artefacts are replaced before the tag inverse, which would
//! otherwise read `[UL] $1 [/UL]` as an ordinary item. Line endings come next
//! so every later rule only sees `\n`. List repair runs before line merging
//! so that repaired items are recognised as list lines and are not glued onto
//! the previous sentence.

use crate::config::LineMerge;
use crate::pipeline::markup;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

/// Convert translated pseudo-tag text back into Markdown.
///
/// Never fails. Rules (applied in order):
/// 1. Replace `$1` list artefacts with placeholder items (lossy fallback)
/// 2. Inverse tag substitutions (paragraph, headings, lists, bold, italic, code, links)
/// 3. Normalise line endings (CRLF → LF)
/// 4. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 5. Repair orphan list tags
/// 6. Collapse 3+ consecutive line breaks down to 2
/// 7. Re-join lines broken mid-sentence, per `line_merge`
///
/// `decode(&encode(text), LineMerge::Off) == text` holds for plain text and
/// for Markdown built from the encoded constructs (blank lines containing
/// only spaces come back empty, `*` bullets come back as `-`). Any other
/// `line_merge` mode may join lines and gives no such guarantee.
pub fn decode(input: &str, line_merge: LineMerge) -> String {
    let s = repair_list_artefacts(input);
    let s = markup::decode_tags(&s);
    let s = normalise_line_endings(&s);
    let s = remove_invisible_chars(&s);
    let s = repair_list_tags(&s);
    let s = collapse_line_breaks(&s);
    let s = merge_broken_lines(&s, line_merge);

    let leftover = markup::leftover_tags(&s);
    if leftover > 0 {
        warn!("{} pseudo-tag(s) could not be restored after decoding", leftover);
    }
    s
}

// ── Rule 3: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 4: Remove invisible Unicode characters ──────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rules 1 and 5: Repair list tags ──────────────────────────────────────────
//
// Known lossy path. Some services replace an item's content with a literal
// `$1`; the item text cannot be recovered, so a generic placeholder item is
// emitted. This has to run before the tag inverse, which would otherwise
// decode the pair as an item reading `$1`. A tag still present after the
// inverse lost its partner during translation and becomes a bare marker or
// is dropped.

static RE_UL_ARTEFACT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[UL\]\s*\$1\s*\[/UL\]").unwrap());
static RE_OL_ARTEFACT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[OL(?:=\d+)?\]\s*\$1\s*\[/OL\]").unwrap());
static RE_UL_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\[UL\][ \t]*").unwrap());
static RE_OL_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[OL(?:=(\d+))?\][ \t]*").unwrap());
static RE_LIST_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[ \t]*\[/(?:UL|OL)\]").unwrap());

fn repair_list_artefacts(input: &str) -> String {
    let s = RE_UL_ARTEFACT.replace_all(input, "- Item");
    RE_OL_ARTEFACT.replace_all(&s, "1. Item").into_owned()
}

fn repair_list_tags(input: &str) -> String {
    let s = RE_UL_OPEN.replace_all(input, "- ");
    let s = RE_OL_OPEN.replace_all(&s, |caps: &regex::Captures<'_>| {
        format!("{}. ", caps.get(1).map_or("1", |m| m.as_str()))
    });
    RE_LIST_CLOSE.replace_all(&s, "").into_owned()
}

// ── Rule 6: Collapse excessive line breaks ───────────────────────────────────

static RE_LINE_BREAKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_line_breaks(input: &str) -> String {
    RE_LINE_BREAKS.replace_all(input, "\n\n").into_owned()
}

// ── Rule 7: Re-join lines broken mid-sentence ────────────────────────────────

static RE_AGGRESSIVE_MERGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w+)\s*\n\s*(\w+)").unwrap());
static RE_ORDERED_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\. ").unwrap());

fn merge_broken_lines(input: &str, mode: LineMerge) -> String {
    match mode {
        LineMerge::Off => input.to_string(),
        LineMerge::Aggressive => RE_AGGRESSIVE_MERGE.replace_all(input, "$1 $2").into_owned(),
        LineMerge::MidSentence => merge_mid_sentence(input),
    }
}

/// Join `line` onto the previous line when the break looks like it landed
/// inside a sentence: previous line ends in a letter or digit, next line
/// starts lower-case, and neither is a block-level Markdown line. Fenced
/// code blocks are copied line for line.
fn merge_mid_sentence(input: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut in_fence = false;

    for line in input.split('\n') {
        if is_fence(line) {
            in_fence = !in_fence;
        } else if !in_fence {
            if let Some(prev) = out.last_mut() {
                if breaks_mid_sentence(prev, line) {
                    let joined = format!("{} {}", prev.trim_end(), line.trim_start());
                    *prev = joined;
                    continue;
                }
            }
        }
        out.push(line.to_string());
    }

    out.join("\n")
}

fn breaks_mid_sentence(prev: &str, next: &str) -> bool {
    if is_block_line(prev) || is_block_line(next) {
        return false;
    }
    let ends_in_word = prev
        .trim_end()
        .chars()
        .last()
        .is_some_and(char::is_alphanumeric);
    let starts_lower = next
        .trim_start()
        .chars()
        .next()
        .is_some_and(char::is_lowercase);
    ends_in_word && starts_lower
}

fn is_fence(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with("```") || t.starts_with("~~~")
}

fn is_block_line(line: &str) -> bool {
    let t = line.trim_start();
    t.is_empty()
        || is_fence(t)
        || t.starts_with('#')
        || t.starts_with("- ")
        || t.starts_with("* ")
        || t.starts_with('>')
        || t.starts_with('|')
        || RE_ORDERED_ITEM.is_match(t)
}

// ── Tests ────────────────────────────────────────────────────────────────────
