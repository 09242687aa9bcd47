//! Text normalization for fuzzy answer matching (spec §4.1).
//!
//! Follows the ordered-transformation pattern from the `lrclib-extract`
//! example crate's own title/artist normalization tables: every regex is
//! compiled once into a `Lazy<Regex>` and the noise-word list is a single
//! source of truth.

use once_cell::sync::Lazy;
use regex::Regex;

/// Noise words stripped both as a dash-suffix trigger and as whole words.
const NOISE_WORDS: &[&str] = &[
    "remastered",
    "remaster",
    "remix",
    "live",
    "acoustic",
    "radio",
    "single",
    "album",
    "version",
    "edit",
    "mix",
    "deluxe",
    "bonus",
    "original",
    "mono",
    "stereo",
    "anniversary",
    "edition",
    "feat",
    "featuring",
    "ft",
    "with",
];

static PARENTHESIZED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\(\[][^\)\]]*[\)\]]").unwrap());

static DASH_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    let alternation = NOISE_WORDS.join("|");
    Regex::new(&format!(r"(?i)[-–—]\s*(?:{alternation}).*$")).unwrap()
});

static ACRONYM_DOTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:[a-z]\.){2,6}").unwrap());

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());

static NOISE_WORD_BOUNDARY: Lazy<Regex> = Lazy::new(|| {
    let alternation = NOISE_WORDS.join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).unwrap()
});

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Applies the ordered normalization pipeline from spec §4.1: lowercase,
/// strip bracketed spans, strip dash-introduced noise suffixes, collapse
/// letter-dot acronyms, drop remaining dots, replace other punctuation
/// with spaces, strip whole-word noise, collapse whitespace, trim.
pub fn normalize(input: &str) -> String {
    let mut text = input.to_lowercase();
    text = PARENTHESIZED.replace_all(&text, "").into_owned();
    text = DASH_SUFFIX.replace(&text, "").into_owned();
    text = ACRONYM_DOTS
        .replace_all(&text, |caps: &regex::Captures| caps[0].replace('.', ""))
        .into_owned();
    text = text.replace('.', "");
    text = NON_WORD.replace_all(&text, " ").into_owned();
    text = NOISE_WORD_BOUNDARY.replace_all(&text, " ").into_owned();
    text = WHITESPACE_RUN.replace_all(&text, " ").into_owned();
    text.trim().to_string()
}
