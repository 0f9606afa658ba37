//! Plain-text helpers shared by loaders.

use regex::Regex;
use std::sync::LazyLock;

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:https?|ftp)://[\n\S]+").expect("valid url pattern"));
static DOUBLE_DOT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\. \.").expect("valid pattern"));
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s\s+").expect("valid pattern"));
static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r\n|\n|\r").expect("valid pattern"));

const TRUNCATION_SEPARATOR: &str = "...";

/// Removes every `http`, `https` and `ftp` URL from `text`.
pub fn strip_urls(text: &str) -> String {
    URL_PATTERN.replace_all(text, "").into_owned()
}

/// Normalizes extracted page text before it is split.
///
/// Backslashes are dropped, `#` becomes a space, `". ."` collapses to `"."`,
/// whitespace runs and line breaks become single spaces and the result is trimmed.
pub fn clean_string(text: &str) -> String {
    let text = text.replace('\\', "");
    let text = text.replace('#', " ");
    let text = DOUBLE_DOT.replace_all(&text, ".");
    let text = WHITESPACE_RUN.replace_all(&text, " ");
    let text = LINE_BREAK.replace_all(&text, " ");
    text.trim().to_string()
}

/// Shortens `full` to at most `max_len` characters by cutting out its middle.
///
/// The front keeps the extra character when the visible length is odd.
pub fn truncate_center_string(full: &str, max_len: usize) -> String {
    let len = full.chars().count();
    if len <= max_len {
        return full.to_string();
    }

    let visible = max_len.saturating_sub(TRUNCATION_SEPARATOR.len());
    let front = visible.div_ceil(2);
    let back = visible / 2;

    let head: String = full.chars().take(front).collect();
    let tail: String = full.chars().skip(len - back).collect();
    format!("{head}{TRUNCATION_SEPARATOR}{tail}")
}
