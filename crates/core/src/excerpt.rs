//! Plain text excerpts from post HTML

use std::sync::LazyLock;

use regex::Regex;

pub const DEFAULT_EXCERPT_LENGTH: usize = 200;
pub const DEFAULT_ELLIPSIS: &str = "...";

static SCRIPT_OR_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)>").expect("valid regex")
});
static BLOCK_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(p|div|li|blockquote|h[1-6]|pre|tr)>").expect("valid regex")
});
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Remove markup from HTML and decode entities.
///
/// Block boundaries become a single space so adjacent paragraphs do not
/// run together; whitespace runs are collapsed and the result is trimmed.
pub fn strip_markup(html: &str) -> String {
    let html = SCRIPT_OR_STYLE.replace_all(html, "");
    let html = BLOCK_BREAK.replace_all(&html, " ");
    let text = TAG.replace_all(&html, "");
    let decoded = html_escape::decode_html_entities(&text);

    WHITESPACE.replace_all(&decoded, " ").trim().to_string()
}

/// Strip `html` and keep at most `length` characters, appending `ending`
/// only when something was cut.
pub fn excerpt(html: &str, length: usize, ending: &str) -> String {
    let text = strip_markup(html);

    match text.char_indices().nth(length) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ending),
        None => text,
    }
}
