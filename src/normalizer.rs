use once_cell::sync::Lazy;
use regex::Regex;

pub const EMPTY_DESCRIPTION: &str = "Transação";
pub const PLACEHOLDER_DESCRIPTION: &str = "Diversos";

static UUID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b[0-9A-F]{8}-[0-9A-F]{4}-[0-9A-F]{4}-[0-9A-F]{4}-[0-9A-F]{12}\b").unwrap()
});
static DATE_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[/\\]\d{4}(?:[-\s]?\d{2})?").unwrap());
static LEGAL_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:LTDA|S\.A\.?|S/A|EIRELI|ME|EPP|MEI)\b").unwrap());
static PAYMENT_INSTITUTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:IP\s?S\.?A\.?|IP)\b").unwrap());
static PUNCTUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-_.:*#/\\]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Turn a raw statement description into a display name:
/// `"UBER *TRIP LTDA 123"` becomes `"Uber Trip 123"`.
pub fn normalize_description(raw: &str) -> String {
    if raw.trim().is_empty() {
        return EMPTY_DESCRIPTION.to_string();
    }
    let text = raw.to_uppercase();
    let text = UUID.replace_all(&text, "");
    let text = DATE_SUFFIX.replace_all(&text, "");
    let text = LEGAL_SUFFIX.replace_all(&text, "");
    let text = PAYMENT_INSTITUTION.replace_all(&text, "");
    let text = PUNCTUATION.replace_all(&text, " ");
    let text = WHITESPACE.replace_all(&text, " ");
    let text = text.trim();

    if text.chars().count() <= 2 {
        return PLACEHOLDER_DESCRIPTION.to_string();
    }
    text.split(' ').map(title_case).collect::<Vec<_>>().join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
