use once_cell::sync::Lazy;
use regex::Regex;

pub const NO_SUMMARY: &str = "(No summary available)";
pub const SUMMARY_MAX_CHARS: usize = 140;
const MAX_DESCRIPTION_LENGTH: usize = 200;
const MIN_DESCRIPTION_LENGTH: usize = 10;

static BARE_DOMAIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[\w\s]+\.(com|org|io)$").expect("valid regex"));

/// Descriptions that are too short, too long or boilerplate make poor summaries.
pub fn is_description_useless(description: &str) -> bool {
    let len = description.chars().count();
    if len < MIN_DESCRIPTION_LENGTH || len > MAX_DESCRIPTION_LENGTH {
        return true;
    }
    let lower = description.to_lowercase();
    if lower.contains("cookie") && lower.contains("policy") {
        return true;
    }
    if lower.contains("privacy") && lower.contains("policy") {
        return true;
    }
    if lower.contains("terms of service") {
        return true;
    }
    BARE_DOMAIN.is_match(description.trim())
}

/// Collapse to one line and cap at [`SUMMARY_MAX_CHARS`], ending in `...` when cut.
pub fn truncate_summary(text: &str) -> String {
    let one_line = text.replace(['\r', '\n'], " ");
    let one_line = one_line.trim();
    if one_line.chars().count() <= SUMMARY_MAX_CHARS {
        return one_line.to_string();
    }
    let mut cut: String = one_line.chars().take(SUMMARY_MAX_CHARS - 3).collect();
    cut.push_str("...");
    cut
}

/// One-line summary for a page: its description when that is usable,
/// otherwise the [`NO_SUMMARY`] placeholder.
pub fn summarize(description: &str) -> String {
    if is_description_useless(description) {
        return NO_SUMMARY.to_string();
    }
    truncate_summary(description)
}
