use once_cell::sync::Lazy;
use regex::Regex;

const WORDS_PER_MINUTE: f64 = 220.0;

static SCRIPT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("valid regex"));
static STYLE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").expect("valid regex"));
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

/// Words of visible text in an HTML document (scripts and styles excluded).
pub fn word_count_from_html(html: &str) -> usize {
    let text = SCRIPT_BLOCK.replace_all(html, "");
    let text = STYLE_BLOCK.replace_all(&text, "");
    let text = TAG.replace_all(&text, " ");
    text.split_whitespace().count()
}

/// `max(1, round(words / 220))`.
pub fn estimate_read_time_minutes(html: &str) -> i64 {
    let words = word_count_from_html(html) as f64;
    ((words / WORDS_PER_MINUTE).round() as i64).max(1)
}
