use regex::Regex;
use std::sync::OnceLock;

fn html_tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern is a valid regex"))
}

/// Upstream clue text arrives with markup (`<i>Hamlet</i>`), escaped quotes
/// and stray padding. Strip all three so renderers get plain text.
pub fn clean_clue_text(raw: &str) -> String {
    let without_tags = html_tag_pattern().replace_all(raw, "");
    let unescaped = without_tags.replace("\\'", "'").replace("\\\"", "\"");
    unescaped.split_whitespace().collect::<Vec<_>>().join(" ")
}
