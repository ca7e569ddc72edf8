//! Terminal presentation for fused results. Formatting only: scores are
//! never recomputed or mutated here.

use chrono::DateTime;
use serde_json::json;

use crate::{fusion::FusedResult, language};

/// Maximum displayed content length before word-boundary truncation.
const MAX_CONTENT_CHARS: usize = 100;

const HIGHLIGHT_ON: &str = "\x1b[1;33m";
const HIGHLIGHT_OFF: &str = "\x1b[0m";

/// Format results for human-readable terminal output, highlighting query
/// terms in the content column.
pub fn format_human(results: &[FusedResult], query: &str) {
    if results.is_empty() {
        println!("No relevant results found.");
        return;
    }

    for (i, r) in results.iter().enumerate() {
        let content = truncate_at_word(&r.content, MAX_CONTENT_CHARS);
        let content = highlight_query(&content, query);
        let lang = r
            .language
            .as_deref()
            .map_or("Unknown", language::display_name);
        let created = r.created_at.map_or_else(String::new, |ts| {
            DateTime::from_timestamp(ts, 0)
                .map(|dt| format!("  {}", dt.format("%Y-%m-%d")))
                .unwrap_or_default()
        });
        println!(
            "{:>3}. [{:.3}] #{} {content}  ({lang}){created}",
            i + 1,
            r.score,
            r.id
        );
    }

    let mut langs: Vec<&str> = results.iter().filter_map(|r| r.language.as_deref()).collect();
    langs.sort_unstable();
    langs.dedup();
    println!("\n{} result(s)", results.len());
    if !langs.is_empty() {
        let label = if langs.len() == 1 {
            "Language found"
        } else {
            "Languages found"
        };
        println!("{label}: {}", langs.join(", "));
    }
}

/// Format results as a JSON object with the originating query.
pub fn format_json(results: &[FusedResult], query: &str) {
    let payload = json!({
        "query": query,
        "result_count": results.len(),
        "results": results,
    });
    println!("{payload}");
}

/// Wrap case-insensitive occurrences of each query term in ANSI highlight
/// codes. Longer terms are matched first so shorter terms cannot split
/// them.
fn highlight_query(content: &str, query: &str) -> String {
    let mut terms: Vec<&str> = query.split_whitespace().collect();
    if terms.is_empty() {
        return content.to_string();
    }
    terms.sort_unstable_by_key(|t| std::cmp::Reverse(t.len()));
    terms.dedup();

    let lower_content = content.to_lowercase();
    if lower_content.len() != content.len() {
        // Case folding shifted byte offsets; skip highlighting rather than
        // risk splitting a character.
        return content.to_string();
    }
    // Collect non-overlapping match ranges over the lowercased text.
    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for term in terms {
        let term_lower = term.to_lowercase();
        let mut start = 0;
        while let Some(pos) = lower_content[start..].find(&term_lower) {
            let begin = start + pos;
            let end = begin + term_lower.len();
            if !ranges.iter().any(|&(b, e)| begin < e && b < end) {
                ranges.push((begin, end));
            }
            start = end;
        }
    }
    if ranges.is_empty() {
        return content.to_string();
    }
    ranges.sort_unstable();

    let mut out = String::with_capacity(content.len() + ranges.len() * 16);
    let mut cursor = 0;
    for (begin, end) in ranges {
        out.push_str(&content[cursor..begin]);
        out.push_str(HIGHLIGHT_ON);
        out.push_str(&content[begin..end]);
        out.push_str(HIGHLIGHT_OFF);
        cursor = end;
    }
    out.push_str(&content[cursor..]);
    out
}

/// Truncate at a word boundary to at most `max_chars` characters, with an
/// ellipsis when anything was cut.
fn truncate_at_word(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    let truncated = match cut.rfind(' ') {
        Some(pos) => &cut[..pos],
        None => cut.as_str(),
    };
    format!("{truncated}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlight_wraps_matching_terms() {
        let out = highlight_query("machine learning in hospitals", "machine hospitals");
        assert!(out.contains(&format!("{HIGHLIGHT_ON}machine{HIGHLIGHT_OFF}")));
        assert!(out.contains(&format!("{HIGHLIGHT_ON}hospitals{HIGHLIGHT_OFF}")));
        assert!(out.contains(" learning in "));
    }

    #[test]
    fn highlight_is_case_insensitive() {
        let out = highlight_query("Machine Learning", "machine");
        assert!(out.contains(&format!("{HIGHLIGHT_ON}Machine{HIGHLIGHT_OFF}")));
    }

    #[test]
    fn highlight_without_match_is_unchanged() {
        assert_eq!(highlight_query("hello world", "xyz"), "hello world");
    }

    #[test]
    fn highlight_empty_query_is_unchanged() {
        assert_eq!(highlight_query("hello", ""), "hello");
    }

    #[test]
    fn highlight_longer_terms_win() {
        // "learn" must not break up the "learning" match.
        let out = highlight_query("learning", "learn learning");
        assert_eq!(out, format!("{HIGHLIGHT_ON}learning{HIGHLIGHT_OFF}"));
    }

    #[test]
    fn truncate_short_text_unchanged() {
        assert_eq!(truncate_at_word("short text", 100), "short text");
    }

    #[test]
    fn truncate_cuts_at_word_boundary() {
        let out = truncate_at_word("alpha beta gamma delta", 12);
        assert_eq!(out, "alpha beta...");
    }

    #[test]
    fn truncate_handles_unbroken_text() {
        let out = truncate_at_word(&"a".repeat(50), 10);
        assert_eq!(out, format!("{}...", "a".repeat(10)));
    }
}
