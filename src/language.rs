//! Best-effort language tagging for ingested documents.
//!
//! Detection failures never abort ingestion: anything we cannot classify is
//! tagged `"unknown"`. The heuristic looks at Unicode script membership
//! first and falls back to a small English stopword check for Latin text.

const UNKNOWN: &str = "unknown";

/// English function words common enough to separate English from other
/// Latin-script languages at small sample sizes.
const EN_STOPWORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "in", "on", "of", "to", "and",
    "it", "for", "with", "that", "this", "be", "as", "at", "by",
];

/// Detect the dominant language of `text`, returning a short tag
/// (`"en"`, `"fa"`, `"zh"`, ...) or `"unknown"`.
pub fn detect(text: &str) -> &'static str {
    let mut arabic = 0usize;
    let mut cyrillic = 0usize;
    let mut hangul = 0usize;
    let mut cjk = 0usize;
    let mut kana = 0usize;
    let mut latin = 0usize;
    let mut letters = 0usize;

    for c in text.chars() {
        if !c.is_alphabetic() {
            continue;
        }
        letters += 1;
        match c {
            '\u{0600}'..='\u{06FF}' | '\u{0750}'..='\u{077F}' => arabic += 1,
            '\u{0400}'..='\u{04FF}' => cyrillic += 1,
            '\u{AC00}'..='\u{D7AF}' | '\u{1100}'..='\u{11FF}' => hangul += 1,
            '\u{3040}'..='\u{30FF}' => kana += 1,
            '\u{4E00}'..='\u{9FFF}' => cjk += 1,
            'a'..='z' | 'A'..='Z' => latin += 1,
            _ => {}
        }
    }

    if letters == 0 {
        return UNKNOWN;
    }

    let dominant = |count: usize| count * 2 > letters;
    if dominant(arabic) {
        return "fa";
    }
    if dominant(cyrillic) {
        return "ru";
    }
    if dominant(hangul) {
        return "ko";
    }
    if dominant(kana) {
        return "ja";
    }
    if dominant(cjk) {
        return "zh";
    }
    if dominant(latin) {
        let hits = text
            .split_whitespace()
            .filter(|w| {
                EN_STOPWORDS.contains(&w.to_lowercase().trim_matches(|c: char| !c.is_alphabetic()))
            })
            .count();
        if hits > 0 {
            return "en";
        }
    }

    UNKNOWN
}

/// Map a language tag to a human-readable name for display.
pub fn display_name(tag: &str) -> &str {
    match tag {
        "en" => "English",
        "fa" => "Persian",
        "ru" => "Russian",
        "ko" => "Korean",
        "ja" => "Japanese",
        "zh" => "Chinese",
        "id" => "Indonesian",
        _ => "Unknown",
    }
}
