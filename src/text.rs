//! Text normalization applied identically to documents at ingestion and to
//! queries at search time. The symmetry is what makes lexical tokenization
//! line up between corpus and query.

/// Normalize raw text for storage and scoring.
///
/// Lowercases, strips punctuation (anything that is not alphanumeric,
/// underscore, or whitespace), and collapses runs of whitespace into single
/// spaces. The result may be empty if the input carried no word characters.
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    stripped
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Tokenize normalized content by splitting on whitespace.
///
/// This is the only tokenization policy the lexical index knows about.
pub fn tokenize(normalized: &str) -> Vec<String> {
    normalized.split_whitespace().map(str::to_string).collect()
}
