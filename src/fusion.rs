//! Score fusion and ranking: one deterministic ordering out of two
//! independently-scaled relevance signals.
//!
//! Each signal is normalized by its own maximum (floored at
//! [`SCORE_FLOOR`] so an absent or degenerate signal can never divide by
//! zero), then combined as `semantic * weight + lexical * (1 - weight)`.
//! Normalization is relative: the top candidate of each signal always
//! contributes its full weight.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::store::SemanticHit;

/// Floor for per-signal maxima, preventing division by zero when a signal
/// is absent or all-zero.
pub const SCORE_FLOOR: f32 = 0.01;

/// A document surfaced by the lexical index, joined with its content.
#[derive(Debug, Clone)]
pub struct LexicalHit {
    pub id: u64,
    pub content: String,
    pub score: f32,
}

/// The only entity exposed to callers: a document with its fused score,
/// ordered by descending score with ties broken by ascending id.
///
/// `language` and `created_at` are `None` for documents that surfaced only
/// lexically; those records did not pass through the document-join path
/// that carries the metadata, and callers may re-resolve them by id.
#[derive(Debug, Clone, Serialize)]
pub struct FusedResult {
    pub id: u64,
    pub content: String,
    pub score: f32,
    pub language: Option<String>,
    pub created_at: Option<i64>,
}

/// Fuse semantic candidates and lexical scores into the top `top_k`
/// results.
///
/// Pure over its inputs: no I/O, no error path. If either signal is empty
/// the result degrades gracefully to a single-signal ranking. Fused scores
/// lie in `[0, 1]` whenever at least one real score attains each used
/// signal's maximum.
pub fn fuse(
    semantic: &[SemanticHit],
    lexical: &[LexicalHit],
    weight: f32,
    top_k: usize,
) -> Vec<FusedResult> {
    let max_semantic = semantic
        .iter()
        .map(|h| h.similarity)
        .fold(SCORE_FLOOR, f32::max);
    let max_lexical = lexical.iter().map(|h| h.score).fold(SCORE_FLOOR, f32::max);

    let mut combined: BTreeMap<u64, FusedResult> = BTreeMap::new();

    for hit in semantic {
        combined.insert(hit.id, FusedResult {
            id: hit.id,
            content: hit.content.clone(),
            score: hit.similarity / max_semantic * weight,
            language: hit.language.clone(),
            created_at: Some(hit.created_at),
        });
    }

    for hit in lexical {
        let contribution = hit.score / max_lexical * (1.0 - weight);
        match combined.get_mut(&hit.id) {
            Some(existing) => existing.score += contribution,
            None => {
                combined.insert(hit.id, FusedResult {
                    id: hit.id,
                    content: hit.content.clone(),
                    score: contribution,
                    language: None,
                    created_at: None,
                });
            }
        }
    }

    let mut results: Vec<FusedResult> = combined.into_values().collect();
    results.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
    results.truncate(top_k);
    results
}
