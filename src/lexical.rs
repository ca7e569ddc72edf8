//! BM25 lexical index over the normalized document corpus.
//!
//! A [`Bm25Index`] is an immutable snapshot: `build` is a pure function of
//! the document set and a rebuild produces a whole new value that replaces
//! the old one. No query ever observes a half-rebuilt index.

use std::collections::HashMap;

use crate::text;

/// Term-frequency saturation parameter (BM25Okapi default).
pub const DEFAULT_K1: f32 = 1.5;
/// Length-normalization parameter (BM25Okapi default).
pub const DEFAULT_B: f32 = 0.75;
/// Fraction of the mean IDF used as the floor for negative IDFs.
const IDF_EPSILON: f32 = 0.25;

#[derive(Debug, Clone)]
struct IndexedDoc {
    id: u64,
    content: String,
    token_count: u32,
    term_freq: HashMap<String, u32>,
}

/// An immutable BM25 snapshot of the corpus.
///
/// Documents whose token sequence is empty after normalization are excluded
/// entirely: they contribute nothing to corpus statistics and can never be
/// retrieved lexically. A corpus that is empty after exclusion yields the
/// empty-index sentinel (`is_empty()`), for which `score` returns an empty
/// mapping rather than an error.
#[derive(Debug, Clone, Default)]
pub struct Bm25Index {
    docs: Vec<IndexedDoc>,
    idf: HashMap<String, f32>,
    avg_len: f32,
    k1: f32,
    b: f32,
}

impl Bm25Index {
    /// Build a new snapshot from `(id, normalized_content)` pairs.
    pub fn build<I, S>(documents: I) -> Self
    where
        I: IntoIterator<Item = (u64, S)>,
        S: Into<String>,
    {
        Self::build_with_params(documents, DEFAULT_K1, DEFAULT_B)
    }

    /// Build with explicit k1/b parameters.
    pub fn build_with_params<I, S>(documents: I, k1: f32, b: f32) -> Self
    where
        I: IntoIterator<Item = (u64, S)>,
        S: Into<String>,
    {
        let mut docs = Vec::new();
        let mut doc_freq: HashMap<String, u32> = HashMap::new();
        let mut total_tokens = 0u64;

        for (id, content) in documents {
            let content = content.into();
            let tokens = text::tokenize(&content);
            if tokens.is_empty() {
                continue;
            }

            let mut term_freq: HashMap<String, u32> = HashMap::new();
            for token in &tokens {
                *term_freq.entry(token.clone()).or_insert(0) += 1;
            }
            for term in term_freq.keys() {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }

            total_tokens += tokens.len() as u64;
            docs.push(IndexedDoc {
                id,
                content,
                token_count: tokens.len() as u32,
                term_freq,
            });
        }

        if docs.is_empty() {
            return Self {
                k1,
                b,
                ..Self::default()
            };
        }

        let n = docs.len() as f32;
        let avg_len = total_tokens as f32 / n;
        let idf = compute_idf(&doc_freq, n);

        Self {
            docs,
            idf,
            avg_len,
            k1,
            b,
        }
    }

    /// True if the corpus was empty after excluding token-less documents.
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Number of documents in this snapshot.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Iterate over `(id, normalized_content)` for every indexed document.
    pub fn documents(&self) -> impl Iterator<Item = (u64, &str)> {
        self.docs.iter().map(|d| (d.id, d.content.as_str()))
    }

    /// BM25 scores for `query_tokens` over every indexed document.
    ///
    /// Every document in the snapshot appears in the mapping, including ones
    /// that match no query term (score 0.0). An empty index or an empty
    /// query token list yields an empty mapping, never an error.
    pub fn score(&self, query_tokens: &[String]) -> HashMap<u64, f32> {
        if self.docs.is_empty() || query_tokens.is_empty() {
            return HashMap::new();
        }

        let mut scores = HashMap::with_capacity(self.docs.len());
        for doc in &self.docs {
            let len_norm = 1.0 - self.b + self.b * doc.token_count as f32 / self.avg_len;
            let mut score = 0.0f32;
            for term in query_tokens {
                let Some(&tf) = doc.term_freq.get(term) else {
                    continue;
                };
                let Some(&idf) = self.idf.get(term) else {
                    continue;
                };
                let tf = tf as f32;
                score += idf * tf * (self.k1 + 1.0) / (tf + self.k1 * len_norm);
            }
            scores.insert(doc.id, score);
        }
        scores
    }
}

/// Okapi IDF with rank_bm25-style flooring: negative IDFs (terms in more
/// than half the corpus) are raised to `IDF_EPSILON * mean(idf)`, or to
/// `IDF_EPSILON` itself when the mean is non-positive (tiny corpora).
fn compute_idf(doc_freq: &HashMap<String, u32>, n: f32) -> HashMap<String, f32> {
    let mut idf: HashMap<String, f32> = HashMap::with_capacity(doc_freq.len());
    let mut sum = 0.0f32;
    for (term, &df) in doc_freq {
        let df = df as f32;
        let value = ((n - df + 0.5) / (df + 0.5)).ln();
        sum += value;
        idf.insert(term.clone(), value);
    }

    let mean = sum / doc_freq.len() as f32;
    let floor = if mean > 0.0 { IDF_EPSILON * mean } else { IDF_EPSILON };
    for value in idf.values_mut() {
        if *value < 0.0 {
            *value = floor;
        }
    }
    idf
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(s: &str) -> Vec<String> {
        text::tokenize(s)
    }

    fn sample_index() -> Bm25Index {
        Bm25Index::build(vec![
            (1u64, "machine learning helps diagnose disease in hospitals"),
            (2u64, "the weather today is sunny"),
            (3u64, "deep learning for machine translation"),
        ])
    }

    #[test]
    fn empty_corpus_yields_sentinel() {
        let index = Bm25Index::build(Vec::<(u64, String)>::new());
        assert!(index.is_empty());
        assert!(index.score(&tokens("anything")).is_empty());
    }

    #[test]
    fn tokenless_documents_are_excluded() {
        let index = Bm25Index::build(vec![(1u64, ""), (2u64, "   "), (3u64, "hello")]);
        assert_eq!(index.len(), 1);

        let all_empty = Bm25Index::build(vec![(1u64, ""), (2u64, "  ")]);
        assert!(all_empty.is_empty());
    }

    #[test]
    fn matching_document_outscores_non_matching() {
        let index = sample_index();
        let scores = index.score(&tokens("machine learning hospitals"));
        assert!(scores[&1] > scores[&2]);
        assert!(scores[&1] > scores[&3]);
    }

    #[test]
    fn every_indexed_doc_appears_in_scores() {
        let index = sample_index();
        let scores = index.score(&tokens("weather"));
        assert_eq!(scores.len(), 3);
        assert_eq!(scores[&1], 0.0);
        assert!(scores[&2] > 0.0);
    }

    #[test]
    fn scores_are_non_negative() {
        let index = sample_index();
        // "learning" appears in 2 of 3 docs; raw IDF would be negative.
        let scores = index.score(&tokens("learning the in for"));
        for (&id, &score) in &scores {
            assert!(score >= 0.0, "doc {id} scored {score}");
        }
    }

    #[test]
    fn empty_query_yields_empty_mapping() {
        let index = sample_index();
        assert!(index.score(&[]).is_empty());
    }

    #[test]
    fn rebuild_is_deterministic() {
        let a = sample_index();
        let b = sample_index();
        let query = tokens("machine learning in hospitals");
        let sa = a.score(&query);
        let sb = b.score(&query);
        assert_eq!(sa.len(), sb.len());
        for (id, score) in &sa {
            assert_eq!(score, &sb[id], "doc {id} diverged across rebuilds");
        }
    }

    #[test]
    fn term_repetition_saturates() {
        let index = Bm25Index::build(vec![
            (1u64, "cat cat cat cat cat cat cat cat"),
            (2u64, "cat dog bird fish mouse horse cow pig"),
        ]);
        let one = index.score(&tokens("cat"));
        // More occurrences score higher, but k1 bounds the growth well
        // below linear.
        assert!(one[&1] > one[&2]);
        assert!(one[&1] < one[&2] * 8.0);
    }

    #[test]
    fn length_normalization_favors_shorter_doc() {
        let index = Bm25Index::build(vec![
            (1u64, "rust ownership"),
            (
                2u64,
                "rust ownership explained at length with many many extra words \
                 padding the document so it is much longer than the other one",
            ),
        ]);
        let scores = index.score(&tokens("rust ownership"));
        assert!(scores[&1] > scores[&2]);
    }

    #[test]
    fn documents_iterator_reflects_snapshot() {
        let index = sample_index();
        let ids: Vec<u64> = index.documents().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
