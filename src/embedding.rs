//! The embedding collaborator: text in, fixed-length vector out.
//!
//! The engine only depends on the [`Embedder`] trait, so a model-backed
//! implementation can be dropped in behind the same seam. The default
//! [`HashEmbedder`] is a deterministic FNV-1a character-n-gram feature
//! hasher: no model download, identical output for identical input.

use crate::error::{Error, Result};

/// Default embedding dimensionality. Fixed system-wide once the first
/// document is stored; the store rejects anything else loudly.
pub const DEFAULT_DIMENSION: usize = 256;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01B3;

/// Produces a fixed-length vector for a text. Must be deterministic for
/// identical input within a session.
pub trait Embedder {
    /// The dimensionality of every vector this embedder produces.
    fn dimension(&self) -> usize;

    /// Encode `text` into a vector of exactly `dimension()` values.
    fn encode(&self, text: &str) -> Result<Vec<f32>>;

    /// A short identifier for status output.
    fn name(&self) -> String;
}

/// FNV-1a feature-hashing embedder over character n-grams.
///
/// Each n-gram hashes to a signed bucket; the final vector is L2-normalized
/// so cosine similarity of identical texts is 1.0.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
    ngram_range: (usize, usize),
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        assert!(dimension > 0, "dimension must be > 0");
        Self {
            dimension,
            ngram_range: (3, 4),
        }
    }

    #[must_use]
    pub fn with_ngram_range(mut self, min: usize, max: usize) -> Self {
        assert!(min > 0 && min <= max);
        self.ngram_range = (min, max);
        self
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

fn l2_normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

impl Embedder for HashEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimension];
        let lower = text.to_lowercase();
        let chars: Vec<char> = lower.chars().collect();
        if chars.is_empty() {
            return Ok(vector);
        }
        for n in self.ngram_range.0..=self.ngram_range.1 {
            if n > chars.len() {
                continue;
            }
            for window in chars.windows(n) {
                let ngram: String = window.iter().collect();
                let h = fnv1a(ngram.as_bytes());
                let bucket = (h as usize) % self.dimension;
                let sign = if (h >> 32) & 1 == 0 { 1.0f32 } else { -1.0f32 };
                vector[bucket] += sign;
            }
        }
        l2_normalize(&mut vector);
        Ok(vector)
    }

    fn name(&self) -> String {
        format!("fnv1a-hash-{}", self.dimension)
    }
}

/// Check a produced vector against the expected dimensionality.
pub fn check_dimension(vector: &[f32], expected: usize) -> Result<()> {
    if vector.len() != expected {
        return Err(Error::DimensionMismatch {
            expected,
            actual: vector.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_is_unit_length() {
        let emb = HashEmbedder::new(64);
        let v = emb.encode("hello world").unwrap();
        assert_eq!(v.len(), 64);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.01);
    }

    #[test]
    fn deterministic_within_session() {
        let emb = HashEmbedder::new(64);
        assert_eq!(emb.encode("test").unwrap(), emb.encode("test").unwrap());
    }

    #[test]
    fn different_inputs_differ() {
        let emb = HashEmbedder::new(128);
        let v1 = emb.encode("hello").unwrap();
        let v2 = emb.encode("goodbye").unwrap();
        let dot: f32 = v1.iter().zip(&v2).map(|(a, b)| a * b).sum();
        assert!(dot < 0.99);
    }

    #[test]
    fn empty_input_is_zero_vector() {
        let emb = HashEmbedder::new(32);
        let v = emb.encode("").unwrap();
        assert!(v.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn case_insensitive() {
        let emb = HashEmbedder::new(64);
        assert_eq!(emb.encode("Hello").unwrap(), emb.encode("hello").unwrap());
    }

    #[test]
    fn similar_inputs_correlate() {
        let emb = HashEmbedder::new(256);
        let v1 = emb.encode("error in compilation step").unwrap();
        let v2 = emb.encode("compilation error detected").unwrap();
        let v3 = emb.encode("the quick brown fox").unwrap();
        let dot12: f32 = v1.iter().zip(&v2).map(|(a, b)| a * b).sum();
        let dot13: f32 = v1.iter().zip(&v3).map(|(a, b)| a * b).sum();
        assert!(dot12 > dot13, "similar={dot12} should > dissimilar={dot13}");
    }

    #[test]
    fn unicode_input() {
        let emb = HashEmbedder::new(64);
        let v = emb.encode("سلام دنیا").unwrap();
        assert_eq!(v.len(), 64);
    }

    #[test]
    fn check_dimension_rejects_mismatch() {
        let v = vec![0.0f32; 10];
        assert!(check_dimension(&v, 10).is_ok());
        assert!(matches!(
            check_dimension(&v, 20),
            Err(Error::DimensionMismatch {
                expected: 20,
                actual: 10
            })
        ));
    }

    #[test]
    fn fnv1a_known_values() {
        assert_eq!(fnv1a(b""), FNV_OFFSET);
        assert_ne!(fnv1a(b"a"), fnv1a(b"b"));
    }

    #[test]
    #[should_panic(expected = "dimension must be > 0")]
    fn zero_dimension_panics() {
        HashEmbedder::new(0);
    }
}
