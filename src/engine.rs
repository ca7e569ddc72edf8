//! The ingestion and query pipelines, driving normalization, embedding,
//! the vector store, the lexical index, and score fusion in sequence.

use tracing::debug;

use crate::{
    embedding::{self, Embedder},
    error::{Error, Result},
    fusion::{self, FusedResult, LexicalHit},
    language,
    lexical::Bm25Index,
    store::DocumentStore,
    text,
};

/// Semantic oversampling factor: the retriever is asked for `top_k * 2`
/// candidates so documents that rank well only lexically cannot starve
/// ones that rank well only semantically within the final cut.
pub const OVERSAMPLE: usize = 2;

pub const DEFAULT_TOP_K: usize = 100;
pub const DEFAULT_THRESHOLD: f32 = 0.4;
pub const DEFAULT_WEIGHT: f32 = 0.5;

/// Caller-supplied search parameters.
#[derive(Debug, Clone, Copy)]
pub struct SearchParams {
    /// Maximum number of fused results to return. Must be > 0.
    pub top_k: usize,
    /// Minimum semantic similarity for a candidate. Must lie in [0, 1].
    pub threshold: f32,
    /// Semantic weight; lexical weight is `1 - weight`. Must lie in [0, 1].
    pub weight: f32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            threshold: DEFAULT_THRESHOLD,
            weight: DEFAULT_WEIGHT,
        }
    }
}

impl SearchParams {
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(Error::InvalidParam("top_k must be greater than 0".into()));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(Error::InvalidParam(format!(
                "threshold must lie in [0, 1], got {}",
                self.threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.weight) {
            return Err(Error::InvalidParam(format!(
                "weight must lie in [0, 1], got {}",
                self.weight
            )));
        }
        Ok(())
    }
}

/// The hybrid retrieval engine: owns the store, the embedding collaborator,
/// and the current lexical index snapshot.
///
/// Single-threaded by design. The index snapshot is an owned value replaced
/// wholesale on refresh; an operation in progress observes one consistent
/// snapshot from start to finish.
pub struct SearchEngine<E: Embedder> {
    store: DocumentStore,
    embedder: E,
    index: Bm25Index,
}

impl<E: Embedder> SearchEngine<E> {
    /// Create an engine over an opened store, building the initial index
    /// snapshot from its current contents.
    pub fn new(store: DocumentStore, embedder: E) -> Result<Self> {
        let mut engine = Self {
            store,
            embedder,
            index: Bm25Index::default(),
        };
        engine.refresh_index()?;
        Ok(engine)
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// Rebuild the lexical index from the current document set and swap in
    /// the new snapshot. Deterministic and side-effect-free given the
    /// store's contents.
    pub fn refresh_index(&mut self) -> Result<()> {
        let documents = self.store.documents()?;
        let snapshot = Bm25Index::build(
            documents.into_iter().map(|d| (d.id, d.content)),
        );
        debug!(documents = snapshot.len(), "lexical index rebuilt");
        self.index = snapshot;
        Ok(())
    }

    /// Ingest one document: validate, normalize, detect language, embed,
    /// persist atomically, then rebuild the lexical index so the document
    /// is immediately searchable. Returns the assigned document id.
    pub fn insert(&mut self, raw: &str) -> Result<u64> {
        if raw.trim().is_empty() {
            return Err(Error::EmptyInput);
        }

        let content = text::normalize(raw);
        if content.is_empty() {
            // Nothing survived normalization (e.g. pure punctuation).
            return Err(Error::EmptyInput);
        }

        let lang = language::detect(&content);
        let vector = self.embedder.encode(&content)?;
        embedding::check_dimension(&vector, self.embedder.dimension())?;

        let id = self.store.insert(raw, &content, Some(lang), &vector)?;
        self.refresh_index()?;
        Ok(id)
    }

    /// Run the full hybrid search pipeline and return the top
    /// `params.top_k` fused results. An empty result is a valid terminal
    /// state, not an error.
    pub fn search(&mut self, raw_query: &str, params: &SearchParams) -> Result<Vec<FusedResult>> {
        params.validate()?;
        if raw_query.trim().is_empty() {
            return Err(Error::EmptyInput);
        }

        let query = text::normalize(raw_query);
        if query.is_empty() {
            return Err(Error::EmptyInput);
        }

        let query_vector = self.embedder.encode(&query)?;
        embedding::check_dimension(&query_vector, self.embedder.dimension())?;

        let limit = params.top_k.saturating_mul(OVERSAMPLE);
        let semantic = self
            .store
            .similarity_search(&query_vector, params.threshold, limit)?;
        debug!(candidates = semantic.len(), "semantic retrieval complete");

        // The index eagerly reflects the current corpus on every query.
        self.refresh_index()?;

        let lexical = if self.index.is_empty() {
            debug!("lexical index empty, semantic ranking only");
            Vec::new()
        } else {
            let query_tokens = text::tokenize(&query);
            let scores = self.index.score(&query_tokens);
            self.index
                .documents()
                .filter_map(|(id, content)| {
                    scores.get(&id).map(|&score| LexicalHit {
                        id,
                        content: content.to_string(),
                        score,
                    })
                })
                .collect()
        };

        Ok(fusion::fuse(&semantic, &lexical, params.weight, params.top_k))
    }

    /// Number of documents currently stored.
    pub fn document_count(&self) -> Result<usize> {
        self.store.len()
    }
}
