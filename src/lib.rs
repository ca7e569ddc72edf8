//! fuserank - a hybrid retrieval engine fusing semantic and lexical
//! relevance into one deterministic ranking.
//!
//! Documents live in an embedded [redb](https://github.com/cberner/redb)
//! store together with a fixed-dimension embedding per document. A query
//! is answered by running two retrieval paths — cosine similarity over the
//! embeddings and BM25 over an in-memory lexical index — and fusing both
//! signals with a configurable semantic weight.
//!
//! # Quick start
//!
//! ```no_run
//! use fuserank::{DocumentStore, HashEmbedder, SearchEngine, SearchParams};
//!
//! let store = DocumentStore::open(std::path::Path::new("store.redb")).unwrap();
//! let mut engine = SearchEngine::new(store, HashEmbedder::default()).unwrap();
//!
//! engine.insert("machine learning helps diagnose disease in hospitals").unwrap();
//! engine.insert("the weather today is sunny").unwrap();
//!
//! let params = SearchParams { top_k: 2, threshold: 0.0, weight: 0.5 };
//! for r in engine.search("machine learning in hospitals", &params).unwrap() {
//!     println!("#{} [{:.3}] {}", r.id, r.score, r.content);
//! }
//! ```

pub mod data_dir;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod fusion;
pub mod language;
pub mod lexical;
pub mod output;
pub mod store;
pub mod text;

pub use data_dir::DataDir;
pub use embedding::{Embedder, HashEmbedder};
pub use engine::{SearchEngine, SearchParams};
pub use error::{Error, Result};
pub use fusion::FusedResult;
pub use lexical::Bm25Index;
pub use store::{Document, DocumentStore, SemanticHit};
