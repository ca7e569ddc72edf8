//! redb-backed document + embedding store, plus the vector-similarity
//! primitive the query pipeline treats as an opaque ranked-candidate
//! source.
//!
//! A document row and its embedding row are written in one redb write
//! transaction: either both land or neither does.
//!
//! Embedding binary format per entry:
//! - 4 bytes: dimension D (u32 LE)
//! - D * 4 bytes: f32 LE values

use std::path::Path;

use chrono::Utc;
use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const DOCUMENTS: TableDefinition<u64, &[u8]> = TableDefinition::new("documents");
const EMBEDDINGS: TableDefinition<u64, &[u8]> = TableDefinition::new("embeddings");
const META: TableDefinition<&str, u64> = TableDefinition::new("meta");

const NEXT_ID_KEY: &str = "next_id";
const DIMENSION_KEY: &str = "dimension";

/// Header size: 4 bytes dimension.
const HEADER_SIZE: usize = 4;

/// A stored document. Fields are set exactly once at ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: u64,
    /// The text as the caller provided it.
    pub raw: String,
    /// Normalized content; what lexical scoring and display operate on.
    pub content: String,
    pub language: Option<String>,
    /// Unix timestamp (seconds).
    pub created_at: i64,
}

/// A candidate surfaced by the similarity query, carrying the document
/// metadata picked up through the join.
#[derive(Debug, Clone)]
pub struct SemanticHit {
    pub id: u64,
    pub content: String,
    /// 1 minus cosine distance, i.e. cosine similarity.
    pub similarity: f32,
    pub language: Option<String>,
    pub created_at: i64,
}

pub struct DocumentStore {
    db: Database,
}

impl DocumentStore {
    /// Open or create a store at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::create(path)?;

        let txn = db.begin_write()?;
        txn.open_table(DOCUMENTS)?;
        txn.open_table(EMBEDDINGS)?;
        txn.open_table(META)?;
        txn.commit()?;

        Ok(Self { db })
    }

    /// Persist a document and its embedding as one atomic transaction,
    /// returning the assigned id.
    ///
    /// The first insert fixes the store's embedding dimensionality; later
    /// inserts with a different dimensionality fail without writing
    /// anything.
    pub fn insert(
        &self,
        raw: &str,
        content: &str,
        language: Option<&str>,
        embedding: &[f32],
    ) -> Result<u64> {
        let txn = self.db.begin_write()?;
        let id = {
            let mut meta = txn.open_table(META)?;

            let dim = meta.get(DIMENSION_KEY)?.map(|v| v.value());
            match dim {
                Some(dim) if dim as usize != embedding.len() => {
                    // Dropping the uncommitted transaction rolls back.
                    return Err(Error::DimensionMismatch {
                        expected: dim as usize,
                        actual: embedding.len(),
                    });
                }
                Some(_) => {}
                None => {
                    meta.insert(DIMENSION_KEY, embedding.len() as u64)?;
                }
            }

            let id = meta.get(NEXT_ID_KEY)?.map_or(1, |v| v.value());
            meta.insert(NEXT_ID_KEY, id + 1)?;

            let document = Document {
                id,
                raw: raw.to_string(),
                content: content.to_string(),
                language: language.map(str::to_string),
                created_at: Utc::now().timestamp(),
            };
            let row = serde_json::to_vec(&document)?;

            let mut documents = txn.open_table(DOCUMENTS)?;
            documents.insert(id, row.as_slice())?;

            let mut bytes =
                Vec::with_capacity(HEADER_SIZE + std::mem::size_of_val(embedding));
            bytes.extend_from_slice(&(embedding.len() as u32).to_le_bytes());
            bytes.extend_from_slice(bytemuck::cast_slice(embedding));

            let mut embeddings = txn.open_table(EMBEDDINGS)?;
            embeddings.insert(id, bytes.as_slice())?;

            id
        };
        txn.commit()?;
        Ok(id)
    }

    /// Fetch a single document by id.
    pub fn get(&self, id: u64) -> Result<Option<Document>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(DOCUMENTS)?;
        let Some(guard) = table.get(id)? else {
            return Ok(None);
        };
        let document = serde_json::from_slice(guard.value())?;
        Ok(Some(document))
    }

    /// All documents, ordered by ascending id.
    pub fn documents(&self) -> Result<Vec<Document>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(DOCUMENTS)?;
        let mut result = Vec::new();
        for entry in table.iter()? {
            let (_, v) = entry?;
            result.push(serde_json::from_slice(v.value())?);
        }
        Ok(result)
    }

    /// Number of stored documents.
    pub fn len(&self) -> Result<usize> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(DOCUMENTS)?;
        Ok(table.len()? as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// The embedding dimensionality fixed by the first insert, if any.
    pub fn dimension(&self) -> Result<Option<usize>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(META)?;
        Ok(table.get(DIMENSION_KEY)?.map(|v| v.value() as usize))
    }

    /// Similarity query over the document + embedding join.
    ///
    /// Returns candidates with cosine similarity `>= threshold`, ordered by
    /// descending similarity (ties by ascending id), capped at `limit`.
    /// An empty result is a valid "no matches" outcome; infrastructure and
    /// data faults surface as errors instead.
    pub fn similarity_search(
        &self,
        query: &[f32],
        threshold: f32,
        limit: usize,
    ) -> Result<Vec<SemanticHit>> {
        let txn = self.db.begin_read()?;
        let meta = txn.open_table(META)?;
        if let Some(dim) = meta.get(DIMENSION_KEY)?.map(|v| v.value() as usize)
            && dim != query.len()
        {
            return Err(Error::DimensionMismatch {
                expected: dim,
                actual: query.len(),
            });
        }

        let embeddings = txn.open_table(EMBEDDINGS)?;
        let documents = txn.open_table(DOCUMENTS)?;

        let mut hits = Vec::new();
        for entry in embeddings.iter()? {
            let (k, v) = entry?;
            let id = k.value();
            let vector = decode_embedding(id, v.value(), query.len())?;

            let similarity = cosine_similarity(query, &vector);
            if similarity < threshold {
                continue;
            }

            // Inner join: an embedding without a document row is skipped.
            let Some(doc_guard) = documents.get(id)? else {
                continue;
            };
            let document: Document = serde_json::from_slice(doc_guard.value())?;
            hits.push(SemanticHit {
                id,
                content: document.content,
                similarity,
                language: document.language,
                created_at: document.created_at,
            });
        }

        hits.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| a.id.cmp(&b.id))
        });
        hits.truncate(limit);
        Ok(hits)
    }
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore").finish_non_exhaustive()
    }
}

fn decode_embedding(id: u64, bytes: &[u8], expected_dim: usize) -> Result<Vec<f32>> {
    if bytes.len() < HEADER_SIZE {
        return Err(Error::CorruptEmbedding(id));
    }
    let mut header = [0u8; HEADER_SIZE];
    header.copy_from_slice(&bytes[..HEADER_SIZE]);
    let dim = u32::from_le_bytes(header) as usize;
    let payload = &bytes[HEADER_SIZE..];
    if payload.len() != dim * 4 {
        return Err(Error::CorruptEmbedding(id));
    }
    if dim != expected_dim {
        return Err(Error::DimensionMismatch {
            expected: expected_dim,
            actual: dim,
        });
    }
    // pod_collect_to_vec copes with the 4-byte offset leaving the payload
    // unaligned for f32.
    Ok(bytemuck::pod_collect_to_vec(payload))
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom <= f32::EPSILON {
        return 0.0;
    }
    dot / denom
}
