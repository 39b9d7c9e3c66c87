//! Core data models used throughout corpus-qa.
//!
//! These types represent the passages, ranked candidates, and responses
//! that flow through the retrieval and synthesis pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Classification of a corpus passage by source document kind.
///
/// Drives the chunking strategy at load time and the selection
/// heuristics at synthesis time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkType {
    Foundation,
    Dosha,
    Faq,
    Product,
    Program,
    ProductCatalog,
}

impl ChunkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkType::Foundation => "foundation",
            ChunkType::Dosha => "dosha",
            ChunkType::Faq => "faq",
            ChunkType::Product => "product",
            ChunkType::Program => "program",
            ChunkType::ProductCatalog => "product_catalog",
        }
    }
}

/// An immutable corpus passage.
///
/// Created once when the corpus is loaded and chunked; never mutated.
/// The [`RetrievalIndex`](crate::index::RetrievalIndex) owns all chunks
/// for the process lifetime, and ranking refers to them by stable
/// corpus position.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Source document identifier (file name for markdown, catalog file
    /// name for CSV rows).
    pub doc_id: String,
    /// Section identifier within the document (`dosha_2`, `faq_5`,
    /// `section_3`, or a catalog product id).
    pub section_id: String,
    /// Passage text as produced by the chunker.
    pub text: String,
    pub chunk_type: ChunkType,
    /// Structured fields carried alongside catalog rows.
    pub metadata: Option<BTreeMap<String, String>>,
}

/// A chunk ranked against one query. Transient — borrows from the index
/// and is discarded after synthesis.
#[derive(Debug, Clone)]
pub struct RankedCandidate<'a> {
    pub chunk: &'a Chunk,
    /// Min-max normalized BM25 score in [0, 1].
    pub lexical_score: f64,
    /// Raw cosine similarity in [-1, 1].
    pub semantic_score: f64,
    /// Weighted combination of the normalized signals.
    pub hybrid_score: f64,
}

/// A source reference attached to an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub doc_id: String,
    pub section_id: String,
}

impl Citation {
    pub fn for_chunk(chunk: &Chunk) -> Self {
        Citation {
            doc_id: chunk.doc_id.clone(),
            section_id: chunk.section_id.clone(),
        }
    }
}

/// The structured result of answering one query.
///
/// `mode` is a fixed literal identifying the synthesis strategy; callers
/// branch on the response fields, never on the answer text.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub answer: String,
    pub citations: Vec<Citation>,
    pub mode: String,
}
