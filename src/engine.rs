//! Orchestrator: wires the corpus, index, gate, and synthesizer.
//!
//! An [`Assistant`] is constructed once per process and owns the
//! retrieval index. Construction is the only expensive or fallible
//! setup step; after it succeeds, [`Assistant::answer_user_query`]
//! always returns a well-formed [`Response`] — per-query faults are
//! logged for operators and converted to the fixed refusal.

use anyhow::Result;

use crate::config::Config;
use crate::index::RetrievalIndex;
use crate::loader;
use crate::models::{Chunk, Response};
use crate::safety;
use crate::synthesis::{self, SynthesisOutcome};

/// Fixed literal identifying the extractive synthesis strategy. Callers
/// branch on `Response` fields, never on this string's content.
pub const MODE: &str = "offline-extractive";

/// The query-answering engine. Owns the retrieval index; safe to share
/// behind a reference for concurrent read-only queries.
pub struct Assistant {
    index: RetrievalIndex,
    config: Config,
}

impl Assistant {
    /// Load the corpus from disk and build the index.
    ///
    /// Any failure here (unreadable corpus, embedding backend
    /// unavailable) is fatal and surfaces to the caller; there is no
    /// degraded mode.
    pub async fn new(config: Config) -> Result<Self> {
        let chunks = loader::load_chunks(&config)?;
        Self::from_chunks(chunks, config).await
    }

    /// Build the index from an already-loaded chunk list.
    pub async fn from_chunks(chunks: Vec<Chunk>, config: Config) -> Result<Self> {
        let index = RetrievalIndex::build(chunks, &config.embedding).await?;
        Ok(Self { index, config })
    }

    pub fn corpus(&self) -> &[Chunk] {
        self.index.chunks()
    }

    /// Answer one query: safety gate, then retrieval, then synthesis.
    ///
    /// `top_k` overrides the configured retrieval depth when given.
    /// Blocked queries, empty retrieval, empty synthesis, and recovered
    /// runtime faults all produce the same refusal response.
    pub async fn answer_user_query(&self, query: &str, top_k: Option<usize>) -> Response {
        if safety::is_blocked(query) {
            tracing::debug!("query blocked by safety gate");
            return refusal_response();
        }

        let top_k = top_k.unwrap_or(self.config.retrieval.top_k);
        let weight = self.config.retrieval.lexical_weight;

        let retrieved = match self.config.retrieval.semantic_floor {
            Some(floor) => self.index.retrieve_with_floor(query, top_k, weight, floor).await,
            None => self.index.retrieve(query, top_k, weight).await,
        };

        let candidates = match retrieved {
            Ok(candidates) => candidates,
            Err(e) => {
                // Recovered at this boundary: the caller sees a refusal,
                // never a raw fault.
                tracing::warn!(error = %e, "retrieval failed; returning refusal");
                return refusal_response();
            }
        };

        let SynthesisOutcome { answer, citations } =
            synthesis::synthesize(query, &candidates, &self.config.synthesis);

        Response {
            answer,
            citations,
            mode: MODE.to_string(),
        }
    }
}

fn refusal_response() -> Response {
    let SynthesisOutcome { answer, citations } = SynthesisOutcome::refusal();
    Response {
        answer,
        citations,
        mode: MODE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Chunk, ChunkType};
    use crate::synthesis::REFUSAL;

    fn dosha_chunk() -> Chunk {
        Chunk {
            doc_id: "dosha_guide.md".to_string(),
            section_id: "dosha_1".to_string(),
            text: "Vata is traditionally described as the energy of movement in Ayurveda. \
                   It governs breath and circulation according to the internal guide."
                .to_string(),
            chunk_type: ChunkType::Dosha,
            metadata: None,
        }
    }

    async fn assistant_with(chunks: Vec<Chunk>) -> Assistant {
        Assistant::from_chunks(chunks, Config::default()).await.unwrap()
    }

    #[tokio::test]
    async fn test_blocked_query_refused_regardless_of_corpus() {
        let assistant = assistant_with(vec![dosha_chunk()]).await;
        let response = assistant
            .answer_user_query("What is the recommended daily dosage?", None)
            .await;
        assert_eq!(response.answer, REFUSAL);
        assert!(response.citations.is_empty());
        assert_eq!(response.mode, MODE);
    }

    #[tokio::test]
    async fn test_empty_corpus_refuses() {
        let assistant = assistant_with(Vec::new()).await;
        let response = assistant.answer_user_query("What is Vata?", None).await;
        assert_eq!(response.answer, REFUSAL);
        assert!(response.citations.is_empty());
    }

    #[tokio::test]
    async fn test_grounded_answer_with_citation() {
        let assistant = assistant_with(vec![dosha_chunk()]).await;
        let response = assistant.answer_user_query("What is Vata?", None).await;
        assert_ne!(response.answer, REFUSAL);
        assert_eq!(response.citations.len(), 1);
        assert_eq!(response.citations[0].doc_id, "dosha_guide.md");
        assert_eq!(response.mode, MODE);
    }

    #[tokio::test]
    async fn test_idempotent() {
        let assistant = assistant_with(vec![dosha_chunk()]).await;
        let a = assistant.answer_user_query("What is Vata?", None).await;
        let b = assistant.answer_user_query("What is Vata?", None).await;
        assert_eq!(a.answer, b.answer);
        assert_eq!(a.citations, b.citations);
        assert_eq!(a.mode, b.mode);
    }

    #[tokio::test]
    async fn test_configured_semantic_floor_excludes_candidates() {
        // A floor no real query similarity reaches filters every
        // candidate out before synthesis, so even a grounded question
        // gets the refusal.
        let mut config = Config::default();
        config.retrieval.semantic_floor = Some(0.99);
        let assistant = Assistant::from_chunks(vec![dosha_chunk()], config)
            .await
            .unwrap();
        let response = assistant.answer_user_query("What is Vata?", None).await;
        assert_eq!(response.answer, REFUSAL);
        assert!(response.citations.is_empty());

        // The lowest valid floor excludes nothing.
        let mut config = Config::default();
        config.retrieval.semantic_floor = Some(-1.0);
        let assistant = Assistant::from_chunks(vec![dosha_chunk()], config)
            .await
            .unwrap();
        let response = assistant.answer_user_query("What is Vata?", None).await;
        assert_ne!(response.answer, REFUSAL);
        assert_eq!(response.citations.len(), 1);
    }

    #[tokio::test]
    async fn test_absent_topic_refuses_despite_candidates() {
        let assistant = assistant_with(vec![dosha_chunk()]).await;
        let response = assistant
            .answer_user_query("What is the refund policy for bulk orders?", None)
            .await;
        assert_eq!(response.answer, REFUSAL);
        assert!(response.citations.is_empty());
    }
}
