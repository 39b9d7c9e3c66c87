//! Hybrid lexical + semantic retrieval over the in-memory corpus.
//!
//! The [`RetrievalIndex`] is built once at startup: it owns the corpus,
//! the BM25 posting statistics, and one L2-normalized embedding vector
//! per chunk. Queries are read-only — the query-side tokens and vector
//! are recomputed per call and nothing corpus-derived is ever mutated,
//! so one index instance safely serves concurrent queries.
//!
//! Scoring convention: BM25 raw scores (unbounded) and cosine
//! similarities (bounded [-1, 1]) are each min-max normalized into
//! [0, 1] across the full corpus, with an all-equal score range treated
//! as uniform 1.0. The optional semantic floor is checked against the
//! raw cosine value, before normalization, so its meaning does not
//! drift with the per-query score distribution.

use anyhow::{Context, Result};

use crate::config::EmbeddingConfig;
use crate::embedding;
use crate::lexical::{self, Bm25Index};
use crate::models::{Chunk, RankedCandidate};

pub struct RetrievalIndex {
    chunks: Vec<Chunk>,
    bm25: Bm25Index,
    /// L2-normalized chunk vectors, parallel to `chunks`.
    vectors: Vec<Vec<f32>>,
    embedding: EmbeddingConfig,
}

impl RetrievalIndex {
    /// Build the index: tokenize every chunk for BM25 and embed the full
    /// corpus with the configured provider.
    ///
    /// This is the one expensive operation in the system. An embedding
    /// failure here is fatal — the index never silently degrades to
    /// lexical-only ranking. Provider construction runs first, so a
    /// misconfigured provider (missing model, missing API key, feature
    /// flag off) fails here even for an empty corpus, which otherwise
    /// never reaches an embed call. An empty corpus builds successfully
    /// and always retrieves zero candidates.
    pub async fn build(chunks: Vec<Chunk>, embedding_config: &EmbeddingConfig) -> Result<Self> {
        let provider = embedding::create_provider(embedding_config)
            .context("Failed to initialize embedding provider")?;

        let tokenized: Vec<Vec<String>> =
            chunks.iter().map(|c| lexical::tokenize(&c.text)).collect();
        let bm25 = Bm25Index::build(&tokenized);

        let mut vectors = Vec::with_capacity(chunks.len());

        for batch in chunks.chunks(embedding_config.batch_size.max(1)) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let embedded = embedding::embed_texts(embedding_config, &texts)
                .await
                .context("Failed to embed corpus chunks")?;

            if embedded.len() != texts.len() {
                anyhow::bail!(
                    "Embedding provider returned {} vectors for {} texts",
                    embedded.len(),
                    texts.len()
                );
            }

            for mut vec in embedded {
                embedding::l2_normalize(&mut vec);
                vectors.push(vec);
            }
        }

        tracing::info!(
            chunks = chunks.len(),
            model = provider.model_name(),
            dims = provider.dims(),
            "retrieval index built"
        );

        Ok(Self {
            chunks,
            bm25,
            vectors,
            embedding: embedding_config.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Rank the whole corpus against `query` and return the top `top_k`
    /// candidates.
    ///
    /// `hybrid = lexical_weight * lex_norm + (1 - lexical_weight) * sem_norm`.
    /// The sort is stable and candidates enter it in corpus order, so
    /// ties always resolve to the earlier chunk — two calls with the
    /// same corpus and query produce identical output.
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
        lexical_weight: f64,
    ) -> Result<Vec<RankedCandidate<'_>>> {
        let mut ranked = self.rank_all(query, lexical_weight).await?;
        ranked.truncate(top_k);
        Ok(ranked)
    }

    /// Like [`retrieve`](Self::retrieve), but candidates whose raw
    /// cosine similarity falls below `floor` are excluded, scanning past
    /// `top_k` ranked candidates until `top_k` qualify or the corpus is
    /// exhausted.
    pub async fn retrieve_with_floor(
        &self,
        query: &str,
        top_k: usize,
        lexical_weight: f64,
        floor: f64,
    ) -> Result<Vec<RankedCandidate<'_>>> {
        let ranked = self.rank_all(query, lexical_weight).await?;
        Ok(ranked
            .into_iter()
            .filter(|c| c.semantic_score >= floor)
            .take(top_k)
            .collect())
    }

    /// Score every chunk and return the full ranking, best first.
    async fn rank_all(&self, query: &str, lexical_weight: f64) -> Result<Vec<RankedCandidate<'_>>> {
        if self.chunks.is_empty() {
            return Ok(Vec::new());
        }

        let query_tokens = lexical::tokenize(query);
        let lexical_raw = self.bm25.scores(&query_tokens);
        let lexical_norm = normalize_scores(&lexical_raw);

        let mut query_vec = embedding::embed_query(&self.embedding, query)
            .await
            .context("Failed to embed query")?;
        embedding::l2_normalize(&mut query_vec);

        let semantic_raw: Vec<f64> = self
            .vectors
            .iter()
            .map(|v| embedding::dot(&query_vec, v) as f64)
            .collect();
        let semantic_norm = normalize_scores(&semantic_raw);

        let mut candidates: Vec<RankedCandidate<'_>> = self
            .chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| RankedCandidate {
                chunk,
                lexical_score: lexical_norm[i],
                semantic_score: semantic_raw[i],
                hybrid_score: lexical_weight * lexical_norm[i]
                    + (1.0 - lexical_weight) * semantic_norm[i],
            })
            .collect();

        // Stable sort: equal hybrid scores keep corpus order
        candidates.sort_by(|a, b| {
            b.hybrid_score
                .partial_cmp(&a.hybrid_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(candidates)
    }
}

/// Min-max normalize scores to [0, 1]. An all-equal score range yields
/// uniform 1.0 (divide-by-zero guard).
fn normalize_scores(scores: &[f64]) -> Vec<f64> {
    if scores.is_empty() {
        return Vec::new();
    }

    let s_min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let s_max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    scores
        .iter()
        .map(|&s| {
            if (s_max - s_min).abs() < f64::EPSILON {
                1.0
            } else {
                (s - s_min) / (s_max - s_min)
            }
        })
        .collect()
}
