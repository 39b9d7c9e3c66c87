//! # corpus-qa
//!
//! Grounded, citation-backed question answering over a small internal
//! document corpus.
//!
//! corpus-qa loads a curated set of markdown documents and a product
//! catalog CSV, builds an in-memory hybrid (BM25 + embedding) retrieval
//! index once at startup, and answers natural-language queries by
//! extracting and citing qualifying sentences from the corpus — no free
//! generation, every output sentence traces to source text.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌─────────────────┐
//! │ Data dir      │──▶│ loader +     │──▶│ RetrievalIndex   │
//! │ .md / .csv    │   │ chunking     │   │ BM25 + vectors  │
//! └──────────────┘   └──────────────┘   └───────┬─────────┘
//!                                               │
//!                       query ──▶ safety gate ──┤
//!                                               ▼
//!                                      ┌─────────────────┐
//!                                      │ synthesis        │
//!                                      │ select/extract/ │
//!                                      │ score/assemble  │
//!                                      └───────┬─────────┘
//!                                              ▼
//!                                   Response { answer, citations, mode }
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! cqa ask "What does Ayurveda mean by Vata, Pitta, and Kapha?"
//! cqa repl                      # interactive session
//! cqa stats                     # corpus overview
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`loader`] | Corpus loading from disk |
//! | [`chunking`] | Markdown/CSV chunking |
//! | [`lexical`] | BM25 keyword scoring |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`index`] | Hybrid retrieval index |
//! | [`safety`] | Query deny-list gate |
//! | [`synthesis`] | Extractive answer assembly |
//! | [`engine`] | Query orchestration |

pub mod chunking;
pub mod config;
pub mod embedding;
pub mod engine;
pub mod index;
pub mod lexical;
pub mod loader;
pub mod models;
pub mod safety;
pub mod synthesis;

pub use engine::Assistant;
pub use models::{Chunk, ChunkType, Citation, Response};
