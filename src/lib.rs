//! # corpus-rag
//!
//! A Rust web service that answers a user query by retrieving passages from
//! a configured corpus and grounding a chat completion in them. Each corpus
//! names one or two retrieval profiles; the profile list decides the path.
//!
//! ## Architecture
//!
//! ```text
//!                     ┌──────────────────────┐
//!                     │ POST /rag (query, db) │
//!                     └──────────┬───────────┘
//!                                │
//!                                ▼
//!                     ┌──────────────────────┐
//!                     │  Resolve profiles    │
//!                     │  for the corpus id   │
//!                     └──────────┬───────────┘
//!                                │ 0 / 1 / 2 / 3+ records
//!                                ▼
//!                     ┌──────────────────────┐
//!                     │  Classify & validate │──── 0 or 3+ ──▶ failure envelope
//!                     └──────────┬───────────┘
//!                ┌───────────────┴────────────────┐
//!                │ 1 record                        │ tfidf + distllm
//!     ┌──────────┼───────────┐                     ▼
//!     ▼          ▼           ▼           ┌───────────────────────┐
//! ┌───────┐ ┌─────────┐ ┌────────────┐   │ TF-IDF top passages   │
//! │ tfidf │ │ distllm │ │corpusSearch│   └──────────┬────────────┘
//! └───┬───┘ └────┬────┘ └─────┬──────┘              │ joined as extra context
//!     │          │            │                     ▼
//!     │          │            │          ┌───────────────────────┐
//!     │          │            │          │ distllm chat          │
//!     │          │            │          └──────────┬────────────┘
//!     │          │            │                     │ distllm docs ++ tfidf docs
//!     └──────────┴─────┬──────┴─────────────────────┘
//!                      ▼
//!           ┌──────────────────────┐
//!           │  Response envelope   │
//!           └──────────────────────┘
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration for the server and every collaborator
//! - [`profile`] - Program tags, profile records, and classification into single or dual sets
//! - [`resolver`] - Profile lookup by corpus id, backed by a JSON file
//! - [`dispatch`] - Routes classified profiles to one adapter or to the fusion combiner
//! - [`adapters`] - tfidf, distllm, and corpus-search adapters plus the multi-RAG combiner
//! - [`search::tfidf`] - Local TF-IDF vectorizer and cosine nearest-neighbour lookup
//! - [`search::cache`] - Process-wide cache of loaded TF-IDF artifacts
//! - [`search::corpus`] - Client for the multi-strategy corpus search service
//! - [`llm::gateway`] - Chat-only completion client and grounding prompt
//! - [`llm::distllm`] - Client for the distllm retrieval-and-generation service
//! - [`models`] - Query context, retrieval results, and the response envelope
//! - [`error`] - Error taxonomy and transport failure classification
//! - [`api`] - Axum handlers for `/rag` and `/test`
//! - [`state`] - Shared application state wiring the collaborators together

pub mod adapters;
pub mod api;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod llm;
pub mod models;
pub mod profile;
pub mod resolver;
pub mod search;
pub mod state;
