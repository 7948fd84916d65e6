//! # repo-pulse
//!
//! A Rust web service that ingests GitHub repositories into a vector
//! store for semantic retrieval, and scores projects and contributors
//! from their GitHub activity.
//!
//! ## Ingestion pipeline
//!
//! ```text
//!   repository connected
//!          │
//!          ▼
//!   ┌──────────────────┐   bounded fan-out over directory nodes
//!   │  Tree traversal  │   (file selector applied at every node)
//!   └────────┬─────────┘
//!            │ selected paths
//!            ▼
//!   ┌──────────────────┐   batches of 20, per-file failures
//!   │  Content fetch   │   logged and skipped
//!   └────────┬─────────┘
//!            │ {path, content}
//!            ▼
//!   ┌──────────────────┐   header + 8000-char truncation,
//!   │  Embed + upsert  │   sequential batches of 100
//!   └────────┬─────────┘
//!            │
//!            ▼
//!      vector store  ──► top-k retrieval per chat query
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration for the server, GitHub,
//!   embedding provider, and vector backend
//! - [`error`] - Upstream failure taxonomy (not-found / transient /
//!   dimension mismatch)
//! - [`models`] - Shared data types: `Project`, `HealthScore`,
//!   `GithubStats`, request/response types
//! - [`github`] - GitHub REST client: tree listing, file content,
//!   activity signals, languages
//! - [`ingest`] - File selection rules and the two-phase parallel fetcher
//! - [`embed`] - Embedding client (Ollama or OpenAI-compatible APIs)
//! - [`vector`] - Vector store capability: local persisted index and a
//!   Pinecone data-plane client
//! - [`index`] - Codebase indexer: embed + batched upsert, prefix-scoped
//!   deletion
//! - [`retrieve`] - Top-k semantic context retrieval scoped to a project
//! - [`score`] - Pure scoring engines: project health and contributor
//!   impact
//! - [`api`] - Axum HTTP handlers
//! - [`state`] - Shared application state

pub mod api;
pub mod config;
pub mod embed;
pub mod error;
pub mod github;
pub mod index;
pub mod ingest;
pub mod models;
pub mod retrieve;
pub mod score;
pub mod state;
pub mod vector;
