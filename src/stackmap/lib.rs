//! # Stackmap Architecture
//!
//! Stackmap is a **UI-agnostic tech-stack catalog library**: the apps a firm
//! uses, the business functions they fill, how they integrate with one
//! another, and where each of them is cited. The bundled CLI is just one client.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (main.rs, cli/)                                        │
//! │  - Parses arguments, formats output, owns stdout/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Owns the catalog, persists, rebuilds indexes, notifies   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Commands (commands/*.rs) + Queries (query.rs, refs.rs)     │
//! │  - Pure functions over CatalogState                         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - KvBackend trait: FsBackend (production), MemBackend      │
//! │  - Store: JSON codec, failure containment, write debouncing │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Loading always goes through [`migrate`], so every older stored shape ends
//! up in the one canonical [`state::CatalogState`].
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code never prints and never exits. Storage failures
//! are logged with `tracing` and contained; the in-memory catalog stays
//! authoritative for the session.
//!
//! ## Testing Strategy
//!
//! 1. **Commands** (`commands/*.rs`): most of the unit tests live here.
//! 2. **API** (`api.rs`): persistence, debouncing and listener dispatch.
//! 3. **Integration** (`tests/`): catalog scenarios and the CLI end to end.
//!
//! ## Module Overview
//!
//! - [`api`]: The facade, entry point for all operations
//! - [`commands`]: Mutations on the catalog
//! - [`query`]: Read-only projections (function groups, pairs, links)
//! - [`refs`]: Cross-reference index for resources and merge-field tokens
//! - [`migrate`]: Normalization of legacy stored shapes
//! - [`seed`]: First-run sample catalog
//! - [`store`]: Key-value backends, JSON store, write debouncer
//! - [`model`], [`state`]: Core data types
//! - [`config`]: Configuration management
//! - [`error`]: Error types
//! - `cli`: Argument parsing and printing for the binary (not part of the lib API)

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod migrate;
pub mod model;
pub mod query;
pub mod refs;
pub mod seed;
pub mod state;
pub mod store;
pub mod util;
