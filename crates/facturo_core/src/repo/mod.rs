//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define data access contracts for the document registry and the
//!   persisted configuration store.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Not-found conditions are returned as `None`/`false`, not errors.

pub mod config_store;
pub mod document_repo;
