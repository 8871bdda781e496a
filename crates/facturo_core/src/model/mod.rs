//! Domain model for generated documents and tax configuration.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep document records as thin indexes over stored PDF artifacts.
//!
//! # Invariants
//! - Every document and preset is identified by a stable UUID.
//! - Document records are immutable; removal is a hard delete.

pub mod document;
pub mod tax;
