//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate registry, artifact-store and configuration-store calls into
//!   use-case level APIs.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod document_service;
pub mod tax_service;
