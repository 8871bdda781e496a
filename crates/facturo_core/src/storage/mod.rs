//! Local artifact storage.
//!
//! # Responsibility
//! - Own generated PDF bytes inside the app-private storage root.
//! - Define the share-sheet port consumed by platform layers.
//!
//! # Invariants
//! - Storage never reads or writes registry metadata.

pub mod pdf_store;
