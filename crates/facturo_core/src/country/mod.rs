//! Country defaults lookup.
//!
//! # Responsibility
//! - Provide the static per-jurisdiction bundle used to seed onboarding and
//!   the tax engine.
//! - Stay dependency-free: no storage, no logging, no I/O.

pub mod defaults;
