//! Flutter-facing bindings for the Facturo core.

pub mod api;
