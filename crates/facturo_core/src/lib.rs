//! Core domain logic for Facturo.
//! This crate is the single source of truth for document/artifact consistency
//! and tax configuration invariants.

pub mod country;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod storage;
pub mod time;

pub use country::defaults::{
    CountryDefaults, CountryDefaultsResolver, CountryDefaultsSource, PresetTemplate,
    ReverseChargePolicy, SupportedCountry,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::document::{DocumentId, DocumentKind, DocumentMetadata};
pub use model::tax::{TaxConfig, TaxPreset, TaxPresetId, TaxPresetPatch};
pub use repo::config_store::{ConfigStore, ConfigStoreError, SqliteConfigStore};
pub use repo::document_repo::{DocumentRegistry, RepoError, RepoResult, SqliteDocumentRegistry};
pub use service::document_service::{
    format_document_number, next_document_number, DocumentService, DocumentServiceError,
    OpenOutcome, OrphanResolution,
};
pub use service::tax_service::{TaxConfigEngine, TaxServiceError};
pub use storage::pdf_store::{
    PdfArtifactStore, ShareRequest, ShareTarget, StorageError, StorageResult, PDF_MIME_TYPE,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
