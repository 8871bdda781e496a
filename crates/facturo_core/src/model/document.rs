//! Generated document metadata model.
//!
//! # Responsibility
//! - Define the thin index record kept for every generated invoice/quote.
//! - Keep the artifact reference as a file name, never as owned bytes.
//!
//! # Invariants
//! - `id` is stable and never reused for another document.
//! - Records are immutable once created; `updated_at == created_at`.
//! - `pdf_file_name` is a non-owning reference into the artifact store.

use crate::time::now_epoch_ms;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for one generated document.
pub type DocumentId = Uuid;

/// Business document category.
///
/// Wire names follow the app's persisted schema (`factura`, `presupuesto`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Invoice.
    Factura,
    /// Quote / estimate.
    Presupuesto,
}

impl DocumentKind {
    /// Returns the stable storage label for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Factura => "factura",
            Self::Presupuesto => "presupuesto",
        }
    }

    /// Parses a storage label; unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "factura" => Some(Self::Factura),
            "presupuesto" => Some(Self::Presupuesto),
            _ => None,
        }
    }
}

/// Registry record for one generated document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub id: DocumentId,
    /// Serialized as `tipo` to match external schema naming.
    #[serde(rename = "tipo")]
    pub kind: DocumentKind,
    /// Business-formatted number, e.g. `FAC-0007`.
    pub document_number: String,
    /// File name inside the artifact directory, e.g. `FAC-0007.pdf`.
    pub pdf_file_name: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds. Equal to `created_at` for immutable records.
    pub updated_at: i64,
}

impl DocumentMetadata {
    /// Creates a record with a generated stable ID and current timestamps.
    pub fn new(
        kind: DocumentKind,
        document_number: impl Into<String>,
        pdf_file_name: impl Into<String>,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), kind, document_number, pdf_file_name)
    }

    /// Creates a record with a caller-provided ID.
    ///
    /// The registry accepts whatever is given here; no validation happens.
    pub fn with_id(
        id: DocumentId,
        kind: DocumentKind,
        document_number: impl Into<String>,
        pdf_file_name: impl Into<String>,
    ) -> Self {
        let now = now_epoch_ms();
        Self {
            id,
            kind,
            document_number: document_number.into(),
            pdf_file_name: pdf_file_name.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DocumentKind;

    #[test]
    fn kind_parse_is_case_insensitive() {
        assert_eq!(DocumentKind::parse(" Factura "), Some(DocumentKind::Factura));
        assert_eq!(
            DocumentKind::parse("PRESUPUESTO"),
            Some(DocumentKind::Presupuesto)
        );
        assert_eq!(DocumentKind::parse("albaran"), None);
    }

    #[test]
    fn kind_labels_roundtrip() {
        for kind in [DocumentKind::Factura, DocumentKind::Presupuesto] {
            assert_eq!(DocumentKind::parse(kind.as_str()), Some(kind));
        }
    }
}
