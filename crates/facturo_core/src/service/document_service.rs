//! Document lifecycle coordinator.
//!
//! # Responsibility
//! - Keep registry records and stored PDF artifacts in agreement on the
//!   generate, open, share and delete paths.
//! - Surface orphan metadata (record present, artifact missing) as a
//!   recoverable state on open.
//! - Derive sequential document numbers from registry contents.
//!
//! # Invariants
//! - A record is only added after its artifact was saved successfully.
//! - Delete removes the record even when the artifact delete fails.
//! - Reconciliation happens lazily on access; there is no full scan.
//! - Record file names are resolved against the store directory at access
//!   time, never cached as absolute paths.

use crate::model::document::{DocumentId, DocumentKind, DocumentMetadata};
use crate::repo::document_repo::{DocumentRegistry, RepoError};
use crate::storage::pdf_store::{artifact_file_name, PdfArtifactStore, ShareTarget, StorageError};
use log::{error, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

static SEQUENCE_DIGITS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+$").expect("valid sequence digits regex"));

/// Digits used when rendering a document sequence.
pub const DOCUMENT_NUMBER_WIDTH: usize = 4;

pub type DocumentServiceResult<T> = Result<T, DocumentServiceError>;

/// Coordinator errors surfaced to UI callers.
#[derive(Debug)]
pub enum DocumentServiceError {
    /// No registry record for the requested id.
    DocumentNotFound(DocumentId),
    /// Artifact store failure on save/share/open.
    Storage(StorageError),
    /// Registry persistence failure.
    Repo(RepoError),
}

impl Display for DocumentServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DocumentNotFound(id) => write!(f, "document not found: {id}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DocumentServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::DocumentNotFound(_) => None,
            Self::Storage(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<StorageError> for DocumentServiceError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<RepoError> for DocumentServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Result of the open flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    /// Artifact is present; hand `path` to the viewer.
    Ready {
        document: DocumentMetadata,
        path: PathBuf,
    },
    /// Record exists but its artifact is gone. Caller picks a resolution.
    Orphaned {
        document: DocumentMetadata,
        expected_path: PathBuf,
    },
}

/// Caller choice for an orphaned record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrphanResolution {
    Keep,
    Purge,
}

/// Coordinates the document registry and the PDF artifact store.
pub struct DocumentService<R: DocumentRegistry> {
    registry: R,
    store: PdfArtifactStore,
}

impl<R: DocumentRegistry> DocumentService<R> {
    pub fn new(registry: R, store: PdfArtifactStore) -> Self {
        Self { registry, store }
    }

    pub fn store(&self) -> &PdfArtifactStore {
        &self.store
    }

    /// Persists a freshly rendered PDF and registers its metadata.
    ///
    /// The artifact is stored as `<document_number>.pdf`, replacing any file
    /// with that name. When the registry insert fails the registry error is
    /// returned and the saved artifact is removed best-effort, unless it
    /// replaced a file that was already there (an older record with the same
    /// number keeps pointing at it).
    pub fn record_generated(
        &self,
        kind: DocumentKind,
        document_number: &str,
        temp_pdf: &Path,
    ) -> DocumentServiceResult<DocumentMetadata> {
        let file_name = artifact_file_name(document_number);
        let replaced_existing = self
            .store
            .path_for(&file_name)
            .map(|path| self.store.exists(&path))
            .unwrap_or(false);
        let path = self.store.save(temp_pdf, document_number)?;
        let metadata = DocumentMetadata::new(kind, document_number, file_name);

        if let Err(err) = self.registry.add(&metadata) {
            error!(
                "event=document_record module=document status=error error_code=registry_add_failed rollback={} error={}",
                !replaced_existing,
                err
            );
            // A replaced file may still back an older record with this number.
            if !replaced_existing {
                self.store.delete(&path);
            }
            return Err(err.into());
        }

        info!(
            "event=document_record module=document status=ok kind={}",
            kind.as_str()
        );
        Ok(metadata)
    }

    pub fn get(&self, id: DocumentId) -> DocumentServiceResult<Option<DocumentMetadata>> {
        Ok(self.registry.get_by_id(id)?)
    }

    /// Lists records in insertion order, optionally restricted to one kind.
    pub fn list(&self, kind: Option<DocumentKind>) -> DocumentServiceResult<Vec<DocumentMetadata>> {
        Ok(self.registry.list(kind)?)
    }

    /// Open flow: checks the artifact behind `id` just in time.
    ///
    /// # Errors
    /// - `DocumentNotFound` when no record exists.
    /// - `Storage(StorageUnavailable)` when the root cannot be resolved.
    pub fn open(&self, id: DocumentId) -> DocumentServiceResult<OpenOutcome> {
        let document = self.require(id)?;
        let path = self.store.path_for(&document.pdf_file_name)?;

        if self.store.exists(&path) {
            info!("event=document_open module=document status=ok");
            return Ok(OpenOutcome::Ready { document, path });
        }

        warn!("event=document_open module=document status=warn reason=orphan_metadata");
        Ok(OpenOutcome::Orphaned {
            document,
            expected_path: path,
        })
    }

    /// Applies the caller's choice for an orphaned record.
    ///
    /// `Purge` removes the record only; there is no artifact to delete.
    /// Returns whether a record was removed.
    pub fn resolve_orphan(
        &self,
        id: DocumentId,
        resolution: OrphanResolution,
    ) -> DocumentServiceResult<bool> {
        match resolution {
            OrphanResolution::Keep => Ok(false),
            OrphanResolution::Purge => {
                let removed = self.registry.remove(id)?;
                info!(
                    "event=document_orphan_purge module=document status=ok removed={}",
                    removed
                );
                Ok(removed)
            }
        }
    }

    /// Delete flow: artifact first (best-effort), then the record, always.
    ///
    /// Returns whether a record was removed; unknown ids are a no-op.
    pub fn delete(&self, id: DocumentId) -> DocumentServiceResult<bool> {
        let Some(document) = self.registry.get_by_id(id)? else {
            return Ok(false);
        };

        match self.store.path_for(&document.pdf_file_name) {
            Ok(path) => self.store.delete(&path),
            Err(err) => warn!(
                "event=document_delete module=document status=warn error_code=artifact_delete_skipped error={}",
                err
            ),
        }

        let removed = self.registry.remove(id)?;
        info!(
            "event=document_delete module=document status=ok removed={}",
            removed
        );
        Ok(removed)
    }

    /// Share flow: resolves the record and hands its artifact to `target`.
    ///
    /// # Errors
    /// - `DocumentNotFound` when no record exists.
    /// - `Storage(FileNotFound)` when the artifact vanished; callers may then
    ///   offer the purge path.
    /// - `Storage(SharingUnavailable)` when the platform cannot share.
    pub fn share(
        &self,
        id: DocumentId,
        target: &dyn ShareTarget,
        title: Option<&str>,
    ) -> DocumentServiceResult<()> {
        let document = self.require(id)?;
        let path = self.store.path_for(&document.pdf_file_name)?;
        self.store.share(&path, target, title)?;
        Ok(())
    }

    /// Returns the number following the highest `<prefix><digits>` of `kind`.
    pub fn next_number(&self, kind: DocumentKind, prefix: &str) -> DocumentServiceResult<String> {
        let documents = self.registry.list(Some(kind))?;
        Ok(next_document_number(
            prefix,
            documents.iter().map(|doc| doc.document_number.as_str()),
        ))
    }

    fn require(&self, id: DocumentId) -> DocumentServiceResult<DocumentMetadata> {
        self.registry
            .get_by_id(id)?
            .ok_or(DocumentServiceError::DocumentNotFound(id))
    }
}

/// Renders `<prefix><sequence>` with the sequence zero-padded.
pub fn format_document_number(prefix: &str, sequence: u32) -> String {
    format!("{prefix}{sequence:0width$}", width = DOCUMENT_NUMBER_WIDTH)
}

/// Returns the number after the highest sequence among `existing` numbers
/// that carry exactly `prefix`.
///
/// The prefix is matched literally, so prefixes ending in digits (`FY24`)
/// work. Numbers with another prefix or a non-digit tail are ignored.
pub fn next_document_number<'a>(
    prefix: &str,
    existing: impl IntoIterator<Item = &'a str>,
) -> String {
    let highest = existing
        .into_iter()
        .filter_map(|number| number.trim().strip_prefix(prefix))
        .filter(|sequence| SEQUENCE_DIGITS_RE.is_match(sequence))
        .filter_map(|sequence| sequence.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format_document_number(prefix, highest.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::{format_document_number, next_document_number};

    #[test]
    fn format_pads_sequence() {
        assert_eq!(format_document_number("FAC-", 7), "FAC-0007");
        assert_eq!(format_document_number("INV-", 12345), "INV-12345");
    }

    #[test]
    fn next_number_starts_at_one() {
        assert_eq!(next_document_number("FAC-", []), "FAC-0001");
    }

    #[test]
    fn next_number_uses_highest_matching_prefix_only() {
        let existing = ["FAC-0002", "PRE-0040", "FAC-0010", "FAC-draft", "XFAC-0099"];
        assert_eq!(next_document_number("FAC-", existing), "FAC-0011");
    }

    #[test]
    fn next_number_handles_prefix_ending_in_digits() {
        assert_eq!(next_document_number("FY24", ["FY240003"]), "FY240004");
        assert_eq!(
            next_document_number("FY24-", ["FY24-0009", "FY23-0050", "FY24-00x1"]),
            "FY24-0010"
        );
    }

    #[test]
    fn next_number_supports_empty_prefix() {
        assert_eq!(next_document_number("", ["9", "A-12"]), "0010");
    }
}
