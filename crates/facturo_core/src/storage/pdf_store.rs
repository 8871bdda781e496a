//! PDF artifact store over the app-private storage root.
//!
//! # Responsibility
//! - Own the binary PDF files under `<root>/facturas/`.
//! - Provide save/exists/delete/list primitives and the share handoff.
//!
//! # Invariants
//! - At most one artifact per file name; saving over an existing name
//!   replaces it (delete, then copy).
//! - `exists` and `delete` never return errors; inaccessible files are
//!   reported as absent and failed deletes are only logged.
//! - `list` never creates the artifact directory.
//! - File names are caller-supplied and are not sanitized here.

use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Subdirectory of the storage root holding all artifacts.
pub const ARTIFACT_DIR_NAME: &str = "facturas";
/// Extension appended to every saved artifact.
pub const PDF_EXTENSION: &str = "pdf";
/// MIME type handed to the platform share sheet.
pub const PDF_MIME_TYPE: &str = "application/pdf";

pub type StorageResult<T> = Result<T, StorageError>;

/// Artifact store failures surfaced to callers.
#[derive(Debug)]
pub enum StorageError {
    /// App-private storage root cannot be resolved.
    StorageUnavailable,
    /// Temporary PDF to persist does not exist.
    SourceMissing(PathBuf),
    /// Copy reported success but the destination is not readable afterwards.
    WriteVerificationFailed(PathBuf),
    /// Requested artifact does not exist at call time.
    FileNotFound(PathBuf),
    /// Platform share capability reports unavailable.
    SharingUnavailable,
    /// Underlying file-system failure.
    Io {
        op: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StorageUnavailable => write!(f, "storage root is unavailable"),
            Self::SourceMissing(path) => {
                write!(f, "source file does not exist: {}", path.display())
            }
            Self::WriteVerificationFailed(path) => {
                write!(f, "written file could not be verified: {}", path.display())
            }
            Self::FileNotFound(path) => write!(f, "file not found: {}", path.display()),
            Self::SharingUnavailable => write!(f, "sharing is not available on this device"),
            Self::Io { op, path, source } => {
                write!(f, "{op} failed for {}: {source}", path.display())
            }
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// One share-sheet invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareRequest {
    pub path: PathBuf,
    pub mime_type: &'static str,
    /// Optional dialog title.
    pub title: Option<String>,
}

/// Platform share capability.
///
/// `share` returns once the user dismisses the sheet; there is no result.
pub trait ShareTarget {
    fn is_available(&self) -> bool;
    fn share(&self, request: &ShareRequest);
}

/// File-system store for generated PDF artifacts.
#[derive(Debug, Clone)]
pub struct PdfArtifactStore {
    root: Option<PathBuf>,
}

impl PdfArtifactStore {
    /// Creates a store over `root`; `None` models an unresolvable root.
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    /// Creates a store over a known storage root.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self::new(Some(root.into()))
    }

    /// Returns the artifact directory path without touching the file system.
    pub fn directory(&self) -> StorageResult<PathBuf> {
        self.root
            .as_ref()
            .map(|root| root.join(ARTIFACT_DIR_NAME))
            .ok_or(StorageError::StorageUnavailable)
    }

    /// Resolves an artifact file name to its absolute location.
    pub fn path_for(&self, file_name: &str) -> StorageResult<PathBuf> {
        Ok(self.directory()?.join(file_name))
    }

    /// Creates the artifact directory if missing.
    ///
    /// Idempotent; returns the directory path.
    pub fn ensure_directory(&self) -> StorageResult<PathBuf> {
        let dir = self.directory()?;
        std::fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            op: "create_dir",
            path: dir.clone(),
            source,
        })?;
        Ok(dir)
    }

    /// Persists `temp_path` as `<dir>/<name>.pdf` and returns the final path.
    ///
    /// # Errors
    /// - `SourceMissing` when `temp_path` does not exist.
    /// - `StorageUnavailable` when the root cannot be resolved.
    /// - `WriteVerificationFailed` when the copy cannot be read back.
    ///
    /// Saving a stored artifact onto itself is a no-op that returns its path.
    pub fn save(&self, temp_path: &Path, name: &str) -> StorageResult<PathBuf> {
        let started_at = Instant::now();
        info!("event=artifact_save module=storage status=start");

        let result = self.save_inner(temp_path, name);
        match &result {
            Ok(_) => info!(
                "event=artifact_save module=storage status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=artifact_save module=storage status=error duration_ms={} error_code={} error={}",
                started_at.elapsed().as_millis(),
                error_code(err),
                err
            ),
        }
        result
    }

    fn save_inner(&self, temp_path: &Path, name: &str) -> StorageResult<PathBuf> {
        if !self.exists(temp_path) {
            return Err(StorageError::SourceMissing(temp_path.to_path_buf()));
        }

        let dir = self.ensure_directory()?;
        let final_path = dir.join(artifact_file_name(name));

        if is_same_file(temp_path, &final_path) {
            return Ok(final_path);
        }

        if self.exists(&final_path) {
            std::fs::remove_file(&final_path).map_err(|source| StorageError::Io {
                op: "replace",
                path: final_path.clone(),
                source,
            })?;
        }

        std::fs::copy(temp_path, &final_path).map_err(|source| StorageError::Io {
            op: "copy",
            path: final_path.clone(),
            source,
        })?;

        if !self.exists(&final_path) {
            return Err(StorageError::WriteVerificationFailed(final_path));
        }

        Ok(final_path)
    }

    /// Returns whether a regular file exists at `path`.
    ///
    /// Read errors are treated as absence.
    pub fn exists(&self, path: &Path) -> bool {
        std::fs::metadata(path)
            .map(|metadata| metadata.is_file())
            .unwrap_or(false)
    }

    /// Deletes the artifact at `path`, best-effort.
    ///
    /// Missing files are a silent success. Failures are logged and swallowed;
    /// callers must not assume the file is gone.
    pub fn delete(&self, path: &Path) {
        if !self.exists(path) {
            return;
        }

        match std::fs::remove_file(path) {
            Ok(()) => info!("event=artifact_delete module=storage status=ok"),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => warn!(
                "event=artifact_delete module=storage status=warn error_code=artifact_delete_failed error={}",
                err
            ),
        }
    }

    /// Hands the artifact at `path` to the platform share capability.
    ///
    /// Presence is checked just before sharing. Blocks until the user
    /// dismisses the share sheet.
    ///
    /// # Errors
    /// - `FileNotFound` when `path` does not exist.
    /// - `SharingUnavailable` when `target` reports unavailable.
    pub fn share(
        &self,
        path: &Path,
        target: &dyn ShareTarget,
        title: Option<&str>,
    ) -> StorageResult<()> {
        if !self.exists(path) {
            warn!("event=artifact_share module=storage status=warn error_code=file_not_found");
            return Err(StorageError::FileNotFound(path.to_path_buf()));
        }
        if !target.is_available() {
            warn!("event=artifact_share module=storage status=warn error_code=sharing_unavailable");
            return Err(StorageError::SharingUnavailable);
        }

        target.share(&ShareRequest {
            path: path.to_path_buf(),
            mime_type: PDF_MIME_TYPE,
            title: title.map(str::to_string),
        });
        info!("event=artifact_share module=storage status=ok");
        Ok(())
    }

    /// Lists `.pdf` file names in the artifact directory, sorted.
    ///
    /// Returns an empty list when the root or directory is missing. A file
    /// named just `.pdf` has no stem and is skipped, as are subdirectories.
    pub fn list(&self) -> Vec<String> {
        let Ok(dir) = self.directory() else {
            return Vec::new();
        };

        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(err) => {
                warn!(
                    "event=artifact_list module=storage status=warn error_code=artifact_list_failed error={}",
                    err
                );
                return Vec::new();
            }
        };

        let mut names = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().map(|kind| kind.is_file()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| has_pdf_extension(name))
            .collect::<Vec<_>>();
        names.sort();
        names
    }
}

/// Returns the stored file name for artifact `name`.
pub fn artifact_file_name(name: &str) -> String {
    format!("{name}.{PDF_EXTENSION}")
}

fn is_same_file(left: &Path, right: &Path) -> bool {
    match (std::fs::canonicalize(left), std::fs::canonicalize(right)) {
        (Ok(left), Ok(right)) => left == right,
        _ => false,
    }
}

fn has_pdf_extension(name: &str) -> bool {
    name.len() > PDF_EXTENSION.len() + 1
        && name.ends_with(&format!(".{PDF_EXTENSION}"))
}

fn error_code(err: &StorageError) -> &'static str {
    match err {
        StorageError::StorageUnavailable => "storage_unavailable",
        StorageError::SourceMissing(_) => "source_missing",
        StorageError::WriteVerificationFailed(_) => "write_verification_failed",
        StorageError::FileNotFound(_) => "file_not_found",
        StorageError::SharingUnavailable => "sharing_unavailable",
        StorageError::Io { .. } => "io_failed",
    }
}

#[cfg(test)]
mod tests {
    use super::{artifact_file_name, has_pdf_extension};

    #[test]
    fn artifact_file_name_appends_extension() {
        assert_eq!(artifact_file_name("FAC-0001"), "FAC-0001.pdf");
    }

    #[test]
    fn pdf_extension_filter_requires_stem() {
        assert!(has_pdf_extension("a.pdf"));
        assert!(!has_pdf_extension(".pdf"));
        assert!(!has_pdf_extension("notes.txt"));
        assert!(!has_pdf_extension("archive.pdf.tmp"));
    }
}
