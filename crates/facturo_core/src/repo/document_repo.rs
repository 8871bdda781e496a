//! Document registry contracts and SQLite implementation.
//!
//! # Responsibility
//! - Keep one metadata record per generated document.
//! - Preserve insertion order for listing.
//!
//! # Invariants
//! - `id` is unique; a second insert with the same id is rejected.
//! - No other field is validated; the registry is a thin index.
//! - Removing an absent id is a no-op, not an error.
//! - The registry never touches artifact files.

use crate::db::DbError;
use crate::model::document::{DocumentId, DocumentKind, DocumentMetadata};
use rusqlite::{ffi, params, Connection, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const DOCUMENT_SELECT_SQL: &str = "SELECT
    id,
    tipo,
    document_number,
    pdf_file_name,
    created_at,
    updated_at
FROM documents";

pub type RepoResult<T> = Result<T, RepoError>;

/// Registry persistence and decoding errors.
#[derive(Debug)]
pub enum RepoError {
    DuplicateId(DocumentId),
    InvalidData(String),
    Db(DbError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "document id already registered: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted document data: {message}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::DuplicateId(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Metadata registry for generated documents.
pub trait DocumentRegistry {
    /// Appends one record; fails with `DuplicateId` when the id exists.
    fn add(&self, metadata: &DocumentMetadata) -> RepoResult<DocumentId>;
    fn get_by_id(&self, id: DocumentId) -> RepoResult<Option<DocumentMetadata>>;
    /// Lists records in insertion order, optionally restricted to one kind.
    fn list(&self, kind: Option<DocumentKind>) -> RepoResult<Vec<DocumentMetadata>>;
    /// Removes one record. Returns whether a record was removed.
    fn remove(&self, id: DocumentId) -> RepoResult<bool>;
}

/// SQLite-backed document registry.
pub struct SqliteDocumentRegistry<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentRegistry<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl DocumentRegistry for SqliteDocumentRegistry<'_> {
    fn add(&self, metadata: &DocumentMetadata) -> RepoResult<DocumentId> {
        let inserted = self.conn.execute(
            "INSERT INTO documents (
                id,
                tipo,
                document_number,
                pdf_file_name,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                metadata.id.to_string(),
                metadata.kind.as_str(),
                metadata.document_number.as_str(),
                metadata.pdf_file_name.as_str(),
                metadata.created_at,
                metadata.updated_at,
            ],
        );

        match inserted {
            Ok(_) => Ok(metadata.id),
            Err(err) if is_unique_violation(&err) => Err(RepoError::DuplicateId(metadata.id)),
            Err(err) => Err(err.into()),
        }
    }

    fn get_by_id(&self, id: DocumentId) -> RepoResult<Option<DocumentMetadata>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{DOCUMENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_document_row(row)?)),
            None => Ok(None),
        }
    }

    fn list(&self, kind: Option<DocumentKind>) -> RepoResult<Vec<DocumentMetadata>> {
        let mut stmt = self.conn.prepare(&format!(
            "{DOCUMENT_SELECT_SQL}
             WHERE (?1 IS NULL OR tipo = ?1)
             ORDER BY seq ASC;"
        ))?;
        let mut rows = stmt.query([kind.map(DocumentKind::as_str)])?;
        let mut documents = Vec::new();
        while let Some(row) = rows.next()? {
            documents.push(parse_document_row(row)?);
        }
        Ok(documents)
    }

    fn remove(&self, id: DocumentId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM documents WHERE id = ?1;", [id.to_string()])?;
        Ok(changed > 0)
    }
}

fn parse_document_row(row: &Row<'_>) -> RepoResult<DocumentMetadata> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in documents.id"))
    })?;

    let kind_text: String = row.get("tipo")?;
    let kind = DocumentKind::parse(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid document kind `{kind_text}` in documents.tipo"))
    })?;

    Ok(DocumentMetadata {
        id,
        kind,
        document_number: row.get("document_number")?,
        pdf_file_name: row.get("pdf_file_name")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation
                && matches!(
                    failure.extended_code,
                    ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                )
    )
}

#[cfg(test)]
mod tests {
    use super::is_unique_violation;
    use crate::db::open_db_in_memory;

    const INSERT_SQL: &str = "INSERT INTO documents
        (id, tipo, document_number, pdf_file_name, created_at, updated_at)
        VALUES (?1, ?2, 'N-1', 'N-1.pdf', 0, 0);";

    #[test]
    fn only_unique_constraint_counts_as_duplicate() {
        let conn = open_db_in_memory().unwrap();
        conn.execute(INSERT_SQL, ["same-id", "factura"]).unwrap();

        let duplicate = conn.execute(INSERT_SQL, ["same-id", "factura"]).unwrap_err();
        assert!(is_unique_violation(&duplicate));

        let bad_kind = conn.execute(INSERT_SQL, ["other-id", "albaran"]).unwrap_err();
        assert!(!is_unique_violation(&bad_kind));
    }
}
