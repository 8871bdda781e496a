use facturo_core::db::open_db_in_memory;
use facturo_core::{
    DocumentKind, DocumentMetadata, DocumentRegistry, RepoError, SqliteDocumentRegistry,
};
use uuid::Uuid;

#[test]
fn add_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let registry = SqliteDocumentRegistry::new(&conn);

    let metadata = DocumentMetadata::new(DocumentKind::Factura, "FAC-0001", "FAC-0001.pdf");
    let id = registry.add(&metadata).unwrap();

    let loaded = registry.get_by_id(id).unwrap().unwrap();
    assert_eq!(loaded, metadata);
    assert_eq!(loaded.created_at, loaded.updated_at);
}

#[test]
fn get_unknown_id_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let registry = SqliteDocumentRegistry::new(&conn);

    assert!(registry.get_by_id(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn list_keeps_insertion_order_and_filters_by_kind() {
    let conn = open_db_in_memory().unwrap();
    let registry = SqliteDocumentRegistry::new(&conn);

    let numbers = [
        (DocumentKind::Factura, "FAC-0002"),
        (DocumentKind::Presupuesto, "PRE-0001"),
        (DocumentKind::Factura, "FAC-0001"),
        (DocumentKind::Presupuesto, "PRE-0002"),
    ];
    for (kind, number) in numbers {
        registry
            .add(&DocumentMetadata::new(kind, number, format!("{number}.pdf")))
            .unwrap();
    }

    let all = registry
        .list(None)
        .unwrap()
        .into_iter()
        .map(|doc| doc.document_number)
        .collect::<Vec<_>>();
    assert_eq!(all, vec!["FAC-0002", "PRE-0001", "FAC-0001", "PRE-0002"]);

    let invoices = registry
        .list(Some(DocumentKind::Factura))
        .unwrap()
        .into_iter()
        .map(|doc| doc.document_number)
        .collect::<Vec<_>>();
    assert_eq!(invoices, vec!["FAC-0002", "FAC-0001"]);

    let quotes = registry.list(Some(DocumentKind::Presupuesto)).unwrap();
    assert!(quotes
        .iter()
        .all(|doc| doc.kind == DocumentKind::Presupuesto));
    assert_eq!(quotes.len(), 2);
}

#[test]
fn add_accepts_unvalidated_fields() {
    let conn = open_db_in_memory().unwrap();
    let registry = SqliteDocumentRegistry::new(&conn);

    let metadata = DocumentMetadata::new(DocumentKind::Presupuesto, "", "no extension");
    let id = registry.add(&metadata).unwrap();
    assert_eq!(registry.get_by_id(id).unwrap().unwrap().document_number, "");
}

#[test]
fn add_rejects_duplicate_id() {
    let conn = open_db_in_memory().unwrap();
    let registry = SqliteDocumentRegistry::new(&conn);

    let first = DocumentMetadata::new(DocumentKind::Factura, "FAC-0001", "FAC-0001.pdf");
    registry.add(&first).unwrap();
    let clash = DocumentMetadata::with_id(
        first.id,
        DocumentKind::Presupuesto,
        "PRE-0001",
        "PRE-0001.pdf",
    );

    let err = registry.add(&clash).unwrap_err();
    assert!(matches!(err, RepoError::DuplicateId(id) if id == first.id));
    assert_eq!(registry.list(None).unwrap().len(), 1);
}

#[test]
fn remove_is_noop_for_absent_id() {
    let conn = open_db_in_memory().unwrap();
    let registry = SqliteDocumentRegistry::new(&conn);

    let metadata = DocumentMetadata::new(DocumentKind::Factura, "FAC-0001", "FAC-0001.pdf");
    registry.add(&metadata).unwrap();

    assert!(registry.remove(metadata.id).unwrap());
    assert!(!registry.remove(metadata.id).unwrap());
    assert!(!registry.remove(Uuid::new_v4()).unwrap());
    assert!(registry.get_by_id(metadata.id).unwrap().is_none());
}

#[test]
fn get_rejects_corrupted_kind() {
    let conn = open_db_in_memory().unwrap();
    let registry = SqliteDocumentRegistry::new(&conn);
    let metadata = DocumentMetadata::new(DocumentKind::Factura, "FAC-0001", "FAC-0001.pdf");
    registry.add(&metadata).unwrap();

    conn.execute_batch("PRAGMA ignore_check_constraints = ON;")
        .unwrap();
    conn.execute(
        "UPDATE documents SET tipo = 'albaran' WHERE id = ?1;",
        [metadata.id.to_string()],
    )
    .unwrap();

    let err = registry.get_by_id(metadata.id).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}
