//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose document lifecycle, tax configuration and country defaults to
//!   Dart via FRB.
//! - Translate core errors into flat response envelopes for UI handling.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Pure lookups are `sync`; calls touching files or SQLite run off the UI
//!   isolate (plain FRB functions are async on the Dart side).
//! - Every call opens its own connection; no connection outlives a call.
//! - Services are rebuilt per call from SQLite instead of living for the
//!   process lifetime; the persisted snapshot is the single copy of the tax
//!   configuration, and the UI is its only writer.

use facturo_core::db::{open_db, DB_FILE_NAME};
use facturo_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CountryDefaultsResolver, DocumentKind, DocumentMetadata, DocumentService,
    DocumentServiceError, OpenOutcome, OrphanResolution, PdfArtifactStore, ShareRequest,
    ShareTarget, SqliteConfigStore, SqliteDocumentRegistry, StorageError, TaxConfig,
    TaxConfigEngine, TaxPreset, TaxPresetPatch, TaxServiceError,
};
use rusqlite::Connection;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use uuid::Uuid;

const APP_DIR_NAME: &str = "facturo";
const DATA_DIR_ENV: &str = "FACTURO_DATA_DIR";
static APP_ROOT: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Sets the app-private storage root for this process.
///
/// Input semantics:
/// - `data_dir`: absolute directory, normally the platform documents dir.
///
/// # FFI contract
/// - Idempotent for the same directory; a different directory is rejected.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_app(data_dir: String) -> String {
    let trimmed = data_dir.trim();
    if trimmed.is_empty() {
        return "data_dir cannot be empty".to_string();
    }
    let requested = PathBuf::from(trimmed);
    if !requested.is_absolute() {
        return format!("data_dir must be an absolute path, got `{trimmed}`");
    }

    let active = APP_ROOT.get_or_init(|| requested.clone());
    if *active != requested {
        return format!(
            "app already initialized at `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        );
    }
    log::info!("event=app_init module=ffi status=ok");
    String::new()
}

/// Country defaults projected for Dart.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryDefaultsDto {
    /// Normalized requested code; empty when the fallback record applies.
    pub code: String,
    pub tax_id_label: String,
    pub tax_name: String,
    pub default_tax_rate: f64,
    pub currency: String,
    pub locale: String,
    pub presets: Vec<PresetTemplateDto>,
    pub invoice_prefix: String,
    pub quote_prefix: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PresetTemplateDto {
    pub name: String,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedCountryItem {
    pub code: String,
    pub name: String,
}

/// Resolves country defaults; unknown codes return the generic record.
#[flutter_rust_bridge::frb(sync)]
pub fn country_defaults(code: String) -> CountryDefaultsDto {
    let defaults = CountryDefaultsResolver::get(&code);
    let normalized = code.trim().to_ascii_uppercase();
    CountryDefaultsDto {
        code: if CountryDefaultsResolver::is_supported(&normalized) {
            normalized
        } else {
            String::new()
        },
        tax_id_label: defaults.tax_id_label.to_string(),
        tax_name: defaults.tax_name.to_string(),
        default_tax_rate: defaults.default_tax_rate,
        currency: defaults.currency.to_string(),
        locale: defaults.locale.to_string(),
        presets: defaults
            .tax_presets
            .iter()
            .map(|template| PresetTemplateDto {
                name: template.name.to_string(),
                rate: template.rate,
            })
            .collect(),
        invoice_prefix: defaults.invoice_prefix.to_string(),
        quote_prefix: defaults.quote_prefix.to_string(),
    }
}

/// Lists countries offered during onboarding.
#[flutter_rust_bridge::frb(sync)]
pub fn countries_supported() -> Vec<SupportedCountryItem> {
    CountryDefaultsResolver::list_supported()
        .iter()
        .map(|country| SupportedCountryItem {
            code: country.code.to_string(),
            name: country.name.to_string(),
        })
        .collect()
}

/// Tax preset projected for Dart.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxPresetItem {
    pub id: String,
    pub name: String,
    pub rate: f64,
    pub is_default: bool,
    pub created_at: i64,
}

/// Tax configuration envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxConfigResponse {
    pub ok: bool,
    pub message: String,
    pub tax_name: String,
    pub presets: Vec<TaxPresetItem>,
    pub allow_per_line_item_tax: bool,
    pub reverse_charge_enabled: bool,
    pub reverse_charge_label: String,
}

impl TaxConfigResponse {
    fn success(message: impl Into<String>, config: &TaxConfig) -> Self {
        Self {
            ok: true,
            message: message.into(),
            tax_name: config.tax_name.clone(),
            presets: config.presets.iter().map(to_tax_preset_item).collect(),
            allow_per_line_item_tax: config.allow_per_line_item_tax,
            reverse_charge_enabled: config.reverse_charge_enabled,
            reverse_charge_label: config.reverse_charge_label.clone(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            tax_name: String::new(),
            presets: Vec::new(),
            allow_per_line_item_tax: false,
            reverse_charge_enabled: false,
            reverse_charge_label: String::new(),
        }
    }
}

/// Generic action response envelope for tax preset edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxActionResponse {
    pub ok: bool,
    /// Affected preset ID; `None` when nothing matched.
    pub preset_id: Option<String>,
    pub message: String,
}

impl TaxActionResponse {
    fn success(message: impl Into<String>, preset_id: Option<String>) -> Self {
        Self {
            ok: true,
            preset_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            preset_id: None,
            message: message.into(),
        }
    }
}

/// Reads the persisted tax configuration.
pub fn tax_config_get() -> TaxConfigResponse {
    match with_tax_engine(|engine| Ok(engine.config().clone())) {
        Ok(config) => TaxConfigResponse::success("Tax configuration loaded.", &config),
        Err(err) => TaxConfigResponse::failure(format!("tax_config_get failed: {err}")),
    }
}

/// Replaces tax configuration with the defaults of `country_code`.
pub fn tax_initialize_from_country(country_code: String) -> TaxConfigResponse {
    match with_tax_engine(|engine| {
        engine
            .initialize_from_country_defaults(&country_code)
            .cloned()
    }) {
        Ok(config) => TaxConfigResponse::success("Tax configuration initialized.", &config),
        Err(err) => {
            TaxConfigResponse::failure(format!("tax_initialize_from_country failed: {err}"))
        }
    }
}

/// Adds one preset. `rate` must already be validated by the form (0..=100).
pub fn tax_add_preset(name: String, rate: f64, is_default: bool) -> TaxActionResponse {
    match with_tax_engine(|engine| engine.add_preset(name.trim(), rate, is_default)) {
        Ok(preset) => TaxActionResponse::success("Preset added.", Some(preset.id.to_string())),
        Err(err) => TaxActionResponse::failure(format!("tax_add_preset failed: {err}")),
    }
}

/// Merges provided fields into one preset; unknown IDs are a no-op.
pub fn tax_update_preset(
    preset_id: String,
    name: Option<String>,
    rate: Option<f64>,
    is_default: Option<bool>,
) -> TaxActionResponse {
    let id = match parse_id(&preset_id) {
        Ok(id) => id,
        Err(err) => return TaxActionResponse::failure(format!("tax_update_preset failed: {err}")),
    };
    let patch = TaxPresetPatch {
        name: name.map(|value| value.trim().to_string()),
        rate,
        is_default,
    };
    match with_tax_engine(|engine| engine.update_preset(id, &patch)) {
        Ok(Some(preset)) => {
            TaxActionResponse::success("Preset updated.", Some(preset.id.to_string()))
        }
        Ok(None) => TaxActionResponse::success("Preset not found.", None),
        Err(err) => TaxActionResponse::failure(format!("tax_update_preset failed: {err}")),
    }
}

/// Deletes one preset; unknown IDs are a no-op.
pub fn tax_delete_preset(preset_id: String) -> TaxActionResponse {
    let id = match parse_id(&preset_id) {
        Ok(id) => id,
        Err(err) => return TaxActionResponse::failure(format!("tax_delete_preset failed: {err}")),
    };
    match with_tax_engine(|engine| engine.delete_preset(id)) {
        Ok(true) => TaxActionResponse::success("Preset deleted.", Some(preset_id)),
        Ok(false) => TaxActionResponse::success("Preset not found.", None),
        Err(err) => TaxActionResponse::failure(format!("tax_delete_preset failed: {err}")),
    }
}

/// Makes one preset the single default.
pub fn tax_set_default_preset(preset_id: String) -> TaxActionResponse {
    let id = match parse_id(&preset_id) {
        Ok(id) => id,
        Err(err) => {
            return TaxActionResponse::failure(format!("tax_set_default_preset failed: {err}"))
        }
    };
    match with_tax_engine(|engine| engine.set_default_preset(id)) {
        Ok(true) => TaxActionResponse::success("Default preset set.", Some(preset_id)),
        Ok(false) => TaxActionResponse::success("Preset not found.", None),
        Err(err) => TaxActionResponse::failure(format!("tax_set_default_preset failed: {err}")),
    }
}

/// Document record projected for Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentItem {
    pub id: String,
    /// `factura|presupuesto`.
    pub kind: String,
    pub document_number: String,
    pub pdf_file_name: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentListResponse {
    pub ok: bool,
    pub items: Vec<DocumentItem>,
    pub message: String,
}

/// Generic action response envelope for document flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentActionResponse {
    pub ok: bool,
    pub document_id: Option<String>,
    pub message: String,
}

impl DocumentActionResponse {
    fn success(message: impl Into<String>, document_id: Option<String>) -> Self {
        Self {
            ok: true,
            document_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            document_id: None,
            message: message.into(),
        }
    }
}

/// Open-flow envelope.
///
/// `status` is one of `ready|orphaned|not_found|error`. On `orphaned` the UI
/// offers keep vs purge and reports the choice via `document_resolve_orphan`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentOpenResponse {
    pub status: String,
    pub path: Option<String>,
    pub message: String,
}

/// Share handoff for the Dart share sheet.
///
/// `error_code` is one of `file_not_found|sharing_unavailable|not_found|error`
/// when `ok` is false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareHandoffResponse {
    pub ok: bool,
    pub path: Option<String>,
    pub mime_type: String,
    pub title: Option<String>,
    pub error_code: Option<String>,
    pub message: String,
}

/// Stores a freshly rendered PDF and registers its metadata.
///
/// Input semantics:
/// - `kind`: `factura|presupuesto`.
/// - `document_number`: also used as artifact file stem; must be file-safe.
/// - `temp_pdf_path`: rendered PDF to copy into private storage.
pub fn document_record_generated(
    kind: String,
    document_number: String,
    temp_pdf_path: String,
) -> DocumentActionResponse {
    let Some(kind) = DocumentKind::parse(&kind) else {
        return DocumentActionResponse::failure(format!(
            "document_record_generated failed: unknown document kind `{kind}`"
        ));
    };
    match with_document_service(|service| {
        service.record_generated(kind, document_number.trim(), Path::new(&temp_pdf_path))
    }) {
        Ok(metadata) => {
            DocumentActionResponse::success("Document saved.", Some(metadata.id.to_string()))
        }
        Err(err) => {
            DocumentActionResponse::failure(format!("document_record_generated failed: {err}"))
        }
    }
}

/// Lists documents in creation order, optionally by kind.
pub fn document_list(kind: Option<String>) -> DocumentListResponse {
    let filter = match kind.as_deref().map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => match DocumentKind::parse(value) {
            Some(kind) => Some(kind),
            None => {
                return DocumentListResponse {
                    ok: false,
                    items: Vec::new(),
                    message: format!("document_list failed: unknown document kind `{value}`"),
                }
            }
        },
        None => None,
    };

    match with_document_service(|service| service.list(filter)) {
        Ok(documents) => DocumentListResponse {
            ok: true,
            message: format!("Found {} document(s).", documents.len()),
            items: documents.iter().map(to_document_item).collect(),
        },
        Err(err) => DocumentListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("document_list failed: {err}"),
        },
    }
}

/// Suggests the next document number for `kind` in `country_code`.
pub fn document_next_number(kind: String, country_code: String) -> DocumentActionResponse {
    let Some(kind) = DocumentKind::parse(&kind) else {
        return DocumentActionResponse::failure(format!(
            "document_next_number failed: unknown document kind `{kind}`"
        ));
    };
    let prefix = CountryDefaultsResolver::get(&country_code).prefix_for(kind);
    match with_document_service(|service| service.next_number(kind, prefix)) {
        Ok(number) => DocumentActionResponse::success(number, None),
        Err(err) => DocumentActionResponse::failure(format!("document_next_number failed: {err}")),
    }
}

/// Open flow with just-in-time artifact check.
pub fn document_open(document_id: String) -> DocumentOpenResponse {
    let id = match parse_id(&document_id) {
        Ok(id) => id,
        Err(err) => return open_response("error", None, err),
    };
    match with_document_service(|service| service.open(id)) {
        Ok(OpenOutcome::Ready { path, .. }) => {
            open_response("ready", Some(path), "Document ready.".to_string())
        }
        Ok(OpenOutcome::Orphaned { .. }) => open_response(
            "orphaned",
            None,
            "Document file is missing.".to_string(),
        ),
        Err(ServiceCallError::Document(DocumentServiceError::DocumentNotFound(_))) => {
            open_response("not_found", None, "Document not found.".to_string())
        }
        Err(err) => open_response("error", None, format!("document_open failed: {err}")),
    }
}

/// Applies the keep/purge choice for an orphaned document.
pub fn document_resolve_orphan(document_id: String, purge: bool) -> DocumentActionResponse {
    let id = match parse_id(&document_id) {
        Ok(id) => id,
        Err(err) => {
            return DocumentActionResponse::failure(format!("document_resolve_orphan failed: {err}"))
        }
    };
    let resolution = if purge {
        OrphanResolution::Purge
    } else {
        OrphanResolution::Keep
    };
    match with_document_service(|service| service.resolve_orphan(id, resolution)) {
        Ok(true) => DocumentActionResponse::success("Document removed.", Some(document_id)),
        Ok(false) => DocumentActionResponse::success("Document kept.", None),
        Err(err) => {
            DocumentActionResponse::failure(format!("document_resolve_orphan failed: {err}"))
        }
    }
}

/// Deletes artifact (best-effort) and metadata (always).
pub fn document_delete(document_id: String) -> DocumentActionResponse {
    let id = match parse_id(&document_id) {
        Ok(id) => id,
        Err(err) => return DocumentActionResponse::failure(format!("document_delete failed: {err}")),
    };
    match with_document_service(|service| service.delete(id)) {
        Ok(true) => DocumentActionResponse::success("Document deleted.", Some(document_id)),
        Ok(false) => DocumentActionResponse::success("Document not found.", None),
        Err(err) => DocumentActionResponse::failure(format!("document_delete failed: {err}")),
    }
}

/// Validates the artifact just in time and returns the share-sheet request.
///
/// The Dart side presents the platform sheet with the returned path and MIME.
pub fn document_prepare_share(document_id: String, title: Option<String>) -> ShareHandoffResponse {
    let id = match parse_id(&document_id) {
        Ok(id) => id,
        Err(err) => return share_failure("error", err),
    };
    let handoff = HandoffShareTarget::default();
    let shared = with_document_service(|service| service.share(id, &handoff, title.as_deref()));

    match (shared, handoff.take()) {
        (Ok(()), Some(request)) => ShareHandoffResponse {
            ok: true,
            path: Some(request.path.display().to_string()),
            mime_type: request.mime_type.to_string(),
            title: request.title,
            error_code: None,
            message: "Ready to share.".to_string(),
        },
        (Ok(()), None) => share_failure("error", "share request was not produced".to_string()),
        (Err(ServiceCallError::Document(DocumentServiceError::DocumentNotFound(_))), _) => {
            share_failure("not_found", "Document not found.".to_string())
        }
        (Err(ServiceCallError::Document(DocumentServiceError::Storage(err))), _) => {
            let code = match err {
                StorageError::FileNotFound(_) => "file_not_found",
                StorageError::SharingUnavailable => "sharing_unavailable",
                _ => "error",
            };
            share_failure(code, format!("document_prepare_share failed: {err}"))
        }
        (Err(err), _) => share_failure("error", format!("document_prepare_share failed: {err}")),
    }
}

/// Lists stored PDF file names, including ones without metadata.
pub fn artifact_list() -> Vec<String> {
    app_store().list()
}

/// Captures the share request so Dart can present the platform sheet.
#[derive(Default)]
struct HandoffShareTarget {
    captured: RefCell<Option<ShareRequest>>,
}

impl HandoffShareTarget {
    fn take(&self) -> Option<ShareRequest> {
        self.captured.borrow_mut().take()
    }
}

impl ShareTarget for HandoffShareTarget {
    fn is_available(&self) -> bool {
        true
    }

    fn share(&self, request: &ShareRequest) {
        *self.captured.borrow_mut() = Some(request.clone());
    }
}

/// Failure of one FFI call: connection setup or the core operation.
enum ServiceCallError {
    Open(String),
    Document(DocumentServiceError),
    Tax(TaxServiceError),
}

impl std::fmt::Display for ServiceCallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open(message) => write!(f, "{message}"),
            Self::Document(err) => write!(f, "{err}"),
            Self::Tax(err) => write!(f, "{err}"),
        }
    }
}

fn resolve_app_root() -> PathBuf {
    if let Some(root) = APP_ROOT.get() {
        return root.clone();
    }
    if let Ok(raw) = std::env::var(DATA_DIR_ENV) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    std::env::temp_dir().join(APP_DIR_NAME)
}

fn app_store() -> PdfArtifactStore {
    PdfArtifactStore::with_root(resolve_app_root())
}

fn open_app_db() -> Result<Connection, ServiceCallError> {
    let root = resolve_app_root();
    std::fs::create_dir_all(&root).map_err(|err| {
        ServiceCallError::Open(format!("app data dir `{}` unavailable: {err}", root.display()))
    })?;
    open_db(root.join(DB_FILE_NAME))
        .map_err(|err| ServiceCallError::Open(format!("app DB open failed: {err}")))
}

fn with_document_service<T>(
    f: impl FnOnce(
        &DocumentService<SqliteDocumentRegistry<'_>>,
    ) -> Result<T, DocumentServiceError>,
) -> Result<T, ServiceCallError> {
    let conn = open_app_db()?;
    let service = DocumentService::new(SqliteDocumentRegistry::new(&conn), app_store());
    f(&service).map_err(ServiceCallError::Document)
}

fn with_tax_engine<T>(
    f: impl FnOnce(&mut TaxConfigEngine<SqliteConfigStore<'_>>) -> Result<T, TaxServiceError>,
) -> Result<T, ServiceCallError> {
    let conn = open_app_db()?;
    let mut engine = TaxConfigEngine::load(SqliteConfigStore::new(&conn), CountryDefaultsResolver)
        .map_err(ServiceCallError::Tax)?;
    f(&mut engine).map_err(ServiceCallError::Tax)
}

fn parse_id(value: &str) -> Result<Uuid, String> {
    Uuid::parse_str(value.trim()).map_err(|_| format!("invalid id `{value}`"))
}

fn open_response(status: &str, path: Option<PathBuf>, message: String) -> DocumentOpenResponse {
    DocumentOpenResponse {
        status: status.to_string(),
        path: path.map(|value| value.display().to_string()),
        message,
    }
}

fn share_failure(error_code: &str, message: String) -> ShareHandoffResponse {
    ShareHandoffResponse {
        ok: false,
        path: None,
        mime_type: String::new(),
        title: None,
        error_code: Some(error_code.to_string()),
        message,
    }
}

fn to_tax_preset_item(preset: &TaxPreset) -> TaxPresetItem {
    TaxPresetItem {
        id: preset.id.to_string(),
        name: preset.name.clone(),
        rate: preset.rate,
        is_default: preset.is_default,
        created_at: preset.created_at,
    }
}

fn to_document_item(metadata: &DocumentMetadata) -> DocumentItem {
    DocumentItem {
        id: metadata.id.to_string(),
        kind: metadata.kind.as_str().to_string(),
        document_number: metadata.document_number.clone(),
        pdf_file_name: metadata.pdf_file_name.clone(),
        created_at: metadata.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, countries_supported, country_defaults, document_delete, document_list,
        document_next_number, document_open, document_prepare_share, document_record_generated,
        document_resolve_orphan, init_app, init_logging, ping, resolve_app_root,
        tax_add_preset, tax_config_get, tax_initialize_from_country, tax_set_default_preset,
    };
    use std::path::PathBuf;
    use std::sync::OnceLock;
    use std::time::{SystemTime, UNIX_EPOCH};

    static TEST_ROOT: OnceLock<PathBuf> = OnceLock::new();

    fn test_root() -> PathBuf {
        TEST_ROOT
            .get_or_init(|| {
                let root = std::env::temp_dir().join(format!(
                    "facturo-ffi-{}-{}",
                    std::process::id(),
                    unique_suffix()
                ));
                let error = init_app(root.display().to_string());
                assert!(error.is_empty(), "{error}");
                // Run migrations once before parallel tests open the file.
                super::open_app_db().ok().expect("app db should open");
                root
            })
            .clone()
    }

    fn unique_suffix() -> u128 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos()
    }

    fn rendered_pdf(root: &std::path::Path, stem: &str) -> String {
        let path = root.join(format!("{stem}.render.tmp"));
        std::fs::write(&path, b"%PDF-1.7").expect("write temp pdf");
        path.display().to_string()
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_app_rejects_relative_and_conflicting_dirs() {
        let root = test_root();
        assert!(!init_app("relative/dir".to_string()).is_empty());
        assert!(init_app(root.display().to_string()).is_empty());
        assert!(!init_app("/somewhere/else".to_string()).is_empty());
        assert_eq!(resolve_app_root(), root);
    }

    #[test]
    fn country_defaults_marks_fallback_with_empty_code() {
        let spain = country_defaults("es".to_string());
        assert_eq!(spain.code, "ES");
        assert_eq!(spain.tax_name, "IVA");

        let unknown = country_defaults("zz".to_string());
        assert!(unknown.code.is_empty());
        assert_eq!(unknown.currency, "USD");

        assert!(countries_supported().iter().any(|item| item.code == "US"));
    }

    #[test]
    fn tax_flow_initializes_and_switches_default() {
        test_root();
        let config = tax_initialize_from_country("ES".to_string());
        assert!(config.ok, "{}", config.message);
        assert!(config.reverse_charge_enabled);

        let added = tax_add_preset("Recargo".to_string(), 5.2, false);
        assert!(added.ok, "{}", added.message);
        let preset_id = added.preset_id.expect("added preset id");

        let switched = tax_set_default_preset(preset_id.clone());
        assert!(switched.ok, "{}", switched.message);

        let loaded = tax_config_get();
        assert_eq!(
            loaded.presets.len(),
            country_defaults("ES".to_string()).presets.len() + 1
        );
        let defaults = loaded
            .presets
            .iter()
            .filter(|preset| preset.is_default)
            .collect::<Vec<_>>();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].id, preset_id);
    }

    #[test]
    fn document_flow_covers_record_share_orphan_and_delete() {
        let root = test_root();
        let number = format!("FAC-T{}", unique_suffix());

        let recorded = document_record_generated(
            "factura".to_string(),
            number.clone(),
            rendered_pdf(&root, &number),
        );
        assert!(recorded.ok, "{}", recorded.message);
        let id = recorded.document_id.expect("recorded document id");

        let listed = document_list(Some("factura".to_string()));
        assert!(listed.items.iter().any(|item| item.id == id));

        let opened = document_open(id.clone());
        assert_eq!(opened.status, "ready");
        let path = opened.path.expect("ready path");

        let share = document_prepare_share(id.clone(), Some("Invoice".to_string()));
        assert!(share.ok, "{}", share.message);
        assert_eq!(share.mime_type, "application/pdf");
        assert_eq!(share.path.as_deref(), Some(path.as_str()));

        std::fs::remove_file(&path).expect("remove artifact externally");
        assert_eq!(document_open(id.clone()).status, "orphaned");
        let share = document_prepare_share(id.clone(), None);
        assert_eq!(share.error_code.as_deref(), Some("file_not_found"));

        let kept = document_resolve_orphan(id.clone(), false);
        assert!(kept.ok && kept.document_id.is_none());
        let purged = document_resolve_orphan(id.clone(), true);
        assert_eq!(purged.document_id.as_deref(), Some(id.as_str()));
        assert_eq!(document_open(id.clone()).status, "not_found");

        let deleted = document_delete(id);
        assert!(deleted.ok && deleted.document_id.is_none());
    }

    #[test]
    fn document_calls_reject_bad_input() {
        test_root();
        assert!(!document_record_generated(
            "albaran".to_string(),
            "X".to_string(),
            "/tmp/x".to_string()
        )
        .ok);
        assert!(!document_list(Some("albaran".to_string())).ok);
        assert_eq!(document_open("not-a-uuid".to_string()).status, "error");
        assert!(!document_next_number("albaran".to_string(), "ES".to_string()).ok);
    }
}
