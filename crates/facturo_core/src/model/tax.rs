//! Tax configuration model.
//!
//! # Responsibility
//! - Define named tax-rate presets and the process-wide tax configuration.
//! - Provide the partial-update shape used by preset edits.
//!
//! # Invariants
//! - `TaxPreset::id` and `TaxPreset::created_at` never change after creation.
//! - At most one preset per config should carry `is_default = true`; only
//!   `TaxConfigEngine::set_default_preset` enforces it.
//! - `rate` is a percentage in `0..=100`, validated by callers.

use crate::time::now_epoch_ms;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for one tax preset.
pub type TaxPresetId = Uuid;

/// Generic reverse-charge label used where no localized label exists.
pub const GENERIC_REVERSE_CHARGE_LABEL: &str = "Reverse Charge";

/// Named, reusable tax rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxPreset {
    pub id: TaxPresetId,
    pub name: String,
    /// Percentage in `0..=100`.
    pub rate: f64,
    pub is_default: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl TaxPreset {
    /// Creates a preset with a fresh ID and creation timestamp.
    pub fn new(name: impl Into<String>, rate: f64, is_default: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            rate,
            is_default,
            created_at: now_epoch_ms(),
        }
    }

    /// Merges set fields of `patch` into this preset.
    ///
    /// `id` and `created_at` are not part of the patch shape and stay intact.
    pub fn apply(&mut self, patch: &TaxPresetPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(rate) = patch.rate {
            self.rate = rate;
        }
        if let Some(is_default) = patch.is_default {
            self.is_default = is_default;
        }
    }
}

/// Partial preset update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaxPresetPatch {
    pub name: Option<String>,
    pub rate: Option<f64>,
    pub is_default: Option<bool>,
}

/// Process-wide tax configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxConfig {
    /// Display label, e.g. `IVA` or `Sales Tax`.
    pub tax_name: String,
    pub presets: Vec<TaxPreset>,
    /// Reserved for per-line-item taxation; not interpreted by core.
    #[serde(default)]
    pub allow_per_line_item_tax: bool,
    #[serde(default)]
    pub reverse_charge_enabled: bool,
    #[serde(default = "default_reverse_charge_label")]
    pub reverse_charge_label: String,
}

impl Default for TaxConfig {
    fn default() -> Self {
        Self {
            tax_name: "Tax".to_string(),
            presets: Vec::new(),
            allow_per_line_item_tax: false,
            reverse_charge_enabled: false,
            reverse_charge_label: default_reverse_charge_label(),
        }
    }
}

impl TaxConfig {
    /// Returns how many presets are currently flagged as default.
    pub fn default_count(&self) -> usize {
        self.presets.iter().filter(|preset| preset.is_default).count()
    }
}

fn default_reverse_charge_label() -> String {
    GENERIC_REVERSE_CHARGE_LABEL.to_string()
}

#[cfg(test)]
mod tests {
    use super::{TaxConfig, TaxPreset, TaxPresetPatch};

    #[test]
    fn apply_patch_keeps_identity_fields() {
        let mut preset = TaxPreset::new("IVA General", 21.0, false);
        let id = preset.id;
        let created_at = preset.created_at;

        preset.apply(&TaxPresetPatch {
            name: Some("IVA Reducido".to_string()),
            rate: Some(10.0),
            is_default: None,
        });

        assert_eq!(preset.id, id);
        assert_eq!(preset.created_at, created_at);
        assert_eq!(preset.name, "IVA Reducido");
        assert_eq!(preset.rate, 10.0);
        assert!(!preset.is_default);
    }

    #[test]
    fn default_config_has_generic_labels() {
        let config = TaxConfig::default();
        assert_eq!(config.tax_name, "Tax");
        assert_eq!(config.reverse_charge_label, "Reverse Charge");
        assert!(config.presets.is_empty());
        assert_eq!(config.default_count(), 0);
    }
}
