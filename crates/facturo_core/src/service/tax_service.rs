//! Tax configuration engine.
//!
//! # Responsibility
//! - Own the process-wide `TaxConfig` and its preset list.
//! - Seed configuration from country defaults during onboarding.
//! - Write the configuration back through the injected store after every
//!   state change.
//!
//! # Invariants
//! - `set_default_preset` leaves exactly one default when the id exists.
//! - `add_preset` and `update_preset` do not clear other defaults; callers
//!   own that rule on those paths (a warning is logged when it breaks).
//! - Not-found ids are no-ops; only persistence failures are errors.
//! - The in-memory view reflects the latest call even if the write-back
//!   fails; the error is returned so the caller can retry or inform.

use crate::country::defaults::{CountryDefaultsResolver, CountryDefaultsSource};
use crate::model::tax::{TaxConfig, TaxPreset, TaxPresetId, TaxPresetPatch};
use crate::repo::config_store::{
    load_snapshot, save_snapshot, ConfigStore, ConfigStoreError, TAX_CONFIG_KEY,
};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type TaxServiceResult<T> = Result<T, TaxServiceError>;

/// Tax engine errors. All of them originate from configuration persistence.
#[derive(Debug)]
pub enum TaxServiceError {
    Store(ConfigStoreError),
}

impl Display for TaxServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "tax configuration store failed: {err}"),
        }
    }
}

impl Error for TaxServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
        }
    }
}

impl From<ConfigStoreError> for TaxServiceError {
    fn from(value: ConfigStoreError) -> Self {
        Self::Store(value)
    }
}

/// Service object holding the tax configuration and its persistence port.
///
/// Construct once at process start with `load`.
pub struct TaxConfigEngine<S: ConfigStore, C: CountryDefaultsSource = CountryDefaultsResolver> {
    store: S,
    countries: C,
    config: TaxConfig,
}

impl<S: ConfigStore, C: CountryDefaultsSource> TaxConfigEngine<S, C> {
    /// Loads the persisted configuration, or the default one when none exists.
    pub fn load(store: S, countries: C) -> TaxServiceResult<Self> {
        let config = match load_snapshot::<TaxConfig>(&store, TAX_CONFIG_KEY) {
            Ok(Some(config)) => config,
            Ok(None) => TaxConfig::default(),
            Err(err) => {
                error!(
                    "event=tax_config_load module=tax status=error error={}",
                    err
                );
                return Err(err.into());
            }
        };
        info!(
            "event=tax_config_load module=tax status=ok presets={}",
            config.presets.len()
        );

        Ok(Self {
            store,
            countries,
            config,
        })
    }

    /// Current in-memory configuration.
    pub fn config(&self) -> &TaxConfig {
        &self.config
    }

    /// Appends a new preset with a fresh id and creation timestamp.
    ///
    /// `rate` is not validated here. Passing `is_default = true` does not
    /// clear the flag on other presets.
    pub fn add_preset(
        &mut self,
        name: impl Into<String>,
        rate: f64,
        is_default: bool,
    ) -> TaxServiceResult<TaxPreset> {
        let preset = TaxPreset::new(name, rate, is_default);
        self.config.presets.push(preset.clone());
        self.warn_on_multiple_defaults("tax_preset_add");
        self.persist("tax_preset_add")?;
        Ok(preset)
    }

    /// Merges `patch` into the preset with `id`.
    ///
    /// Returns the updated preset, or `None` when `id` is unknown.
    pub fn update_preset(
        &mut self,
        id: TaxPresetId,
        patch: &TaxPresetPatch,
    ) -> TaxServiceResult<Option<TaxPreset>> {
        let Some(preset) = self.config.presets.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        preset.apply(patch);
        let updated = preset.clone();

        self.warn_on_multiple_defaults("tax_preset_update");
        self.persist("tax_preset_update")?;
        Ok(Some(updated))
    }

    /// Removes the preset with `id`. Default status is not reassigned.
    pub fn delete_preset(&mut self, id: TaxPresetId) -> TaxServiceResult<bool> {
        let before = self.config.presets.len();
        self.config.presets.retain(|preset| preset.id != id);
        if self.config.presets.len() == before {
            return Ok(false);
        }

        self.persist("tax_preset_delete")?;
        Ok(true)
    }

    /// Makes `id` the single default preset.
    ///
    /// Unknown ids leave the configuration untouched and return `false`.
    pub fn set_default_preset(&mut self, id: TaxPresetId) -> TaxServiceResult<bool> {
        if self.get_preset_by_id(id).is_none() {
            return Ok(false);
        }

        for preset in &mut self.config.presets {
            preset.is_default = preset.id == id;
        }
        self.persist("tax_preset_set_default")?;
        Ok(true)
    }

    pub fn get_preset_by_id(&self, id: TaxPresetId) -> Option<&TaxPreset> {
        self.config.presets.iter().find(|preset| preset.id == id)
    }

    /// Returns the first preset flagged as default.
    pub fn get_default_preset(&self) -> Option<&TaxPreset> {
        self.config.presets.iter().find(|preset| preset.is_default)
    }

    /// Updates the display label used for the tax on documents.
    pub fn set_tax_name(&mut self, tax_name: impl Into<String>) -> TaxServiceResult<()> {
        self.config.tax_name = tax_name.into();
        self.persist("tax_name_set")
    }

    /// Toggles reverse-charge mode, optionally replacing its label.
    pub fn set_reverse_charge(
        &mut self,
        enabled: bool,
        label: Option<String>,
    ) -> TaxServiceResult<()> {
        self.config.reverse_charge_enabled = enabled;
        if let Some(label) = label {
            self.config.reverse_charge_label = label;
        }
        self.persist("tax_reverse_charge_set")
    }

    /// Replaces the whole configuration with the defaults for `country_code`.
    ///
    /// One preset per country template (fresh ids and timestamps), index 0
    /// marked default, reverse charge taken from the jurisdiction policy.
    pub fn initialize_from_country_defaults(
        &mut self,
        country_code: &str,
    ) -> TaxServiceResult<&TaxConfig> {
        let defaults = self.countries.defaults_for(country_code);
        let reverse_charge = self.countries.reverse_charge_for(country_code);

        let presets = defaults
            .tax_presets
            .iter()
            .enumerate()
            .map(|(index, template)| TaxPreset::new(template.name, template.rate, index == 0))
            .collect::<Vec<_>>();

        self.config = TaxConfig {
            tax_name: defaults.tax_name.to_string(),
            presets,
            allow_per_line_item_tax: false,
            reverse_charge_enabled: reverse_charge.enabled,
            reverse_charge_label: reverse_charge.label.to_string(),
        };
        info!(
            "event=tax_initialize module=tax status=ok country={} presets={} reverse_charge={}",
            country_code.trim().to_ascii_uppercase(),
            self.config.presets.len(),
            reverse_charge.enabled
        );

        self.persist("tax_initialize")?;
        Ok(&self.config)
    }

    fn warn_on_multiple_defaults(&self, event: &str) {
        let defaults = self.config.default_count();
        if defaults > 1 {
            warn!(
                "event={} module=tax status=warn reason=multiple_defaults count={}",
                event, defaults
            );
        }
    }

    fn persist(&self, event: &str) -> TaxServiceResult<()> {
        save_snapshot(&self.store, TAX_CONFIG_KEY, &self.config).map_err(|err| {
            error!(
                "event={} module=tax status=error error_code=config_persist_failed error={}",
                event, err
            );
            TaxServiceError::from(err)
        })
    }
}
