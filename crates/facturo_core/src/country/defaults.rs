//! Static per-country defaults and reverse-charge policy.
//!
//! # Responsibility
//! - Map ISO-3166 alpha-2 codes to tax labels, presets, currency, locale and
//!   document numbering prefixes.
//! - Decide reverse-charge availability and label per jurisdiction.
//!
//! # Invariants
//! - Lookups are case-insensitive and never fail; unknown or empty codes
//!   resolve to the generic fallback record.
//! - Every code returned by `list_supported()` exists in the lookup table.
//! - Table contents are immutable for the process lifetime.

use crate::model::document::DocumentKind;
use crate::model::tax::GENERIC_REVERSE_CHARGE_LABEL;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Preset seed used when initializing tax configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetTemplate {
    pub name: &'static str,
    pub rate: f64,
}

/// Static defaults bundle for one jurisdiction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountryDefaults {
    pub tax_id_label: &'static str,
    pub tax_name: &'static str,
    pub default_tax_rate: f64,
    /// ISO-4217 code.
    pub currency: &'static str,
    /// BCP-47 tag.
    pub locale: &'static str,
    /// Ordered; index 0 becomes the default preset on initialization.
    pub tax_presets: &'static [PresetTemplate],
    pub invoice_prefix: &'static str,
    pub quote_prefix: &'static str,
}

impl CountryDefaults {
    /// Returns the numbering prefix used for `kind`.
    pub fn prefix_for(&self, kind: DocumentKind) -> &'static str {
        match kind {
            DocumentKind::Factura => self.invoice_prefix,
            DocumentKind::Presupuesto => self.quote_prefix,
        }
    }
}

/// Entry of the supported-country enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupportedCountry {
    pub code: &'static str,
    pub name: &'static str,
}

/// Reverse-charge treatment for one jurisdiction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReverseChargePolicy {
    pub enabled: bool,
    pub label: &'static str,
}

/// Source of country defaults injected into the tax engine.
///
/// Keeps the engine independent of the concrete table.
pub trait CountryDefaultsSource {
    fn defaults_for(&self, code: &str) -> CountryDefaults;
    fn reverse_charge_for(&self, code: &str) -> ReverseChargePolicy;
}

/// Stateless resolver over the built-in country table.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountryDefaultsResolver;

impl CountryDefaultsResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolves defaults for `code`, falling back to the generic record.
    pub fn get(code: &str) -> CountryDefaults {
        let normalized = normalize_code(code);
        COUNTRY_TABLE
            .get(normalized.as_str())
            .copied()
            .unwrap_or(FALLBACK_DEFAULTS)
    }

    /// Returns the fixed supported-country enumeration.
    pub fn list_supported() -> &'static [SupportedCountry] {
        SUPPORTED_COUNTRIES
    }

    /// Returns whether `code` has a dedicated table entry.
    pub fn is_supported(code: &str) -> bool {
        COUNTRY_TABLE.contains_key(normalize_code(code).as_str())
    }

    /// Resolves reverse-charge policy for `code`.
    pub fn reverse_charge_policy(code: &str) -> ReverseChargePolicy {
        let normalized = normalize_code(code);
        REVERSE_CHARGE_LABELS
            .iter()
            .find(|(candidate, _)| *candidate == normalized)
            .map(|(_, label)| ReverseChargePolicy {
                enabled: true,
                label: *label,
            })
            .unwrap_or(ReverseChargePolicy {
                enabled: false,
                label: GENERIC_REVERSE_CHARGE_LABEL,
            })
    }
}

impl CountryDefaultsSource for CountryDefaultsResolver {
    fn defaults_for(&self, code: &str) -> CountryDefaults {
        Self::get(code)
    }

    fn reverse_charge_for(&self, code: &str) -> ReverseChargePolicy {
        Self::reverse_charge_policy(code)
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

static COUNTRY_TABLE: Lazy<BTreeMap<&'static str, CountryDefaults>> =
    Lazy::new(|| COUNTRY_ENTRIES.iter().copied().collect());

/// Returned for unknown or empty codes.
pub const FALLBACK_DEFAULTS: CountryDefaults = CountryDefaults {
    tax_id_label: "Tax ID",
    tax_name: "Tax",
    default_tax_rate: 0.0,
    currency: "USD",
    locale: "en-US",
    tax_presets: &[
        PresetTemplate {
            name: "No Tax",
            rate: 0.0,
        },
        PresetTemplate {
            name: "Standard",
            rate: 10.0,
        },
    ],
    invoice_prefix: "INV-",
    quote_prefix: "QUO-",
};

const SUPPORTED_COUNTRIES: &[SupportedCountry] = &[
    SupportedCountry { code: "ES", name: "Spain" },
    SupportedCountry { code: "MX", name: "Mexico" },
    SupportedCountry { code: "AR", name: "Argentina" },
    SupportedCountry { code: "CO", name: "Colombia" },
    SupportedCountry { code: "CL", name: "Chile" },
    SupportedCountry { code: "PE", name: "Peru" },
    SupportedCountry { code: "US", name: "United States" },
    SupportedCountry { code: "CA", name: "Canada" },
    SupportedCountry { code: "GB", name: "United Kingdom" },
    SupportedCountry { code: "DE", name: "Germany" },
    SupportedCountry { code: "FR", name: "France" },
    SupportedCountry { code: "IT", name: "Italy" },
    SupportedCountry { code: "PT", name: "Portugal" },
    SupportedCountry { code: "NL", name: "Netherlands" },
    SupportedCountry { code: "BE", name: "Belgium" },
    SupportedCountry { code: "AT", name: "Austria" },
];

const REVERSE_CHARGE_LABELS: &[(&str, &str)] = &[
    ("ES", "Inversión del Sujeto Pasivo"),
    ("DE", "Steuerschuldnerschaft des Leistungsempfängers"),
    ("AT", "Steuerschuldnerschaft des Leistungsempfängers"),
    ("FR", "Autoliquidation"),
    ("BE", "Autoliquidation"),
    ("IT", "Inversione contabile"),
    ("PT", "Autoliquidação"),
    ("NL", "Btw verlegd"),
];

const fn preset(name: &'static str, rate: f64) -> PresetTemplate {
    PresetTemplate { name, rate }
}

const COUNTRY_ENTRIES: &[(&str, CountryDefaults)] = &[
    (
        "ES",
        CountryDefaults {
            tax_id_label: "NIF/CIF",
            tax_name: "IVA",
            default_tax_rate: 21.0,
            currency: "EUR",
            locale: "es-ES",
            tax_presets: &[
                preset("IVA General", 21.0),
                preset("IVA Reducido", 10.0),
                preset("IVA Superreducido", 4.0),
                preset("Exento", 0.0),
            ],
            invoice_prefix: "FAC-",
            quote_prefix: "PRE-",
        },
    ),
    (
        "MX",
        CountryDefaults {
            tax_id_label: "RFC",
            tax_name: "IVA",
            default_tax_rate: 16.0,
            currency: "MXN",
            locale: "es-MX",
            tax_presets: &[
                preset("IVA General", 16.0),
                preset("IVA Frontera", 8.0),
                preset("Tasa 0%", 0.0),
            ],
            invoice_prefix: "FAC-",
            quote_prefix: "COT-",
        },
    ),
    (
        "AR",
        CountryDefaults {
            tax_id_label: "CUIT",
            tax_name: "IVA",
            default_tax_rate: 21.0,
            currency: "ARS",
            locale: "es-AR",
            tax_presets: &[
                preset("IVA General", 21.0),
                preset("IVA Reducido", 10.5),
                preset("IVA Incrementado", 27.0),
                preset("Exento", 0.0),
            ],
            invoice_prefix: "FAC-",
            quote_prefix: "PRE-",
        },
    ),
    (
        "CO",
        CountryDefaults {
            tax_id_label: "NIT",
            tax_name: "IVA",
            default_tax_rate: 19.0,
            currency: "COP",
            locale: "es-CO",
            tax_presets: &[
                preset("IVA General", 19.0),
                preset("IVA Reducido", 5.0),
                preset("Exento", 0.0),
            ],
            invoice_prefix: "FAC-",
            quote_prefix: "COT-",
        },
    ),
    (
        "CL",
        CountryDefaults {
            tax_id_label: "RUT",
            tax_name: "IVA",
            default_tax_rate: 19.0,
            currency: "CLP",
            locale: "es-CL",
            tax_presets: &[preset("IVA", 19.0), preset("Exento", 0.0)],
            invoice_prefix: "FAC-",
            quote_prefix: "COT-",
        },
    ),
    (
        "PE",
        CountryDefaults {
            tax_id_label: "RUC",
            tax_name: "IGV",
            default_tax_rate: 18.0,
            currency: "PEN",
            locale: "es-PE",
            tax_presets: &[preset("IGV", 18.0), preset("Exonerado", 0.0)],
            invoice_prefix: "FAC-",
            quote_prefix: "COT-",
        },
    ),
    (
        "US",
        CountryDefaults {
            tax_id_label: "EIN",
            tax_name: "Sales Tax",
            default_tax_rate: 0.0,
            currency: "USD",
            locale: "en-US",
            tax_presets: &[preset("No Tax", 0.0), preset("Sales Tax", 7.0)],
            invoice_prefix: "INV-",
            quote_prefix: "EST-",
        },
    ),
    (
        "CA",
        CountryDefaults {
            tax_id_label: "Business Number",
            tax_name: "GST/HST",
            default_tax_rate: 5.0,
            currency: "CAD",
            locale: "en-CA",
            tax_presets: &[
                preset("GST", 5.0),
                preset("HST", 13.0),
                preset("Zero-rated", 0.0),
            ],
            invoice_prefix: "INV-",
            quote_prefix: "QUO-",
        },
    ),
    (
        "GB",
        CountryDefaults {
            tax_id_label: "VAT Number",
            tax_name: "VAT",
            default_tax_rate: 20.0,
            currency: "GBP",
            locale: "en-GB",
            tax_presets: &[
                preset("Standard Rate", 20.0),
                preset("Reduced Rate", 5.0),
                preset("Zero Rate", 0.0),
            ],
            invoice_prefix: "INV-",
            quote_prefix: "QUO-",
        },
    ),
    (
        "DE",
        CountryDefaults {
            tax_id_label: "USt-IdNr.",
            tax_name: "MwSt.",
            default_tax_rate: 19.0,
            currency: "EUR",
            locale: "de-DE",
            tax_presets: &[
                preset("Regelsatz", 19.0),
                preset("Ermäßigt", 7.0),
                preset("Steuerfrei", 0.0),
            ],
            invoice_prefix: "RE-",
            quote_prefix: "AN-",
        },
    ),
    (
        "FR",
        CountryDefaults {
            tax_id_label: "N° TVA",
            tax_name: "TVA",
            default_tax_rate: 20.0,
            currency: "EUR",
            locale: "fr-FR",
            tax_presets: &[
                preset("Taux normal", 20.0),
                preset("Taux intermédiaire", 10.0),
                preset("Taux réduit", 5.5),
                preset("Exonéré", 0.0),
            ],
            invoice_prefix: "FAC-",
            quote_prefix: "DEV-",
        },
    ),
    (
        "IT",
        CountryDefaults {
            tax_id_label: "Partita IVA",
            tax_name: "IVA",
            default_tax_rate: 22.0,
            currency: "EUR",
            locale: "it-IT",
            tax_presets: &[
                preset("Aliquota ordinaria", 22.0),
                preset("Aliquota ridotta", 10.0),
                preset("Aliquota minima", 4.0),
                preset("Esente", 0.0),
            ],
            invoice_prefix: "FT-",
            quote_prefix: "PRV-",
        },
    ),
    (
        "PT",
        CountryDefaults {
            tax_id_label: "NIF",
            tax_name: "IVA",
            default_tax_rate: 23.0,
            currency: "EUR",
            locale: "pt-PT",
            tax_presets: &[
                preset("Taxa normal", 23.0),
                preset("Taxa intermédia", 13.0),
                preset("Taxa reduzida", 6.0),
                preset("Isento", 0.0),
            ],
            invoice_prefix: "FT-",
            quote_prefix: "ORC-",
        },
    ),
    (
        "NL",
        CountryDefaults {
            tax_id_label: "BTW-nummer",
            tax_name: "BTW",
            default_tax_rate: 21.0,
            currency: "EUR",
            locale: "nl-NL",
            tax_presets: &[
                preset("Hoog tarief", 21.0),
                preset("Laag tarief", 9.0),
                preset("Vrijgesteld", 0.0),
            ],
            invoice_prefix: "FAC-",
            quote_prefix: "OFF-",
        },
    ),
    (
        "BE",
        CountryDefaults {
            tax_id_label: "N° TVA",
            tax_name: "TVA",
            default_tax_rate: 21.0,
            currency: "EUR",
            locale: "fr-BE",
            tax_presets: &[
                preset("Taux normal", 21.0),
                preset("Taux intermédiaire", 12.0),
                preset("Taux réduit", 6.0),
                preset("Exonéré", 0.0),
            ],
            invoice_prefix: "FAC-",
            quote_prefix: "DEV-",
        },
    ),
    (
        "AT",
        CountryDefaults {
            tax_id_label: "UID-Nummer",
            tax_name: "USt.",
            default_tax_rate: 20.0,
            currency: "EUR",
            locale: "de-AT",
            tax_presets: &[
                preset("Normalsatz", 20.0),
                preset("Ermäßigt", 10.0),
                preset("Sondersatz", 13.0),
                preset("Steuerfrei", 0.0),
            ],
            invoice_prefix: "RE-",
            quote_prefix: "AN-",
        },
    ),
];

#[cfg(test)]
mod tests {
    use super::{CountryDefaultsResolver, COUNTRY_ENTRIES, REVERSE_CHARGE_LABELS};

    #[test]
    fn every_table_entry_has_presets_and_default_rate_matches_first_preset() {
        for (code, defaults) in COUNTRY_ENTRIES {
            let first = defaults
                .tax_presets
                .first()
                .unwrap_or_else(|| panic!("{code} must define presets"));
            assert_eq!(first.rate, defaults.default_tax_rate, "{code}");
            assert!(
                defaults
                    .tax_presets
                    .iter()
                    .all(|preset| (0.0..=100.0).contains(&preset.rate)),
                "{code} has out-of-range preset rate"
            );
        }
    }

    #[test]
    fn reverse_charge_jurisdictions_are_supported_countries() {
        for (code, _) in REVERSE_CHARGE_LABELS {
            assert!(CountryDefaultsResolver::is_supported(code), "{code}");
        }
    }

    #[test]
    fn is_supported_normalizes_input() {
        assert!(CountryDefaultsResolver::is_supported(" mx "));
        assert!(!CountryDefaultsResolver::is_supported(""));
    }
}
