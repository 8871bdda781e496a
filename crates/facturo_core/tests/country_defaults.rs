use facturo_core::{CountryDefaultsResolver, DocumentKind};
use std::collections::HashSet;

#[test]
fn lookup_is_case_insensitive() {
    assert_eq!(
        CountryDefaultsResolver::get("es"),
        CountryDefaultsResolver::get("ES")
    );
    assert_eq!(
        CountryDefaultsResolver::get(" mx "),
        CountryDefaultsResolver::get("MX")
    );
}

#[test]
fn unknown_and_empty_codes_resolve_to_generic_fallback() {
    for code in ["ZZ", "", "   ", "spain"] {
        let defaults = CountryDefaultsResolver::get(code);
        assert_eq!(defaults.tax_id_label, "Tax ID", "{code:?}");
        assert_eq!(defaults.tax_name, "Tax");
        assert_eq!(defaults.default_tax_rate, 0.0);
        assert_eq!(defaults.currency, "USD");
        assert_eq!(defaults.locale, "en-US");
        assert_eq!(defaults.tax_presets.len(), 2);
        assert_eq!(defaults.invoice_prefix, "INV-");
        assert_eq!(defaults.quote_prefix, "QUO-");
    }
}

#[test]
fn spain_defaults_match_local_conventions() {
    let spain = CountryDefaultsResolver::get("ES");
    assert_eq!(spain.tax_name, "IVA");
    assert_eq!(spain.default_tax_rate, 21.0);
    assert_eq!(spain.currency, "EUR");
    assert_eq!(spain.locale, "es-ES");
    assert_eq!(spain.tax_presets[0].rate, 21.0);
    assert_eq!(spain.prefix_for(DocumentKind::Factura), "FAC-");
    assert_eq!(spain.prefix_for(DocumentKind::Presupuesto), "PRE-");
}

#[test]
fn every_supported_code_exists_in_lookup_table() {
    let supported = CountryDefaultsResolver::list_supported();
    assert!(!supported.is_empty());

    let mut seen = HashSet::new();
    for country in supported {
        assert!(seen.insert(country.code), "duplicate code {}", country.code);
        assert!(
            CountryDefaultsResolver::is_supported(country.code),
            "{} missing from table",
            country.code
        );
        assert!(!country.name.is_empty());
    }
}

#[test]
fn reverse_charge_policy_is_localized_for_selected_jurisdictions() {
    let spain = CountryDefaultsResolver::reverse_charge_policy("es");
    assert!(spain.enabled);
    assert_eq!(spain.label, "Inversión del Sujeto Pasivo");

    let us = CountryDefaultsResolver::reverse_charge_policy("US");
    assert!(!us.enabled);
    assert_eq!(us.label, "Reverse Charge");

    let unknown = CountryDefaultsResolver::reverse_charge_policy("ZZ");
    assert!(!unknown.enabled);
}
