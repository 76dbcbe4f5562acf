//! Load the target country's governorates from a source document.

use std::io::Read;

use thiserror::Error;

use crate::hierarchy::{Governorate, SourceHierarchy};

/// Locale consulted when none is configured.
pub const DEFAULT_LOCALE: &str = "fr";
/// Country consulted when none is configured.
pub const DEFAULT_COUNTRY: &str = "Tunisie";

/// Identifies the country node to ingest within a source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountrySelector {
    /// Top-level locale key, e.g. `fr`.
    pub locale: String,
    /// Country name under that locale, e.g. `Tunisie`.
    pub country: String,
}

impl CountrySelector {
    /// Select `country` under `locale`.
    #[must_use]
    pub fn new(locale: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            country: country.into(),
        }
    }
}

impl Default for CountrySelector {
    fn default() -> Self {
        Self::new(DEFAULT_LOCALE, DEFAULT_COUNTRY)
    }
}

/// Errors raised while loading the source hierarchy.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The document could not be read or is not valid hierarchy JSON.
    #[error("failed to parse source hierarchy: {source}")]
    Parse {
        /// Underlying decoder error.
        #[source]
        source: serde_json::Error,
    },
    /// The requested locale is absent from the document.
    #[error("locale {locale:?} not present in source hierarchy")]
    MissingLocale {
        /// Requested locale key.
        locale: String,
    },
    /// The requested country is absent under an existing locale.
    #[error("country {country:?} not present under locale {locale:?}")]
    MissingCountry {
        /// Requested locale key.
        locale: String,
        /// Requested country name.
        country: String,
    },
}

/// Read a source document and return the selected country's governorates.
///
/// Governorate fields are taken as written; empty nodes are left for the
/// flattener to skip.
///
/// # Errors
///
/// Returns [`LoadError::Parse`] when the document cannot be read or decoded,
/// and [`LoadError::MissingLocale`] or [`LoadError::MissingCountry`] when the
/// selected node is absent.
///
/// # Examples
/// ```
/// use locality_core::{CountrySelector, load_governorates};
///
/// let json = br#"{"fr": {"Tunisie": {"governorates": [
///     {"nom": "Tunis", "code": "11", "latitude": 36.8, "longitude": 10.18,
///      "delegations": [{"nom": "La Marsa", "cites": ["Gammarth"]}]}
/// ]}}}"#;
/// let governorates = load_governorates(&json[..], &CountrySelector::default())?;
/// assert_eq!(governorates.len(), 1);
/// assert_eq!(governorates[0].delegations[0].cities, vec!["Gammarth".to_string()]);
/// # Ok::<(), locality_core::LoadError>(())
/// ```
pub fn load_governorates<R: Read>(
    reader: R,
    selector: &CountrySelector,
) -> Result<Vec<Governorate>, LoadError> {
    let hierarchy: SourceHierarchy =
        serde_json::from_reader(reader).map_err(|source| LoadError::Parse { source })?;
    select_country(hierarchy, selector)
}

/// Parse an in-memory source document.
///
/// # Errors
///
/// Fails under the same conditions as [`load_governorates`].
pub fn load_governorates_from_str(
    document: &str,
    selector: &CountrySelector,
) -> Result<Vec<Governorate>, LoadError> {
    let hierarchy: SourceHierarchy =
        serde_json::from_str(document).map_err(|source| LoadError::Parse { source })?;
    select_country(hierarchy, selector)
}

fn select_country(
    hierarchy: SourceHierarchy,
    selector: &CountrySelector,
) -> Result<Vec<Governorate>, LoadError> {
    if !hierarchy.has_locale(&selector.locale) {
        return Err(LoadError::MissingLocale {
            locale: selector.locale.clone(),
        });
    }
    let country = hierarchy
        .into_country(&selector.locale, &selector.country)
        .ok_or_else(|| LoadError::MissingCountry {
            locale: selector.locale.clone(),
            country: selector.country.clone(),
        })?;
    Ok(country.governorates)
}
