//! Typed model of the static geographic source document.
//!
//! The document nests `locale → country → governorates → delegations →
//! cities`. Field names follow the source (`nom`, `cites`) and are mapped onto
//! English identifiers here. Every parent owns its children outright; the tree
//! is read-only once deserialised.

use std::collections::HashMap;

use geo::Coord;
use serde::{Deserialize, Deserializer};

/// Root of the source document, keyed by locale and then by country name.
///
/// # Examples
/// ```
/// use locality_core::SourceHierarchy;
///
/// let json = r#"{"fr": {"Tunisie": {"governorates": []}}}"#;
/// let hierarchy: SourceHierarchy = serde_json::from_str(json).expect("valid document");
/// assert!(hierarchy.country("fr", "Tunisie").is_some());
/// assert!(hierarchy.country("en", "Tunisie").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(transparent)]
pub struct SourceHierarchy {
    locales: HashMap<String, HashMap<String, Country>>,
}

impl SourceHierarchy {
    /// Return whether the document declares `locale` at all.
    #[must_use]
    pub fn has_locale(&self, locale: &str) -> bool {
        self.locales.contains_key(locale)
    }

    /// Borrow the country node for `locale` and `country`, if present.
    #[must_use]
    pub fn country(&self, locale: &str, country: &str) -> Option<&Country> {
        self.locales.get(locale)?.get(country)
    }

    /// Take ownership of the country node for `locale` and `country`.
    #[must_use]
    pub fn into_country(mut self, locale: &str, country: &str) -> Option<Country> {
        self.locales.get_mut(locale)?.remove(country)
    }
}

/// A single country node.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Country {
    /// First-level administrative regions in source order.
    pub governorates: Vec<Governorate>,
}

/// First-level administrative region.
///
/// Its coordinate pair is reused for every city beneath it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Governorate {
    /// Display name.
    #[serde(rename = "nom")]
    pub name: String,
    /// Administrative code. Numeric codes in the source are kept as written.
    #[serde(deserialize_with = "code_as_string")]
    pub code: String,
    /// WGS84 latitude shared by all descendant records.
    pub latitude: f64,
    /// WGS84 longitude shared by all descendant records.
    pub longitude: f64,
    /// Second-level subdivisions in source order.
    #[serde(default)]
    pub delegations: Vec<Delegation>,
}

impl Governorate {
    /// Construct a governorate without delegations.
    #[must_use]
    pub fn new(name: impl Into<String>, code: impl Into<String>, location: Coord<f64>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            latitude: location.y,
            longitude: location.x,
            delegations: Vec::new(),
        }
    }

    /// Append a delegation, keeping source order.
    #[must_use]
    pub fn with_delegation(mut self, delegation: Delegation) -> Self {
        self.delegations.push(delegation);
        self
    }

    /// Shared coordinate with `x = longitude`, `y = latitude`.
    #[must_use]
    pub const fn centroid(&self) -> Coord<f64> {
        Coord {
            x: self.longitude,
            y: self.latitude,
        }
    }
}

/// Second-level subdivision holding bare city names.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Delegation {
    /// Display name.
    #[serde(rename = "nom")]
    pub name: String,
    /// Leaf locality names in source order.
    #[serde(rename = "cites", default)]
    pub cities: Vec<String>,
}

impl Delegation {
    /// Construct a delegation from a name and its cities.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, cities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            cities: cities.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCode {
    Text(String),
    Number(serde_json::Number),
}

fn code_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawCode::deserialize(deserializer)? {
        RawCode::Text(text) => text,
        RawCode::Number(number) => number.to_string(),
    })
}
