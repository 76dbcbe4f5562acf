//! Flat location records produced from the source hierarchy.

use std::time::SystemTime;

use geo::Coord;

use crate::hierarchy::{Delegation, Governorate};

/// ISO 3166 code stamped on every record; the dataset covers one country.
pub const COUNTRY_CODE: &str = "TN";

/// Derive the case-insensitive search key for a locality name.
///
/// Uses Unicode default case mapping, independent of the host locale.
/// Accented characters are lowered but otherwise kept.
///
/// # Examples
/// ```
/// use locality_core::normalise_key;
///
/// assert_eq!(normalise_key("Sidi Bou Saïd"), "sidi bou saïd");
/// assert_eq!(normalise_key("ÉCOLE"), "école");
/// ```
#[must_use]
pub fn normalise_key(name: &str) -> String {
    name.to_lowercase()
}

/// One leaf city with its administrative context.
///
/// Coordinates are the owning governorate's centroid (`x = longitude`,
/// `y = latitude`), shared by every city beneath it.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRecord {
    /// City name as it appears in the source.
    pub name: String,
    /// Lowercased search key derived from `name`.
    pub name_lower: String,
    /// Owning governorate name.
    pub governorate: String,
    /// Owning governorate code.
    pub governorate_code: String,
    /// Owning delegation name.
    pub delegation: String,
    /// Country name taken from the source selector.
    pub country: String,
    /// Always [`COUNTRY_CODE`].
    pub country_code: &'static str,
    /// Governorate centroid.
    pub location: Coord<f64>,
    /// Assigned by the destination store at commit time; unset otherwise.
    pub created_at: Option<SystemTime>,
}

impl LocationRecord {
    /// Build the record for `city` beneath `delegation` and `governorate`.
    ///
    /// # Examples
    /// ```
    /// use geo::Coord;
    /// use locality_core::{Delegation, Governorate, LocationRecord};
    ///
    /// let governorate = Governorate::new("Tunis", "11", Coord { x: 10.18, y: 36.8 });
    /// let delegation = Delegation::new("La Marsa", ["Gammarth"]);
    /// let record = LocationRecord::new("Tunisie", &governorate, &delegation, "Gammarth");
    /// assert_eq!(record.name_lower, "gammarth");
    /// assert_eq!(record.country_code, "TN");
    /// assert!(record.created_at.is_none());
    /// ```
    #[must_use]
    pub fn new(
        country: &str,
        governorate: &Governorate,
        delegation: &Delegation,
        city: &str,
    ) -> Self {
        Self {
            name: city.to_owned(),
            name_lower: normalise_key(city),
            governorate: governorate.name.clone(),
            governorate_code: governorate.code.clone(),
            delegation: delegation.name.clone(),
            country: country.to_owned(),
            country_code: COUNTRY_CODE,
            location: governorate.centroid(),
            created_at: None,
        }
    }

    /// Latitude in decimal degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.location.y
    }

    /// Longitude in decimal degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.location.x
    }

    /// Return the record stamped with a store-assigned creation time.
    #[must_use]
    pub fn with_created_at(mut self, created_at: SystemTime) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Tunis", "tunis")]
    #[case("EL MENZAH", "el menzah")]
    #[case("Ksar Hellal", "ksar hellal")]
    #[case("Sidi Bou Saïd", "sidi bou saïd")]
    #[case("Île de Djerba", "île de djerba")]
    #[case("", "")]
    fn normalises_to_lowercase(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(normalise_key(name), expected);
    }

    #[rstest]
    fn record_copies_governorate_context() {
        let governorate = Governorate::new("Nabeul", "21", Coord { x: 10.73, y: 36.45 });
        let delegation = Delegation::new("Hammamet", ["Yasmine Hammamet"]);
        let record = LocationRecord::new("Tunisie", &governorate, &delegation, "Yasmine Hammamet");

        assert_eq!(record.governorate, "Nabeul");
        assert_eq!(record.governorate_code, "21");
        assert_eq!(record.delegation, "Hammamet");
        assert_eq!(record.country, "Tunisie");
        assert_eq!(record.latitude(), 36.45);
        assert_eq!(record.longitude(), 10.73);
    }

    #[rstest]
    fn created_at_is_only_set_explicitly() {
        let governorate = Governorate::new("Sousse", "51", Coord { x: 10.63, y: 35.82 });
        let delegation = Delegation::new("Sousse Ville", ["Sousse"]);
        let record = LocationRecord::new("Tunisie", &governorate, &delegation, "Sousse");
        assert!(record.created_at.is_none());

        let stamped = record.with_created_at(SystemTime::UNIX_EPOCH);
        assert_eq!(stamped.created_at, Some(SystemTime::UNIX_EPOCH));
    }
}
