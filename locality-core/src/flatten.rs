//! Depth-first flattening of governorates into location records.
//!
//! Traversal order is fixed: governorates, then their delegations, then their
//! cities, each in source order. Empty delegation or city lists yield nothing
//! and are reported through [`Flattener::anomalies`] rather than as errors.

use std::fmt;
use std::iter::FusedIterator;
use std::slice;

use crate::hierarchy::{Delegation, Governorate};
use crate::record::LocationRecord;

/// A structurally empty node skipped during traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraversalAnomaly {
    /// A governorate without delegations.
    EmptyGovernorate {
        /// Governorate name.
        governorate: String,
    },
    /// A delegation without cities.
    EmptyDelegation {
        /// Owning governorate name.
        governorate: String,
        /// Delegation name.
        delegation: String,
    },
}

impl fmt::Display for TraversalAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGovernorate { governorate } => {
                write!(f, "governorate {governorate:?} has no delegations")
            }
            Self::EmptyDelegation {
                governorate,
                delegation,
            } => write!(
                f,
                "delegation {delegation:?} in governorate {governorate:?} has no cities"
            ),
        }
    }
}

/// Pure traversal over a borrowed governorate list.
///
/// The flattener performs no I/O; [`Flattener::records`] can be called any
/// number of times and always yields the same sequence.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use locality_core::{Delegation, Flattener, Governorate};
///
/// let governorates = vec![
///     Governorate::new("Tunis", "11", Coord { x: 10.18, y: 36.8 })
///         .with_delegation(Delegation::new("A", ["X", "Y"]))
///         .with_delegation(Delegation::new("B", Vec::<String>::new())),
/// ];
/// let flattener = Flattener::new(&governorates, "Tunisie");
/// let names: Vec<_> = flattener.records().map(|record| record.name).collect();
/// assert_eq!(names, ["X", "Y"]);
/// assert_eq!(flattener.record_count(), 2);
/// assert_eq!(flattener.anomalies().len(), 1);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Flattener<'a> {
    governorates: &'a [Governorate],
    country: &'a str,
}

impl<'a> Flattener<'a> {
    /// Prepare a traversal of `governorates` belonging to `country`.
    #[must_use]
    pub const fn new(governorates: &'a [Governorate], country: &'a str) -> Self {
        Self {
            governorates,
            country,
        }
    }

    /// Start a fresh traversal.
    #[must_use]
    pub fn records(&self) -> Records<'a> {
        Records {
            country: self.country,
            governorates: self.governorates.iter(),
            governorate: None,
            delegations: slice::Iter::default(),
            delegation: None,
            cities: slice::Iter::default(),
        }
    }

    /// Number of records a traversal yields: the total of all city lists.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.governorates
            .iter()
            .flat_map(|governorate| &governorate.delegations)
            .map(|delegation| delegation.cities.len())
            .sum()
    }

    /// Empty nodes encountered by the traversal, in traversal order.
    #[must_use]
    pub fn anomalies(&self) -> Vec<TraversalAnomaly> {
        let mut anomalies = Vec::new();
        for governorate in self.governorates {
            if governorate.delegations.is_empty() {
                anomalies.push(TraversalAnomaly::EmptyGovernorate {
                    governorate: governorate.name.clone(),
                });
            }
            anomalies.extend(
                governorate
                    .delegations
                    .iter()
                    .filter(|delegation| delegation.cities.is_empty())
                    .map(|delegation| TraversalAnomaly::EmptyDelegation {
                        governorate: governorate.name.clone(),
                        delegation: delegation.name.clone(),
                    }),
            );
        }
        anomalies
    }
}

/// Iterator over the flattened records of a [`Flattener`].
///
/// Cloning the iterator snapshots its position.
#[derive(Debug, Clone)]
pub struct Records<'a> {
    country: &'a str,
    governorates: slice::Iter<'a, Governorate>,
    governorate: Option<&'a Governorate>,
    delegations: slice::Iter<'a, Delegation>,
    delegation: Option<&'a Delegation>,
    cities: slice::Iter<'a, String>,
}

impl Iterator for Records<'_> {
    type Item = LocationRecord;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let (Some(governorate), Some(delegation)) = (self.governorate, self.delegation)
                && let Some(city) = self.cities.next()
            {
                return Some(LocationRecord::new(
                    self.country,
                    governorate,
                    delegation,
                    city,
                ));
            }
            if self.governorate.is_some()
                && let Some(delegation) = self.delegations.next()
            {
                self.delegation = Some(delegation);
                self.cities = delegation.cities.iter();
                continue;
            }
            let governorate = self.governorates.next()?;
            self.governorate = Some(governorate);
            self.delegations = governorate.delegations.iter();
            self.delegation = None;
            self.cities = slice::Iter::default();
        }
    }
}

impl FusedIterator for Records<'_> {}
