//! Test-only, in-memory collaborators used by unit and behaviour tests.

use std::time::SystemTime;

use geo::Coord;

use crate::batch::MAX_BATCH_OPERATIONS;
use crate::hierarchy::{Delegation, Governorate};
use crate::progress::{ProgressReporter, RunSummary};
use crate::record::LocationRecord;
use crate::store::{BatchWriter, CommitError};

/// Cities placed in each synthetic delegation.
const CITIES_PER_DELEGATION: usize = 40;
/// Delegations placed in each synthetic governorate.
const DELEGATIONS_PER_GOVERNORATE: usize = 6;

/// In-memory `BatchWriter` that appends every committed record.
///
/// Records are stamped with `created_at` on commit, mirroring a store-assigned
/// timestamp. A failure can be injected for a given one-based attempt.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: Vec<LocationRecord>,
    batch_sizes: Vec<usize>,
    attempts: usize,
    fail_at: Option<usize>,
}

impl MemoryDocumentStore {
    /// Create a store whose `attempt`-th commit fails.
    #[must_use]
    pub fn failing_at(attempt: usize) -> Self {
        Self {
            fail_at: Some(attempt),
            ..Self::default()
        }
    }

    /// Every committed record in commit order.
    #[must_use]
    pub fn documents(&self) -> &[LocationRecord] {
        &self.documents
    }

    /// Size of each successful commit.
    #[must_use]
    pub fn batch_sizes(&self) -> &[usize] {
        &self.batch_sizes
    }

    /// Commit calls received, including failed ones.
    #[must_use]
    pub const fn attempts(&self) -> usize {
        self.attempts
    }
}

impl BatchWriter for MemoryDocumentStore {
    fn commit_batch(&mut self, batch: &[LocationRecord]) -> Result<(), CommitError> {
        self.attempts += 1;
        if batch.len() > MAX_BATCH_OPERATIONS {
            return Err(CommitError::BatchTooLarge {
                size: batch.len(),
                limit: MAX_BATCH_OPERATIONS,
            });
        }
        if self.fail_at == Some(self.attempts) {
            return Err(CommitError::Unavailable {
                message: format!("injected failure on attempt {}", self.attempts),
            });
        }
        let now = SystemTime::now();
        self.documents.extend(
            batch
                .iter()
                .cloned()
                .map(|record| record.with_created_at(now)),
        );
        self.batch_sizes.push(batch.len());
        Ok(())
    }
}

/// Event captured by [`RecordingProgress`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A batch was committed.
    BatchCommitted {
        /// One-based batch number.
        batch: usize,
        /// Running total.
        committed: usize,
    },
    /// The run finished with the rendered summary line.
    Finished {
        /// Records handled.
        records: usize,
        /// Rendered summary.
        line: String,
    },
}

/// `ProgressReporter` that records events for later assertions.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    events: Vec<ProgressEvent>,
}

impl RecordingProgress {
    /// Events in emission order.
    #[must_use]
    pub fn events(&self) -> &[ProgressEvent] {
        &self.events
    }
}

impl ProgressReporter for RecordingProgress {
    fn batch_committed(&mut self, batch: usize, committed: usize) {
        self.events
            .push(ProgressEvent::BatchCommitted { batch, committed });
    }

    fn finished(&mut self, summary: &RunSummary<'_>) {
        self.events.push(ProgressEvent::Finished {
            records: summary.records(),
            line: summary.to_string(),
        });
    }
}

/// Build governorates holding exactly `cities` leaf cities.
///
/// Cities are spread over delegations of up to 40 entries, six delegations per
/// governorate. Names are unique so ordering can be asserted.
#[must_use]
pub fn synthetic_governorates(cities: usize) -> Vec<Governorate> {
    let names: Vec<String> = (0..cities).map(|n| format!("City {n:05}")).collect();
    let delegations: Vec<Delegation> = names
        .chunks(CITIES_PER_DELEGATION)
        .enumerate()
        .map(|(index, chunk)| Delegation::new(format!("Delegation {index:03}"), chunk.to_vec()))
        .collect();
    delegations
        .chunks(DELEGATIONS_PER_GOVERNORATE)
        .enumerate()
        .map(|(index, chunk)| {
            let code = format!("{:02}", index + 10);
            let mut governorate = Governorate::new(
                format!("Governorate {index:02}"),
                code,
                Coord { x: 10.0, y: 35.0 },
            );
            governorate.delegations = chunk.to_vec();
            governorate
        })
        .collect()
}
