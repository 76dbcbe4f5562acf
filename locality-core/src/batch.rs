//! Sequential batch committer.
//!
//! Records are grouped into batches of at most [`MAX_BATCH_OPERATIONS`] and
//! committed one at a time. The first failure aborts the run; batches already
//! committed stay committed and nothing is retried.

use log::{debug, info};
use thiserror::Error;

use crate::progress::ProgressReporter;
use crate::record::LocationRecord;
use crate::store::{BatchWriter, CommitError};

/// Write operations the destination store accepts per atomic commit.
///
/// This is an external ceiling, not a tuning knob.
pub const MAX_BATCH_OPERATIONS: usize = 500;

/// Counts reported after every batch was committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommitSummary {
    /// Batches committed.
    pub batches: usize,
    /// Records committed across all batches.
    pub committed: usize,
}

/// A batch commit failed; earlier batches remain stored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("batch {batch} failed after {committed} records were committed: {source}")]
pub struct BatchCommitError {
    /// One-based number of the failing batch.
    pub batch: usize,
    /// Records durably stored before the failure.
    pub committed: usize,
    /// Store error for the failing batch.
    #[source]
    pub source: CommitError,
}

/// Commit `records` through `writer` in bounded batches.
///
/// Every successful commit is reported to `progress` with the running total.
/// The final summary is left to the caller so that it is only emitted once the
/// whole run has succeeded.
///
/// # Errors
///
/// Returns [`BatchCommitError`] for the first batch the writer rejects. Later
/// batches are never attempted.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use locality_core::{
///     BatchWriter, CommitError, ConsoleProgress, Delegation, Flattener, Governorate,
///     LocationRecord, commit_in_batches,
/// };
///
/// #[derive(Default)]
/// struct SizeLog(Vec<usize>);
///
/// impl BatchWriter for SizeLog {
///     fn commit_batch(&mut self, batch: &[LocationRecord]) -> Result<(), CommitError> {
///         self.0.push(batch.len());
///         Ok(())
///     }
/// }
///
/// let cities: Vec<String> = (0..1001).map(|n| format!("City {n}")).collect();
/// let governorates = vec![Governorate::new("Tunis", "11", Coord { x: 10.18, y: 36.8 })
///     .with_delegation(Delegation::new("La Marsa", cities))];
/// let flattener = Flattener::new(&governorates, "Tunisie");
/// let mut store = SizeLog::default();
/// let mut progress = ConsoleProgress::new(Vec::new());
///
/// let summary = commit_in_batches(&mut store, flattener.records(), &mut progress)?;
/// assert_eq!(summary.batches, 3);
/// assert_eq!(store.0, [500, 500, 1]);
/// # Ok::<(), locality_core::BatchCommitError>(())
/// ```
pub fn commit_in_batches<W, I, P>(
    writer: &mut W,
    records: I,
    progress: &mut P,
) -> Result<CommitSummary, BatchCommitError>
where
    W: BatchWriter + ?Sized,
    I: IntoIterator<Item = LocationRecord>,
    P: ProgressReporter + ?Sized,
{
    let mut records = records.into_iter();
    let mut summary = CommitSummary::default();
    let mut batch = Vec::with_capacity(MAX_BATCH_OPERATIONS);

    loop {
        batch.clear();
        batch.extend(records.by_ref().take(MAX_BATCH_OPERATIONS));
        if batch.is_empty() {
            break;
        }

        let number = summary.batches + 1;
        debug!("Committing batch {number} with {} records", batch.len());
        writer
            .commit_batch(&batch)
            .map_err(|source| BatchCommitError {
                batch: number,
                committed: summary.committed,
                source,
            })?;

        summary.batches = number;
        summary.committed += batch.len();
        progress.batch_committed(number, summary.committed);
    }

    info!(
        "Committed {} records in {} batches",
        summary.committed, summary.batches
    );
    Ok(summary)
}

/// Number of commits needed for `records` records.
///
/// # Examples
/// ```
/// use locality_core::batch::planned_batches;
///
/// assert_eq!(planned_batches(0), 0);
/// assert_eq!(planned_batches(1000), 2);
/// assert_eq!(planned_batches(1001), 3);
/// ```
#[must_use]
pub const fn planned_batches(records: usize) -> usize {
    records.div_ceil(MAX_BATCH_OPERATIONS)
}
