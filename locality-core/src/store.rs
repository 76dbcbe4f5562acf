//! Batched write capability of a destination document store.
//!
//! The [`BatchWriter`] trait is the only view the pipeline has of a store.
//! Implementations live in `locality-data`; an in-memory double lives in
//! [`crate::test_support`].

use thiserror::Error;

use crate::record::LocationRecord;

/// Errors from [`BatchWriter::commit_batch`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    /// The batch holds more writes than the store accepts in one commit.
    #[error("batch of {size} writes exceeds the store limit of {limit}")]
    BatchTooLarge {
        /// Number of writes submitted.
        size: usize,
        /// Store ceiling.
        limit: usize,
    },
    /// The store processed the request and refused it.
    #[error("store rejected the batch: {message}")]
    Rejected {
        /// Store-supplied description.
        message: String,
    },
    /// The store could not be reached or failed before answering.
    #[error("store unavailable: {message}")]
    Unavailable {
        /// Transport-level description.
        message: String,
    },
    /// The commit did not complete within the configured timeout.
    #[error("commit timed out after {timeout_secs}s")]
    Timeout {
        /// Timeout that elapsed.
        timeout_secs: u64,
    },
}

/// Persist one batch of records atomically.
///
/// A successful call means every record of the batch is durably stored; an
/// error means none of them are. Implementations assign `created_at`
/// themselves and must not retry internally.
///
/// # Examples
///
/// ```
/// use locality_core::{BatchWriter, CommitError, LocationRecord};
///
/// #[derive(Default)]
/// struct CountingStore {
///     stored: usize,
/// }
///
/// impl BatchWriter for CountingStore {
///     fn commit_batch(&mut self, batch: &[LocationRecord]) -> Result<(), CommitError> {
///         self.stored += batch.len();
///         Ok(())
///     }
/// }
///
/// let mut store = CountingStore::default();
/// store.commit_batch(&[])?;
/// assert_eq!(store.stored, 0);
/// # Ok::<(), CommitError>(())
/// ```
pub trait BatchWriter {
    /// Commit `batch` as a single all-or-nothing write.
    fn commit_batch(&mut self, batch: &[LocationRecord]) -> Result<(), CommitError>;
}

impl<W: BatchWriter + ?Sized> BatchWriter for Box<W> {
    fn commit_batch(&mut self, batch: &[LocationRecord]) -> Result<(), CommitError> {
        (**self).commit_batch(batch)
    }
}
