//! Console progress reporting.
//!
//! Reporting is observational only: a failed console write is logged and
//! otherwise ignored.

use std::fmt;
use std::io::Write;

use log::warn;

/// Final outcome of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunSummary<'a> {
    /// Records committed to a document store.
    Imported {
        /// Records committed.
        records: usize,
        /// Batches committed.
        batches: usize,
    },
    /// Records written to an export file.
    Exported {
        /// Records written.
        records: usize,
        /// Destination file.
        destination: &'a str,
    },
}

impl RunSummary<'_> {
    /// Total records handled by the run.
    #[must_use]
    pub const fn records(&self) -> usize {
        match self {
            Self::Imported { records, .. } | Self::Exported { records, .. } => *records,
        }
    }
}

impl fmt::Display for RunSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Imported { records, batches } => {
                write!(f, "Imported {records} locations in {batches} batches")
            }
            Self::Exported {
                records,
                destination,
            } => write!(f, "Exported {records} locations to {destination}"),
        }
    }
}

/// Receives status updates from the pipeline.
pub trait ProgressReporter {
    /// A batch was committed; `committed` is the running total.
    fn batch_committed(&mut self, batch: usize, committed: usize);

    /// The run completed successfully.
    fn finished(&mut self, summary: &RunSummary<'_>);
}

/// Writes one status line per event to a console stream.
///
/// # Examples
/// ```
/// use locality_core::{ConsoleProgress, ProgressReporter, RunSummary};
///
/// let mut progress = ConsoleProgress::new(Vec::new());
/// progress.batch_committed(1, 500);
/// progress.finished(&RunSummary::Imported { records: 500, batches: 1 });
/// let output = String::from_utf8(progress.into_inner()).expect("utf-8 output");
/// assert_eq!(
///     output,
///     "Committed batch 1 (500 locations so far)\nImported 500 locations in 1 batches\n"
/// );
/// ```
#[derive(Debug)]
pub struct ConsoleProgress<W> {
    writer: W,
}

impl<W: Write> ConsoleProgress<W> {
    /// Report to `writer`.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the underlying writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn emit(&mut self, line: fmt::Arguments<'_>) {
        if let Err(err) = writeln!(self.writer, "{line}") {
            warn!("failed to write progress line: {err}");
        }
    }
}

impl<W: Write> ProgressReporter for ConsoleProgress<W> {
    fn batch_committed(&mut self, batch: usize, committed: usize) {
        self.emit(format_args!(
            "Committed batch {batch} ({committed} locations so far)"
        ));
    }

    fn finished(&mut self, summary: &RunSummary<'_>) {
        self.emit(format_args!("{summary}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[rstest]
    fn export_summary_names_destination() {
        let summary = RunSummary::Exported {
            records: 2,
            destination: "out/locations.json",
        };
        assert_eq!(
            summary.to_string(),
            "Exported 2 locations to out/locations.json"
        );
        assert_eq!(summary.records(), 2);
    }

    #[rstest]
    fn write_failures_do_not_interrupt_reporting() {
        let mut progress = ConsoleProgress::new(BrokenPipe);
        progress.batch_committed(1, 500);
        progress.finished(&RunSummary::Imported {
            records: 500,
            batches: 1,
        });
    }
}
