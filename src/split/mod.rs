//! The routing driver: read records in archive order, classify each one and
//! append its raw bytes to the matching output archive.

pub mod layout;
pub mod sink;
pub mod stats;

use std::path::PathBuf;

use tracing::{info, warn};

use crate::classify::classify;
use crate::error::Result;
use crate::model::{Bucket, Record};
use crate::parser::mbox::{MboxParser, DEFAULT_READ_BUFFER_SIZE};

pub use layout::OutputLayout;
pub use sink::{FileSink, MailboxSink, MemorySink, NullSink};
pub use stats::{OutputStats, SplitStats};

/// Report routed-record progress every this many records by default.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 2000;

/// Progress events emitted during [`split_mbox`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// This many records have been routed so far.
    Records(u64),
    /// Bytes of the source archive consumed so far.
    Bytes { read: u64, total: u64 },
}

/// Routes records to a sink and keeps the run's counters.
///
/// The router owns the sink for the whole run; [`Router::finish`] or
/// [`Router::abort`] releases it.
pub struct Router<S: MailboxSink> {
    layout: OutputLayout,
    sink: S,
    stats: SplitStats,
}

impl<S: MailboxSink> Router<S> {
    pub fn new(layout: OutputLayout, sink: S) -> Self {
        Self {
            layout,
            sink,
            stats: SplitStats::default(),
        }
    }

    /// Classify `record` and append its raw bytes to the matching archive.
    pub fn route(&mut self, record: &Record<'_>) -> Result<Bucket> {
        let bucket = classify(record.labels(), self.layout.max_name_len);
        let filename = self.layout.filename_for(&bucket);
        self.sink.append(&filename, record.raw)?;
        self.stats.record(&filename, &bucket, record.raw.len() as u64);
        Ok(bucket)
    }

    pub fn stats(&self) -> &SplitStats {
        &self.stats
    }

    /// Close the sink and hand back the counters and the sink.
    pub fn finish(mut self) -> Result<(SplitStats, S)> {
        self.sink.close()?;
        Ok((self.stats, self.sink))
    }

    /// Close the sink after a failure. A close error is logged, not returned,
    /// so it never hides the error that caused the abort.
    pub fn abort(mut self) {
        if let Err(e) = self.sink.close() {
            warn!(error = %e, "Failed to close outputs while aborting");
        }
    }
}

/// Settings for one split run.
#[derive(Debug, Clone)]
pub struct SplitOptions {
    /// Source MBOX.
    pub input: PathBuf,
    pub layout: OutputLayout,
    /// Emit [`Progress::Records`] every this many records (0 is treated as 1).
    pub progress_interval: u64,
    pub read_buffer_size: usize,
}

impl SplitOptions {
    pub fn new(input: impl Into<PathBuf>, layout: OutputLayout) -> Self {
        Self {
            input: input.into(),
            layout,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }
}

/// Split the source MBOX into `sink`, one archive per bucket.
///
/// The source is checked before anything is written. Whether the run
/// succeeds or fails, the sink is closed exactly once; on failure the
/// original error is returned even if closing also fails.
pub fn split_mbox<S: MailboxSink>(
    options: &SplitOptions,
    sink: S,
    progress: Option<&dyn Fn(Progress)>,
) -> Result<(SplitStats, S)> {
    let parser = MboxParser::new(&options.input)?.with_buffer_size(options.read_buffer_size);
    info!(
        input = %options.input.display(),
        prefix = %options.layout.prefix,
        size = parser.file_size(),
        "Splitting MBOX"
    );

    let interval = options.progress_interval.max(1);
    let on_bytes = |read: u64, total: u64| {
        if let Some(cb) = progress {
            cb(Progress::Bytes { read, total });
        }
    };

    let mut router = Router::new(options.layout.clone(), sink);
    let result = parser.parse(
        &mut |_offset, raw| {
            router.route(&Record::parse(raw))?;
            let routed = router.stats().total_records;
            if routed % interval == 0 {
                if let Some(cb) = progress {
                    cb(Progress::Records(routed));
                }
            }
            Ok(())
        },
        progress.map(|_| &on_bytes as &dyn Fn(u64, u64)),
    );

    match result {
        Ok(_) => {
            let (stats, sink) = router.finish()?;
            info!(
                records = stats.total_records,
                outputs = stats.outputs.len(),
                "Split complete"
            );
            Ok((stats, sink))
        }
        Err(e) => {
            router.abort();
            Err(e)
        }
    }
}
