//! Destinations for routed messages.
//!
//! A sink receives `(filename, raw bytes)` pairs in record order. The file
//! sink opens each output lazily, keeps it open for the rest of the run and
//! releases every handle on `close` or drop.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Result, SplitError};

/// Default size of each output write buffer (64 KB).
pub const DEFAULT_WRITE_BUFFER_SIZE: usize = 64 * 1024;

/// Somewhere routed messages are appended to.
pub trait MailboxSink {
    /// Append one message, byte-for-byte, to the archive called `filename`.
    fn append(&mut self, filename: &str, raw: &[u8]) -> Result<()>;

    /// Flush and release every open archive. Called once at the end of a run.
    fn close(&mut self) -> Result<()>;
}

/// Write `raw` after a `\n` separator if the stream does not sit at the
/// start of a line, so the next `From ` line is always recognized.
///
/// Returns whether the stream ends at a line start afterwards.
fn write_record(out: &mut impl Write, at_line_start: bool, raw: &[u8]) -> std::io::Result<bool> {
    if raw.is_empty() {
        return Ok(at_line_start);
    }
    if !at_line_start {
        out.write_all(b"\n")?;
    }
    out.write_all(raw)?;
    Ok(raw.ends_with(b"\n"))
}

/// One open output archive.
#[derive(Debug)]
struct OutputStream {
    path: PathBuf,
    writer: BufWriter<File>,
    at_line_start: bool,
}

impl OutputStream {
    /// Open `path` with create-if-absent + append semantics.
    fn open(path: PathBuf, buffer_size: usize) -> Result<Self> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(&path)
            .map_err(|e| SplitError::io(&path, e))?;

        let len = file.metadata().map_err(|e| SplitError::io(&path, e))?.len();
        let at_line_start = if len == 0 {
            true
        } else {
            let mut last = [0u8; 1];
            file.seek(SeekFrom::End(-1))
                .and_then(|_| file.read_exact(&mut last))
                .map_err(|e| SplitError::io(&path, e))?;
            last[0] == b'\n'
        };

        debug!(path = %path.display(), existing_bytes = len, "Opened output archive");
        Ok(Self {
            writer: BufWriter::with_capacity(buffer_size, file),
            path,
            at_line_start,
        })
    }

    fn append(&mut self, raw: &[u8]) -> Result<()> {
        self.at_line_start = write_record(&mut self.writer, self.at_line_start, raw)
            .map_err(|e| SplitError::io(&self.path, e))?;
        Ok(())
    }
}

/// Appends messages to `{output_dir}/{filename}` files.
///
/// Each filename maps to exactly one open handle for the lifetime of the
/// sink. Dropping the sink without calling [`MailboxSink::close`] still
/// flushes and closes every handle, ignoring errors.
#[derive(Debug)]
pub struct FileSink {
    output_dir: PathBuf,
    buffer_size: usize,
    protected: Option<PathBuf>,
    streams: HashMap<String, OutputStream>,
}

impl FileSink {
    /// Create a sink writing into `output_dir`. Nothing is opened yet.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            buffer_size: DEFAULT_WRITE_BUFFER_SIZE,
            protected: None,
            streams: HashMap::new(),
        }
    }

    /// Override the per-file write buffer size.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Refuse to append to `path`, typically the source archive.
    pub fn protect(mut self, path: &Path) -> Result<Self> {
        let canonical = path.canonicalize().map_err(|e| SplitError::io(path, e))?;
        self.protected = Some(canonical);
        Ok(self)
    }

    /// Number of archives opened so far.
    pub fn open_count(&self) -> usize {
        self.streams.len()
    }
}

fn check_not_protected(protected: Option<&Path>, path: &Path) -> Result<()> {
    if let (Some(protected), Ok(candidate)) = (protected, path.canonicalize()) {
        if candidate == protected {
            return Err(SplitError::OutputIsInput(path.to_path_buf()));
        }
    }
    Ok(())
}

impl MailboxSink for FileSink {
    fn append(&mut self, filename: &str, raw: &[u8]) -> Result<()> {
        let stream = match self.streams.entry(filename.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let path = self.output_dir.join(filename);
                check_not_protected(self.protected.as_deref(), &path)?;
                entry.insert(OutputStream::open(path, self.buffer_size)?)
            }
        };
        stream.append(raw)
    }

    fn close(&mut self) -> Result<()> {
        let mut first_error = None;
        for (_, mut stream) in self.streams.drain() {
            if let Err(e) = stream.writer.flush() {
                warn!(path = %stream.path.display(), error = %e, "Failed to flush output archive");
                if first_error.is_none() {
                    first_error = Some(SplitError::io(&stream.path, e));
                }
            }
            // Dropping the writer closes the file.
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        if !self.streams.is_empty() {
            let _ = self.close();
        }
    }
}

/// Keeps every archive in memory: filename → concatenated message bytes.
#[derive(Debug, Default)]
pub struct MemorySink {
    outputs: BTreeMap<String, Vec<u8>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes collected for `filename`, if anything was routed there.
    pub fn get(&self, filename: &str) -> Option<&[u8]> {
        self.outputs.get(filename).map(Vec::as_slice)
    }

    pub fn outputs(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.outputs
    }

    pub fn into_outputs(self) -> BTreeMap<String, Vec<u8>> {
        self.outputs
    }
}

impl MailboxSink for MemorySink {
    fn append(&mut self, filename: &str, raw: &[u8]) -> Result<()> {
        let buf = self.outputs.entry(filename.to_string()).or_default();
        let at_line_start = buf.last().map_or(true, |&b| b == b'\n');
        write_record(buf, at_line_start, raw)?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Discards everything. Used for dry runs, where only the counts matter.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl MailboxSink for NullSink {
    fn append(&mut self, _filename: &str, _raw: &[u8]) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
