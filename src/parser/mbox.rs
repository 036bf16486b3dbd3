//! Streaming MBOX reader.
//!
//! Reads the source archive line-by-line through a large buffer and hands
//! each message to a callback as the exact bytes stored on disk. The whole
//! file is never loaded into memory.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{Result, SplitError};

/// Default size of the read buffer (1 MB for fast sequential reads).
pub const DEFAULT_READ_BUFFER_SIZE: usize = 1024 * 1024;

/// Report byte progress at most every 4 MB.
const PROGRESS_INTERVAL: u64 = 4 * 1024 * 1024;

/// Streaming MBOX parser.
///
/// A new message starts at every line beginning with `From `. Body lines
/// that were escaped as `>From ` are not separators. The parser is tolerant of:
///
/// - Mixed `\n` and `\r\n` line endings
/// - `From ` lines not preceded by a blank line (logs a warning)
/// - A final message without a trailing newline
/// - NUL bytes and other binary content in the body
/// - UTF-8 BOM at the start of the file
///
/// Bytes before the first separator (other than a BOM) are delivered as a
/// message of their own so nothing in the source is dropped.
pub struct MboxParser {
    path: PathBuf,
    file_size: u64,
    buffer_size: usize,
}

impl MboxParser {
    /// Create a parser for the given MBOX file.
    ///
    /// Verifies that the file exists and is readable, but does NOT validate
    /// that it is actually an MBOX.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = std::fs::metadata(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SplitError::FileNotFound(path.clone())
            } else {
                SplitError::io(&path, e)
            }
        })?;
        if metadata.is_dir() {
            return Err(SplitError::io(
                &path,
                std::io::Error::new(std::io::ErrorKind::Other, "is a directory"),
            ));
        }
        Ok(Self {
            path,
            file_size: metadata.len(),
            buffer_size: DEFAULT_READ_BUFFER_SIZE,
        })
    }

    /// Override the read buffer size.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(4096);
        self
    }

    /// Total size of the underlying file in bytes.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Read the whole MBOX, calling `message_callback` for each message.
    ///
    /// The callback receives `(offset, raw_bytes)`; an error from it stops
    /// the scan and is returned unchanged. `progress_callback` receives
    /// `(bytes_read, file_size)`.
    ///
    /// Returns the number of messages delivered.
    pub fn parse(
        &self,
        message_callback: &mut dyn FnMut(u64, &[u8]) -> Result<()>,
        progress_callback: Option<&dyn Fn(u64, u64)>,
    ) -> Result<u64> {
        if self.file_size == 0 {
            return Ok(0);
        }

        let file = File::open(&self.path).map_err(|e| SplitError::io(&self.path, e))?;
        let mut reader = BufReader::with_capacity(self.buffer_size, file);

        let mut count: u64 = 0;
        let mut current_offset: u64 = 0;
        let mut message_buf: Vec<u8> = Vec::with_capacity(64 * 1024);
        let mut message_start: u64 = 0;
        let mut prev_line_was_empty = true;
        let mut last_progress: u64 = 0;

        // Reusable line buffer
        let mut line_buf: Vec<u8> = Vec::with_capacity(4096);

        loop {
            line_buf.clear();
            let line_len = reader
                .read_until(b'\n', &mut line_buf)
                .map_err(|e| SplitError::io(&self.path, e))?;
            if line_len == 0 {
                break; // EOF
            }

            let separator = if current_offset == 0 {
                is_mbox_separator(strip_bom(&line_buf))
            } else {
                is_mbox_separator(&line_buf)
            };

            if separator {
                if !prev_line_was_empty {
                    warn!(
                        offset = current_offset,
                        "Found 'From ' separator without preceding blank line"
                    );
                }
                if !message_buf.is_empty() {
                    message_callback(message_start, &message_buf)?;
                    count += 1;
                }
                message_start = current_offset;
                message_buf.clear();
            }
            message_buf.extend_from_slice(&line_buf);

            prev_line_was_empty = is_blank_line(&line_buf);
            current_offset += line_len as u64;

            if let Some(cb) = progress_callback {
                if current_offset - last_progress >= PROGRESS_INTERVAL {
                    cb(current_offset, self.file_size);
                    last_progress = current_offset;
                }
            }
        }

        if !message_buf.is_empty() {
            message_callback(message_start, &message_buf)?;
            count += 1;
        }

        if let Some(cb) = progress_callback {
            cb(current_offset, self.file_size.max(current_offset));
        }

        Ok(count)
    }
}

fn strip_bom(line: &[u8]) -> &[u8] {
    line.strip_prefix(b"\xEF\xBB\xBF".as_slice()).unwrap_or(line)
}

/// Check whether a line is an MBOX separator (`From ` at the start).
fn is_mbox_separator(line: &[u8]) -> bool {
    line.starts_with(b"From ")
}

/// Check whether a line is blank (empty or only whitespace / CR / LF).
fn is_blank_line(line: &[u8]) -> bool {
    line.iter()
        .all(|&b| b == b'\n' || b == b'\r' || b == b' ' || b == b'\t')
}
