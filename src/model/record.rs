//! A single message as read from the source archive.

use crate::parser::header;

/// Name of the header Gmail Takeout uses to store a message's labels.
pub const LABELS_HEADER: &str = "x-gmail-labels";

/// One message from the source MBOX.
///
/// `raw` borrows the exact bytes of the message, including the leading
/// `From ` envelope line, and is never modified. `labels` holds the
/// comma-separated label field when the header is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record<'a> {
    pub raw: &'a [u8],
    pub labels: Option<String>,
}

impl<'a> Record<'a> {
    /// Build a record from raw message bytes, reading `X-Gmail-Labels`
    /// from the header block.
    pub fn parse(raw: &'a [u8]) -> Self {
        let labels = header::extract_header(raw, LABELS_HEADER)
            .map(|value| header::decode_encoded_words(&value));
        Self { raw, labels }
    }

    /// The label field, if present.
    pub fn labels(&self) -> Option<&str> {
        self.labels.as_deref()
    }
}
