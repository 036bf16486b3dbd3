//! Logical destinations a message can be routed to.

use std::fmt;

use serde::Serialize;

/// The destination category of a single message.
///
/// Buckets are plain values: classifying equal label text always yields an
/// equal bucket. `Custom` carries an already-sanitized name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum Bucket {
    Inbox,
    Sent,
    Spam,
    Trash,
    /// Messages with no label, or with only non-routing markers.
    Archive,
    /// A user label, sanitized for use in a filename.
    Custom(String),
}

impl Bucket {
    /// Name used to build the output filename.
    pub fn display_name(&self) -> &str {
        match self {
            Self::Inbox => "Inbox",
            Self::Sent => "Sent",
            Self::Spam => "Spam",
            Self::Trash => "Trash",
            Self::Archive => "Archive",
            Self::Custom(name) => name,
        }
    }

    /// Whether this is one of the fixed, non-custom buckets.
    pub fn is_system(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
