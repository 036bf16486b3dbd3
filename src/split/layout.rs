//! Bucket → output filename convention.

use crate::model::Bucket;
use crate::sanitize::DEFAULT_MAX_NAME_LEN;

/// Extension of every output archive.
pub const MBOX_EXTENSION: &str = "mbox";

/// How output archives are named: `{prefix}{name}.mbox`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    /// Prepended verbatim to every filename.
    pub prefix: String,
    /// Maximum length of a sanitized custom label.
    pub max_name_len: usize,
}

impl OutputLayout {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            max_name_len: DEFAULT_MAX_NAME_LEN,
        }
    }

    pub fn with_max_name_len(mut self, max_name_len: usize) -> Self {
        self.max_name_len = max_name_len;
        self
    }

    /// Filename of the archive that collects `bucket`.
    pub fn filename_for(&self, bucket: &Bucket) -> String {
        format!("{}{}.{MBOX_EXTENSION}", self.prefix, bucket.display_name())
    }
}

impl Default for OutputLayout {
    fn default() -> Self {
        Self::new("split_")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_filenames() {
        let layout = OutputLayout::new("out_");
        assert_eq!(layout.filename_for(&Bucket::Inbox), "out_Inbox.mbox");
        assert_eq!(layout.filename_for(&Bucket::Sent), "out_Sent.mbox");
        assert_eq!(layout.filename_for(&Bucket::Spam), "out_Spam.mbox");
        assert_eq!(layout.filename_for(&Bucket::Trash), "out_Trash.mbox");
        assert_eq!(layout.filename_for(&Bucket::Archive), "out_Archive.mbox");
    }

    #[test]
    fn test_custom_filename() {
        let layout = OutputLayout::default();
        assert_eq!(
            layout.filename_for(&Bucket::Custom("Some Project".into())),
            "split_Some Project.mbox"
        );
    }

    #[test]
    fn test_custom_archive_shares_file_with_system_archive() {
        let layout = OutputLayout::default();
        assert_eq!(
            layout.filename_for(&Bucket::Custom("Archive".into())),
            layout.filename_for(&Bucket::Archive)
        );
    }
}
