//! Decide which output bucket a message belongs to from its label field.

use crate::model::Bucket;
use crate::sanitize::sanitize;

/// Labels that never select a custom bucket on their own.
pub const IGNORED_LABELS: &[&str] = &["important", "unread", "starred", "newsletters"];

/// Classify a message by its `X-Gmail-Labels` value.
///
/// System markers win over user labels, checked as substrings of the whole
/// lowercased field in the order spam, trash, inbox, sent. Otherwise the
/// first comma-separated part that is neither empty nor in
/// [`IGNORED_LABELS`] becomes a [`Bucket::Custom`], sanitized to at most
/// `max_name_len` characters. Everything else lands in [`Bucket::Archive`].
pub fn classify(labels: Option<&str>, max_name_len: usize) -> Bucket {
    let labels = match labels {
        Some(l) if !l.is_empty() => l,
        _ => return Bucket::Archive,
    };

    let lower = labels.to_lowercase();
    if lower.contains("spam") {
        Bucket::Spam
    } else if lower.contains("trash") {
        Bucket::Trash
    } else if lower.contains("inbox") {
        Bucket::Inbox
    } else if lower.contains("sent") {
        Bucket::Sent
    } else {
        first_custom_label(labels)
            .map(|label| Bucket::Custom(sanitize(label, max_name_len)))
            .unwrap_or(Bucket::Archive)
    }
}

/// First routing label in source order, trimmed.
fn first_custom_label(labels: &str) -> Option<&str> {
    labels
        .split(',')
        .map(str::trim)
        .find(|part| !part.is_empty() && !is_ignored(part))
}

fn is_ignored(label: &str) -> bool {
    let lower = label.to_lowercase();
    IGNORED_LABELS.contains(&lower.as_str())
}
