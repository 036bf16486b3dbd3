//! `mboxsplit` — split a Gmail Takeout MBOX into one archive per label.
//!
//! The core is two pure functions: [`classify`](classify::classify) picks a
//! [`Bucket`](model::Bucket) from a message's `X-Gmail-Labels` value, and
//! [`sanitize`](sanitize::sanitize) turns a label into a safe filename
//! fragment. The [`split`] module streams the source archive through them
//! and appends every message, byte-for-byte, to its output archive.

pub mod classify;
pub mod config;
pub mod error;
pub mod i18n;
pub mod model;
pub mod parser;
pub mod sanitize;
pub mod split;
