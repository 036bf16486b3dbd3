//! Core data model: messages read from the source and their destinations.

pub mod bucket;
pub mod record;

pub use bucket::Bucket;
pub use record::Record;
