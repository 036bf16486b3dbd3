//! Source-side parsing: the streaming MBOX reader and header lookup.

pub mod header;
pub mod mbox;
