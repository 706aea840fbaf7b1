//! Parsing of `/proc/<pid>/stat` records.
//!
//! Only the leading `pid (comm) state ppid` fields are decoded; everything
//! after the parent pid is ignored.

mod record;

pub use record::*;
