//! Render the processes of a Linux host as an indented tree.
//!
//! The pipeline runs in three stages: a [`SnapshotBuilder`] turns raw status
//! records into a [`Snapshot`], [`Snapshot::resolve`] links every record to
//! its parent by position, and [`Render`] walks the resulting
//! [`ProcessTree`] in preorder.

pub mod app;
mod error;
mod prelude;
pub mod render;
pub mod snapshot;
pub mod source;
pub mod tree;

pub use error::{Error, Result};
pub use procstat::{ParseError, Pid, ProcessRecord};
pub use render::{Render, RenderOptions, RenderedLine};
pub use snapshot::{ParsePolicy, Snapshot, SnapshotBuilder};
pub use tree::ProcessTree;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
