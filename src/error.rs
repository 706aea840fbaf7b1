use std::path::PathBuf;

use procstat::{ParseError, Pid};
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// The process list itself cannot be enumerated.
    #[error("cannot enumerate processes under {}: {reason}", .root.display())]
    SourceUnavailable { root: PathBuf, reason: String },

    /// A single process vanished or hid its status; the rest of the snapshot
    /// is still usable.
    #[error("cannot read {}: {reason}", .path.display())]
    RecordUnreadable { path: PathBuf, reason: String },

    #[error("malformed status record{} {line:?}", listed_pid(.pid))]
    Parse {
        pid: Option<Pid>,
        line: String,
        source: ParseError,
    },

    #[error("process {id} (position {index}) is reachable twice, its subtree was skipped")]
    StructuralInconsistency { index: usize, id: Pid },
}

fn listed_pid(pid: &Option<Pid>) -> String {
    pid.map(|pid| format!(" of pid {pid}")).unwrap_or_default()
}
