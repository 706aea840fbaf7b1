use std::path::{Path, PathBuf};

use log::debug;
use procstat::Pid;

use super::{DEFAULT_PROC_ROOT, Entries, StatusEntry, StatusSource};
use crate::{Error, Result};

/// Reads `<root>/<pid>/stat` for every numeric entry of a procfs mount.
#[derive(Debug, Clone)]
pub struct ProcfsSource {
    root: PathBuf,
}

impl ProcfsSource {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read_stat(&self, pid: i32) -> Result<StatusEntry> {
        let path = self.root.join(pid.to_string()).join("stat");
        let bytes = std::fs::read(&path).map_err(|err| Error::RecordUnreadable {
            path: path.clone(),
            reason: err.to_string(),
        })?;

        // `comm` is arbitrary bytes, only its display needs to be text
        Ok(StatusEntry {
            pid: Pid::try_from(pid).ok(),
            line: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

impl Default for ProcfsSource {
    fn default() -> Self {
        Self::new(DEFAULT_PROC_ROOT)
    }
}

impl StatusSource for ProcfsSource {
    fn entries(&self) -> Result<Entries<'_>> {
        debug!("Enumerating processes under {}", self.root.display());

        let processes = procfs::process::all_processes_with_root(&self.root).map_err(|err| {
            Error::SourceUnavailable {
                root: self.root.clone(),
                reason: err.to_string(),
            }
        })?;

        Ok(Box::new(processes.map(move |process| {
            let process = process.map_err(|err| Error::RecordUnreadable {
                path: self.root.clone(),
                reason: err.to_string(),
            })?;
            self.read_stat(process.pid())
        })))
    }
}
