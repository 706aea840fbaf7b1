//! Where raw status records come from.

use procstat::Pid;

use crate::Result;

#[cfg(target_os = "linux")]
mod proc_dir;
#[cfg(target_os = "linux")]
pub use proc_dir::ProcfsSource;

pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// One raw status record as produced by a [`StatusSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// Pid known to the source independently of the record, e.g. the name of
    /// the `/proc` entry it was read from.
    pub pid: Option<Pid>,
    pub line: String,
}

pub type Entries<'a> = Box<dyn Iterator<Item = Result<StatusEntry>> + 'a>;

pub trait StatusSource {
    /// Enumerate the status records of every live process, in the order the
    /// underlying system lists them.
    ///
    /// Failing here is fatal for the whole run. Individual items may fail
    /// with [`crate::Error::RecordUnreadable`] when a process goes away
    /// while being read.
    fn entries(&self) -> Result<Entries<'_>>;
}

/// A source serving a fixed list of status lines.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    lines: Vec<String>,
}

impl StaticSource {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S: Into<String>> FromIterator<S> for StaticSource {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl StatusSource for StaticSource {
    fn entries(&self) -> Result<Entries<'_>> {
        Ok(Box::new(self.lines.iter().map(|line| {
            Ok(StatusEntry {
                pid: None,
                line: line.clone(),
            })
        })))
    }
}
