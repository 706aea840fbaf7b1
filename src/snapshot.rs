use clap::ValueEnum;
use log::{debug, trace, warn};
use procstat::ProcessRecord;

use crate::source::StatusSource;
use crate::{Error, Result};

/// What to do with a status record that does not parse.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ParsePolicy {
    /// Stop at the first malformed record
    #[default]
    Abort,
    /// Log the malformed record and leave it out of the snapshot
    Skip,
}

/// The records of every process seen during one enumeration, in the order
/// the source listed them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub(crate) records: Vec<ProcessRecord>,
}

impl Snapshot {
    pub fn records(&self) -> &[ProcessRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<ProcessRecord>> for Snapshot {
    fn from(records: Vec<ProcessRecord>) -> Self {
        Self { records }
    }
}

impl FromIterator<ProcessRecord> for Snapshot {
    fn from_iter<I: IntoIterator<Item = ProcessRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotBuilder {
    policy: ParsePolicy,
}

impl SnapshotBuilder {
    pub fn new(policy: ParsePolicy) -> Self {
        Self { policy }
    }

    /// Parse every record the source yields.
    ///
    /// Processes that cannot be read are skipped, they most likely exited
    /// since the enumeration started. Malformed records are handled according
    /// to the [`ParsePolicy`].
    pub fn build<S: StatusSource + ?Sized>(&self, source: &S) -> Result<Snapshot> {
        let mut snapshot = Snapshot::default();
        let mut skipped = 0;

        for entry in source.entries()? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err @ Error::RecordUnreadable { .. }) => {
                    warn!("Skipping process: {err}");
                    skipped += 1;
                    continue;
                }
                Err(err) => return Err(err),
            };

            let record = match procstat::parse(&entry.line) {
                Ok(record) => record,
                Err(source) => match self.policy {
                    ParsePolicy::Abort => {
                        return Err(Error::Parse {
                            pid: entry.pid,
                            line: entry.line.trim_end_matches(['\n', '\r']).to_string(),
                            source,
                        });
                    }
                    ParsePolicy::Skip => {
                        warn!(
                            "Skipping malformed status record {:?}: {source}",
                            entry.line.trim_end_matches(['\n', '\r'])
                        );
                        skipped += 1;
                        continue;
                    }
                },
            };

            if let Some(pid) = entry.pid.filter(|pid| *pid != record.id) {
                warn!(
                    "Status record listed as pid {pid} announces pid {}, using the latter",
                    record.id
                );
            }

            trace!("Parsed record: {record}");
            snapshot.records.push(record);
        }

        debug!(
            "Snapshot holds {} processes ({skipped} skipped)",
            snapshot.len()
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{Entries, StaticSource, StatusEntry};
    use procstat::ParseError;
    use std::path::PathBuf;

    /// Yields a fixed sequence of entries, failures included.
    struct ScriptedSource(Vec<fn() -> Result<StatusEntry>>);

    impl StatusSource for ScriptedSource {
        fn entries(&self) -> Result<Entries<'_>> {
            Ok(Box::new(self.0.iter().map(|entry| entry())))
        }
    }

    struct UnavailableSource;

    impl StatusSource for UnavailableSource {
        fn entries(&self) -> Result<Entries<'_>> {
            Err(Error::SourceUnavailable {
                root: PathBuf::from("/proc"),
                reason: "permission denied".to_string(),
            })
        }
    }

    #[test]
    fn test_build_keeps_source_order() {
        let source = StaticSource::new(["30 (c) S 1", "1 (a) S 0", "20 (b) S 1"]);
        let snapshot = SnapshotBuilder::default().build(&source).unwrap();

        let ids: Vec<_> = snapshot.records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![30, 1, 20]);
        assert!(snapshot.records().iter().all(|r| r.parent_index.is_none()));
    }

    #[test]
    fn test_build_empty_source() {
        let snapshot = SnapshotBuilder::default()
            .build(&StaticSource::default())
            .unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_abort_on_malformed_record() {
        let source = StaticSource::new(["1 (a) S 0", "2 b S 1", "3 (c) S 1"]);
        let err = SnapshotBuilder::new(ParsePolicy::Abort)
            .build(&source)
            .unwrap_err();

        match err {
            Error::Parse { line, source, .. } => {
                assert_eq!(line, "2 b S 1");
                assert_eq!(source, ParseError::MissingParenthesis);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_error_names_the_listed_pid() {
        let source = ScriptedSource(vec![|| {
            Ok(StatusEntry {
                pid: Some(4),
                line: "4 (sh S 1\n".to_string(),
            })
        }]);

        let err = SnapshotBuilder::default().build(&source).unwrap_err();
        assert_eq!(
            err.to_string(),
            "malformed status record of pid 4 \"4 (sh S 1\""
        );
        assert!(matches!(err, Error::Parse { line, .. } if line == "4 (sh S 1"));
    }

    #[test_log::test]
    fn test_skip_malformed_record() {
        let source = StaticSource::new(["1 (a) S 0", "2 b S 1", "3 (c) S x"]);
        let snapshot = SnapshotBuilder::new(ParsePolicy::Skip)
            .build(&source)
            .unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.records()[0].name, "a");
    }

    #[test_log::test]
    fn test_unreadable_records_are_skipped() {
        let source = ScriptedSource(vec![
            || {
                Ok(StatusEntry {
                    pid: Some(1),
                    line: "1 (init) S 0".to_string(),
                })
            },
            || {
                Err(Error::RecordUnreadable {
                    path: PathBuf::from("/proc/2/stat"),
                    reason: "No such process".to_string(),
                })
            },
            || {
                Ok(StatusEntry {
                    pid: Some(3),
                    line: "3 (sh) S 1".to_string(),
                })
            },
        ]);

        let snapshot = SnapshotBuilder::default().build(&source).unwrap();
        let ids: Vec<_> = snapshot.records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test_log::test]
    fn test_embedded_pid_wins_over_listed_pid() {
        let source = ScriptedSource(vec![|| {
            Ok(StatusEntry {
                pid: Some(8),
                line: "9 (odd) S 1".to_string(),
            })
        }]);

        let snapshot = SnapshotBuilder::default().build(&source).unwrap();
        assert_eq!(snapshot.records()[0].id, 9);
    }

    #[test]
    fn test_unavailable_source_is_fatal() {
        let err = SnapshotBuilder::default()
            .build(&UnavailableSource)
            .unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable { .. }));
    }
}
