use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub type Pid = u32;

/// Parent pid announcing that a process has no parent.
pub const ROOT_PARENT_ID: Pid = 0;

/// Longest accepted process name, in bytes.
pub const MAX_NAME_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("missing `(name)` delimiters")]
    MissingParenthesis,
    #[error("empty process name")]
    EmptyName,
    #[error("process name is {len} bytes long, at most {MAX_NAME_LEN} are allowed")]
    NameTooLong { len: usize },
    #[error("missing `{field}` field")]
    MissingField { field: &'static str },
    #[error("invalid `{field}` field: {value:?} is not a pid")]
    InvalidNumber { field: &'static str, value: String },
    #[error("invalid state {value:?}, expected a single character")]
    InvalidState { value: String },
}

/// One process entry of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    pub id: Pid,
    pub name: String,
    pub state: char,
    pub parent_id: Pid,
    /// Position of the parent record in the owning snapshot, filled in once
    /// the snapshot is resolved.
    pub parent_index: Option<usize>,
}

impl ProcessRecord {
    pub fn new(id: Pid, name: impl Into<String>, parent_id: Pid) -> Self {
        Self {
            id,
            name: name.into(),
            state: 'S',
            parent_id,
            parent_index: None,
        }
    }

    /// Whether the record explicitly announces itself as a root.
    pub fn has_root_parent(&self) -> bool {
        self.parent_id == ROOT_PARENT_ID
    }
}

/// Formats the record back into the `stat` layout, limited to the fields the
/// parser reads.
impl fmt::Display for ProcessRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) {} {}",
            self.id, self.name, self.state, self.parent_id
        )
    }
}

impl FromStr for ProcessRecord {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        parse(line)
    }
}

/// Parse one `stat` line of the form `<pid> (<comm>) <state> <ppid> ...`.
///
/// `comm` can hold spaces and parentheses of its own, so it spans from the
/// first `(` to the last `)` of the line. The pid never contains a
/// parenthesis and the fields after `comm` are numeric or single characters.
/// Fields outside the parentheses are separated by exactly one space, a
/// doubled separator makes the line malformed.
pub fn parse(line: &str) -> Result<ProcessRecord, ParseError> {
    let line = line.trim_end_matches(['\n', '\r']);

    let (Some(open), Some(close)) = (line.find('('), line.rfind(')')) else {
        return Err(ParseError::MissingParenthesis);
    };
    if close < open {
        return Err(ParseError::MissingParenthesis);
    }

    let name = &line[open + 1..close];
    if name.is_empty() {
        return Err(ParseError::EmptyName);
    }
    if name.len() > MAX_NAME_LEN {
        return Err(ParseError::NameTooLong { len: name.len() });
    }

    // Exactly one space separates the pid from `(`
    let id = line[..open]
        .strip_suffix(' ')
        .ok_or(ParseError::MissingField { field: "pid" })?;
    let id = parse_pid("pid", id)?;

    // and `)` from the state, the remaining fields are single-space separated
    let mut fields = line[close + 1..]
        .strip_prefix(' ')
        .ok_or(ParseError::MissingField { field: "state" })?
        .split(' ');
    let state = next_field(&mut fields, "state")?;
    let state = single_char(state).ok_or_else(|| ParseError::InvalidState {
        value: state.to_string(),
    })?;
    let parent_id = parse_pid("ppid", next_field(&mut fields, "ppid")?)?;

    Ok(ProcessRecord {
        id,
        name: name.to_string(),
        state,
        parent_id,
        parent_index: None,
    })
}

fn parse_pid(field: &'static str, value: &str) -> Result<Pid, ParseError> {
    if value.is_empty() {
        return Err(ParseError::MissingField { field });
    }
    value.parse().map_err(|_| ParseError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

fn next_field<'a>(
    fields: &mut impl Iterator<Item = &'a str>,
    field: &'static str,
) -> Result<&'a str, ParseError> {
    fields
        .next()
        .filter(|value| !value.is_empty())
        .ok_or(ParseError::MissingField { field })
}

fn single_char(value: &str) -> Option<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}
