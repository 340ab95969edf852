use crate::TreeCmpError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::FileType;
use std::path::{Component, Path, PathBuf};

/// A path relative to a comparison root, made only of normal components.
///
/// Ordering is component-wise, which is the order `PathBuf` already uses, so
/// `a/b` sorts before `a.txt` even though `/` > `.` byte-wise.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "PathBuf", into = "PathBuf")]
pub struct RelativePath(PathBuf);

impl RelativePath {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, TreeCmpError> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(TreeCmpError::InvalidPath("empty path".to_string()));
        }
        for component in path.components() {
            if !matches!(component, Component::Normal(_)) {
                return Err(TreeCmpError::InvalidPath(path.display().to_string()));
            }
        }
        Ok(Self(path))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Join this relative path onto a comparison root.
    pub fn under(&self, root: &Path) -> PathBuf {
        root.join(&self.0)
    }
}

impl TryFrom<PathBuf> for RelativePath {
    type Error = TreeCmpError;

    fn try_from(path: PathBuf) -> Result<Self, Self::Error> {
        Self::new(path)
    }
}

impl From<RelativePath> for PathBuf {
    fn from(path: RelativePath) -> Self {
        path.0
    }
}

impl AsRef<Path> for RelativePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// The three kinds of filesystem entry that can be compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    RegularFile,
    Directory,
    SymbolicLink,
}

impl EntryKind {
    pub const ALL: [EntryKind; 3] = [
        EntryKind::RegularFile,
        EntryKind::Directory,
        EntryKind::SymbolicLink,
    ];

    /// Map a file type obtained without following links. Anything else yields `None`.
    pub fn from_file_type(file_type: &FileType) -> Option<Self> {
        if file_type.is_symlink() {
            Some(EntryKind::SymbolicLink)
        } else if file_type.is_dir() {
            Some(EntryKind::Directory)
        } else if file_type.is_file() {
            Some(EntryKind::RegularFile)
        } else {
            None
        }
    }
}

/// Result of comparing one relative path across both roots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOutcome {
    /// Both entries exist, share a kind and match in substance
    Match,
    /// Both entries exist but are of different kinds
    TypeMismatch,
    /// Same kind, different file bytes or link target
    ContentMismatch,
    NeitherExists,
    OnlyFirstExists,
    OnlySecondExists,
}

/// Outcome of a pairwise comparison together with the kind found on each side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairComparison {
    pub outcome: ComparisonOutcome,
    pub first_kind: Option<EntryKind>,
    pub second_kind: Option<EntryKind>,
}

impl PairComparison {
    pub fn neither() -> Self {
        Self {
            outcome: ComparisonOutcome::NeitherExists,
            first_kind: None,
            second_kind: None,
        }
    }

    pub fn only_first(kind: EntryKind) -> Self {
        Self {
            outcome: ComparisonOutcome::OnlyFirstExists,
            first_kind: Some(kind),
            second_kind: None,
        }
    }

    pub fn only_second(kind: EntryKind) -> Self {
        Self {
            outcome: ComparisonOutcome::OnlySecondExists,
            first_kind: None,
            second_kind: Some(kind),
        }
    }

    pub fn both(outcome: ComparisonOutcome, first: EntryKind, second: EntryKind) -> Self {
        Self {
            outcome,
            first_kind: Some(first),
            second_kind: Some(second),
        }
    }

    pub fn is_match(&self) -> bool {
        self.outcome == ComparisonOutcome::Match
    }

    /// Whether either side is of the given kind
    pub fn involves(&self, kind: EntryKind) -> bool {
        self.first_kind == Some(kind) || self.second_kind == Some(kind)
    }
}

/// One visited relative path: both fully-qualified paths plus the comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullComparison {
    pub relative_path: RelativePath,
    pub first_path: PathBuf,
    pub second_path: PathBuf,
    pub pair: PairComparison,
}

impl FullComparison {
    pub fn outcome(&self) -> ComparisonOutcome {
        self.pair.outcome
    }
}

/// Options shared by the comparison engine, the renderer and the CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// Also list paths that match
    pub matches: bool,

    /// Colorize output lines
    pub pretty: bool,

    /// Print per-kind match totals after the listing
    pub totals: bool,

    /// Print nothing per path; only the exit status reports the result
    pub silent: bool,

    /// Treat equal-size regular files as matching without reading them
    pub shallow: bool,

    /// Scan and compare on the rayon thread pool
    pub parallel: bool,
}
