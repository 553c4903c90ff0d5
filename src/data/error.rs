//! Error types for `.ts` loading.

use std::fmt;

use thiserror::Error;

use super::model::TargetKind;

/// Cause of a failed load.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadErrorKind {
    // -- structural --
    #[error("no @data line before end of input")]
    MissingSentinel,

    #[error("header is missing required directive(s): {}", .0.join(", "))]
    IncompleteHeader(Vec<&'static str>),

    #[error("directive @{0} declared more than once")]
    DuplicateHeaderKey(String),

    #[error("invalid value for @{key}: {reason}")]
    HeaderValue { key: String, reason: String },

    #[error("expected a directive starting with '@', found '{0}'")]
    MalformedHeaderLine(String),

    // -- per record --
    #[error("record has no parsable content")]
    EmptyRecord,

    #[error("expected {expected} channel(s), found {found}")]
    ChannelCountMismatch { expected: usize, found: usize },

    #[error("channel {channel} has {found} point(s), expected {expected}")]
    LengthMismatch {
        channel: usize,
        expected: usize,
        found: usize,
    },

    #[error("channel {channel}, point {point}: '?' found but @missing is false")]
    MissingValueNotAllowed { channel: usize, point: usize },

    #[error("channel {channel}, point {point}: '{token}' is not a number")]
    MalformedPoint {
        channel: usize,
        point: usize,
        token: String,
    },

    #[error("record has an empty target segment")]
    MissingTarget,

    #[error("class label '{0}' contains whitespace")]
    MalformedLabel(String),

    #[error("target '{token}' is a {found} but the dataset's targets are {expected}s")]
    TargetKindMismatch {
        token: String,
        expected: TargetKind,
        found: TargetKind,
    },

    // -- post validation --
    #[error("dataset contains no instances")]
    NoInstances,

    #[error("class label '{0}' is not declared in @classLabel")]
    UnknownLabel(String),

    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),
}

/// A load failure tagged with the 1-based line that caused it.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadError {
    pub line: usize,
    pub kind: LoadErrorKind,
}

impl LoadError {
    pub fn new(line: usize, kind: LoadErrorKind) -> Self {
        Self { line, kind }
    }

    /// Whether this error points at a parser defect rather than bad input.
    pub fn is_internal(&self) -> bool {
        matches!(self.kind, LoadErrorKind::InternalInvariant(_))
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

pub type Result<T> = std::result::Result<T, LoadError>;
