use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Metadata – the parsed header
// ---------------------------------------------------------------------------

/// Header declarations of a `.ts` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub problem_name: String,
    /// Points are `(timestamp,value)` pairs.
    pub timestamps: bool,
    /// The `?` marker may appear in channel data.
    pub missing: bool,
    /// Exactly one channel per instance.
    pub univariate: bool,
    /// Every channel index has the same length across instances.
    pub equal_length: bool,
    /// Each record ends with a target segment.
    pub target_label: bool,
    /// Permitted class labels. `None` for regression or unlabelled data.
    pub class_labels: Option<BTreeSet<String>>,
    /// Declared `@seriesLength`, if any.
    pub series_length: Option<usize>,
    /// Declared `@dimensions`, if any.
    pub dimensions: Option<usize>,
}

// ---------------------------------------------------------------------------
// Target – the trailing segment of a record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Target {
    /// Classification target.
    Label(String),
    /// Regression target.
    Value(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetKind {
    Classification,
    Regression,
}

impl Target {
    pub fn kind(&self) -> TargetKind {
        match self {
            Target::Label(_) => TargetKind::Classification,
            Target::Value(_) => TargetKind::Regression,
        }
    }

    pub fn as_label(&self) -> Option<&str> {
        match self {
            Target::Label(s) => Some(s),
            Target::Value(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Target::Value(v) => Some(*v),
            Target::Label(_) => None,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Label(s) => write!(f, "{s}"),
            Target::Value(v) => write!(f, "{v}"),
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Classification => write!(f, "class label"),
            TargetKind::Regression => write!(f, "numeric value"),
        }
    }
}

// ---------------------------------------------------------------------------
// Channel / Instance – one record of the body
// ---------------------------------------------------------------------------

/// A single series within an instance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Channel {
    /// Point values; `None` marks a `?` in the source.
    pub values: Vec<Option<f64>>,
    /// Per-point timestamps, same length as `values`. Only for timestamped data.
    pub timestamps: Option<Vec<f64>>,
}

impl Channel {
    pub fn from_values(values: Vec<Option<f64>>) -> Self {
        Self {
            values,
            timestamps: None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of missing points.
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub channels: Vec<Channel>,
    pub target: Option<Target>,
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded file
// ---------------------------------------------------------------------------

/// A fully loaded and validated `.ts` file. Instances keep file order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub metadata: Metadata,
    pub instances: Vec<Instance>,
}

impl Dataset {
    /// Number of instances.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Channel count shared by every instance.
    pub fn n_channels(&self) -> usize {
        self.instances.first().map_or(0, |i| i.channels.len())
    }

    /// Shortest and longest channel length over the whole dataset.
    pub fn series_length_range(&self) -> Option<(usize, usize)> {
        self.instances
            .iter()
            .flat_map(|i| i.channels.iter().map(Channel::len))
            .fold(None, |acc, len| match acc {
                None => Some((len, len)),
                Some((lo, hi)) => Some((lo.min(len), hi.max(len))),
            })
    }

    pub fn target_kind(&self) -> Option<TargetKind> {
        self.instances
            .iter()
            .find_map(|i| i.target.as_ref().map(Target::kind))
    }

    /// Whether any point in the dataset is missing.
    pub fn has_missing(&self) -> bool {
        self.instances
            .iter()
            .flat_map(|i| &i.channels)
            .any(|c| c.missing_count() > 0)
    }
}
