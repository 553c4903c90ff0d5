use super::model::Metadata;

/// Separates channels from each other and from the trailing target.
pub const CHANNEL_DELIMITER: char = ':';
/// Separates points within a channel.
pub const POINT_DELIMITER: char = ',';
/// Stands in for an absent point.
pub const MISSING_MARKER: &str = "?";

/// How the trailing target segment of a record is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetPolicy {
    /// Records carry no target.
    Absent,
    /// The header declared a label set; every target is a label.
    Declared,
    /// Numeric if it parses as a decimal, otherwise a label. The first
    /// record decides the kind for the whole file.
    Inferred,
}

/// Record grammar for one dataset, derived once from its header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    pub channel_delimiter: char,
    pub point_delimiter: char,
    pub target: TargetPolicy,
    pub missing_allowed: bool,
    pub timestamped: bool,
    /// `Some(1)` for univariate data, `None` when the first record decides.
    pub fixed_channels: Option<usize>,
    pub equal_length: bool,
}

impl Grammar {
    pub fn from_metadata(metadata: &Metadata) -> Self {
        let target = match (metadata.target_label, &metadata.class_labels) {
            (false, _) => TargetPolicy::Absent,
            (true, Some(_)) => TargetPolicy::Declared,
            (true, None) => TargetPolicy::Inferred,
        };
        Self {
            channel_delimiter: CHANNEL_DELIMITER,
            point_delimiter: POINT_DELIMITER,
            target,
            missing_allowed: metadata.missing,
            timestamped: metadata.timestamps,
            fixed_channels: metadata.univariate.then_some(1),
            equal_length: metadata.equal_length,
        }
    }

    pub fn has_target(&self) -> bool {
        self.target != TargetPolicy::Absent
    }
}
