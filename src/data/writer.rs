use std::fmt;

use super::grammar::{CHANNEL_DELIMITER, MISSING_MARKER, POINT_DELIMITER};
use super::model::{Channel, Dataset, Instance, Metadata};

/// Render a dataset back into `.ts` text.
///
/// Floats use the shortest representation that parses back to the same
/// value, so `load(&write_ts(&ds))` reproduces `ds`.
pub fn write_ts(dataset: &Dataset) -> String {
    TsText(dataset).to_string()
}

/// `.ts` rendering of a borrowed dataset.
pub struct TsText<'a>(pub &'a Dataset);

impl fmt::Display for TsText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_header(f, &self.0.metadata)?;
        for instance in &self.0.instances {
            write_record(f, instance)?;
        }
        Ok(())
    }
}

fn write_header(f: &mut fmt::Formatter<'_>, m: &Metadata) -> fmt::Result {
    if !m.problem_name.is_empty() {
        writeln!(f, "@problemName {}", m.problem_name)?;
    }
    writeln!(f, "@timestamps {}", m.timestamps)?;
    writeln!(f, "@missing {}", m.missing)?;
    writeln!(f, "@univariate {}", m.univariate)?;
    if let Some(d) = m.dimensions {
        writeln!(f, "@dimensions {d}")?;
    }
    writeln!(f, "@equalLength {}", m.equal_length)?;
    if let Some(n) = m.series_length {
        writeln!(f, "@seriesLength {n}")?;
    }
    if let Some(labels) = &m.class_labels {
        let joined: Vec<&str> = labels.iter().map(String::as_str).collect();
        writeln!(f, "@classLabel true {}", joined.join(" "))?;
    }
    writeln!(f, "@targetlabel {}", m.target_label)?;
    writeln!(f, "@data")
}

fn write_record(f: &mut fmt::Formatter<'_>, instance: &Instance) -> fmt::Result {
    for (i, channel) in instance.channels.iter().enumerate() {
        if i > 0 {
            write!(f, "{CHANNEL_DELIMITER}")?;
        }
        write_channel(f, channel)?;
    }
    if let Some(target) = &instance.target {
        write!(f, "{CHANNEL_DELIMITER}{target}")?;
    }
    writeln!(f)
}

fn write_channel(f: &mut fmt::Formatter<'_>, channel: &Channel) -> fmt::Result {
    for (i, value) in channel.values.iter().enumerate() {
        if i > 0 {
            write!(f, "{POINT_DELIMITER}")?;
        }
        let timestamp = channel.timestamps.as_ref().and_then(|ts| ts.get(i));
        if let Some(t) = timestamp {
            write!(f, "({t}{POINT_DELIMITER}")?;
        }
        match value {
            Some(v) => write!(f, "{v}")?,
            None => f.write_str(MISSING_MARKER)?,
        }
        if timestamp.is_some() {
            f.write_str(")")?;
        }
    }
    Ok(())
}
