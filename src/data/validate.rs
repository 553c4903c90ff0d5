use super::body::ParsedBody;
use super::error::{LoadError, LoadErrorKind, Result};
use super::model::{Channel, Metadata, Target};

/// Dataset-wide checks run once the whole body is parsed.
///
/// `end_line` is reported when the failure has no single offending record.
pub fn validate(metadata: &Metadata, body: &ParsedBody, end_line: usize) -> Result<()> {
    let Some(first) = body.instances.first() else {
        return Err(LoadError::new(end_line, LoadErrorKind::NoInstances));
    };
    if body.instances.len() != body.line_numbers.len() {
        return Err(LoadError::new(
            end_line,
            LoadErrorKind::InternalInvariant(format!(
                "{} instances but {} line numbers",
                body.instances.len(),
                body.line_numbers.len()
            )),
        ));
    }

    let first_line = body.line_numbers[0];
    let n_channels = first.channels.len();
    let first_lengths: Vec<usize> = first.channels.iter().map(Channel::len).collect();

    for (inst, &line) in body.instances.iter().zip(&body.line_numbers) {
        if inst.channels.len() != n_channels {
            return Err(LoadError::new(
                line,
                LoadErrorKind::InternalInvariant(format!(
                    "channel count {} slipped past the parser (expected {n_channels})",
                    inst.channels.len()
                )),
            ));
        }
        if let Some(channel) = inst.channels.iter().position(Channel::is_empty) {
            return Err(LoadError::new(
                line,
                LoadErrorKind::InternalInvariant(format!(
                    "empty channel {channel} slipped past the parser"
                )),
            ));
        }
        if metadata.equal_length {
            let lengths: Vec<usize> = inst.channels.iter().map(Channel::len).collect();
            if lengths != first_lengths {
                return Err(LoadError::new(
                    line,
                    LoadErrorKind::InternalInvariant(format!(
                        "unequal lengths {lengths:?} slipped past the parser (expected {first_lengths:?})"
                    )),
                ));
            }
        }
    }

    if let Some(declared) = metadata.dimensions {
        if declared != n_channels {
            return Err(LoadError::new(
                first_line,
                LoadErrorKind::ChannelCountMismatch {
                    expected: declared,
                    found: n_channels,
                },
            ));
        }
    }

    if let (true, Some(declared)) = (metadata.equal_length, metadata.series_length) {
        if let Some((channel, &found)) = first_lengths.iter().enumerate().find(|&(_, &l)| l != declared) {
            return Err(LoadError::new(
                first_line,
                LoadErrorKind::LengthMismatch {
                    channel,
                    expected: declared,
                    found,
                },
            ));
        }
    }

    if let Some(declared) = &metadata.class_labels {
        for (inst, &line) in body.instances.iter().zip(&body.line_numbers) {
            if let Some(Target::Label(label)) = &inst.target {
                if !declared.contains(label) {
                    return Err(LoadError::new(line, LoadErrorKind::UnknownLabel(label.clone())));
                }
            }
        }
    }

    Ok(())
}
