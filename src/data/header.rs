use std::collections::BTreeSet;

use log::{debug, warn};

use super::error::{LoadError, LoadErrorKind, Result};
use super::model::Metadata;

/// The parsed header plus the line on which `@data` appeared.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub metadata: Metadata,
    pub data_line: usize,
}

/// Consume numbered lines up to and including `@data`.
///
/// The iterator is left positioned on the first body line.
pub fn parse_header<'a, I>(lines: &mut I) -> Result<Header>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    let mut builder = HeaderBuilder::default();
    let mut last_line = 0;

    for (line_no, raw) in lines.by_ref() {
        last_line = line_no;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some(directive) = line.strip_prefix('@') else {
            return Err(LoadError::new(
                line_no,
                LoadErrorKind::MalformedHeaderLine(line.to_string()),
            ));
        };

        let (key, value) = match directive.split_once(char::is_whitespace) {
            Some((k, v)) => (k, v.trim()),
            None => (directive, ""),
        };

        if key.eq_ignore_ascii_case("data") {
            let metadata = builder
                .finish()
                .map_err(|kind| LoadError::new(line_no, kind))?;
            debug!(
                "header of '{}' ends on line {line_no}",
                metadata.problem_name
            );
            return Ok(Header {
                metadata,
                data_line: line_no,
            });
        }

        builder
            .apply(key, value)
            .map_err(|kind| LoadError::new(line_no, kind))?;
    }

    Err(LoadError::new(
        last_line.max(1),
        LoadErrorKind::MissingSentinel,
    ))
}

// ---------------------------------------------------------------------------
// Directive accumulation
// ---------------------------------------------------------------------------

/// `None` = never declared. `class_label` is `Some(None)` for `@classLabel false`.
#[derive(Debug, Default)]
struct HeaderBuilder {
    problem_name: Option<String>,
    timestamps: Option<bool>,
    missing: Option<bool>,
    univariate: Option<bool>,
    equal_length: Option<bool>,
    target_label: Option<bool>,
    class_label: Option<Option<BTreeSet<String>>>,
    series_length: Option<usize>,
    dimensions: Option<usize>,
}

impl HeaderBuilder {
    fn apply(&mut self, key: &str, value: &str) -> std::result::Result<(), LoadErrorKind> {
        match key.to_ascii_lowercase().as_str() {
            "problemname" => set_once(&mut self.problem_name, "problemName", value.to_string()),
            "timestamps" => set_once(&mut self.timestamps, "timestamps", parse_bool(key, value)?),
            "missing" => set_once(&mut self.missing, "missing", parse_bool(key, value)?),
            "univariate" => set_once(&mut self.univariate, "univariate", parse_bool(key, value)?),
            "equallength" => {
                set_once(&mut self.equal_length, "equalLength", parse_bool(key, value)?)
            }
            "targetlabel" => {
                set_once(&mut self.target_label, "targetlabel", parse_bool(key, value)?)
            }
            "classlabel" => set_once(&mut self.class_label, "classLabel", parse_labels(key, value)?),
            "serieslength" => {
                set_once(&mut self.series_length, "seriesLength", parse_count(key, value)?)
            }
            "dimensions" => set_once(&mut self.dimensions, "dimensions", parse_count(key, value)?),
            _ => {
                warn!("ignoring unknown header directive @{key}");
                Ok(())
            }
        }
    }

    fn finish(self) -> std::result::Result<Metadata, LoadErrorKind> {
        // Any @classLabel declaration also settles whether a target is present.
        let target_label = match (self.target_label, &self.class_label) {
            (Some(false), Some(Some(_))) => {
                return Err(LoadErrorKind::HeaderValue {
                    key: "classLabel".into(),
                    reason: "a label set is declared but @targetlabel is false".into(),
                })
            }
            (Some(t), _) => Some(t),
            (None, Some(labels)) => Some(labels.is_some()),
            (None, None) => None,
        };

        let mut absent = Vec::new();
        if self.timestamps.is_none() {
            absent.push("timestamps");
        }
        if self.missing.is_none() {
            absent.push("missing");
        }
        if self.univariate.is_none() {
            absent.push("univariate");
        }
        if self.equal_length.is_none() {
            absent.push("equalLength");
        }
        if target_label.is_none() {
            absent.push("targetlabel");
        }

        let (
            Some(timestamps),
            Some(missing),
            Some(univariate),
            Some(equal_length),
            Some(target_label),
        ) = (
            self.timestamps,
            self.missing,
            self.univariate,
            self.equal_length,
            target_label,
        )
        else {
            return Err(LoadErrorKind::IncompleteHeader(absent));
        };

        if univariate && self.dimensions.is_some_and(|d| d != 1) {
            return Err(LoadErrorKind::HeaderValue {
                key: "dimensions".into(),
                reason: "a univariate dataset has exactly one dimension".into(),
            });
        }

        Ok(Metadata {
            problem_name: self.problem_name.unwrap_or_default(),
            timestamps,
            missing,
            univariate,
            equal_length,
            target_label,
            class_labels: self.class_label.flatten(),
            series_length: self.series_length,
            dimensions: self.dimensions,
        })
    }
}

fn set_once<T>(slot: &mut Option<T>, name: &str, value: T) -> std::result::Result<(), LoadErrorKind> {
    if slot.is_some() {
        return Err(LoadErrorKind::DuplicateHeaderKey(name.to_string()));
    }
    *slot = Some(value);
    Ok(())
}

fn parse_bool(key: &str, value: &str) -> std::result::Result<bool, LoadErrorKind> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(LoadErrorKind::HeaderValue {
            key: key.to_string(),
            reason: format!("expected true or false, found '{value}'"),
        })
    }
}

fn parse_count(key: &str, value: &str) -> std::result::Result<usize, LoadErrorKind> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(LoadErrorKind::HeaderValue {
            key: key.to_string(),
            reason: format!("expected a positive integer, found '{value}'"),
        }),
    }
}

/// `true label1 label2 ...` or `false`.
fn parse_labels(
    key: &str,
    value: &str,
) -> std::result::Result<Option<BTreeSet<String>>, LoadErrorKind> {
    let mut words = value.split_whitespace();
    let flag = parse_bool(key, words.next().unwrap_or(""))?;
    let labels: Vec<&str> = words.collect();

    if !flag {
        if !labels.is_empty() {
            return Err(LoadErrorKind::HeaderValue {
                key: key.to_string(),
                reason: "labels listed after false".into(),
            });
        }
        return Ok(None);
    }

    if labels.is_empty() {
        return Err(LoadErrorKind::HeaderValue {
            key: key.to_string(),
            reason: "true must be followed by at least one label".into(),
        });
    }

    let mut set = BTreeSet::new();
    for label in labels {
        if !set.insert(label.to_string()) {
            return Err(LoadErrorKind::HeaderValue {
                key: key.to_string(),
                reason: format!("label '{label}' listed twice"),
            });
        }
    }
    Ok(Some(set))
}
