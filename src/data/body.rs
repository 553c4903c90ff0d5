use std::collections::BTreeSet;

use super::error::{LoadError, LoadErrorKind, Result};
use super::grammar::{Grammar, TargetPolicy, MISSING_MARKER};
use super::model::{Channel, Instance, Target, TargetKind};
use super::tokenizer::{pair_tokens, tokenize};

/// Everything the body parser learned, ready for validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBody {
    pub instances: Vec<Instance>,
    /// Source line of each instance, parallel to `instances`.
    pub line_numbers: Vec<usize>,
    pub target_kind: Option<TargetKind>,
    pub observed_labels: BTreeSet<String>,
}

/// Incremental record parser. Feed it every line after `@data`.
#[derive(Debug)]
pub struct BodyParser<'g> {
    grammar: &'g Grammar,
    expected_channels: Option<usize>,
    expected_lengths: Vec<usize>,
    target_kind: Option<TargetKind>,
    observed_labels: BTreeSet<String>,
    instances: Vec<Instance>,
    line_numbers: Vec<usize>,
}

impl<'g> BodyParser<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            expected_channels: grammar.fixed_channels,
            expected_lengths: Vec::new(),
            target_kind: None,
            observed_labels: BTreeSet::new(),
            instances: Vec::new(),
            line_numbers: Vec::new(),
        }
    }

    /// Parse one body line. Blank lines are skipped.
    pub fn push_line(&mut self, line_no: usize, line: &str) -> Result<()> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }
        let instance = self
            .parse_record(line)
            .map_err(|kind| LoadError::new(line_no, kind))?;
        self.instances.push(instance);
        self.line_numbers.push(line_no);
        Ok(())
    }

    pub fn finish(self) -> ParsedBody {
        ParsedBody {
            instances: self.instances,
            line_numbers: self.line_numbers,
            target_kind: self.target_kind,
            observed_labels: self.observed_labels,
        }
    }

    fn parse_record(&mut self, line: &str) -> std::result::Result<Instance, LoadErrorKind> {
        if line
            .strip_prefix('@')
            .is_some_and(|rest| rest.trim().eq_ignore_ascii_case("data"))
        {
            return Err(LoadErrorKind::DuplicateHeaderKey("data".into()));
        }

        let delimiters = [self.grammar.channel_delimiter, self.grammar.point_delimiter];
        if tokenize(line, &delimiters).iter().all(|s| s.is_empty()) {
            return Err(LoadErrorKind::EmptyRecord);
        }
        let mut segments = tokenize(line, &[self.grammar.channel_delimiter]);

        let target_token = if self.grammar.has_target() {
            segments.pop()
        } else {
            None
        };

        self.check_channel_count(segments.len())?;

        let channels = segments
            .iter()
            .enumerate()
            .map(|(idx, seg)| self.parse_channel(idx, seg))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        if self.grammar.equal_length {
            self.check_lengths(&channels)?;
        }

        let target = match target_token {
            Some(token) => Some(self.parse_target(token)?),
            None => None,
        };

        Ok(Instance { channels, target })
    }

    fn check_channel_count(&mut self, found: usize) -> std::result::Result<(), LoadErrorKind> {
        match self.expected_channels {
            Some(expected) if expected != found => {
                Err(LoadErrorKind::ChannelCountMismatch { expected, found })
            }
            Some(_) => Ok(()),
            None if found == 0 => Err(LoadErrorKind::ChannelCountMismatch {
                expected: 1,
                found: 0,
            }),
            None => {
                self.expected_channels = Some(found);
                Ok(())
            }
        }
    }

    fn check_lengths(&mut self, channels: &[Channel]) -> std::result::Result<(), LoadErrorKind> {
        if self.expected_lengths.is_empty() {
            self.expected_lengths = channels.iter().map(Channel::len).collect();
            return Ok(());
        }
        for (channel, (ch, &expected)) in channels.iter().zip(&self.expected_lengths).enumerate() {
            if ch.len() != expected {
                return Err(LoadErrorKind::LengthMismatch {
                    channel,
                    expected,
                    found: ch.len(),
                });
            }
        }
        Ok(())
    }

    fn parse_channel(&self, channel: usize, segment: &str) -> std::result::Result<Channel, LoadErrorKind> {
        let malformed = |point: usize, token: &str| LoadErrorKind::MalformedPoint {
            channel,
            point,
            token: token.to_string(),
        };

        if segment.is_empty() {
            return Err(malformed(0, segment));
        }

        if !self.grammar.timestamped {
            let values = tokenize(segment, &[self.grammar.point_delimiter])
                .into_iter()
                .enumerate()
                .map(|(point, tok)| self.parse_point(channel, point, tok))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            return Ok(Channel::from_values(values));
        }

        let pairs = pair_tokens(segment).ok_or_else(|| malformed(0, segment))?;
        let mut timestamps = Vec::with_capacity(pairs.len());
        let mut values = Vec::with_capacity(pairs.len());
        for (point, (ts, val)) in pairs.into_iter().enumerate() {
            timestamps.push(parse_decimal(ts).ok_or_else(|| malformed(point, ts))?);
            values.push(self.parse_point(channel, point, val)?);
        }
        Ok(Channel {
            values,
            timestamps: Some(timestamps),
        })
    }

    fn parse_point(
        &self,
        channel: usize,
        point: usize,
        token: &str,
    ) -> std::result::Result<Option<f64>, LoadErrorKind> {
        if token == MISSING_MARKER {
            return if self.grammar.missing_allowed {
                Ok(None)
            } else {
                Err(LoadErrorKind::MissingValueNotAllowed { channel, point })
            };
        }
        parse_decimal(token)
            .map(Some)
            .ok_or_else(|| LoadErrorKind::MalformedPoint {
                channel,
                point,
                token: token.to_string(),
            })
    }

    fn parse_target(&mut self, token: &str) -> std::result::Result<Target, LoadErrorKind> {
        if token.is_empty() {
            return Err(LoadErrorKind::MissingTarget);
        }

        let target = match (self.grammar.target, parse_decimal(token)) {
            (TargetPolicy::Inferred, Some(v)) => Target::Value(v),
            _ => Target::Label(token.to_string()),
        };

        let found = target.kind();
        match self.target_kind {
            None => self.target_kind = Some(found),
            Some(expected) if expected != found => {
                return Err(LoadErrorKind::TargetKindMismatch {
                    token: token.to_string(),
                    expected,
                    found,
                })
            }
            Some(_) => {}
        }

        if let Target::Label(label) = &target {
            // Labels are listed space-separated on the @classLabel line.
            if label.contains(char::is_whitespace) {
                return Err(LoadErrorKind::MalformedLabel(label.clone()));
            }
            self.observed_labels.insert(label.clone());
        }
        Ok(target)
    }
}

/// A finite decimal number. `NaN` and infinities are not data.
fn parse_decimal(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Metadata;

    fn grammar(univariate: bool, missing: bool, equal_length: bool, target_label: bool) -> Grammar {
        Grammar::from_metadata(&Metadata {
            problem_name: String::new(),
            timestamps: false,
            missing,
            univariate,
            equal_length,
            target_label,
            class_labels: None,
            series_length: None,
            dimensions: None,
        })
    }

    fn parse_all(g: &Grammar, lines: &[&str]) -> Result<ParsedBody> {
        let mut parser = BodyParser::new(g);
        for (i, line) in lines.iter().enumerate() {
            parser.push_line(i + 1, line)?;
        }
        Ok(parser.finish())
    }

    #[test]
    fn multivariate_record_with_label() {
        let g = grammar(false, false, false, true);
        let body = parse_all(&g, &["1,2,3:4,5,6:classA"]).unwrap();
        let inst = &body.instances[0];
        assert_eq!(inst.channels.len(), 2);
        assert_eq!(inst.channels[0].values, vec![Some(1.0), Some(2.0), Some(3.0)]);
        assert_eq!(inst.channels[1].values, vec![Some(4.0), Some(5.0), Some(6.0)]);
        assert_eq!(inst.target, Some(Target::Label("classA".into())));
        assert_eq!(body.target_kind, Some(TargetKind::Classification));
        assert!(body.observed_labels.contains("classA"));
    }

    #[test]
    fn regression_target() {
        let g = grammar(true, false, false, true);
        let body = parse_all(&g, &["2.39,2.36:-0.4272497972616782"]).unwrap();
        assert_eq!(
            body.instances[0].target,
            Some(Target::Value(-0.4272497972616782))
        );
        assert!(body.observed_labels.is_empty());
    }

    #[test]
    fn no_target_means_every_segment_is_a_channel() {
        let g = grammar(false, false, false, false);
        let body = parse_all(&g, &["1,2:3,4:5"]).unwrap();
        assert_eq!(body.instances[0].channels.len(), 3);
        assert_eq!(body.instances[0].target, None);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let g = grammar(true, false, false, true);
        let body = parse_all(&g, &["", "1,2:0.5", "   ", "3:1.5"]).unwrap();
        assert_eq!(body.instances.len(), 2);
        assert_eq!(body.line_numbers, vec![2, 4]);
    }

    #[test]
    fn univariate_rejects_extra_channel() {
        let g = grammar(true, false, false, true);
        let err = parse_all(&g, &["1,2:3,4:0.5"]).unwrap_err();
        assert_eq!(
            err,
            LoadError::new(
                1,
                LoadErrorKind::ChannelCountMismatch {
                    expected: 1,
                    found: 2
                }
            )
        );
    }

    #[test]
    fn first_record_fixes_channel_count() {
        let g = grammar(false, false, false, true);
        let err = parse_all(&g, &["1:2:a", "1:2:b", "1:2:3:c"]).unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(
            err.kind,
            LoadErrorKind::ChannelCountMismatch {
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    fn target_only_record_has_no_channels() {
        let g = grammar(false, false, false, true);
        let err = parse_all(&g, &["classA"]).unwrap_err();
        assert!(matches!(
            err.kind,
            LoadErrorKind::ChannelCountMismatch { found: 0, .. }
        ));
    }

    #[test]
    fn equal_length_is_enforced_per_channel() {
        let g = grammar(false, false, true, false);
        let err = parse_all(&g, &["1,2:3", "4,5:6,7"]).unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(
            err.kind,
            LoadErrorKind::LengthMismatch {
                channel: 1,
                expected: 1,
                found: 2
            }
        );
    }

    #[test]
    fn unequal_length_is_free() {
        let g = grammar(true, false, false, false);
        let body = parse_all(&g, &["1,2,3", "4", "5,6"]).unwrap();
        let lens: Vec<_> = body.instances.iter().map(|i| i.channels[0].len()).collect();
        assert_eq!(lens, vec![3, 1, 2]);
    }

    #[test]
    fn missing_marker_policy() {
        let g = grammar(true, true, false, false);
        let body = parse_all(&g, &["1,?,3"]).unwrap();
        assert_eq!(body.instances[0].channels[0].values, vec![Some(1.0), None, Some(3.0)]);

        let g = grammar(true, false, false, false);
        let err = parse_all(&g, &["1,?,3"]).unwrap_err();
        assert_eq!(
            err.kind,
            LoadErrorKind::MissingValueNotAllowed {
                channel: 0,
                point: 1
            }
        );
    }

    #[test]
    fn malformed_points() {
        let g = grammar(true, true, false, false);
        for (line, token) in [("1,x,3", "x"), ("1,,3", ""), ("1,NaN", "NaN"), ("inf", "inf")] {
            let err = parse_all(&g, &[line]).unwrap_err();
            assert!(
                matches!(&err.kind, LoadErrorKind::MalformedPoint { token: t, .. } if t == token),
                "{line}: {err}"
            );
        }
    }

    #[test]
    fn empty_channel_is_malformed() {
        let g = grammar(false, false, false, true);
        let err = parse_all(&g, &["1,2::a"]).unwrap_err();
        assert_eq!(
            err.kind,
            LoadErrorKind::MalformedPoint {
                channel: 1,
                point: 0,
                token: String::new()
            }
        );
    }

    #[test]
    fn empty_record() {
        let g = grammar(false, false, false, true);
        let err = parse_all(&g, &[" : : "]).unwrap_err();
        assert_eq!(err.kind, LoadErrorKind::EmptyRecord);
    }

    #[test]
    fn point_delimiters_alone_are_an_empty_record() {
        let g = grammar(true, false, false, true);
        for line in [",,,", ",:,", " , : "] {
            let err = parse_all(&g, &[line]).unwrap_err();
            assert_eq!(err.kind, LoadErrorKind::EmptyRecord, "{line}");
        }
    }

    #[test]
    fn label_with_whitespace_is_rejected() {
        let g = grammar(true, false, false, true);
        let err = parse_all(&g, &["1,2:up", "3,4:class B"]).unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.kind, LoadErrorKind::MalformedLabel("class B".into()));
    }

    #[test]
    fn empty_target_segment() {
        let g = grammar(true, false, false, true);
        let err = parse_all(&g, &["1,2,3:"]).unwrap_err();
        assert_eq!(err.kind, LoadErrorKind::MissingTarget);
    }

    #[test]
    fn target_kind_is_fixed_by_first_record() {
        let g = grammar(true, false, false, true);
        let err = parse_all(&g, &["1:0.5", "2:1.5", "3:big"]).unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(
            err.kind,
            LoadErrorKind::TargetKindMismatch {
                token: "big".into(),
                expected: TargetKind::Regression,
                found: TargetKind::Classification
            }
        );

        let err = parse_all(&g, &["1:small", "2:1.5"]).unwrap_err();
        assert!(matches!(err.kind, LoadErrorKind::TargetKindMismatch { .. }));
    }

    #[test]
    fn declared_labels_keep_numeric_targets_as_labels() {
        let mut metadata = Metadata {
            problem_name: String::new(),
            timestamps: false,
            missing: false,
            univariate: true,
            equal_length: true,
            target_label: true,
            class_labels: Some(["1".to_string(), "2".to_string()].into_iter().collect()),
            series_length: None,
            dimensions: None,
        };
        let g = Grammar::from_metadata(&metadata);
        let body = parse_all(&g, &["1,2:1", "3,4:2"]).unwrap();
        assert_eq!(body.instances[1].target, Some(Target::Label("2".into())));
        metadata.class_labels = None;
        assert_eq!(Grammar::from_metadata(&metadata).target, TargetPolicy::Inferred);
    }

    #[test]
    fn second_data_sentinel_is_rejected() {
        let g = grammar(true, false, false, false);
        let err = parse_all(&g, &["1,2", "@data"]).unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.kind, LoadErrorKind::DuplicateHeaderKey("data".into()));
    }

    #[test]
    fn timestamped_channels() {
        let mut metadata = Metadata {
            problem_name: String::new(),
            timestamps: true,
            missing: true,
            univariate: false,
            equal_length: false,
            target_label: true,
            class_labels: None,
            series_length: None,
            dimensions: None,
        };
        let g = Grammar::from_metadata(&metadata);
        let body = parse_all(&g, &["(0,1.5),(1,?):(0,2),(2,3):7"]).unwrap();
        let inst = &body.instances[0];
        assert_eq!(inst.channels[0].values, vec![Some(1.5), None]);
        assert_eq!(inst.channels[0].timestamps, Some(vec![0.0, 1.0]));
        assert_eq!(inst.channels[1].timestamps, Some(vec![0.0, 2.0]));
        assert_eq!(inst.target, Some(Target::Value(7.0)));

        metadata.missing = false;
        let g = Grammar::from_metadata(&metadata);
        let err = parse_all(&g, &["(0,1.5),(1,?):(0,2):7"]).unwrap_err();
        assert!(matches!(err.kind, LoadErrorKind::MissingValueNotAllowed { .. }));
        let err = parse_all(&g, &["(0,1.5),(1:(0,2):7"]).unwrap_err();
        assert!(matches!(err.kind, LoadErrorKind::MalformedPoint { .. }));
    }
}
