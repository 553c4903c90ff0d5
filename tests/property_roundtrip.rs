use proptest::collection::vec;
use proptest::prelude::*;
use rusty_ts::{load, write_ts, Channel, Dataset, Instance, LoadErrorKind, Metadata, Target};

fn point(missing: bool) -> BoxedStrategy<Option<f64>> {
    let value = (-1.0e6f64..1.0e6).prop_map(Some);
    if missing {
        prop_oneof![4 => value, 1 => Just(None)].boxed()
    } else {
        value.boxed()
    }
}

/// A dataset that satisfies every header invariant it declares.
fn dataset() -> impl Strategy<Value = Dataset> {
    (
        any::<bool>(),
        any::<bool>(),
        1usize..4,
        1usize..8,
        any::<bool>(),
        0u8..3,
    )
        .prop_flat_map(|(missing, equal_length, n_channels, base_len, univariate, target)| {
            let n_channels = if univariate { 1 } else { n_channels };
            let channel = move || {
                let len = if equal_length { base_len..base_len + 1 } else { 1..10 };
                vec(point(missing), len).prop_map(Channel::from_values)
            };
            let target = match target {
                0 => Just(None).boxed(),
                1 => (-100.0f64..100.0).prop_map(|v| Some(Target::Value(v))).boxed(),
                _ => "[a-z]{1,6}".prop_map(|s| Some(Target::Label(s))).boxed(),
            };
            let instance = (vec(channel(), n_channels), target)
                .prop_map(|(channels, target)| Instance { channels, target });
            vec(instance, 1..12).prop_map(move |instances| {
                let target_label = instances[0].target.is_some();
                let labels: std::collections::BTreeSet<String> = instances
                    .iter()
                    .filter_map(|i| i.target.as_ref().and_then(Target::as_label))
                    .map(str::to_string)
                    .collect();
                Dataset {
                    metadata: Metadata {
                        problem_name: "Prop".into(),
                        timestamps: false,
                        missing,
                        univariate,
                        equal_length,
                        target_label,
                        class_labels: (!labels.is_empty()).then_some(labels),
                        series_length: None,
                        dimensions: None,
                    },
                    instances,
                }
            })
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_write_then_load_is_identity(ds in dataset()) {
        let text = write_ts(&ds);
        let back = load(&text).map_err(|e| TestCaseError::fail(format!("{e}\n{text}")))?;
        prop_assert_eq!(back, ds);
    }

    #[test]
    fn prop_load_is_deterministic(ds in dataset()) {
        let text = write_ts(&ds);
        prop_assert_eq!(load(&text), load(&text));
    }

    #[test]
    fn prop_missing_marker_rejected_when_disallowed(
        values in vec(-10.0f64..10.0, 2..10),
        at in any::<prop::sample::Index>(),
    ) {
        let mut tokens: Vec<String> = values.iter().map(f64::to_string).collect();
        let idx = at.index(tokens.len());
        tokens[idx] = "?".to_string();
        let text = format!(
            "@timestamps false\n@missing false\n@univariate true\n@equalLength false\n\
             @targetlabel false\n@data\n{}\n",
            tokens.join(",")
        );
        let err = load(&text).unwrap_err();
        prop_assert_eq!(
            err.kind,
            LoadErrorKind::MissingValueNotAllowed { channel: 0, point: idx }
        );
    }
}
