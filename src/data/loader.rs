use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use log::{debug, info};

use super::body::BodyParser;
use super::error::LoadError;
use super::grammar::Grammar;
use super::header::parse_header;
use super::model::{Dataset, Metadata, TargetKind};
use super::validate::validate;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Parse and validate the full text of a `.ts` file.
///
/// All-or-nothing: the first problem aborts the load and is reported with
/// the 1-based line it was found on.
pub fn load(text: &str) -> Result<Dataset, LoadError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l));

    let header = parse_header(&mut lines)?;
    let grammar = Grammar::from_metadata(&header.metadata);
    debug!("record grammar: {grammar:?}");

    let mut parser = BodyParser::new(&grammar);
    let mut end_line = header.data_line;
    for (line_no, line) in lines {
        end_line = line_no;
        parser.push_line(line_no, line)?;
    }
    let body = parser.finish();

    validate(&header.metadata, &body, end_line)?;

    // Inferred classification keeps the labels it saw; regression keeps none.
    let class_labels = match (header.metadata.class_labels, body.target_kind) {
        (Some(declared), _) => Some(declared),
        (None, Some(TargetKind::Classification)) => Some(body.observed_labels),
        (None, _) => None,
    };

    let dataset = Dataset {
        metadata: Metadata {
            class_labels,
            ..header.metadata
        },
        instances: body.instances,
    };
    debug!(
        "loaded '{}': {} instances, {} channel(s)",
        dataset.metadata.problem_name,
        dataset.len(),
        dataset.n_channels()
    );
    Ok(dataset)
}

/// Read a `.ts` file from disk and load it.
pub fn load_file(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let dataset = load(&text).with_context(|| format!("loading {}", path.display()))?;
    info!("loaded {} ({} instances)", path.display(), dataset.len());
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Train / test splits
// ---------------------------------------------------------------------------

/// Where to find the train/test pair of a problem.
///
/// Files live at `<problem_path>/<dataset>/<dataset>[<resample>]_TRAIN.ts`
/// and the matching `_TEST.ts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitRequest {
    pub problem_path: PathBuf,
    pub dataset: String,
    pub resample_id: Option<u32>,
    /// Use the `<dataset><resample>_TRAIN.ts` files shipped with the problem.
    pub predefined_resample: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub train: Dataset,
    pub test: Dataset,
    /// The caller still has to resample the pair itself.
    pub resample: bool,
}

impl SplitRequest {
    pub fn new(problem_path: impl Into<PathBuf>, dataset: impl Into<String>) -> Self {
        Self {
            problem_path: problem_path.into(),
            dataset: dataset.into(),
            resample_id: None,
            predefined_resample: false,
        }
    }

    pub fn with_resample(mut self, resample_id: u32, predefined: bool) -> Self {
        self.resample_id = Some(resample_id);
        self.predefined_resample = predefined;
        self
    }

    fn uses_predefined(&self) -> bool {
        self.predefined_resample && self.resample_id.is_some()
    }

    /// Paths of the train and test files.
    pub fn paths(&self) -> (PathBuf, PathBuf) {
        let suffix = match self.resample_id {
            Some(id) if self.uses_predefined() => id.to_string(),
            _ => String::new(),
        };
        let dir = self.problem_path.join(&self.dataset);
        (
            dir.join(format!("{}{suffix}_TRAIN.ts", self.dataset)),
            dir.join(format!("{}{suffix}_TEST.ts", self.dataset)),
        )
    }

    /// Whether the loaded pair still needs resampling by the caller.
    pub fn needs_resample(&self) -> bool {
        !self.uses_predefined() && self.resample_id != Some(0)
    }
}

/// Load both halves of a problem and check they describe the same data.
pub fn load_split(request: &SplitRequest) -> Result<Split> {
    let (train_path, test_path) = request.paths();
    let train = load_file(&train_path)?;
    let test = load_file(&test_path)?;

    if train.n_channels() != test.n_channels() {
        bail!(
            "{}: train has {} channel(s) but test has {}",
            request.dataset,
            train.n_channels(),
            test.n_channels()
        );
    }
    if train.metadata.target_label != test.metadata.target_label {
        bail!(
            "{}: train and test disagree on whether records carry a target",
            request.dataset
        );
    }

    Ok(Split {
        train,
        test,
        resample: request.needs_resample(),
    })
}
