use std::collections::BTreeSet;

use super::model::{Dataset, Target};

// ---------------------------------------------------------------------------
// Filter predicate: which class labels are selected
// ---------------------------------------------------------------------------

/// Selected class labels. An empty selection matches nothing.
pub type LabelSelection = BTreeSet<String>;

/// Initialise a [`LabelSelection`] with every known label selected.
pub fn init_selection(dataset: &Dataset) -> LabelSelection {
    dataset.metadata.class_labels.clone().unwrap_or_default()
}

/// Return indices of instances whose class label is selected.
///
/// Instances without a label (regression or unlabelled data) never pass.
pub fn filtered_indices(dataset: &Dataset, selected: &LabelSelection) -> Vec<usize> {
    dataset
        .instances
        .iter()
        .enumerate()
        .filter(|(_, inst)| match &inst.target {
            Some(Target::Label(label)) => selected.contains(label),
            _ => false,
        })
        .map(|(i, _)| i)
        .collect()
}

/// Copy the instances at `indices` into a new dataset with the same metadata.
pub fn subset(dataset: &Dataset, indices: &[usize]) -> Dataset {
    Dataset {
        metadata: dataset.metadata.clone(),
        instances: indices
            .iter()
            .filter_map(|&i| dataset.instances.get(i).cloned())
            .collect(),
    }
}
