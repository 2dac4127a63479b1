//! Full-capture and selection trees side by side.

use super::filter::{filter_samples, filter_with, SamplePredicate};
use crate::aggregator::{build_tree_pair, BuildOptions, TreePair};
use crate::capture::{CallstackSample, CaptureInfo, CaptureModel, SampleSet};
use log::{info, warn};
use std::sync::Arc;

/// Outcome of applying a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionStatus {
    /// The selection kept this many samples
    Samples(usize),
    /// No sample matched; the selection trees are empty
    EmptySelection,
}

impl SelectionStatus {
    fn from_count(count: usize) -> Self {
        if count == 0 {
            SelectionStatus::EmptySelection
        } else {
            SelectionStatus::Samples(count)
        }
    }
}

/// A sample subset and the trees built from it
#[derive(Debug, Clone)]
pub struct Selection {
    pub description: String,
    pub samples: SampleSet,
    pub trees: TreePair,
    pub status: SelectionStatus,
}

/// The trees a presentation layer shows for one capture
///
/// Full-capture trees are built once. Each selection builds its own pair;
/// replacing or clearing it never touches the full trees.
#[derive(Debug, Clone)]
pub struct CallstackViews {
    info: Arc<CaptureInfo>,
    samples: SampleSet,
    options: BuildOptions,
    full: TreePair,
    selection: Option<Selection>,
}

impl CallstackViews {
    pub fn new(model: &CaptureModel, options: BuildOptions) -> Self {
        let info = Arc::clone(model.info());
        let samples = model.samples().clone();
        let full = build_tree_pair(&samples, &info, &options);

        Self {
            info,
            samples,
            options,
            full,
            selection: None,
        }
    }

    pub fn full(&self) -> &TreePair {
        &self.full
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Selection trees if a selection is active, full trees otherwise
    pub fn active(&self) -> &TreePair {
        self.selection
            .as_ref()
            .map(|s| &s.trees)
            .unwrap_or(&self.full)
    }

    /// Replace the selection with the samples matching `predicate`
    pub fn select(&mut self, predicate: &SamplePredicate) -> SelectionStatus {
        let samples = filter_samples(&self.samples, predicate);
        self.set_selection(predicate.describe(), samples)
    }

    /// Replace the selection using an arbitrary predicate
    pub fn select_with(
        &mut self,
        description: impl Into<String>,
        predicate: impl Fn(&CallstackSample) -> bool,
    ) -> SelectionStatus {
        let samples = filter_with(&self.samples, predicate);
        self.set_selection(description.into(), samples)
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    fn set_selection(&mut self, description: String, samples: SampleSet) -> SelectionStatus {
        let status = SelectionStatus::from_count(samples.len());
        match status {
            SelectionStatus::EmptySelection => {
                warn!("Selection '{}' matched no samples", description)
            }
            SelectionStatus::Samples(count) => {
                info!("Selection '{}': {} samples", description, count)
            }
        }

        let trees = build_tree_pair(&samples, &self.info, &self.options);
        self.selection = Some(Selection {
            description,
            samples,
            trees,
            status,
        });
        status
    }
}
