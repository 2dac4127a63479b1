//! Immutable, cheaply clonable collections of callstack samples.

use super::model::CallstackSample;
use std::sync::Arc;

/// An ordered, immutable set of samples
///
/// Either every sample of a capture or a filtered subset of them. Filtering
/// always produces a new set; clones share the same storage.
#[derive(Debug, Clone)]
pub struct SampleSet {
    samples: Arc<[CallstackSample]>,
}

impl SampleSet {
    pub fn new(samples: Vec<CallstackSample>) -> Self {
        Self {
            samples: samples.into(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CallstackSample> {
        self.samples.iter()
    }

    pub fn as_slice(&self) -> &[CallstackSample] {
        &self.samples
    }
}

impl Default for SampleSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl FromIterator<CallstackSample> for SampleSet {
    fn from_iter<I: IntoIterator<Item = CallstackSample>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a SampleSet {
    type Item = &'a CallstackSample;
    type IntoIter = std::slice::Iter<'a, CallstackSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
