//! Sample predicates and filtering.
//!
//! Filtering never touches the source set; it always returns a new
//! `SampleSet` holding the matching samples in their original order.

use crate::capture::{CallstackSample, CaptureModel, SampleSet, ThreadId};
use log::debug;
use std::collections::{BTreeSet, HashSet};

/// Which samples a selection keeps
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SamplePredicate {
    /// Samples with `start_ns <= timestamp_ns <= end_ns`
    TimeRange { start_ns: i64, end_ns: i64 },
    Thread(ThreadId),
    Threads(BTreeSet<ThreadId>),
    /// Samples at exactly these timestamps (e.g. those under a selected track region)
    Timestamps(HashSet<i64>),
    /// Samples matching every inner predicate
    All(Vec<SamplePredicate>),
}

impl SamplePredicate {
    pub fn matches(&self, sample: &CallstackSample) -> bool {
        match self {
            SamplePredicate::TimeRange { start_ns, end_ns } => {
                (*start_ns..=*end_ns).contains(&sample.timestamp_ns)
            }
            SamplePredicate::Thread(thread_id) => sample.thread_id == *thread_id,
            SamplePredicate::Threads(threads) => threads.contains(&sample.thread_id),
            SamplePredicate::Timestamps(timestamps) => timestamps.contains(&sample.timestamp_ns),
            SamplePredicate::All(predicates) => predicates.iter().all(|p| p.matches(sample)),
        }
    }

    /// Short human-readable description
    pub fn describe(&self) -> String {
        match self {
            SamplePredicate::TimeRange { start_ns, end_ns } => {
                format!("time {}..={} ns", start_ns, end_ns)
            }
            SamplePredicate::Thread(thread_id) => format!("thread {}", thread_id),
            SamplePredicate::Threads(threads) => {
                let ids: Vec<String> = threads.iter().map(|t| t.to_string()).collect();
                format!("threads {}", ids.join(","))
            }
            SamplePredicate::Timestamps(timestamps) => {
                format!("{} selected timestamps", timestamps.len())
            }
            SamplePredicate::All(predicates) => {
                let parts: Vec<String> = predicates.iter().map(|p| p.describe()).collect();
                parts.join(" and ")
            }
        }
    }
}

/// Select samples of a capture
///
/// **Public** - main entry point for selections
pub fn filter(model: &CaptureModel, predicate: &SamplePredicate) -> SampleSet {
    filter_samples(model.samples(), predicate)
}

/// Select samples from an existing set
pub fn filter_samples(samples: &SampleSet, predicate: &SamplePredicate) -> SampleSet {
    let selected = filter_with(samples, |s| predicate.matches(s));
    debug!(
        "Selection '{}' kept {} of {} samples",
        predicate.describe(),
        selected.len(),
        samples.len()
    );
    selected
}

/// Select samples with an arbitrary predicate
pub fn filter_with(samples: &SampleSet, predicate: impl Fn(&CallstackSample) -> bool) -> SampleSet {
    samples.iter().copied().filter(|s| predicate(s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> SampleSet {
        (0..10)
            .map(|i| CallstackSample {
                timestamp_ns: i * 100,
                thread_id: (i % 3) as u32,
                callstack_id: 1,
            })
            .collect()
    }

    #[test]
    fn test_time_range_is_inclusive() {
        let selected = filter_samples(
            &samples(),
            &SamplePredicate::TimeRange {
                start_ns: 200,
                end_ns: 500,
            },
        );
        let stamps: Vec<i64> = selected.iter().map(|s| s.timestamp_ns).collect();
        assert_eq!(stamps, vec![200, 300, 400, 500]);
    }

    #[test]
    fn test_thread_filters() {
        let all = samples();
        assert_eq!(filter_samples(&all, &SamplePredicate::Thread(0)).len(), 4);

        let threads = SamplePredicate::Threads([1, 2].into_iter().collect());
        assert_eq!(filter_samples(&all, &threads).len(), 6);
    }

    #[test]
    fn test_timestamps_and_conjunction() {
        let all = samples();
        let predicate = SamplePredicate::All(vec![
            SamplePredicate::Timestamps([0, 300, 600, 700].into_iter().collect()),
            SamplePredicate::Thread(0),
        ]);

        let selected = filter_samples(&all, &predicate);
        let stamps: Vec<i64> = selected.iter().map(|s| s.timestamp_ns).collect();
        assert_eq!(stamps, vec![0, 300, 600]);
        assert!(predicate.describe().contains(" and thread 0"));
    }

    #[test]
    fn test_source_set_untouched() {
        let all = samples();
        let selected = filter_with(&all, |_| false);

        assert!(selected.is_empty());
        assert_eq!(all.len(), 10);
    }
}
