//! Zone-run segmentation, fixed-count windows and range selection.

use serde::Serialize;

use crate::error::AnalysisError;
use crate::types::{DerivedSample, Metric};
use crate::zones::Zone;

/// A maximal run of consecutive samples sharing one zone (`None` = unclassified).
///
/// Runs partition the series: `start..end` of consecutive runs are adjacent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub zone: Option<Zone>,
    pub start: usize,
    /// exclusive
    pub end: usize,
    pub start_elapsed_s: f64,
    pub end_elapsed_s: f64,
}

impl Segment {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Unclassified runs break lines but are not drawn.
    pub fn is_renderable(&self) -> bool {
        self.zone.is_some()
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.start..self.end]
    }
}

/// Splits the series into runs of equal zone in one pass.
pub fn zone_runs(samples: &[DerivedSample]) -> Vec<Segment> {
    let mut out: Vec<Segment> = Vec::new();
    for (i, s) in samples.iter().enumerate() {
        match out.last_mut() {
            Some(last) if last.zone == s.hr_zone => {
                last.end = i + 1;
                last.end_elapsed_s = s.elapsed_s;
            }
            _ => out.push(Segment {
                zone: s.hr_zone,
                start: i,
                end: i + 1,
                start_elapsed_s: s.elapsed_s,
                end_elapsed_s: s.elapsed_s,
            }),
        }
    }
    out
}

/// Only the runs with a zone.
pub fn renderable_segments(segments: &[Segment]) -> impl Iterator<Item = &Segment> + '_ {
    segments.iter().filter(|s| s.is_renderable())
}

/// One of N contiguous equal-count partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub index: usize,
    pub start: usize,
    /// exclusive
    pub end: usize,
}

impl Window {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.start..self.end]
    }
}

/// Splits `len` samples into `count` windows by sample count. The first
/// `len % count` windows take one extra sample.
pub fn partition(len: usize, count: usize) -> Result<Vec<Window>, AnalysisError> {
    if count == 0 {
        return Err(AnalysisError::InvalidParameter("window count must be >= 1".into()));
    }
    if len < count {
        return Err(AnalysisError::InsufficientSamples {
            needed: count,
            got: len,
        });
    }
    let base = len / count;
    let extra = len % count;
    let mut start = 0;
    Ok((0..count)
        .map(|index| {
            let size = base + usize::from(index < extra);
            let w = Window {
                index,
                start,
                end: start + size,
            };
            start += size;
            w
        })
        .collect())
}

/// Indices of samples whose `metric` lies within `[min, max]`.
pub fn select_range(
    samples: &[DerivedSample],
    metric: Metric,
    min: f64,
    max: f64,
) -> Result<Vec<usize>, AnalysisError> {
    if !(min <= max) {
        return Err(AnalysisError::InvalidParameter(format!(
            "range [{min}, {max}] is empty"
        )));
    }
    Ok(samples
        .iter()
        .enumerate()
        .filter(|(_, s)| matches!(s.metric(metric), Some(v) if v >= min && v <= max))
        .map(|(i, _)| i)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_spreads_remainder_to_front() {
        let w = partition(10, 3).unwrap();
        let sizes: Vec<usize> = w.iter().map(|w| w.len()).collect();
        assert_eq!(sizes, vec![4, 3, 3]);
        assert_eq!(w[2].end, 10);
    }

    #[test]
    fn partition_rejects_short_series() {
        assert_eq!(
            partition(2, 3),
            Err(AnalysisError::InsufficientSamples { needed: 3, got: 2 })
        );
        assert!(matches!(partition(5, 0), Err(AnalysisError::InvalidParameter(_))));
    }
}
