use pacelens_core::segment::{renderable_segments, select_range};
use pacelens_core::{analyze_session, partition, Cfg, Metric, RawTable, Zone};
use serde_json::json;

const T0: i64 = 1_714_557_600;

#[test]
fn nine_samples_in_three_windows() {
    let w = partition(9, 3).unwrap();
    let bounds: Vec<_> = w.iter().map(|w| (w.start, w.end)).collect();
    assert_eq!(bounds, vec![(0, 3), (3, 6), (6, 9)]);
}

#[test]
fn windows_partition_the_samples() {
    for len in 1..40 {
        for count in 1..=len.min(7) {
            let w = partition(len, count).unwrap();
            assert_eq!(w.len(), count);
            assert_eq!(w[0].start, 0);
            assert_eq!(w[count - 1].end, len);
            assert!(w.windows(2).all(|p| p[0].end == p[1].start));
            let (min, max) = w.iter().fold((usize::MAX, 0), |(lo, hi), x| {
                (lo.min(x.len()), hi.max(x.len()))
            });
            assert!(max - min <= 1, "len {len} count {count}");
        }
    }
}

#[test]
fn zone_runs_cover_series_without_equal_neighbours() {
    let hr = [100, 101, 150, 150, 400, 400, 110, 110, 101, 160];
    let rows: Vec<_> = hr
        .iter()
        .enumerate()
        .map(|(i, h)| json!({"timestamp": T0 + i as i64, "heart_rate": h}))
        .collect();
    let report = analyze_session(&RawTable::from_json_value(&json!(rows)).unwrap(), &Cfg::default())
        .unwrap();
    let segs = &report.segments;

    assert_eq!(segs[0].start, 0);
    assert_eq!(segs.last().unwrap().end, hr.len());
    assert!(segs.windows(2).all(|p| p[0].end == p[1].start));
    assert!(segs.windows(2).all(|p| p[0].zone != p[1].zone));
    assert_eq!(segs.iter().map(|s| s.len()).sum::<usize>(), hr.len());

    let zones: Vec<_> = segs.iter().map(|s| s.zone).collect();
    assert_eq!(
        zones,
        vec![
            Some(Zone::Z1),
            Some(Zone::Z4),
            None,
            Some(Zone::Z2),
            Some(Zone::Z1),
            Some(Zone::Z5),
        ]
    );
    assert_eq!(renderable_segments(segs).count(), 5);
}

#[test]
fn range_selection_is_inclusive() {
    let rows: Vec<_> = (0..5)
        .map(|i| json!({"timestamp": T0 + i, "heart_rate": 120 + 10 * i}))
        .collect();
    let report = analyze_session(&RawTable::from_json_value(&json!(rows)).unwrap(), &Cfg::default())
        .unwrap();
    let idx = select_range(&report.samples, Metric::HeartRate, 130.0, 150.0).unwrap();
    assert_eq!(idx, vec![1, 2, 3]);
    assert!(select_range(&report.samples, Metric::HeartRate, 150.0, 130.0).is_err());
}
