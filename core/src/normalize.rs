//! Sample normalizer: time axis, chronological order, elapsed seconds.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use log::{debug, warn};

use crate::error::AnalysisError;
use crate::table::{Cell, RawTable};
use crate::types::{Column, FieldSet, RawSample, Series};

/// Time column spellings, in priority order.
pub const TIME_COLUMNS: [&str; 2] = ["timestamp", "time"];

/// Column spellings per raw field, in priority order. Per row, the first alias
/// with a numeric value wins.
pub fn column_aliases(column: Column) -> &'static [&'static str] {
    match column {
        Column::HeartRate => &["heart_rate", "hr"],
        Column::Cadence => &["cadence"],
        Column::Distance => &["distance"],
        Column::Altitude => &["enhanced_altitude", "altitude", "elevation"],
        Column::Power => &["power", "watts"],
    }
}

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

/// Parses one time cell: RFC 3339, naive date-time (taken as UTC) or epoch seconds.
pub fn parse_time(cell: &Cell) -> Option<DateTime<Utc>> {
    match cell {
        Cell::Null => None,
        Cell::Number(secs) => epoch_seconds(*secs),
        Cell::Text(raw) => {
            let s = raw.trim();
            if s.is_empty() {
                return None;
            }
            if let Ok(t) = DateTime::parse_from_rfc3339(s) {
                return Some(t.with_timezone(&Utc));
            }
            for fmt in NAIVE_FORMATS {
                if let Ok(t) = NaiveDateTime::parse_from_str(s, fmt) {
                    return Some(Utc.from_utc_datetime(&t));
                }
            }
            s.parse::<f64>().ok().and_then(epoch_seconds)
        }
    }
}

fn epoch_seconds(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos)
}

/// Seconds from `a` to `b`, microsecond resolution.
pub fn seconds_between(a: DateTime<Utc>, b: DateTime<Utc>) -> f64 {
    let d = b - a;
    match d.num_microseconds() {
        Some(us) => us as f64 / 1e6,
        None => d.num_milliseconds() as f64 / 1e3,
    }
}

/// Builds the canonical series from a raw table.
///
/// Fails with `MissingTimeField` when neither `timestamp` nor `time` exists and
/// with `InvalidTimestamp` when a row's time cannot be parsed. Like the other
/// columns, a row without `timestamp` falls back to its `time` cell. Sorting is stable,
/// so rows with equal timestamps keep their input order.
pub fn normalize(table: &RawTable) -> Result<Series, AnalysisError> {
    let time_cols = table.resolve_all(&TIME_COLUMNS);
    let time_col = *time_cols.first().ok_or(AnalysisError::MissingTimeField)?;

    let resolved: Vec<(Column, Vec<usize>)> = Column::ALL
        .iter()
        .map(|c| (*c, table.resolve_all(column_aliases(*c))))
        .collect();

    let mut fields = FieldSet::default();
    let mut samples = Vec::with_capacity(table.len());

    for (row_idx, row) in table.rows().enumerate() {
        // per row, the first non-null time spelling wins
        let cell = time_cols
            .iter()
            .filter_map(|&i| row.get(i))
            .find(|c| !c.is_null())
            .or_else(|| row.get(time_col))
            .unwrap_or(&Cell::Null);
        let time = parse_time(cell).ok_or_else(|| AnalysisError::InvalidTimestamp {
            row: row_idx,
            value: cell.render(),
        })?;

        let mut sample = RawSample::at(time);
        for (column, cols) in &resolved {
            let value = cols
                .iter()
                .find_map(|&i| row.get(i).and_then(Cell::as_f64));
            if value.is_some() {
                fields.set(*column);
            }
            match column {
                Column::HeartRate => sample.heart_rate = value,
                Column::Cadence => sample.cadence = value,
                Column::Distance => sample.distance = value,
                Column::Altitude => sample.altitude = value,
                Column::Power => sample.power = value,
            }
        }
        samples.push(sample);
    }

    // stable
    samples.sort_by_key(|s| s.time);

    let elapsed_s = match samples.first() {
        Some(first) => {
            let t0 = first.time;
            samples.iter().map(|s| seconds_between(t0, s.time)).collect()
        }
        None => {
            warn!("normalize: table has no rows");
            Vec::new()
        }
    };

    debug!(
        "normalize: {} samples, time column `{}`, fields {:?}",
        samples.len(),
        table.columns()[time_col],
        fields
    );

    Ok(Series {
        samples,
        elapsed_s,
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_time_spellings() {
        let rfc = parse_time(&Cell::Text("2024-05-01T10:00:00Z".into())).unwrap();
        let offset = parse_time(&Cell::Text("2024-05-01T12:00:00+02:00".into())).unwrap();
        let naive = parse_time(&Cell::Text("2024-05-01 10:00:00".into())).unwrap();
        let frac = parse_time(&Cell::Text("2024-05-01T10:00:00.500".into())).unwrap();
        let epoch = parse_time(&Cell::Number(1_714_557_600.0)).unwrap();
        assert_eq!(rfc, offset);
        assert_eq!(rfc, naive);
        assert_eq!(rfc, epoch);
        assert!((seconds_between(rfc, frac) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn rejects_garbage_time() {
        assert!(parse_time(&Cell::Text("yesterday".into())).is_none());
        assert!(parse_time(&Cell::Null).is_none());
        assert!(parse_time(&Cell::Number(f64::NAN)).is_none());
    }
}
