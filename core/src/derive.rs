//! Derived metrics: deltas, speed/pace, grade, power, zone and efficiency.

use log::debug;

use crate::error::AnalysisError;
use crate::smoothing::centered_mean;
use crate::types::{
    Cfg, Column, DerivedSample, DerivedSeries, FieldSet, Metric, PowerSource, Series,
};

/// m/s → km/h
pub const MS_TO_KMH: f64 = 3.6;

/// Session-level availability of every derived metric.
pub fn unavailable_metrics(fields: &FieldSet) -> Vec<AnalysisError> {
    let needs: [(Metric, &[Column]); 9] = [
        (Metric::HeartRate, &[Column::HeartRate]),
        (Metric::Cadence, &[Column::Cadence]),
        (Metric::Speed, &[Column::Distance]),
        (Metric::Pace, &[Column::Distance]),
        (Metric::Grade, &[Column::Distance, Column::Altitude]),
        (Metric::HrZone, &[Column::HeartRate]),
        (Metric::HrEfficiency, &[Column::Distance, Column::HeartRate]),
        (Metric::SessionEfficiency, &[Column::Distance, Column::HeartRate]),
        // measured power, or distance for the modeled fallback
        (Metric::Power, if fields.power { &[Column::Power] } else { &[Column::Distance] }),
    ];
    needs
        .iter()
        .filter_map(|(metric, cols)| fields.require(*metric, cols).err())
        .collect()
}

/// Difference to the previous sample; the first sample's delta is 0 when the
/// column exists.
fn delta(prev: Option<Option<f64>>, cur: Option<f64>, present: bool) -> Option<f64> {
    if !present {
        return None;
    }
    match prev {
        None => Some(0.0),
        Some(p) => Some(cur? - p?),
    }
}

/// `num / den`, undefined for a zero divisor.
fn ratio(num: Option<f64>, den: Option<f64>) -> Option<f64> {
    let (n, d) = (num?, den?);
    if d == 0.0 {
        return None;
    }
    Some(n / d)
}

pub fn derive_metrics(series: &Series, cfg: &Cfg) -> DerivedSeries {
    let fields = series.fields;
    let unavailable = unavailable_metrics(&fields);
    let power_source = if fields.power {
        Some(PowerSource::Measured)
    } else if fields.distance {
        Some(PowerSource::Modeled)
    } else {
        None
    };

    let mut samples: Vec<DerivedSample> = Vec::with_capacity(series.len());
    for (i, (raw, elapsed_s)) in series.iter().enumerate() {
        let prev = i.checked_sub(1).map(|j| &series.samples[j]);
        let time_delta_s = if i == 0 { 0.0 } else { elapsed_s - series.elapsed_s[i - 1] };

        let distance_delta_m = delta(prev.map(|p| p.distance), raw.distance, fields.distance);
        let altitude_delta_m = delta(prev.map(|p| p.altitude), raw.altitude, fields.altitude);

        // pace and speed are one quantity: both need a non-zero time and distance delta
        let moving = time_delta_s != 0.0 && matches!(distance_delta_m, Some(d) if d != 0.0);
        let speed_kmh = ratio(distance_delta_m, Some(time_delta_s))
            .filter(|_| moving)
            .map(|v| v * MS_TO_KMH);
        let pace_sec_per_km = ratio(Some(time_delta_s), distance_delta_m.map(|d| d / 1000.0))
            .filter(|_| moving);
        let grade_pct = ratio(altitude_delta_m, distance_delta_m).map(|g| g * 100.0);

        let power = match power_source {
            Some(PowerSource::Measured) => raw.power,
            Some(PowerSource::Modeled) => speed_kmh.map(|v| (v / MS_TO_KMH).powi(3)),
            None => None,
        };

        let heart_rate = raw.heart_rate;
        let hr_zone = heart_rate.and_then(|hr| cfg.zone_table.classify(hr));
        let hr_efficiency = match heart_rate {
            Some(hr) if hr > 0.0 => speed_kmh.map(|v| v / hr),
            _ => None,
        };

        samples.push(DerivedSample {
            time: raw.time,
            elapsed_s,
            heart_rate,
            cadence: raw.cadence,
            distance: raw.distance,
            altitude: raw.altitude,
            time_delta_s,
            distance_delta_m,
            altitude_delta_m,
            speed_kmh,
            pace_sec_per_km,
            pace_smoothed_sec_per_km: None,
            grade_pct,
            power,
            hr_zone,
            hr_efficiency,
            session_efficiency: None,
        });
    }

    let pace: Vec<Option<f64>> = samples.iter().map(|s| s.pace_sec_per_km).collect();
    let smoothed = centered_mean(&pace, cfg.pace_smoothing_window);
    for (s, p) in samples.iter_mut().zip(smoothed) {
        s.pace_smoothed_sec_per_km = p;
    }

    // session-length normalisation: efficiency per minute of speed samples
    let speed_minutes = samples.iter().filter(|s| s.speed_kmh.is_some()).count() as f64 / 60.0;
    for s in samples.iter_mut() {
        s.session_efficiency = ratio(s.hr_efficiency, Some(speed_minutes));
    }

    debug!(
        "derive_metrics: {} samples, power {:?}, unavailable {:?}",
        samples.len(),
        power_source,
        unavailable.iter().map(|e| e.to_string()).collect::<Vec<_>>()
    );

    DerivedSeries {
        samples,
        fields,
        unavailable,
        power_source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_first_sample_is_zero_only_with_column() {
        assert_eq!(delta(None, Some(5.0), true), Some(0.0));
        assert_eq!(delta(None, Some(5.0), false), None);
        assert_eq!(delta(Some(Some(3.0)), Some(5.0), true), Some(2.0));
        assert_eq!(delta(Some(None), Some(5.0), true), None);
        assert_eq!(delta(Some(Some(5.0)), Some(3.0), true), Some(-2.0));
    }

    #[test]
    fn ratio_with_zero_divisor_is_undefined() {
        assert_eq!(ratio(Some(1.0), Some(0.0)), None);
        assert_eq!(ratio(Some(0.0), Some(2.0)), Some(0.0));
        assert_eq!(ratio(None, Some(2.0)), None);
    }

    #[test]
    fn power_falls_back_to_model_only_without_device_power() {
        let mut fields = FieldSet {
            distance: true,
            ..Default::default()
        };
        assert!(unavailable_metrics(&fields)
            .iter()
            .all(|e| !matches!(e, AnalysisError::MetricUnavailable { metric: Metric::Power, .. })));
        fields.distance = false;
        assert!(unavailable_metrics(&fields).contains(&AnalysisError::unavailable(
            Metric::Power,
            Column::Distance
        )));
    }
}
