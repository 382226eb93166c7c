use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::error::AnalysisError;

/// Mean of the values, `None` when empty.
///
/// Accumulates offsets from the first value, so a constant series returns that
/// constant exactly.
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut it = values.into_iter();
    let first = it.next()?;
    let mut offset = 0.0f64;
    let mut cnt = 1usize;
    for v in it {
        offset += v - first;
        cnt += 1;
    }
    Some(first + offset / cnt as f64)
}

/// Mean of the defined values.
pub fn mean_defined(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    mean(values.into_iter().flatten())
}

/// Sample variance (n - 1). `None` with fewer than two values.
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values.iter().copied())?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some(ss / (values.len() - 1) as f64)
}

/// Quantile with linear interpolation between closest ranks.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let mut sorted: Vec<OrderedFloat<f64>> = values.iter().copied().map(OrderedFloat).collect();
    sorted.sort();
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo].0 + (sorted[hi].0 - sorted[lo].0) * frac)
}

/// Ordinary least squares line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: Option<f64>,
}

pub fn linear_fit(points: &[(f64, f64)]) -> Result<LinearFit, AnalysisError> {
    if points.len() < 2 {
        return Err(AnalysisError::InsufficientSamples {
            needed: 2,
            got: points.len(),
        });
    }
    let n = points.len() as f64;
    let mx = points.iter().map(|p| p.0).sum::<f64>() / n;
    let my = points.iter().map(|p| p.1).sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut syy = 0.0;
    for (x, y) in points {
        sxx += (x - mx) * (x - mx);
        sxy += (x - mx) * (y - my);
        syy += (y - my) * (y - my);
    }
    if sxx == 0.0 {
        return Err(AnalysisError::DivisionUndefined(
            "all x values are identical".into(),
        ));
    }

    let slope = sxy / sxx;
    let intercept = my - slope * mx;
    // undefined for flat y
    let r_squared = (syy > 0.0).then(|| (sxy * sxy) / (sxx * syy));
    Ok(LinearFit {
        slope,
        intercept,
        r_squared,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_constant_is_exact() {
        let xs = vec![0.1f64; 7];
        assert_eq!(mean(xs.iter().copied()), Some(0.1));
        assert_eq!(mean(std::iter::empty()), None);
    }

    #[test]
    fn variance_matches_sample_definition() {
        let v = sample_variance(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((v - 32.0 / 7.0).abs() < 1e-12);
        assert_eq!(sample_variance(&[1.0]), None);
    }

    #[test]
    fn quantile_interpolates() {
        let xs: Vec<f64> = (1..=5).map(|x| x as f64).collect();
        assert_eq!(quantile(&xs, 0.0), Some(1.0));
        assert_eq!(quantile(&xs, 1.0), Some(5.0));
        assert!((quantile(&xs, 0.95).unwrap() - 4.8).abs() < 1e-12);
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn fit_recovers_line() {
        let pts: Vec<(f64, f64)> = (0..20).map(|i| (i as f64, 3.0 * i as f64 + 1.0)).collect();
        let fit = linear_fit(&pts).unwrap();
        assert!((fit.slope - 3.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-9);
        assert!((fit.r_squared.unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn fit_on_vertical_points_is_undefined() {
        let err = linear_fit(&[(1.0, 2.0), (1.0, 3.0)]).unwrap_err();
        assert!(matches!(err, AnalysisError::DivisionUndefined(_)));
    }
}
