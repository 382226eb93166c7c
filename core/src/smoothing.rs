use crate::stats::mean;

/// Centered rolling mean over an undefined-safe series.
///
/// Window `w` covers `i - w/2 ..= i + (w - 1 - w/2)`, truncated at the ends.
/// Undefined inputs are left out of the local window; the output is undefined
/// only when the whole window is.
pub fn centered_mean(xs: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let n = xs.len();
    if window <= 1 {
        return xs.to_vec();
    }
    let left = window / 2;
    let right = window - 1 - left;
    (0..n)
        .map(|i| {
            let start = i.saturating_sub(left);
            let end = (i + right).min(n - 1);
            mean(xs[start..=end].iter().flatten().copied())
        })
        .collect()
}

/// Trailing rolling mean (`i - w + 1 ..= i`), partial windows at the start.
pub fn trailing_mean(xs: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window <= 1 {
        return xs.to_vec();
    }
    (0..xs.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            mean(xs[start..=i].iter().flatten().copied())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_skips_gaps_instead_of_zero_filling() {
        let xs = [Some(10.0), None, Some(20.0), None, None];
        let out = centered_mean(&xs, 3);
        assert_eq!(out[0], Some(10.0));
        assert_eq!(out[1], Some(15.0));
        assert_eq!(out[2], Some(20.0));
        assert_eq!(out[3], Some(20.0));
        assert_eq!(out[4], None);
    }

    #[test]
    fn centered_dampens_single_spike() {
        let mut xs = vec![Some(300.0); 9];
        xs[4] = Some(900.0);
        let out = centered_mean(&xs, 5);
        assert!(out[4].unwrap() < 450.0);
        assert_eq!(out[0], Some(300.0));
    }

    #[test]
    fn trailing_uses_partial_windows() {
        let xs = [Some(1.0), Some(2.0), Some(3.0), Some(4.0)];
        let out = trailing_mean(&xs, 2);
        assert_eq!(out, vec![Some(1.0), Some(1.5), Some(2.5), Some(3.5)]);
    }
}
