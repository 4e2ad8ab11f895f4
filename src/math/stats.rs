//! Small descriptive statistics used by the fusion engine.

/// Round `value` to `decimals` places (half away from zero).
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Arithmetic mean. `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divides by `n`, not `n - 1`).
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let mu = mean(values)?;
    let var = values.iter().map(|v| (v - mu) * (v - mu)).sum::<f64>() / values.len() as f64;
    Some(var.sqrt())
}

/// Scale non-negative scores so they sum to 1.
///
/// Returns `None` if any score is negative/non-finite or the total is zero.
pub fn normalize(scores: &[f64]) -> Option<Vec<f64>> {
    if scores.iter().any(|s| !s.is_finite() || *s < 0.0) {
        return None;
    }
    let total: f64 = scores.iter().sum();
    if total <= 0.0 {
        return None;
    }
    Some(scores.iter().map(|s| s / total).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_to_one_decimal() {
        assert_eq!(round_to(21.449, 1), 21.4);
        assert_eq!(round_to(21.46, 1), 21.5);
        assert_eq!(round_to(-3.06, 1), -3.1);
    }

    #[test]
    fn std_dev_of_pair_is_half_the_gap() {
        let sd = std_dev(&[19.0, 24.0]).unwrap();
        assert!((sd - 2.5).abs() < 1e-12);
        assert!(std_dev(&[]).is_none());
    }

    #[test]
    fn normalize_sums_to_one() {
        let w = normalize(&[0.91, 0.51]).unwrap();
        assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(w[0] > w[1]);

        assert!(normalize(&[0.0, 0.0]).is_none());
        assert!(normalize(&[0.5, -0.1]).is_none());
    }
}
