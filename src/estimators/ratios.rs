//! Ratio calculator: raw landmark distances -> dimensionless ratios.

use crate::domain::{Measurements, Ratios};
use crate::error::{EstimateError, Result};

/// Compute `waist/shoulder`, `hip/shoulder` and `torso/shoulder`.
///
/// Fails with `EstimateError::Division` when `shoulder_width` is zero (or not a
/// number), and with `InvalidMeasurement` when any required distance is not a
/// positive finite value. Upstream validation is expected to prevent both.
pub fn calculate_ratios(m: &Measurements) -> Result<Ratios> {
    if m.shoulder_width == 0.0 || m.shoulder_width.is_nan() {
        return Err(EstimateError::Division {
            field: "shoulder_width",
        });
    }

    let required = [
        ("shoulder_width", m.shoulder_width),
        ("hip_width", m.hip_width),
        ("waist_width", m.waist_width),
        ("torso_height", m.torso_height),
    ];
    for (field, value) in required {
        if !(value.is_finite() && value > 0.0) {
            return Err(EstimateError::InvalidMeasurement { field, value });
        }
    }

    Ok(Ratios {
        waist_to_shoulder: m.waist_width / m.shoulder_width,
        hip_to_shoulder: m.hip_width / m.shoulder_width,
        torso_to_shoulder: m.torso_height / m.shoulder_width,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratios_divide_by_shoulder_width() {
        let m = Measurements::new(0.40, 0.30, 0.26, 0.50);
        let r = calculate_ratios(&m).unwrap();
        assert!((r.waist_to_shoulder - 0.65).abs() < 1e-12);
        assert!((r.hip_to_shoulder - 0.75).abs() < 1e-12);
        assert!((r.torso_to_shoulder - 1.25).abs() < 1e-12);
    }

    #[test]
    fn zero_shoulder_width_is_a_division_error() {
        let m = Measurements::new(0.0, 0.30, 0.26, 0.50);
        assert_eq!(
            calculate_ratios(&m),
            Err(EstimateError::Division {
                field: "shoulder_width"
            })
        );
    }

    #[test]
    fn non_positive_distances_are_rejected() {
        let m = Measurements::new(0.40, 0.30, -0.1, 0.50);
        assert!(matches!(
            calculate_ratios(&m),
            Err(EstimateError::InvalidMeasurement {
                field: "waist_width",
                ..
            })
        ));
    }
}
