//! Banded lookups and linear anchors.
//!
//! Almost every heuristic in the estimators is one of two shapes:
//!
//! - a **step table**: the first band whose threshold is crossed wins
//! - a **linear anchor**: `base + (x - origin) * slope`
//!
//! Keeping both as data (`const` tables) makes the heuristics auditable and lets
//! tests walk the tables instead of re-deriving constants.

/// A step band: `value` applies when the input crosses `threshold`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub threshold: f64,
    pub value: f64,
}

impl Step {
    pub const fn new(threshold: f64, value: f64) -> Self {
        Self { threshold, value }
    }
}

/// First band (in table order) with `x > threshold`, else `fallback`.
///
/// Tables are expected in descending threshold order.
pub fn step_above(x: f64, bands: &[Step], fallback: f64) -> f64 {
    bands
        .iter()
        .find(|b| x > b.threshold)
        .map(|b| b.value)
        .unwrap_or(fallback)
}

/// First band (in table order) with `x < threshold`, else `fallback`.
///
/// Tables are expected in ascending threshold order.
pub fn step_below(x: f64, bands: &[Step], fallback: f64) -> f64 {
    bands
        .iter()
        .find(|b| x < b.threshold)
        .map(|b| b.value)
        .unwrap_or(fallback)
}

/// Linear replacement value `base + (x - origin) * slope`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearAnchor {
    pub base: f64,
    pub origin: f64,
    pub slope: f64,
}

impl LinearAnchor {
    pub const fn new(base: f64, origin: f64, slope: f64) -> Self {
        Self { base, origin, slope }
    }

    pub fn eval(&self, x: f64) -> f64 {
        self.base + (x - self.origin) * self.slope
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESC: [Step; 2] = [Step::new(0.7, 6.0), Step::new(0.5, 2.0)];
    const ASC: [Step; 2] = [Step::new(18.5, -3.0), Step::new(22.0, -1.0)];

    #[test]
    fn step_above_is_strict() {
        assert_eq!(step_above(0.71, &DESC, 0.0), 6.0);
        assert_eq!(step_above(0.70, &DESC, 0.0), 2.0);
        assert_eq!(step_above(0.50, &DESC, 0.0), 0.0);
    }

    #[test]
    fn step_below_is_strict() {
        assert_eq!(step_below(18.0, &ASC, 1.0), -3.0);
        assert_eq!(step_below(18.5, &ASC, 1.0), -1.0);
        assert_eq!(step_below(22.0, &ASC, 1.0), 1.0);
    }

    #[test]
    fn anchor_eval() {
        let a = LinearAnchor::new(8.0, 18.0, 2.0);
        assert_eq!(a.eval(20.0), 12.0);
        let falling = LinearAnchor::new(7.0, 1.0, -27.0);
        assert!((falling.eval(0.9) - 9.7).abs() < 1e-12);
    }
}
