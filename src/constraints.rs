//! Box bounds on the joint angles

use crate::ik_error::IkError;

/// Per-joint inclusive angle intervals, in radians.
///
/// Unlike wrap-around joint limits of industrial controllers, these are plain
/// boxes on the real line: that is what the quadratic subproblems of the
/// solver consume directly.
#[derive(Debug, Clone)]
pub struct Bounds {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl Bounds {
    /// Creates bounds from parallel lower/upper sequences.
    ///
    /// Fails with [`IkError::DimensionMismatch`] when the sequences differ in
    /// length and with [`IkError::InfeasibleBounds`] when any interval is
    /// empty. Validation happens here, before any solver ever runs.
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Result<Self, IkError> {
        if lower.len() != upper.len() {
            return Err(IkError::DimensionMismatch {
                expected: lower.len(),
                found: upper.len(),
            });
        }
        for (joint, (&lo, &hi)) in lower.iter().zip(upper.iter()).enumerate() {
            if lo > hi {
                return Err(IkError::InfeasibleBounds {
                    joint,
                    lower: lo,
                    upper: hi,
                });
            }
        }
        Ok(Bounds { lower, upper })
    }

    /// Same interval `[-limit, limit]` for each of `dof` joints.
    pub fn symmetric(dof: usize, limit: f64) -> Result<Self, IkError> {
        Bounds::new(vec![-limit; dof], vec![limit; dof])
    }

    pub fn dof(&self) -> usize {
        self.lower.len()
    }

    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// True when every angle lies inside its interval, inclusive.
    pub fn compliant(&self, qs: &[f64]) -> bool {
        qs.len() == self.dof()
            && qs
                .iter()
                .zip(self.lower.iter().zip(self.upper.iter()))
                .all(|(&q, (&lo, &hi))| q >= lo && q <= hi)
    }

    /// Clamps each angle into its interval. Used to keep line-search trial
    /// points inside the box despite floating point drift.
    pub fn clamp(&self, qs: &mut [f64]) {
        for (q, (&lo, &hi)) in qs.iter_mut().zip(self.lower.iter().zip(self.upper.iter())) {
            *q = q.clamp(lo, hi);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_compliant_inside() {
        let bounds = Bounds::symmetric(3, PI).unwrap();
        assert!(bounds.compliant(&[0.0, -3.0, 3.0]));
    }

    #[test]
    fn test_compliant_on_the_edge() {
        let bounds = Bounds::new(vec![-1.0, 0.0], vec![1.0, 2.0]).unwrap();
        assert!(bounds.compliant(&[-1.0, 2.0]));
    }

    #[test]
    fn test_not_compliant_outside() {
        let bounds = Bounds::symmetric(2, 1.0).unwrap();
        assert!(!bounds.compliant(&[0.0, 1.5]));
    }

    #[test]
    fn test_wrong_length_not_compliant() {
        let bounds = Bounds::symmetric(3, 1.0).unwrap();
        assert!(!bounds.compliant(&[0.0, 0.0]));
    }

    #[test]
    fn test_empty_interval_rejected() {
        let result = Bounds::new(vec![0.5], vec![-0.5]);
        assert_eq!(
            result.err(),
            Some(IkError::InfeasibleBounds {
                joint: 0,
                lower: 0.5,
                upper: -0.5
            })
        );
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let result = Bounds::new(vec![0.0, 0.0], vec![1.0]);
        assert!(matches!(result, Err(IkError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_clamp_pulls_into_box() {
        let bounds = Bounds::symmetric(2, 1.0).unwrap();
        let mut qs = [1.7, -2.0];
        bounds.clamp(&mut qs);
        assert!(bounds.compliant(&qs));
        assert_eq!(qs, [1.0, -1.0]);
    }
}
