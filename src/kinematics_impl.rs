//! Implements the forward kinematics of the planar chain

use crate::kinematic_traits::{Kinematics, TaskPoint};
use nalgebra::{Isometry3, Vector3};

/// An open serial chain of revolute joints that all rotate about the base
/// frame Z axis, so the arm stays in the XY plane for every configuration.
///
/// Each link contributes one rigid transform: rotation by the joint angle,
/// then translation by the link length along the rotated local X axis. The
/// position of any joint is the translation component of the product of the
/// transforms up to it.
#[derive(Debug, Clone)]
pub struct PlanarChain {
    link_lengths: Vec<f64>,
}

impl PlanarChain {
    /// Creates a chain from the link lengths, base to tip.
    ///
    /// Lengths are not validated here: a zero-length link is a legal identity
    /// element for plain forward kinematics. Collision-constrained problems
    /// reject such links at construction, as a zero-length segment has no
    /// direction to test against an obstacle.
    pub fn new(link_lengths: Vec<f64>) -> Self {
        PlanarChain { link_lengths }
    }

    pub fn link_lengths(&self) -> &[f64] {
        &self.link_lengths
    }
}

impl Kinematics for PlanarChain {
    fn dof(&self) -> usize {
        self.link_lengths.len()
    }

    fn forward(&self, qs: &[f64]) -> TaskPoint {
        assert!(
            qs.len() <= self.link_lengths.len(),
            "{} joint angles passed to a {} link chain",
            qs.len(),
            self.link_lengths.len()
        );
        let mut pose = Isometry3::identity();
        for (angle, length) in qs.iter().zip(self.link_lengths.iter()) {
            pose = pose
                * Isometry3::rotation(Vector3::z() * *angle)
                * Isometry3::translation(*length, 0.0, 0.0);
        }
        pose.translation.vector
    }

    fn link_points(&self, qs: &[f64]) -> Vec<TaskPoint> {
        (0..=qs.len()).map(|k| self.forward(&qs[..k])).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_stretched_chain_spans_total_length() {
        let chain = PlanarChain::new(vec![0.7, 1.0, 1.0]);
        let tip = chain.forward(&[0.0, 0.0, 0.0]);
        assert_abs_diff_eq!(tip.x, 2.7, epsilon = 1e-12);
        assert_abs_diff_eq!(tip.y, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(tip.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_right_angle_elbow() {
        let chain = PlanarChain::new(vec![1.0, 1.0]);
        let tip = chain.forward(&[0.0, FRAC_PI_2]);
        // First link along X, second straight up.
        assert_abs_diff_eq!(tip.x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(tip.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_prefix_matches_truncated_chain() {
        let chain = PlanarChain::new(vec![0.7, 1.0, 1.0]);
        let truncated = PlanarChain::new(vec![0.7, 1.0]);
        let qs = [0.3, -0.8, 1.2];
        let via_prefix = chain.forward(&qs[..2]);
        let via_truncated = truncated.forward(&qs[..2]);
        assert_abs_diff_eq!(via_prefix.x, via_truncated.x, epsilon = 1e-12);
        assert_abs_diff_eq!(via_prefix.y, via_truncated.y, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_length_link_is_identity() {
        let chain = PlanarChain::new(vec![1.0, 2.0]);
        let extended = PlanarChain::new(vec![1.0, 2.0, 0.0]);
        let tip = chain.forward(&[0.3, 0.4]);
        // The trailing angle is arbitrary; a zero-length link cannot move the tip.
        let tip_extended = extended.forward(&[0.3, 0.4, 1.234]);
        assert_abs_diff_eq!(tip.x, tip_extended.x, epsilon = 1e-12);
        assert_abs_diff_eq!(tip.y, tip_extended.y, epsilon = 1e-12);
        assert_abs_diff_eq!(tip.z, tip_extended.z, epsilon = 1e-12);
    }

    #[test]
    fn test_planar_chain_never_leaves_plane() {
        let chain = PlanarChain::new(vec![0.7, 1.0, 1.0]);
        let qs = [1.1, -2.3, 0.6];
        for k in 0..=3 {
            assert_abs_diff_eq!(chain.forward(&qs[..k]).z, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_link_points_walk_the_chain() {
        let chain = PlanarChain::new(vec![0.7, 1.0, 1.0]);
        let qs = [0.0, FRAC_PI_2, 0.0];
        let points = chain.link_points(&qs);
        assert_eq!(points.len(), 4);
        assert_abs_diff_eq!(points[0].norm(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(points[1].x, 0.7, epsilon = 1e-12);
        // After the right-angle bend both remaining links point along Y.
        assert_abs_diff_eq!(points[3].x, 0.7, epsilon = 1e-12);
        assert_abs_diff_eq!(points[3].y, 2.0, epsilon = 1e-12);
    }
}
