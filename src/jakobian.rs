//! Numeric differentiation of the objective and of the collision margins

use crate::ik_error::IkError;
use crate::kinematic_traits::TaskPoint;
use crate::problem::IkProblem;
use nalgebra::{DMatrix, DVector};

/// Jacobian of the task-space residual with respect to the joint angles,
/// estimated by disturbing each joint by a small epsilon.
///
/// For the squared-error objective this is all the solver needs: it yields
/// both the gradient and a convex Gauss-Newton model of the Hessian, without
/// any closed-form derivation of the chain.
pub struct TaskJacobian {
    residual: TaskPoint,
    /// 3 x dof matrix; column `j` is the sensitivity of the end effector to
    /// joint `j`.
    matrix: DMatrix<f64>,
}

impl TaskJacobian {
    /// Computes the Jacobian at the configuration `qs`.
    ///
    /// # Arguments
    ///
    /// * `problem` - the problem supplying the residual
    /// * `qs` - the joint configuration to differentiate at
    /// * `epsilon` - the disturbance used for forward differences
    pub fn new(problem: &IkProblem, qs: &[f64], epsilon: f64) -> Self {
        let residual = problem.residual(qs);
        let mut matrix = DMatrix::zeros(3, qs.len());
        let mut disturbed = qs.to_vec();
        for j in 0..qs.len() {
            disturbed[j] += epsilon;
            let delta = (problem.residual(&disturbed) - residual) / epsilon;
            matrix.fixed_view_mut::<3, 1>(0, j).copy_from(&delta);
            disturbed[j] = qs[j];
        }
        TaskJacobian { residual, matrix }
    }

    pub fn residual(&self) -> &TaskPoint {
        &self.residual
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// Gradient of the squared positioning error: `2 J^T r`.
    pub fn gradient(&self) -> DVector<f64> {
        self.matrix.transpose() * DVector::from_column_slice(self.residual.as_slice()) * 2.0
    }

    /// Damped Gauss-Newton approximation of the objective Hessian,
    /// `2 J^T J + damping * I`. Positive definite for any damping > 0, which
    /// keeps the quadratic subproblem convex even at singular configurations.
    pub fn gauss_newton_hessian(&self, damping: f64) -> DMatrix<f64> {
        let dof = self.matrix.ncols();
        self.matrix.transpose() * &self.matrix * 2.0 + DMatrix::identity(dof, dof) * damping
    }
}

/// Jacobian of the collision margins, one row per link, by forward
/// differences with the given epsilon. Fails only if a margin itself fails
/// to evaluate.
pub fn constraint_jacobian(
    problem: &IkProblem,
    qs: &[f64],
    epsilon: f64,
) -> Result<DMatrix<f64>, IkError> {
    let values = problem.constraint_values(qs)?;
    let mut matrix = DMatrix::zeros(values.len(), qs.len());
    let mut disturbed = qs.to_vec();
    for j in 0..qs.len() {
        disturbed[j] += epsilon;
        let disturbed_values = problem.constraint_values(&disturbed)?;
        for (i, (&c1, &c0)) in disturbed_values.iter().zip(values.iter()).enumerate() {
            matrix[(i, j)] = (c1 - c0) / epsilon;
        }
        disturbed[j] = qs[j];
    }
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collisions::Sphere;
    use crate::constraints::Bounds;
    use crate::kinematics_impl::PlanarChain;
    use approx::assert_abs_diff_eq;
    use nalgebra::Vector3;
    use std::f64::consts::PI;

    const EPSILON: f64 = 1e-6;

    fn two_link_problem(target: Vector3<f64>) -> IkProblem {
        IkProblem::new(
            PlanarChain::new(vec![1.0, 0.8]),
            vec![Sphere::new(Vector3::new(0.5, 0.3, 0.0), 0.1).unwrap()],
            target,
            Bounds::symmetric(2, PI).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_task_jacobian_matches_analytic() {
        // For the planar chain the columns have the classic closed form
        //   d(tip)/d(q_j) = sum over links k >= j of l_k * (-sin, cos) of the
        //   accumulated angle.
        let problem = two_link_problem(Vector3::zeros());
        let qs = [0.4, -0.9];
        let jacobian = TaskJacobian::new(&problem, &qs, EPSILON);

        let (l1, l2) = (1.0, 0.8);
        let (a1, a12) = (qs[0], qs[0] + qs[1]);
        let expected = [
            [-l1 * a1.sin() - l2 * a12.sin(), -l2 * a12.sin()],
            [l1 * a1.cos() + l2 * a12.cos(), l2 * a12.cos()],
        ];
        for i in 0..2 {
            for j in 0..2 {
                assert_abs_diff_eq!(jacobian.matrix()[(i, j)], expected[i][j], epsilon = 1e-4);
            }
        }
        // Third row: the chain never leaves the plane.
        assert_abs_diff_eq!(jacobian.matrix()[(2, 0)], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(jacobian.matrix()[(2, 1)], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_gradient_vanishes_at_the_target() {
        let chain = PlanarChain::new(vec![1.0, 0.8]);
        let qs = [0.4, -0.9];
        let tip = crate::kinematic_traits::Kinematics::forward(&chain, &qs);
        let problem = two_link_problem(tip);
        let gradient = TaskJacobian::new(&problem, &qs, EPSILON).gradient();
        // Forward differences leave O(epsilon) bias around a minimum.
        assert!(gradient.norm() < 1e-5, "gradient {}", gradient.norm());
    }

    #[test]
    fn test_hessian_is_symmetric_and_damped() {
        let problem = two_link_problem(Vector3::new(0.5, 0.5, 0.0));
        let jacobian = TaskJacobian::new(&problem, &[0.1, 0.2], EPSILON);
        let h = jacobian.gauss_newton_hessian(1e-3);
        assert_abs_diff_eq!(h[(0, 1)], h[(1, 0)], epsilon = 1e-12);
        // Diagonal dominated from below by the damping term.
        assert!(h[(0, 0)] >= 1e-3 && h[(1, 1)] >= 1e-3);
    }

    #[test]
    fn test_constraint_jacobian_points_away_from_obstacle() {
        // One link along X, obstacle above the axis: rotating the joint
        // upward (positive angle) must shrink the collision margin.
        let problem = IkProblem::new(
            PlanarChain::new(vec![1.0]),
            vec![Sphere::new(Vector3::new(0.5, 0.4, 0.0), 0.1).unwrap()],
            Vector3::new(1.0, 0.0, 0.0),
            Bounds::symmetric(1, PI).unwrap(),
        )
        .unwrap();
        let jacobian = constraint_jacobian(&problem, &[0.0], EPSILON).unwrap();
        assert_eq!(jacobian.shape(), (1, 1));
        assert!(jacobian[(0, 0)] < 0.0, "derivative {}", jacobian[(0, 0)]);
    }
}
