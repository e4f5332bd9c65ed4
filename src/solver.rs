//! Sequential quadratic programming driver for constrained IK.
//!
//! Uses Clarabel (pure Rust interior-point solver) for the quadratic
//! subproblem of every iteration.
//!
//! # Subproblem formulation
//!
//! At the current iterate q, with step d as the decision variable:
//!
//! Cost: 0.5 d^T H d + g^T d, where g is the finite-difference gradient of
//! the squared positioning error and H its damped Gauss-Newton Hessian.
//!
//! Subject to (all in the nonnegative cone, A d <= b):
//! - Linearized collision margins: -grad(c_i) d <= c_i, one row per link
//! - Box bounds on the step: d <= upper - q and -d <= q - lower
//!
//! The step is then scaled back by an L1 merit line search before the
//! iterate moves, so progress on the objective never comes at the price of
//! unchecked constraint violation.

use clarabel::algebra::CscMatrix;
use clarabel::solver::{
    DefaultSettingsBuilder, DefaultSolver, IPSolver, SolverStatus,
    SupportedConeT::NonnegativeConeT,
};
use nalgebra::{DMatrix, DVector};
use tracing::{debug, info, warn};

use crate::constraints::Bounds;
use crate::ik_error::IkError;
use crate::jakobian::{TaskJacobian, constraint_jacobian};
use crate::kinematic_traits::Joints;
use crate::problem::IkProblem;

/// Armijo sufficient-decrease slope for the merit line search.
const ARMIJO_SLOPE: f64 = 1e-4;

/// Step halvings attempted before the line search gives up.
const MAX_BACKTRACKS: u32 = 30;

/// Configuration of the SQP driver.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Maximum SQP iterations.
    pub max_iterations: u32,
    /// Maximum interior-point iterations per quadratic subproblem.
    pub qp_max_iterations: u32,
    /// Step norm below which the iterate counts as stationary.
    pub step_tolerance: f64,
    /// Collision margins above `-constraint_tolerance` count as feasible.
    pub constraint_tolerance: f64,
    /// Tikhonov damping added to the Gauss-Newton Hessian.
    pub damping: f64,
    /// Weight of the constraint violation in the L1 merit function.
    pub merit_penalty: f64,
    /// Disturbance for the finite-difference derivatives.
    pub epsilon: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            qp_max_iterations: 50,
            step_tolerance: 1e-7,
            constraint_tolerance: 1e-6,
            damping: 1e-3,
            merit_penalty: 10.0,
            epsilon: 1e-6,
        }
    }
}

/// How a solve terminated. Only [`TerminationStatus::Converged`] certifies a
/// feasible local minimum; everything else must be inspected by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum TerminationStatus {
    /// Stationary point, all collision margins within tolerance.
    Converged,
    /// Stationary point that still violates at least one collision margin.
    /// The feasible region may be empty, or the iterate is stuck against a
    /// constraint it cannot slide around.
    StalledInfeasible,
    /// The iteration budget ran out before the step shrank below tolerance.
    IterationLimit,
    /// A quadratic subproblem could not be solved; the message carries the
    /// inner solver status.
    SubproblemFailed(String),
}

impl TerminationStatus {
    /// True only for a converged, feasible solve.
    pub fn is_success(&self) -> bool {
        *self == TerminationStatus::Converged
    }
}

impl std::fmt::Display for TerminationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            TerminationStatus::Converged => write!(f, "converged"),
            TerminationStatus::StalledInfeasible =>
                write!(f, "stationary but constraint-violating"),
            TerminationStatus::IterationLimit => write!(f, "iteration limit reached"),
            TerminationStatus::SubproblemFailed(status) =>
                write!(f, "quadratic subproblem failed: {}", status),
        }
    }
}

/// Result of one solve: the final iterate plus everything a caller needs to
/// judge it. The last iterate is always returned, even on failure, but the
/// status says what it is worth.
#[derive(Debug, Clone)]
pub struct IkSolution {
    /// Joint angles at the final iterate.
    pub joints: Joints,
    /// Objective at the initial guess, for diagnostics.
    pub initial_objective: f64,
    /// Objective at the final iterate.
    pub final_objective: f64,
    /// Accepted SQP steps.
    pub iterations: u32,
    /// Collision margins at the final iterate, one per link.
    pub constraint_values: Vec<f64>,
    /// Why the solver stopped.
    pub status: TerminationStatus,
}

impl IkSolution {
    /// True when every collision margin is above `-tolerance`.
    pub fn feasible(&self, tolerance: f64) -> bool {
        self.constraint_values.iter().all(|&c| c >= -tolerance)
    }
}

/// The constrained solver driver. Holds no state between solves; the only
/// mutable value during a solve is the current iterate.
pub struct SqpSolver {
    config: SolverConfig,
}

impl SqpSolver {
    pub const fn new(config: SolverConfig) -> Self {
        SqpSolver { config }
    }

    pub fn with_defaults() -> Self {
        SqpSolver::new(SolverConfig::default())
    }

    pub const fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Minimizes the positioning error of `problem` starting from
    /// `initial`, subject to the collision margins and the joint bounds.
    ///
    /// Malformed input (wrong guess length) is an error; running out of
    /// iterations or stalling against a violated constraint is not - those
    /// come back as the [`TerminationStatus`] of an ordinary solution, and
    /// deciding what to do with such an iterate is the caller's call.
    pub fn solve(&self, problem: &IkProblem, initial: &[f64]) -> Result<IkSolution, IkError> {
        let dof = problem.dof();
        if initial.len() != dof {
            return Err(IkError::DimensionMismatch {
                expected: dof,
                found: initial.len(),
            });
        }

        let bounds = problem.bounds();
        let mut q: Joints = initial.to_vec();
        bounds.clamp(&mut q);

        let initial_objective = problem.objective(&q);
        info!("starting solve, initial objective {:.6e}", initial_objective);

        let mut iterations = 0;
        let mut status = TerminationStatus::IterationLimit;

        for iteration in 0..self.config.max_iterations {
            let task = TaskJacobian::new(problem, &q, self.config.epsilon);
            let gradient = task.gradient();
            let hessian = task.gauss_newton_hessian(self.config.damping);
            let margins = problem.constraint_values(&q)?;
            let margin_jacobian = constraint_jacobian(problem, &q, self.config.epsilon)?;

            let (rows, rhs) = self.step_constraints(&q, &margins, &margin_jacobian, bounds);

            let step = match self.solve_subproblem(&hessian, &gradient, &rows, &rhs) {
                Ok(step) => step,
                Err(inner_status) => {
                    warn!("quadratic subproblem failed: {}", inner_status);
                    status = TerminationStatus::SubproblemFailed(inner_status);
                    break;
                }
            };

            let step_norm = step.norm();
            if step_norm < self.config.step_tolerance {
                status = self.classify_stationary(&margins);
                break;
            }

            // L1 merit backtracking: accept the longest halved step that
            // still makes sufficient progress on objective + violation.
            let reference_merit = self.merit(problem, &q)?;
            let mut alpha = 1.0;
            let mut accepted = None;
            for _ in 0..MAX_BACKTRACKS {
                let mut trial: Joints = q
                    .iter()
                    .zip(step.iter())
                    .map(|(&qj, &dj)| qj + alpha * dj)
                    .collect();
                bounds.clamp(&mut trial);
                if self.merit(problem, &trial)?
                    < reference_merit - ARMIJO_SLOPE * alpha * step_norm * step_norm
                {
                    accepted = Some(trial);
                    break;
                }
                alpha *= 0.5;
            }

            let Some(next) = accepted else {
                // No descent direction left; the iterate is as stationary as
                // the merit model can tell.
                status = self.classify_stationary(&margins);
                break;
            };

            q = next;
            iterations += 1;
            debug!(
                "iteration {}: objective {:.6e}, step {:.3e}, alpha {:.3e}",
                iteration,
                problem.objective(&q),
                step_norm,
                alpha
            );
        }

        let constraint_values = problem.constraint_values(&q)?;
        let final_objective = problem.objective(&q);

        match status {
            TerminationStatus::Converged => {
                info!(
                    "converged after {} iterations, objective {:.6e} -> {:.6e}",
                    iterations, initial_objective, final_objective
                );
            }
            ref other => {
                warn!(
                    "solver stopped without a validated solution ({}), objective {:.6e} -> {:.6e}",
                    other, initial_objective, final_objective
                );
            }
        }

        Ok(IkSolution {
            joints: q,
            initial_objective,
            final_objective,
            iterations,
            constraint_values,
            status,
        })
    }

    /// Stacks the linearized collision margins and the step box into one
    /// `A d <= b` block for the nonnegative cone.
    fn step_constraints(
        &self,
        q: &[f64],
        margins: &[f64],
        margin_jacobian: &DMatrix<f64>,
        bounds: &Bounds,
    ) -> (DMatrix<f64>, DVector<f64>) {
        let dof = q.len();
        let n_rows = margins.len() + 2 * dof;
        let mut rows = DMatrix::zeros(n_rows, dof);
        let mut rhs = DVector::zeros(n_rows);

        // margin_i + grad(margin_i) . d >= 0, flipped for the <= cone
        for (i, &margin) in margins.iter().enumerate() {
            for j in 0..dof {
                rows[(i, j)] = -margin_jacobian[(i, j)];
            }
            rhs[i] = margin;
        }

        let mut row = margins.len();
        for j in 0..dof {
            rows[(row, j)] = 1.0;
            rhs[row] = bounds.upper()[j] - q[j];
            row += 1;
            rows[(row, j)] = -1.0;
            rhs[row] = q[j] - bounds.lower()[j];
            row += 1;
        }

        (rows, rhs)
    }

    /// Solves one quadratic subproblem. Returns the step, or the inner
    /// solver's status when it reports anything but (almost) solved.
    fn solve_subproblem(
        &self,
        hessian: &DMatrix<f64>,
        gradient: &DVector<f64>,
        rows: &DMatrix<f64>,
        rhs: &DVector<f64>,
    ) -> Result<DVector<f64>, String> {
        let p_csc = dense_to_csc_upper(hessian);
        let a_csc = dense_to_csc(rows);
        let q_vec: Vec<f64> = gradient.iter().copied().collect();
        let b_vec: Vec<f64> = rhs.iter().copied().collect();
        let cones = [NonnegativeConeT(rhs.len())];

        let settings = DefaultSettingsBuilder::default()
            .max_iter(self.config.qp_max_iterations)
            .verbose(false)
            .build()
            .expect("valid solver settings");

        let mut solver = DefaultSolver::new(&p_csc, &q_vec, &a_csc, &b_vec, &cones, settings)
            .map_err(|e| format!("{:?}", e))?;
        solver.solve();

        let solution = &solver.solution;
        match solution.status {
            SolverStatus::Solved | SolverStatus::AlmostSolved => Ok(DVector::from_iterator(
                gradient.len(),
                solution.x.iter().take(gradient.len()).copied(),
            )),
            other => Err(format!("{:?}", other)),
        }
    }

    /// L1 merit: objective plus the penalized sum of margin violations.
    fn merit(&self, problem: &IkProblem, qs: &[f64]) -> Result<f64, IkError> {
        let violation: f64 = problem
            .constraint_values(qs)?
            .iter()
            .map(|&c| (-c).max(0.0))
            .sum();
        Ok(problem.objective(qs) + self.config.merit_penalty * violation)
    }

    /// A vanishing step means a stationary point; whether that is a solution
    /// depends on the margins there.
    fn classify_stationary(&self, margins: &[f64]) -> TerminationStatus {
        let worst = margins.iter().copied().fold(f64::INFINITY, f64::min);
        if worst >= -self.config.constraint_tolerance {
            TerminationStatus::Converged
        } else {
            warn!(
                "stationary point violates a collision margin by {:.3e}",
                -worst
            );
            TerminationStatus::StalledInfeasible
        }
    }
}

/// Dense to Clarabel CSC, all entries.
fn dense_to_csc(matrix: &DMatrix<f64>) -> CscMatrix<f64> {
    let (nrows, ncols) = matrix.shape();
    let mut colptr = vec![0usize; ncols + 1];
    let mut rowval = Vec::new();
    let mut nzval = Vec::new();
    for j in 0..ncols {
        for i in 0..nrows {
            let v = matrix[(i, j)];
            if v != 0.0 {
                rowval.push(i);
                nzval.push(v);
            }
        }
        colptr[j + 1] = rowval.len();
    }
    CscMatrix::new(nrows, ncols, colptr, rowval, nzval)
}

/// Dense symmetric to Clarabel CSC, upper triangle only, as the cost matrix
/// requires.
fn dense_to_csc_upper(matrix: &DMatrix<f64>) -> CscMatrix<f64> {
    let (nrows, ncols) = matrix.shape();
    let mut colptr = vec![0usize; ncols + 1];
    let mut rowval = Vec::new();
    let mut nzval = Vec::new();
    for j in 0..ncols {
        for i in 0..=j.min(nrows.saturating_sub(1)) {
            let v = matrix[(i, j)];
            if v != 0.0 {
                rowval.push(i);
                nzval.push(v);
            }
        }
        colptr[j + 1] = rowval.len();
    }
    CscMatrix::new(nrows, ncols, colptr, rowval, nzval)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_to_csc_keeps_all_nonzeros() {
        let m = DMatrix::from_row_slice(2, 3, &[1.0, 0.0, 2.0, 0.0, 3.0, 0.0]);
        let csc = dense_to_csc(&m);
        assert_eq!(csc.colptr, vec![0, 1, 2, 3]);
        assert_eq!(csc.rowval, vec![0, 1, 0]);
        assert_eq!(csc.nzval, vec![1.0, 3.0, 2.0]);
    }

    #[test]
    fn test_dense_to_csc_upper_drops_lower_triangle() {
        let m = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 2.0]);
        let csc = dense_to_csc_upper(&m);
        assert_eq!(csc.colptr, vec![0, 1, 3]);
        assert_eq!(csc.rowval, vec![0, 0, 1]);
        assert_eq!(csc.nzval, vec![2.0, 1.0, 2.0]);
    }
}
