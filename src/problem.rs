//! Defines one constrained IK problem instance

use crate::collisions::{Sphere, line_sphere_discriminant};
use crate::constraints::Bounds;
use crate::ik_error::IkError;
use crate::kinematic_traits::{Kinematics, TaskPoint};
use crate::kinematics_impl::PlanarChain;

/// Everything that describes a single solve: the chain, the obstacles, the
/// task-space target and the joint bounds. Immutable once constructed, so
/// independent solves can share a problem freely.
///
/// The objective and the per-link collision constraints are evaluated here;
/// the solver only sees scalar values and never touches the geometry.
#[derive(Debug, Clone)]
pub struct IkProblem {
    chain: PlanarChain,
    obstacles: Vec<Sphere>,
    target: TaskPoint,
    bounds: Bounds,
}

impl IkProblem {
    /// Validates and assembles a problem.
    ///
    /// Every link must have strictly positive length: consecutive joint
    /// positions are then always distinct (their distance equals the link
    /// length), which is exactly the precondition of the collision
    /// predicate. Bounds must match the chain's degree-of-freedom count.
    pub fn new(
        chain: PlanarChain,
        obstacles: Vec<Sphere>,
        target: TaskPoint,
        bounds: Bounds,
    ) -> Result<Self, IkError> {
        for (link, &length) in chain.link_lengths().iter().enumerate() {
            if !(length > 0.0) {
                return Err(IkError::NonPositiveLinkLength { link, length });
            }
        }
        if bounds.dof() != chain.dof() {
            return Err(IkError::DimensionMismatch {
                expected: chain.dof(),
                found: bounds.dof(),
            });
        }
        Ok(IkProblem {
            chain,
            obstacles,
            target,
            bounds,
        })
    }

    pub fn dof(&self) -> usize {
        self.chain.dof()
    }

    pub fn chain(&self) -> &PlanarChain {
        &self.chain
    }

    pub fn target(&self) -> &TaskPoint {
        &self.target
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Number of inequality constraints: one per link when obstacles are
    /// present, none for an obstacle-free problem (which degenerates to
    /// bound-constrained least squares).
    pub fn constraint_count(&self) -> usize {
        if self.obstacles.is_empty() {
            0
        } else {
            self.dof()
        }
    }

    /// Task-space positioning error of the full configuration, as a vector.
    pub fn residual(&self, qs: &[f64]) -> TaskPoint {
        self.chain.forward(qs) - self.target
    }

    /// Squared distance between the end effector and the target. Zero iff
    /// the chain reaches the target exactly. Evaluated at every candidate
    /// the solver proposes, feasible or not.
    pub fn objective(&self, qs: &[f64]) -> f64 {
        self.residual(qs).norm_squared()
    }

    /// Collision margin of one link: the negated line-sphere discriminant,
    /// minimized over all obstacles. Non-negative means the link's carrier
    /// line clears every sphere; negative means a collision.
    pub fn constraint(&self, link: usize, qs: &[f64]) -> Result<f64, IkError> {
        let p_start = self.chain.forward(&qs[..link]);
        let p_end = self.chain.forward(&qs[..=link]);
        let mut margin = f64::INFINITY;
        for obstacle in &self.obstacles {
            margin = margin.min(-line_sphere_discriminant(&p_start, &p_end, obstacle)?);
        }
        Ok(margin)
    }

    /// All collision margins, link 0 first. Length equals
    /// [`constraint_count`](Self::constraint_count).
    pub fn constraint_values(&self, qs: &[f64]) -> Result<Vec<f64>, IkError> {
        (0..self.constraint_count())
            .map(|link| self.constraint(link, qs))
            .collect()
    }
}
