//! Defines the shared kinematic types and the trait boundary of the chain model

extern crate nalgebra as na;

use na::Vector3;

/// Joint configuration of the arm, one angle in radians per link.
/// The length is the degree-of-freedom count of the chain it is used with.
pub type Joints = Vec<f64>;

/// A position in task space, expressed in the base frame of the chain.
pub type TaskPoint = Vector3<f64>;

/// Forward kinematics of an open serial chain.
///
/// The solver, the constraint set and any presentation layer all obtain link
/// positions through this trait, so that nobody re-implements the chain math.
pub trait Kinematics {
    /// Number of links (and joints) of the chain.
    fn dof(&self) -> usize;

    /// Position of the end of the sub-chain spanned by the first `qs.len()`
    /// links. Passing the full configuration yields the end effector;
    /// passing a prefix yields the corresponding intermediate joint.
    ///
    /// Panics if `qs` is longer than the chain.
    fn forward(&self, qs: &[f64]) -> TaskPoint;

    /// Base position followed by the position of every joint, in link order.
    /// This is what a drawing or reporting layer should consume instead of
    /// recomputing transforms itself.
    fn link_points(&self, qs: &[f64]) -> Vec<TaskPoint>;
}
