//! Rust implementation of obstacle-aware inverse kinematics for planar
//! serial arms.
//!
//! Given a target position for the end effector, the solver finds joint
//! angles that reach it while keeping the carrier line of every link clear
//! of a set of spherical obstacles. The problem is posed as a constrained
//! nonlinear program: squared task-space error as the objective, one
//! line-sphere collision margin per link as inequality constraints, and
//! per-joint box bounds. It is solved by sequential quadratic programming
//! with numerically estimated derivatives, so no analytic Jacobian of the
//! chain is required.
//!
//! # Features
//!
//! - Chains of any length; the collision constraint set is generated from
//!   the link count, never hand-written for a fixed arity.
//! - One problem instance describes one solve: obstacles, target and bounds
//!   are explicit values, not globals, so independent solves can run side by
//!   side on shared, immutable problems.
//! - Every returned solution carries its termination status and the final
//!   collision margins; a non-converged or infeasible iterate is never
//!   presented as a validated answer.
//! - Joint bounds are validated at construction time, before any solver
//!   runs.
//! - The chain model exposes intermediate joint positions through one
//!   trait, so reporting or drawing layers reuse the same kinematics that
//!   the constraints are built on.
//!
//! # Example
//!
//! See `main.rs` for the complete scenario: a three-link arm reaching
//! around a spherical obstacle.

pub mod kinematic_traits;
pub mod kinematics_impl;

pub mod collisions;
pub mod constraints;
pub mod ik_error;
pub mod problem;

pub mod jakobian;
pub mod solver;

pub mod utils;
