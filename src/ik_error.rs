//! Error handling for problem construction and constraint evaluation

/// Unified error for malformed IK problem inputs and degenerate geometry.
///
/// Solver non-convergence is deliberately not represented here; it is a
/// termination status on the returned solution, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum IkError {
    /// The collision predicate was called with coincident segment endpoints.
    DegenerateSegment,
    /// A joint interval has its lower bound above its upper bound.
    InfeasibleBounds { joint: usize, lower: f64, upper: f64 },
    /// A joint vector or bounds sequence does not match the chain length.
    DimensionMismatch { expected: usize, found: usize },
    /// An obstacle was declared with a radius that is not strictly positive.
    NonPositiveRadius(f64),
    /// A link of the chain has a length that is not strictly positive.
    NonPositiveLinkLength { link: usize, length: f64 },
}

impl std::fmt::Display for IkError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            IkError::DegenerateSegment =>
                write!(f, "Degenerate segment: endpoints coincide"),
            IkError::InfeasibleBounds { joint, lower, upper } =>
                write!(f, "Infeasible bounds for joint {}: lower {} > upper {}", joint, lower, upper),
            IkError::DimensionMismatch { expected, found } =>
                write!(f, "Dimension mismatch: expected {}, found {}", expected, found),
            IkError::NonPositiveRadius(radius) =>
                write!(f, "Obstacle radius must be positive, got {}", radius),
            IkError::NonPositiveLinkLength { link, length } =>
                write!(f, "Link {} must have positive length, got {}", link, length),
        }
    }
}

impl std::error::Error for IkError {}
