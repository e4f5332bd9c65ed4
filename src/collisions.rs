//! Implements the line-sphere collision predicate and the obstacle type

use crate::ik_error::IkError;
use crate::kinematic_traits::TaskPoint;

/// Static spherical obstacle the arm must stay clear of.
#[derive(Debug, Clone)]
pub struct Sphere {
    /// Center in the base frame of the chain.
    pub center: TaskPoint,
    /// Radius, strictly positive.
    pub radius: f64,
}

impl Sphere {
    pub fn new(center: TaskPoint, radius: f64) -> Result<Self, IkError> {
        if !(radius > 0.0) {
            return Err(IkError::NonPositiveRadius(radius));
        }
        Ok(Sphere { center, radius })
    }
}

/// Discriminant of the line-sphere intersection equation for the infinite
/// line through `p1` and `p2`.
///
/// With `u` the unit direction of the line and `o = p1`, the returned value
/// is `(u . (o - c))^2 - (|o - c|^2 - r^2)`: positive when the line crosses
/// the sphere surface twice, zero when tangent, negative when it misses.
///
/// The test is deliberately not clipped to the segment between `p1` and
/// `p2`; a sphere beyond either endpoint but on the carrier line still
/// counts as intersecting. Callers relying on exact segment semantics must
/// treat this as a conservative approximation.
///
/// Fails with [`IkError::DegenerateSegment`] when the endpoints coincide,
/// since a zero-length segment has no direction.
pub fn line_sphere_discriminant(
    p1: &TaskPoint,
    p2: &TaskPoint,
    sphere: &Sphere,
) -> Result<f64, IkError> {
    let d = (p2 - p1).norm();
    if d == 0.0 {
        return Err(IkError::DegenerateSegment);
    }
    let u = (p2 - p1) / d;
    let oc = p1 - sphere.center;
    Ok(u.dot(&oc).powi(2) - (oc.norm_squared() - sphere.radius * sphere.radius))
}
