//! Helper functions

use crate::kinematic_traits::Joints;

/// Checks if all angles in the configuration are finite. Solutions coming
/// out of the solver already are; this is for caller-supplied input.
pub fn is_valid(qs: &[f64]) -> bool {
    qs.iter().all(|&q| q.is_finite())
}

/// Print joint values, converting radians to degrees.
#[allow(dead_code)]
pub fn dump_joints(joints: &[f64]) {
    let mut row_str = String::new();
    for &joint in joints {
        row_str.push_str(&format!("{:5.2} ", joint.to_degrees()));
    }
    println!("[{}]", row_str.trim_end());
}

/// Allows to specify joint values in degrees (converts to radians)
#[allow(dead_code)]
pub fn as_radians(degrees: &[i32]) -> Joints {
    degrees.iter().map(|&d| (d as f64).to_radians()).collect()
}
