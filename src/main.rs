use anyhow::Result;
use nalgebra::Vector3;
use rs_planar_ik::collisions::Sphere;
use rs_planar_ik::constraints::Bounds;
use rs_planar_ik::kinematic_traits::Kinematics;
use rs_planar_ik::kinematics_impl::PlanarChain;
use rs_planar_ik::problem::IkProblem;
use rs_planar_ik::solver::SqpSolver;
use rs_planar_ik::utils::dump_joints;
use std::f64::consts::PI;

/// Usage example: a three-link arm reaching around a spherical obstacle.
fn main() -> Result<()> {
    let chain = PlanarChain::new(vec![0.7, 1.0, 1.0]);
    let obstacle = Sphere::new(Vector3::new(0.6, 0.5, 0.0), 0.25)?;
    let target = Vector3::new(0.1, 1.33, 0.0);
    let bounds = Bounds::symmetric(3, PI)?;

    let problem = IkProblem::new(chain, vec![obstacle], target, bounds)?;
    let initial = [0.0, 0.0, 1.86];

    let solver = SqpSolver::with_defaults();
    let solution = solver.solve(&problem, &initial)?;

    println!("Initial SSE objective: {}", solution.initial_objective);
    println!("Final SSE objective: {}", solution.final_objective);
    println!("Termination: {}", solution.status);

    println!("Solution (degrees):");
    dump_joints(&solution.joints);

    println!("Collision margins per link: {:?}", solution.constraint_values);

    // What a plotting layer would consume: the same chain the solver used,
    // walked joint by joint.
    println!("Link endpoints:");
    for point in problem.chain().link_points(&solution.joints) {
        println!("  ({:7.4}, {:7.4}, {:7.4})", point.x, point.y, point.z);
    }

    Ok(())
}
