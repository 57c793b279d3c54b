//! Test SE(2) pose composition and particle propagation.

use std::f32::consts::PI;

use candle_core::{Device, Var};
use na::Vector3;
use nalgebra as na;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use dpf_se2::se2::{
    compose, isometry_to_pose, particles_from_poses, poses_from_particles, pose_to_isometry, propagate_particles,
    wrap_angle,
};
use dpf_se2::DpfError;

#[test]
fn test_wrap_angle() {
    approx::assert_abs_diff_eq!(wrap_angle(1.5 * PI), -0.5 * PI, epsilon = 1e-6);
    approx::assert_abs_diff_eq!(wrap_angle(-1.5 * PI), 0.5 * PI, epsilon = 1e-6);
    approx::assert_abs_diff_eq!(wrap_angle(0.25f64), 0.25, epsilon = 1e-12);
    approx::assert_abs_diff_eq!(wrap_angle(std::f64::consts::PI), -std::f64::consts::PI, epsilon = 1e-12);
}

#[test]
fn test_compose_body_frame() {
    // Facing +y, moving forward one unit
    let pose = Vector3::new(1f64, 2., std::f64::consts::FRAC_PI_2);
    let moved = compose(&pose, &Vector3::new(1., 0., 0.));
    approx::assert_abs_diff_eq!(moved, Vector3::new(1., 3., std::f64::consts::FRAC_PI_2), epsilon = 1e-12);

    let turned = compose(&pose, &Vector3::new(0., 0., std::f64::consts::PI));
    approx::assert_abs_diff_eq!(turned[2], -std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
}

#[test]
fn test_pose_heading_at_pi() {
    let pi = std::f64::consts::PI;
    // A half turn stays below π, as wrap_angle and propagate_particles give it
    let pose = isometry_to_pose(&pose_to_isometry(&Vector3::new(1f64, 2., pi)));
    assert!(pose[2] < pi);
    approx::assert_abs_diff_eq!(pose[2].abs(), pi, epsilon = 1e-12);
    for &theta in &[pi, -pi, 0.5 * pi, 3. * pi] {
        let pose = compose(&Vector3::new(0f64, 0., theta), &Vector3::new(0., 0., 0.));
        assert!(pose[2] >= -pi && pose[2] < pi, "{}", theta);
    }
}

#[test]
fn test_propagate_matches_compose() {
    let mut rng = StdRng::seed_from_u64(1);
    let n = 200;
    let mut poses = Vec::with_capacity(n);
    let mut motions = Vec::with_capacity(n);
    for _ in 0..n {
        poses.push(Vector3::new(rng.gen_range(-10f32..10.), rng.gen_range(-10f32..10.), rng.gen_range(-PI..PI)));
        motions.push(Vector3::new(rng.gen_range(-1f32..1.), rng.gen_range(-1f32..1.), rng.gen_range(-PI..PI)));
    }
    let particles = particles_from_poses(&poses, &Device::Cpu).unwrap();
    let moved = propagate_particles(&particles, &particles_from_poses(&motions, &Device::Cpu).unwrap()).unwrap();
    assert_eq!(moved.dims(), &[1, n, 3]);

    let moved = poses_from_particles(&moved, 0).unwrap();
    for ((pose, motion), got) in poses.iter().zip(motions.iter()).zip(moved.iter()) {
        let expected = compose(pose, motion);
        approx::assert_abs_diff_eq!(got[0], expected[0], epsilon = 1e-4);
        approx::assert_abs_diff_eq!(got[1], expected[1], epsilon = 1e-4);
        assert!(got[2] >= -PI && got[2] < PI);
        approx::assert_abs_diff_eq!(wrap_angle(got[2] - expected[2]), 0., epsilon = 1e-4);
    }
}

#[test]
fn test_propagate_is_differentiable() {
    let poses = vec![Vector3::new(0f32, 0., 0.), Vector3::new(1., 1., 3.)];
    let particles = Var::from_tensor(&particles_from_poses(&poses, &Device::Cpu).unwrap()).unwrap();
    let motions = Var::from_tensor(&particles_from_poses(&poses, &Device::Cpu).unwrap()).unwrap();
    let moved = propagate_particles(particles.as_tensor(), motions.as_tensor()).unwrap();
    let grads = moved.sum_all().unwrap().backward().unwrap();

    assert_eq!(grads.get(particles.as_tensor()).unwrap().dims(), &[1, 2, 3]);
    // d(x + y + θ)/dθ' for the heading component of the motion is 1
    let g = grads.get(motions.as_tensor()).unwrap().to_vec3::<f32>().unwrap();
    approx::assert_abs_diff_eq!(g[0][0][2], 1., epsilon = 1e-6);
}

#[test]
fn test_propagate_shape_mismatch() {
    let poses = vec![Vector3::new(0f32, 0., 0.); 4];
    let particles = particles_from_poses(&poses, &Device::Cpu).unwrap();
    let motions = particles.narrow(1, 0, 2).unwrap();
    assert!(matches!(
        propagate_particles(&particles, &motions),
        Err(DpfError::ShapeMismatch { what: "motions", .. })
    ));
}
