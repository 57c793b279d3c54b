//! SE(2) particle motion.
//!
//! A particle is a planar pose (x, y, θ). Motions (dx, dy, dθ) are expressed in the particle's body frame,
//! so applying a motion is the composition of two rigid transformations.
//!
//! The pose algebra uses nalgebra's [`Isometry2`]; [`propagate_particles`] is the equivalent
//! differentiable tensor operation over a whole particle set.

use std::f64::consts::TAU;

use candle_core::{Device, Tensor};
use na::{Isometry2, RealField, Vector2, Vector3};
use nalgebra as na;
use num_traits::{Float, FloatConst};

use crate::error::{check_dims, Result};

/// Dimension of an SE(2) state.
pub const STATE_DIM: usize = 3;

/// Wraps an angle into [-π, π).
pub fn wrap_angle<N: Float + FloatConst>(angle: N) -> N {
    let two_pi = N::PI() + N::PI();
    angle - two_pi * ((angle + N::PI()) / two_pi).floor()
}

/// The rigid transformation of pose (x, y, θ).
pub fn pose_to_isometry<N: RealField>(pose: &Vector3<N>) -> Isometry2<N> {
    Isometry2::new(Vector2::new(pose[0], pose[1]), pose[2])
}

/// The pose (x, y, θ) of a rigid transformation, θ in [-π, π) like [`wrap_angle`].
pub fn isometry_to_pose<N: RealField>(iso: &Isometry2<N>) -> Vector3<N> {
    let t = &iso.translation.vector;
    // angle() is in (-π, π], only π itself moves
    let angle = iso.rotation.angle();
    let angle = angle - N::two_pi() * ((angle + N::pi()) / N::two_pi()).floor();
    Vector3::new(t[0], t[1], angle)
}

/// Applies the body frame `motion` to `pose`.
pub fn compose<N: RealField>(pose: &Vector3<N>, motion: &Vector3<N>) -> Vector3<N> {
    isometry_to_pose(&(pose_to_isometry(pose) * pose_to_isometry(motion)))
}

/// Applies body frame motions `(B, P, 3)` to particles `(B, P, 3)`.
///
/// Differentiable with respect to both inputs. The heading is wrapped into [-π, π),
/// the wrapping offset carries no gradient.
pub fn propagate_particles(particles: &Tensor, motions: &Tensor) -> Result<Tensor> {
    let dims = particles.dims();
    let (batch, num_particles) = (dims.first().copied().unwrap_or(0), dims.get(1).copied().unwrap_or(0));
    check_dims("particles", dims, &[batch, num_particles, STATE_DIM])?;
    check_dims("motions", motions.dims(), &[batch, num_particles, STATE_DIM])?;

    let x = particles.narrow(2, 0, 1)?;
    let y = particles.narrow(2, 1, 1)?;
    let theta = particles.narrow(2, 2, 1)?;
    let dx = motions.narrow(2, 0, 1)?;
    let dy = motions.narrow(2, 1, 1)?;
    let dtheta = motions.narrow(2, 2, 1)?;

    let (c, s) = (theta.cos()?, theta.sin()?);
    let new_x = x.add(&c.mul(&dx)?.sub(&s.mul(&dy)?)?)?;
    let new_y = y.add(&s.mul(&dx)?.add(&c.mul(&dy)?)?)?;
    let new_theta = wrap_heading(&theta.add(&dtheta)?)?;

    Ok(Tensor::cat(&[&new_x, &new_y, &new_theta], 2)?)
}

fn wrap_heading(theta: &Tensor) -> Result<Tensor> {
    // θ - 2π floor((θ + π) / 2π)
    let turns = theta.detach().affine(1. / TAU, 0.5)?.floor()?;
    Ok(theta.sub(&turns.affine(TAU, 0.)?)?)
}

/// Particle tensor `(1, P, 3)` of a set of poses.
pub fn particles_from_poses(poses: &[Vector3<f32>], device: &Device) -> Result<Tensor> {
    let data: Vec<f32> = poses.iter().flat_map(|p| p.iter().copied()).collect();
    Ok(Tensor::from_vec(data, (1, poses.len(), STATE_DIM), device)?)
}

/// Poses of batch element `batch` of a `(B, P, 3)` particle tensor.
pub fn poses_from_particles(particles: &Tensor, batch: usize) -> Result<Vec<Vector3<f32>>> {
    let rows = particles.get(batch)?.to_vec2::<f32>()?;
    let mut poses = Vec::with_capacity(rows.len());
    for row in rows {
        check_dims("pose", &[row.len()], &[STATE_DIM])?;
        poses.push(Vector3::new(row[0], row[1], row[2]));
    }
    Ok(poses)
}
