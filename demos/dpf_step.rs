//! One predict and observe step of a Differentiable Particle Filter on SE(2).
//!
//! Particles start around the origin, move by a noisy sample of a nominal action
//! and are scored against a (random) camera image.

use std::f32::consts::PI;

use candle_core::{Device, Tensor};
use na::Vector3;
use nalgebra as na;
use rand::{Rng, SeedableRng};

use dpf_se2::config::DpfConfig;
use dpf_se2::dpf::DpfSe2;
use dpf_se2::models::Mode;
use dpf_se2::{noise, se2};

fn main() -> dpf_se2::Result<()> {
    // We need random numbers, seeded so the run is reproducible
    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    let device = Device::Cpu;

    let dpf = DpfSe2::new(&DpfConfig::new(24, 24), &device, &mut rng)?;

    // 1000 particles in a 1 by 1 box with any heading
    let poses: Vec<Vector3<f32>> = (0..1000)
        .map(|_| Vector3::new(rng.gen_range(-0.5..0.5), rng.gen_range(-0.5..0.5), rng.gen_range(-PI..PI)))
        .collect();
    let particles = se2::particles_from_poses(&poses, &device)?;

    // Move forward 1 while turning slightly
    let actions = Tensor::new(&[[1f32, 0., 0.1]], &device)?;
    let stds = Tensor::new(&[0.5f32], &device)?;
    let particles = dpf.predict(&particles, &actions, &stds, &mut rng)?;
    println!("{}", particles.mean(1)?);

    // Score an observation
    let image = noise::standard_normal(&[1, 3, 24, 24], &device, &mut rng)?;
    let likelihood = dpf.observation_likelihood(&image, Mode::Evaluation, &mut rng)?;
    println!("{}", likelihood);
    Ok(())
}
