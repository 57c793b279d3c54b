//! Test the composed DPF model.
//!
//! Observation and prediction steps over a small particle set.

use std::f32::consts::PI;

use candle_core::{Device, Tensor};
use rand::rngs::StdRng;
use rand::SeedableRng;

use dpf_se2::config::DpfConfig;
use dpf_se2::dpf::DpfSe2;
use dpf_se2::models::{Mode, Parameterized};
use dpf_se2::noise;
use dpf_se2::DpfError;

fn model(seed: u64) -> DpfSe2 {
    DpfSe2::new(&DpfConfig::new(32, 32), &Device::Cpu, &mut StdRng::seed_from_u64(seed)).unwrap()
}

#[test]
fn test_observation_likelihood() {
    let dpf = model(1);
    let mut rng = StdRng::seed_from_u64(2);
    let images = noise::standard_normal(&[3, 3, 32, 32], &Device::Cpu, &mut rng).unwrap();

    assert_eq!(dpf.encode(&images, Mode::Evaluation, &mut rng).unwrap().dims(), &[3, 128]);
    for &mode in &[Mode::Training, Mode::Evaluation] {
        let l = dpf.observation_likelihood(&images, mode, &mut rng).unwrap();
        assert_eq!(l.dims(), &[3, 1]);
        for v in l.flatten_all().unwrap().to_vec1::<f32>().unwrap() {
            assert!(v >= 0.004f32 && v <= 1.);
        }
    }
}

#[test]
fn test_predict() {
    let dpf = model(3);
    let mut rng = StdRng::seed_from_u64(4);
    let particles = noise::standard_normal(&[2, 100, 3], &Device::Cpu, &mut rng).unwrap();
    let actions = Tensor::new(&[[1f32, 0., 0.1], [0.5, 0.2, -0.3]], &Device::Cpu).unwrap();
    let stds = Tensor::new(&[1f32, 2.], &Device::Cpu).unwrap();

    let noisy = dpf.sample_actions(&actions, &stds, &particles, &mut rng).unwrap();
    assert_eq!(noisy.dims(), &[2, 100, 3]);

    let moved = dpf.predict(&particles, &actions, &stds, &mut rng).unwrap();
    assert_eq!(moved.dims(), &[2, 100, 3]);
    let headings = moved.narrow(2, 2, 1).unwrap().flatten_all().unwrap().to_vec1::<f32>().unwrap();
    assert!(headings.iter().all(|&h| h >= -PI && h < PI));
}

#[test]
fn test_parameters() {
    let dpf = model(5);
    assert_eq!(dpf.weight_layers().len(), 10);
    assert_eq!(dpf.vars().len(), 20);
    let total = dpf.encoder().num_parameters() + dpf.likelihood().num_parameters() + dpf.action_sampler().num_parameters();
    assert_eq!(dpf.num_parameters(), total);
    // conv 3->16, 16->32, 32->64 and fc 64*4*4 -> 128
    let encoder = (27 * 16 + 16) + (144 * 32 + 32) + (288 * 64 + 64) + (1024 * 128 + 128);
    assert_eq!(dpf.encoder().num_parameters(), encoder);
}

#[test]
fn test_initialize() {
    let dpf = model(6);
    let before = dpf.vars()[0].flatten_all().unwrap().to_vec1::<f32>().unwrap();
    assert_eq!(dpf.initialize(&mut StdRng::seed_from_u64(7)).unwrap(), 10);
    let after = dpf.vars()[0].flatten_all().unwrap().to_vec1::<f32>().unwrap();
    assert_ne!(before, after);
}

#[test]
fn test_feature_width_mismatch() {
    let mut config = DpfConfig::new(32, 32);
    config.likelihood.in_features = 64;
    let res = DpfSe2::new(&config, &Device::Cpu, &mut StdRng::seed_from_u64(8));
    assert!(matches!(res, Err(DpfError::InvalidConfig(_))));
}
