// Host-side tests for front-end constants.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}

use constants::*;

#[test]
#[allow(clippy::assertions_on_constants)]
fn constants_are_within_reasonable_bounds() {
    assert!(MAX_DEVICE_PIXEL_RATIO >= 1.0);
    assert!(MAX_IMAGE_DIMENSION >= 1024);
    for c in CLEAR_COLOR {
        assert!((0.0..=1.0).contains(&c));
    }
    assert_eq!(CLEAR_COLOR[3], 1.0);
}

#[test]
fn core_defaults_are_consistent() {
    use hero_core::constants as core;
    // Threshold must be reachable by holding contact.
    assert!(core::BURN_CHARGE_PER_FRAME > 0.0);
    let frames = (core::BURN_THRESHOLD / core::BURN_CHARGE_PER_FRAME).ceil() as u32;
    assert_eq!(frames, 417);
    // A single frame of contact decays in one idle frame.
    assert!(core::BURN_DECAY_PER_FRAME >= core::BURN_CHARGE_PER_FRAME);
    assert!(core::VELOCITY_DISSIPATION_IDLE > core::VELOCITY_DISSIPATION_ACTIVE);
    assert!(core::DENSITY_DISSIPATION_IDLE > core::DENSITY_DISSIPATION_ACTIVE);
    assert!(core::MIN_MESH_SCALE <= core::DEFAULT_MESH_SCALE);
}
