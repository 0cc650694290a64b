// Host solver checks: dissipation, NaN safety and remount behaviour.

use hero_core::solver::CpuFluid;
use hero_core::{Field, FrameInputs, FramePlan, HeroParams, Pass};

const DT: f32 = 1.0 / 60.0;
const N: u32 = 32;

fn params() -> HeroParams {
    HeroParams {
        sim_resolution: N,
        ..HeroParams::default()
    }
}

fn active(uv: [f32; 2], drag: [f32; 2]) -> FrameInputs {
    FrameInputs {
        dt: DT,
        contact_active: true,
        contact_uv: uv,
        drag_delta: drag,
    }
}

fn idle() -> FrameInputs {
    FrameInputs {
        dt: DT,
        ..FrameInputs::default()
    }
}

#[test]
fn density_decays_below_threshold_after_release() {
    let p = params();
    let mut fluid = CpuFluid::new(N as usize);
    for i in 0..60 {
        let x = 0.3 + 0.005 * i as f32;
        fluid.run_frame(&FramePlan::build(&active([x, 0.5], [0.005, 0.0]), &p));
    }
    assert!(fluid.max_density() > 0.1);
    assert!(fluid.max_speed() > 0.0);
    for _ in 0..400 {
        fluid.run_frame(&FramePlan::build(&idle(), &p));
    }
    assert!(fluid.max_density() < 0.01, "max={}", fluid.max_density());
    assert!(fluid.is_finite());
}

#[test]
fn zero_drag_produces_no_nan() {
    let p = params();
    let mut fluid = CpuFluid::new(N as usize);
    for _ in 0..120 {
        fluid.run_frame(&FramePlan::build(&active([0.5, 0.5], [0.0, 0.0]), &p));
    }
    assert!(fluid.is_finite());
    assert_eq!(fluid.max_speed(), 0.0);
    assert!(fluid.mean_density() > 0.0);
}

#[test]
fn density_splat_is_centred_on_contact() {
    let p = params();
    let mut fluid = CpuFluid::new(N as usize);
    fluid.run_pass(
        Pass::SplatDensity,
        FramePlan::build(&active([0.25, 0.75], [0.0, 0.0]), &p)
            .uniforms(Pass::SplatDensity)
            .expect("splat pass"),
    );
    let d = fluid.density();
    let near = d.sample(glam::Vec2::new(0.25, 0.75));
    let far = d.sample(glam::Vec2::new(0.75, 0.25));
    assert!(near > 0.5 * p.density_splat_amount);
    assert!(far < 1e-6);
}

#[test]
fn each_double_buffered_pass_swaps_once() {
    let p = params();
    let mut fluid = CpuFluid::new(N as usize);
    let plan = FramePlan::build(&active([0.5, 0.5], [0.01, 0.0]), &p);
    // splat, vorticity and advect each write velocity; splat and advect write density
    fluid.run_frame(&plan);
    assert_eq!(fluid.current_index(Field::Velocity), 1);
    assert_eq!(fluid.current_index(Field::Density), 0);
    fluid.run_frame(&FramePlan::build(&idle(), &p));
    assert_eq!(fluid.current_index(Field::Velocity), 0);
    assert_eq!(fluid.current_index(Field::Density), 1);
}

#[test]
fn reset_store_matches_a_freshly_allocated_one() {
    let p = params();
    let touch = FramePlan::build(&active([0.3, 0.6], [0.02, 0.01]), &p);
    let mut fluid = CpuFluid::new(N as usize);
    fluid.run_frame(&touch);
    fluid.run_frame(&FramePlan::build(&idle(), &p));
    assert!(fluid.max_density() > 0.0);
    assert_eq!(fluid.current_index(Field::Velocity), 0);
    assert_eq!(fluid.current_index(Field::Density), 1);

    fluid.reset();
    assert_eq!(fluid.max_density(), 0.0);
    assert_eq!(fluid.max_speed(), 0.0);
    assert!(fluid.curl().cells().iter().all(|c| *c == 0.0));
    assert_eq!(fluid.current_index(Field::Velocity), 0);
    assert_eq!(fluid.current_index(Field::Density), 0);

    // The first frame after a reset must match one on new storage.
    let mut fresh = CpuFluid::new(N as usize);
    fluid.run_frame(&touch);
    fresh.run_frame(&touch);
    assert_eq!(fluid.density(), fresh.density());
    assert_eq!(fluid.velocity(), fresh.velocity());
}
