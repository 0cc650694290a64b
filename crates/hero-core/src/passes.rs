//! Per-frame simulation pass schedule and the uniform block each pass reads.
//!
//! The GPU kernels (`hero-web/shaders/fluid.wgsl`) and the host-side
//! [`crate::solver::CpuFluid`] both consume a [`FramePlan`], so ordering and
//! parameters are decided in exactly one place.

use crate::field::Field;
use crate::params::HeroParams;
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pass {
    SplatVelocity,
    SplatDensity,
    Curl,
    Vorticity,
    AdvectVelocity,
    AdvectDensity,
}

impl Pass {
    pub const ALL: [Pass; 6] = [
        Pass::SplatVelocity,
        Pass::SplatDensity,
        Pass::Curl,
        Pass::Vorticity,
        Pass::AdvectVelocity,
        Pass::AdvectDensity,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Pass::SplatVelocity => "splat_velocity",
            Pass::SplatDensity => "splat_density",
            Pass::Curl => "curl",
            Pass::Vorticity => "vorticity",
            Pass::AdvectVelocity => "advect_velocity",
            Pass::AdvectDensity => "advect_density",
        }
    }

    /// WGSL fragment entry point implementing this pass.
    pub fn entry_point(self) -> &'static str {
        match self {
            Pass::SplatVelocity | Pass::SplatDensity => "fs_splat",
            Pass::Curl => "fs_curl",
            Pass::Vorticity => "fs_vorticity",
            Pass::AdvectVelocity | Pass::AdvectDensity => "fs_advect",
        }
    }

    /// Field written by the pass.
    pub fn output(self) -> Field {
        match self {
            Pass::SplatVelocity | Pass::Vorticity | Pass::AdvectVelocity => Field::Velocity,
            Pass::SplatDensity | Pass::AdvectDensity => Field::Density,
            Pass::Curl => Field::Curl,
        }
    }

    /// Field bound as the primary source texture.
    pub fn source(self) -> Field {
        match self {
            Pass::SplatDensity | Pass::AdvectDensity => Field::Density,
            _ => Field::Velocity,
        }
    }

    /// Field bound as the auxiliary texture (velocity for advection, curl for
    /// confinement; the source again when unused).
    pub fn aux(self) -> Field {
        match self {
            Pass::Vorticity => Field::Curl,
            Pass::AdvectDensity | Pass::AdvectVelocity => Field::Velocity,
            other => other.source(),
        }
    }

    #[inline]
    pub fn swaps_output(self) -> bool {
        self.output().is_double_buffered()
    }
}

pub type PassSchedule = SmallVec<[Pass; 6]>;

/// Fixed pass order for one frame. Splats and confinement only run while
/// contact is active; without confinement the flow relaxes smoothly.
pub fn frame_schedule(contact_active: bool) -> PassSchedule {
    let mut passes = PassSchedule::new();
    if contact_active {
        passes.push(Pass::SplatVelocity);
        passes.push(Pass::SplatDensity);
    }
    passes.push(Pass::Curl);
    if contact_active {
        passes.push(Pass::Vorticity);
    }
    passes.push(Pass::AdvectVelocity);
    passes.push(Pass::AdvectDensity);
    passes
}

/// Per-second dissipation constants in effect for a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dissipation {
    pub velocity: f32,
    pub density: f32,
}

impl Dissipation {
    pub fn for_contact(active: bool, params: &HeroParams) -> Self {
        if active {
            Self {
                velocity: params.velocity_dissipation_active,
                density: params.density_dissipation_active,
            }
        } else {
            Self {
                velocity: params.velocity_dissipation_idle,
                density: params.density_dissipation_idle,
            }
        }
    }
}

/// Multiplicative decay applied by advection: `1 / (1 + dissipation * dt)`.
#[inline]
pub fn decay_factor(dissipation: f32, dt: f32) -> f32 {
    1.0 / (1.0 + dissipation.max(0.0) * dt.max(0.0))
}

/// Interaction-derived inputs for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInputs {
    pub dt: f32,
    pub contact_active: bool,
    pub contact_uv: [f32; 2],
    pub drag_delta: [f32; 2],
}

/// Uniform block shared by every simulation kernel (64 bytes, WGSL layout).
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SimUniforms {
    pub texel: [f32; 2],
    pub dt: f32,
    pub dissipation: f32,
    pub point: [f32; 2],
    pub radius: f32,
    pub curl_strength: f32,
    pub splat: [f32; 4],
    pub border_fade: f32,
    pub _pad: [f32; 3],
}

impl SimUniforms {
    pub fn for_pass(pass: Pass, inputs: &FrameInputs, params: &HeroParams) -> Self {
        let dissipation = Dissipation::for_contact(inputs.contact_active, params);
        let mut u = Self {
            texel: params.texel_size(),
            dt: inputs.dt,
            border_fade: params.border_fade,
            curl_strength: params.curl_strength,
            point: inputs.contact_uv,
            ..Self::default()
        };
        match pass {
            Pass::SplatVelocity => {
                let [dx, dy] = inputs.drag_delta;
                let force = params.velocity_splat_force;
                u.radius = params.velocity_splat_radius;
                u.splat = [dx * force, dy * force, 0.0, 0.0];
            }
            Pass::SplatDensity => {
                u.radius = params.density_splat_radius;
                u.splat = [params.density_splat_amount, 0.0, 0.0, 0.0];
            }
            Pass::Curl | Pass::Vorticity => {}
            Pass::AdvectVelocity => u.dissipation = dissipation.velocity,
            Pass::AdvectDensity => u.dissipation = dissipation.density,
        }
        u
    }
}

/// Ordered passes with their uniform values for one frame.
#[derive(Clone, Debug, Default)]
pub struct FramePlan {
    pub passes: SmallVec<[(Pass, SimUniforms); 6]>,
}

impl FramePlan {
    pub fn build(inputs: &FrameInputs, params: &HeroParams) -> Self {
        let passes = frame_schedule(inputs.contact_active)
            .into_iter()
            .map(|p| (p, SimUniforms::for_pass(p, inputs, params)))
            .collect();
        Self { passes }
    }

    pub fn schedule(&self) -> PassSchedule {
        self.passes.iter().map(|(p, _)| *p).collect()
    }

    pub fn uniforms(&self, pass: Pass) -> Option<&SimUniforms> {
        self.passes.iter().find(|(p, _)| *p == pass).map(|(_, u)| u)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_block_is_64_bytes() {
        assert_eq!(std::mem::size_of::<SimUniforms>(), 64);
    }

    #[test]
    fn active_schedule_runs_all_passes_in_order() {
        let s = frame_schedule(true);
        assert_eq!(s.as_slice(), &Pass::ALL);
    }

    #[test]
    fn idle_schedule_skips_splats_and_confinement() {
        let s = frame_schedule(false);
        assert_eq!(
            s.as_slice(),
            &[Pass::Curl, Pass::AdvectVelocity, Pass::AdvectDensity]
        );
    }

    #[test]
    fn no_pass_reads_the_slot_it_writes() {
        // A double-buffered output is written to the non-current slot, so the
        // only hazard is a single-buffered output that is also an input.
        for pass in Pass::ALL {
            if !pass.swaps_output() {
                assert_ne!(pass.source(), pass.output(), "{}", pass.label());
                assert_ne!(pass.aux(), pass.output(), "{}", pass.label());
            }
        }
    }

    #[test]
    fn idle_dissipation_is_stronger() {
        let p = HeroParams::default();
        let active = Dissipation::for_contact(true, &p);
        let idle = Dissipation::for_contact(false, &p);
        assert!(idle.velocity > active.velocity);
        assert!(idle.density > active.density);
        assert!((idle.velocity - 0.8).abs() < 1e-6);
        assert!((idle.density - 2.5).abs() < 1e-6);
    }

    #[test]
    fn decay_factor_is_one_for_zero_dt() {
        assert_eq!(decay_factor(2.5, 0.0), 1.0);
        let f = decay_factor(2.5, 1.0 / 60.0);
        assert!(f < 1.0 && f > 0.9);
    }

    #[test]
    fn splat_velocity_scales_drag_delta() {
        let p = HeroParams::default();
        let inputs = FrameInputs {
            dt: 1.0 / 60.0,
            contact_active: true,
            contact_uv: [0.25, 0.75],
            drag_delta: [0.01, -0.02],
        };
        let u = SimUniforms::for_pass(Pass::SplatVelocity, &inputs, &p);
        assert_eq!(u.point, [0.25, 0.75]);
        assert!((u.splat[0] - 0.01 * p.velocity_splat_force).abs() < 1e-3);
        assert!((u.splat[1] + 0.02 * p.velocity_splat_force).abs() < 1e-3);
        assert_eq!(u.radius, p.velocity_splat_radius);
    }
}
