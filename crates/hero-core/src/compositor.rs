//! Uniform block for `composite.wgsl` plus host-side copies of its shading
//! functions.

use crate::interaction::{Camera, MeshQuad};
use crate::params::HeroParams;
use glam::Vec3;

/// 128 bytes, WGSL uniform layout.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CompositeUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub half_extent: [f32; 2],
    pub blend: f32,
    pub distortion: f32,
    /// rgb tint, w = density gain
    pub smoke_tint: [f32; 4],
    pub ripple_uv: [f32; 2],
    pub ripple_strength: f32,
    pub time: f32,
    pub vignette: f32,
    pub next_ready: f32,
    pub _pad: [f32; 2],
}

impl Default for CompositeUniforms {
    fn default() -> Self {
        bytemuck::Zeroable::zeroed()
    }
}

/// Per-frame values the compositor needs beyond the static parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CompositeFrame {
    pub blend: f32,
    pub next_ready: bool,
    pub hover_uv: [f32; 2],
    pub hover_amount: f32,
    pub time: f32,
}

impl CompositeUniforms {
    pub fn build(camera: &Camera, quad: MeshQuad, params: &HeroParams, frame: &CompositeFrame) -> Self {
        let [r, g, b] = params.smoke_tint;
        Self {
            view_proj: camera.view_proj().to_cols_array_2d(),
            half_extent: [quad.half_extent, quad.half_extent],
            blend: frame.blend.clamp(0.0, 1.0),
            distortion: params.distortion,
            smoke_tint: [r, g, b, params.smoke_gain],
            ripple_uv: frame.hover_uv,
            ripple_strength: params.ripple_strength * frame.hover_amount.clamp(0.0, 1.0),
            time: frame.time,
            vignette: params.vignette,
            next_ready: if frame.next_ready { 1.0 } else { 0.0 },
            _pad: [0.0; 2],
        }
    }
}

/// Rec. 709 luma.
#[inline]
pub fn luminance(rgb: [f32; 3]) -> f32 {
    Vec3::from(rgb).dot(Vec3::new(0.2126, 0.7152, 0.0722))
}

#[inline]
pub fn smoke_coverage(density: f32, gain: f32) -> f32 {
    1.0 - (-density.max(0.0) * gain).exp()
}

#[inline]
pub fn reveal_amount(blend: f32, smoke: f32) -> f32 {
    (blend * (1.0 - smoke)).clamp(0.0, 1.0)
}

/// Velocity-driven darkening, faded out as the reveal progresses.
#[inline]
pub fn vignette_factor(speed: f32, strength: f32, blend: f32) -> f32 {
    (1.0 - speed * strength * (1.0 - blend)).clamp(0.0, 1.0)
}

/// Final colour for one fragment, given the already-distorted samples.
pub fn shade(current: [f32; 3], next: [f32; 3], density: f32, speed: f32, u: &CompositeUniforms) -> [f32; 3] {
    let tint = Vec3::new(u.smoke_tint[0], u.smoke_tint[1], u.smoke_tint[2]);
    let smoke = smoke_coverage(density, u.smoke_tint[3]);
    let reveal = reveal_amount(u.blend * u.next_ready, smoke);
    let burnt = Vec3::splat(luminance(current)).lerp(tint, smoke);
    let color = burnt.lerp(Vec3::splat(luminance(next)), reveal);
    (color * vignette_factor(speed, u.vignette, u.blend)).to_array()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniforms(blend: f32) -> CompositeUniforms {
        let frame = CompositeFrame {
            blend,
            next_ready: true,
            ..Default::default()
        };
        CompositeUniforms::build(&Camera::default(), MeshQuad::default(), &HeroParams::default(), &frame)
    }

    #[test]
    fn uniform_block_is_128_bytes() {
        assert_eq!(std::mem::size_of::<CompositeUniforms>(), 128);
    }

    #[test]
    fn luminance_weights_sum_to_one() {
        assert!((luminance([1.0, 1.0, 1.0]) - 1.0).abs() < 1e-6);
        assert!((luminance([0.0, 1.0, 0.0]) - 0.7152).abs() < 1e-6);
    }

    #[test]
    fn no_smoke_and_no_blend_shows_current_grey() {
        let c = shade([1.0, 0.0, 0.0], [0.0, 0.0, 1.0], 0.0, 0.0, &uniforms(0.0));
        for ch in c {
            assert!((ch - 0.2126).abs() < 1e-5);
        }
    }

    #[test]
    fn smoke_holds_back_the_reveal() {
        let clear = shade([0.0; 3], [1.0; 3], 0.0, 0.0, &uniforms(0.5));
        let smoky = shade([0.0; 3], [1.0; 3], 3.0, 0.0, &uniforms(0.5));
        assert!(clear[0] > smoky[0]);
    }

    #[test]
    fn full_blend_without_smoke_shows_next() {
        let c = shade([0.0; 3], [1.0; 3], 0.0, 500.0, &uniforms(1.0));
        assert!((c[1] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn vignette_darkens_with_speed() {
        assert_eq!(vignette_factor(0.0, 0.004, 0.0), 1.0);
        assert!(vignette_factor(100.0, 0.004, 0.0) < 1.0);
        assert_eq!(vignette_factor(100.0, 0.004, 1.0), 1.0);
    }
}
