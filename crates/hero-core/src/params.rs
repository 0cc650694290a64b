use crate::constants::*;

/// Tunable parameters for one mounted hero.
///
/// Defaults come from [`crate::constants`]; the web front-end overrides the
/// mesh scale and image source from its mount options.
#[derive(Clone, Debug)]
pub struct HeroParams {
    pub sim_resolution: u32,

    pub velocity_dissipation_active: f32,
    pub velocity_dissipation_idle: f32,
    pub density_dissipation_active: f32,
    pub density_dissipation_idle: f32,

    pub velocity_splat_force: f32,
    pub velocity_splat_radius: f32,
    pub density_splat_amount: f32,
    pub density_splat_radius: f32,
    pub curl_strength: f32,
    pub border_fade: f32,

    pub burn_charge_per_frame: f32,
    pub burn_decay_per_frame: f32,
    pub burn_threshold: f32,

    pub reveal_epsilon: f32,
    pub reveal_blend_tau_sec: f32,

    pub distortion: f32,
    pub smoke_tint: [f32; 3],
    pub smoke_gain: f32,
    pub vignette: f32,
    pub ripple_strength: f32,

    pub mesh_scale: f32,
    pub image_base_url: String,
}

impl Default for HeroParams {
    fn default() -> Self {
        Self {
            sim_resolution: SIM_RESOLUTION,
            velocity_dissipation_active: VELOCITY_DISSIPATION_ACTIVE,
            velocity_dissipation_idle: VELOCITY_DISSIPATION_IDLE,
            density_dissipation_active: DENSITY_DISSIPATION_ACTIVE,
            density_dissipation_idle: DENSITY_DISSIPATION_IDLE,
            velocity_splat_force: VELOCITY_SPLAT_FORCE,
            velocity_splat_radius: VELOCITY_SPLAT_RADIUS,
            density_splat_amount: DENSITY_SPLAT_AMOUNT,
            density_splat_radius: DENSITY_SPLAT_RADIUS,
            curl_strength: CURL_STRENGTH,
            border_fade: BORDER_FADE,
            burn_charge_per_frame: BURN_CHARGE_PER_FRAME,
            burn_decay_per_frame: BURN_DECAY_PER_FRAME,
            burn_threshold: BURN_THRESHOLD,
            reveal_epsilon: REVEAL_EPSILON,
            reveal_blend_tau_sec: REVEAL_BLEND_TAU_SEC,
            distortion: UV_DISTORTION,
            smoke_tint: SMOKE_TINT,
            smoke_gain: SMOKE_GAIN,
            vignette: VIGNETTE_STRENGTH,
            ripple_strength: RIPPLE_STRENGTH,
            mesh_scale: DEFAULT_MESH_SCALE,
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
        }
    }
}

impl HeroParams {
    /// Clamp values that would break the solver or the picking maths.
    pub fn sanitized(mut self) -> Self {
        self.sim_resolution = self.sim_resolution.clamp(8, 2048);
        self.mesh_scale = self.mesh_scale.max(MIN_MESH_SCALE);
        self.velocity_splat_radius = self.velocity_splat_radius.max(1e-6);
        self.density_splat_radius = self.density_splat_radius.max(1e-6);
        self.burn_charge_per_frame = self.burn_charge_per_frame.max(0.0);
        self.burn_decay_per_frame = self.burn_decay_per_frame.max(0.0);
        self.reveal_blend_tau_sec = self.reveal_blend_tau_sec.max(1e-3);
        self.border_fade = self.border_fade.clamp(0.0, 0.5);
        self
    }

    #[inline]
    pub fn texel_size(&self) -> [f32; 2] {
        let inv = 1.0 / self.sim_resolution.max(1) as f32;
        [inv, inv]
    }
}
