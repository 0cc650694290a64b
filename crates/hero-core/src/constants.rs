// Shared tuning constants for the burn-through hero.
//
// Per-frame quantities are applied once per simulated frame regardless of
// the frame interval; per-second quantities are scaled by `dt`.

// Simulation grid
pub const SIM_RESOLUTION: u32 = 256; // square grid, independent of display size
pub const MAX_STEP_DT_SEC: f32 = 1.0 / 20.0; // longest interval fed to one step

// Dissipation (per second); idle values let the flow relax quickly
pub const VELOCITY_DISSIPATION_ACTIVE: f32 = 0.05;
pub const VELOCITY_DISSIPATION_IDLE: f32 = 0.8;
pub const DENSITY_DISSIPATION_ACTIVE: f32 = 0.08;
pub const DENSITY_DISSIPATION_IDLE: f32 = 2.5;

// Splats
pub const VELOCITY_SPLAT_FORCE: f32 = 6000.0; // drag delta (uv) -> texels per second
pub const VELOCITY_SPLAT_RADIUS: f32 = 0.0025; // gaussian falloff, uv^2 units
pub const DENSITY_SPLAT_AMOUNT: f32 = 0.35; // peak density added per frame
pub const DENSITY_SPLAT_RADIUS: f32 = 0.0012;

// Vorticity confinement
pub const CURL_STRENGTH: f32 = 25.0;
pub const VORTICITY_EPSILON: f32 = 1e-4; // guards the gradient normalisation

// Edge attenuation width in uv; 0 disables it so mass can pile up at the edges
pub const BORDER_FADE: f32 = 0.0;

// Burn meter
pub const BURN_CHARGE_PER_FRAME: f32 = 0.006;
pub const BURN_DECAY_PER_FRAME: f32 = 0.02;
pub const BURN_THRESHOLD: f32 = 2.5;

// Reveal transition
pub const REVEAL_EPSILON: f32 = 0.01;
pub const REVEAL_BLEND_TAU_SEC: f32 = 0.6; // time constant of the blend toward 1

// Hover ripple easing
pub const HOVER_RISE_TAU_SEC: f32 = 0.12;
pub const HOVER_FALL_TAU_SEC: f32 = 0.4;

// Camera (matches the hosting viewport: eye at z = 3 looking at the origin)
pub const CAMERA_Z: f32 = 3.0;
pub const CAMERA_FOV_Y_DEG: f32 = 75.0;
pub const CAMERA_ZNEAR: f32 = 0.1;
pub const CAMERA_ZFAR: f32 = 100.0;

// Mesh
pub const DEFAULT_MESH_SCALE: f32 = 1.0; // plane spans [-scale, scale] in world x/y
pub const MIN_MESH_SCALE: f32 = 0.05;

// Compositor
pub const UV_DISTORTION: f32 = 0.0003; // uv offset per texel/sec of velocity
pub const SMOKE_TINT: [f32; 3] = [0.045, 0.038, 0.034]; // charred, slightly warm
pub const SMOKE_GAIN: f32 = 1.6; // density -> coverage steepness
pub const VIGNETTE_STRENGTH: f32 = 0.004; // darkening per texel/sec of speed
pub const RIPPLE_STRENGTH: f32 = 0.05;

// Images
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://picsum.photos/1920/1080";
pub const IMAGE_RANDOM_MAX: u32 = 100_000; // upper bound of the cache-busting query value
