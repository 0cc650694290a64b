// Front-end tuning: canvas sizing, clear colour and image upload limits

// Backing store is CSS size * devicePixelRatio, ratio capped at this value
pub const MAX_DEVICE_PIXEL_RATIO: f64 = 2.0;

// Background behind the image plane (linear rgb)
pub const CLEAR_COLOR: [f64; 4] = [0.02, 0.02, 0.024, 1.0];

// Images larger than this on either side are downscaled before upload
pub const MAX_IMAGE_DIMENSION: u32 = 4096;
