pub static FLUID_WGSL: &str = include_str!("../shaders/fluid.wgsl");
pub static COMPOSITE_WGSL: &str = include_str!("../shaders/composite.wgsl");
