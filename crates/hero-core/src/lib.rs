pub mod burn;
pub mod compositor;
pub mod constants;
pub mod error;
pub mod field;
pub mod hero;
pub mod interaction;
pub mod lifecycle;
pub mod params;
pub mod passes;
pub mod solver;

pub use burn::*;
pub use compositor::*;
pub use error::*;
pub use field::*;
pub use hero::*;
pub use interaction::*;
pub use lifecycle::*;
pub use params::*;
pub use passes::*;
