pub mod sprite;

pub use sprite::*;
pub use sprite::error::RecolourError;
pub use sprite::normalize::{AlphaMode, Color};
