pub mod image;
pub mod media;
pub mod prediction;
pub mod raw;
pub mod text;

pub use image::*;
pub use media::*;
pub use prediction::*;
pub use raw::*;
pub use text::*;
