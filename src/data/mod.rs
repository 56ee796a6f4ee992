pub mod coords;
pub mod image;
pub mod memory;

pub use coords::*;
pub use image::*;
pub use memory::*;
