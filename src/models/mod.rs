pub mod common;
pub mod image;
pub mod storage;

pub use common::*;
pub use image::*;
pub use storage::*;
