pub mod frame;

pub use frame::{RasterFrame, Rgba};
