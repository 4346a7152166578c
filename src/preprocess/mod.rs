pub mod downsample;
pub mod normalize;

pub use downsample::{downsample, IntensityGrid, GRID_LEN, GRID_SIDE};
pub use normalize::{normalize, normalize_with, FeatureVector, Normalization};
