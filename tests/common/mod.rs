mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from photoscan for tests
pub use photoscan::{
    Batch, ExtractError, Extraction, PhotoExtractor, Polarity, RegionVerdict, ThresholdConfig,
};
