pub mod config;
pub mod detection;
pub mod error;
pub mod models;
pub mod pipeline;

pub use config::{FilterThresholds, Polarity, ThresholdConfig, DEFAULT_THRESHOLD};
pub use detection::corners::{CornerSession, CornerState};
pub use detection::{extract, PhotoExtractor};
pub use error::{ExtractError, Result};
pub use models::{
    BoundingQuad, Contour, ExtractedPhoto, Extraction, Mask, Region, RegionVerdict, ScanImage,
};
pub use pipeline::{Batch, BatchReport, DebugConfig, ImageReport};
