pub mod annotate;
pub mod classify;
pub mod contours;
pub mod corners;
pub mod preprocessing;
pub mod rectify;
pub mod split;

use image::RgbImage;
use tracing::{debug, info, instrument};

use crate::config::{FilterThresholds, ThresholdConfig, DEFAULT_THRESHOLD};
use crate::error::Result;
use crate::models::{BoundingQuad, Contour, ExtractedPhoto, Extraction, Mask, Region, RegionVerdict};
use annotate::Annotator;

/// Finds and straightens the photos on one scan
#[derive(Debug, Clone)]
pub struct PhotoExtractor {
    pub threshold: u8,
    pub config: ThresholdConfig,
    /// Render the summary canvas alongside the photos
    pub annotate: bool,
}

impl PhotoExtractor {
    pub fn new(threshold: u8) -> Self {
        Self {
            threshold,
            config: ThresholdConfig::default(),
            annotate: false,
        }
    }

    pub fn with_config(mut self, config: ThresholdConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn with_annotation(mut self, annotate: bool) -> Self {
        self.annotate = annotate;
        self
    }

    /// Run the full pipeline on a scan.
    ///
    /// Regions that cannot be rectified are skipped; any other error ends the run.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn extract(&self, image: &RgbImage) -> Result<Extraction> {
        let (width, height) = image.dimensions();
        let thresholds = FilterThresholds::for_image(&self.config, width, height);

        // Step 1: Mask
        let prepared = preprocessing::preprocess(image, self.threshold, &self.config);

        // Step 2: Candidate regions, smallest first
        let candidates = contours::detect_regions(&prepared.mask, thresholds.tiny_area);

        let mut annotator = self.annotate.then(|| {
            Annotator::new(
                preprocessing::mask_view(&prepared.mask),
                thresholds.highlight_thickness,
            )
        });

        let mut photos = Vec::new();
        let mut regions = Vec::with_capacity(candidates.len());

        // Step 3 and 4: classify, then rectify what is kept
        for contour in &candidates {
            let Some(quad) = BoundingQuad::from_contour(contour) else {
                continue;
            };
            let region = Region {
                verdict: classify::classify(&quad, &thresholds),
                contour_area: contour.area(),
                quad,
            };
            debug!(
                verdict = ?region.verdict,
                area = region.quad.area,
                short_side = region.quad.short_side(),
                "Region classified"
            );

            if let Some(annotator) = annotator.as_mut() {
                annotator.mark(&region);
            }

            if region.verdict == RegionVerdict::Keep {
                match rectify::rectify(image, &region.quad) {
                    Ok(rectified) => photos.push(ExtractedPhoto {
                        image: rectified,
                        source_index: photos.len(),
                    }),
                    Err(e) if e.is_recoverable() => debug!(error = %e, "Skipping region"),
                    Err(e) => return Err(e),
                }
            }

            regions.push(region);
        }

        let debug_canvas = match annotator {
            Some(annotator) if !photos.is_empty() => Some(annotate::compose_summary(
                annotator.canvas(),
                &prepared.gray,
                &photos,
            )),
            _ => None,
        };

        info!(
            candidates = candidates.len(),
            rejected = regions.iter().filter(|r| r.verdict == RegionVerdict::Reject).count(),
            extracted = photos.len(),
            "Extraction finished"
        );

        Ok(Extraction {
            photos,
            regions,
            debug_canvas,
        })
    }

    /// Foreground mask of a scan (for debugging)
    pub fn get_mask(&self, image: &RgbImage) -> Mask {
        preprocessing::preprocess(image, self.threshold, &self.config).mask
    }

    /// Candidate contours of a scan after the tiny-area filter (for debugging)
    pub fn get_contours(&self, image: &RgbImage) -> Vec<Contour> {
        let thresholds = FilterThresholds::for_image(&self.config, image.width(), image.height());
        contours::detect_regions(&self.get_mask(image), thresholds.tiny_area)
    }
}

impl Default for PhotoExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

/// Extract photos from a scan with an explicit threshold and filter configuration
pub fn extract(image: &RgbImage, threshold: u8, config: &ThresholdConfig) -> Result<Extraction> {
    let extractor = PhotoExtractor::new(threshold)
        .with_config(config.clone())?
        .with_annotation(true);
    extractor.extract(image)
}
