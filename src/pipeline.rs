//! File-level driver around [`PhotoExtractor`]: loading scans, naming and
//! writing results, debug summaries, and running many scans concurrently.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbImage;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use crate::detection::PhotoExtractor;
use crate::error::{ExtractError, Result};

/// Debug configuration for batch execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Directory receiving summary sheets
    pub output_dir: PathBuf,
}

/// What one scan produced on disk
#[derive(Debug, Clone)]
pub struct ImageReport {
    pub source: PathBuf,
    pub photos: Vec<PathBuf>,
    pub summary: Option<PathBuf>,
}

/// Outcome of every scan in a batch, in input order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<(PathBuf, Result<ImageReport>)>,
}

impl BatchReport {
    pub fn total_photos(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|(_, outcome)| outcome.as_ref().ok())
            .map(|report| report.photos.len())
            .sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&PathBuf, &ExtractError)> {
        self.outcomes
            .iter()
            .filter_map(|(path, outcome)| outcome.as_ref().err().map(|e| (path, e)))
    }
}

/// Load a scan from disk
pub fn load_scan(path: &Path) -> Result<RgbImage> {
    let image = image::open(path).map_err(|e| ExtractError::input(path, e))?;
    debug!(width = image.width(), height = image.height(), "Scan loaded");
    Ok(image.to_rgb8())
}

/// File name without its last extension
pub fn source_base_name(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.rsplit_once('.') {
        Some((base, _)) => base.to_string(),
        None => name,
    }
}

/// Output file name for the `index`-th photo of a scan
pub fn output_name(base: &str, index: usize) -> String {
    format!("{}_{}.jpg", base, index)
}

/// Create a directory if it is missing; safe to race with other workers
pub fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| ExtractError::output(dir, e))
}

/// Encode an image to `path`, format chosen by extension
pub fn write_image(image: &RgbImage, path: &Path) -> Result<()> {
    image.save(path).map_err(|e| ExtractError::output(path, e))
}

/// Batch driver: one output directory, many scans
#[derive(Clone)]
pub struct Batch {
    extractor: Arc<PhotoExtractor>,
    output_dir: PathBuf,
    debug: Option<DebugConfig>,
    jobs: usize,
}

impl Batch {
    pub fn new(extractor: PhotoExtractor, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            extractor: Arc::new(extractor),
            output_dir: output_dir.into(),
            debug: None,
            jobs: 1,
        }
    }

    /// Write summary sheets to `<output>/debug/`
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug = enabled.then(|| DebugConfig {
            output_dir: self.output_dir.join("debug"),
        });
        self
    }

    /// Number of scans processed at the same time
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Extract and write the photos of one scan
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn process_image(&self, path: &Path) -> Result<ImageReport> {
        let scan = load_scan(path)?;

        let extractor = if self.debug.is_some() && !self.extractor.annotate {
            self.extractor.as_ref().clone().with_annotation(true)
        } else {
            self.extractor.as_ref().clone()
        };
        let extraction = extractor.extract(&scan)?;

        ensure_dir(&self.output_dir)?;
        let base = source_base_name(path);

        let mut written = Vec::with_capacity(extraction.photos.len());
        for photo in &extraction.photos {
            let target = self.output_dir.join(output_name(&base, photo.source_index));
            write_image(&photo.image, &target)?;
            debug!(
                path = %target.display(),
                width = photo.width(),
                height = photo.height(),
                "Photo written"
            );
            written.push(target);
        }

        let summary = match (&self.debug, &extraction.debug_canvas) {
            (Some(debug), Some(canvas)) => self.write_summary(&debug.output_dir, &base, canvas),
            _ => None,
        };

        info!(photos = written.len(), "Scan processed");
        Ok(ImageReport {
            source: path.to_path_buf(),
            photos: written,
            summary,
        })
    }

    /// Summary sheets are optional; a failure here is logged and ignored
    fn write_summary(&self, dir: &Path, base: &str, canvas: &RgbImage) -> Option<PathBuf> {
        let target = dir.join(format!("{}_summary.png", base));
        match ensure_dir(dir).and_then(|_| write_image(canvas, &target)) {
            Ok(()) => Some(target),
            Err(e) => {
                warn!(error = %e, "Could not save summary sheet");
                None
            }
        }
    }

    /// Process every scan, at most `jobs` at a time.
    ///
    /// A failing scan never stops the others; its error is kept in the report.
    pub async fn run(&self, paths: Vec<PathBuf>) -> BatchReport {
        let permits = Arc::new(Semaphore::new(self.jobs));
        let mut handles = Vec::with_capacity(paths.len());

        for path in paths {
            let batch = self.clone();
            let permits = permits.clone();
            let task_path = path.clone();
            let handle = tokio::spawn(async move {
                let _permit = match permits.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        return Err(ExtractError::Worker {
                            message: e.to_string(),
                        });
                    }
                };
                match tokio::task::spawn_blocking(move || batch.process_image(&task_path)).await {
                    Ok(outcome) => outcome,
                    Err(e) => Err(ExtractError::Worker {
                        message: e.to_string(),
                    }),
                }
            });
            handles.push((path, handle));
        }

        let mut report = BatchReport::default();
        for (path, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => Err(ExtractError::Worker {
                    message: e.to_string(),
                }),
            };
            if let Err(e) = &outcome {
                warn!(path = %path.display(), error = %e, "Scan failed");
            }
            report.outcomes.push((path, outcome));
        }
        report
    }
}
