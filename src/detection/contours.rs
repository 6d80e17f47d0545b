use imageproc::contours::{find_contours, BorderType};
use tracing::{debug, instrument};

use crate::models::{Contour, Mask};

/// Outer boundaries of the foreground regions in a mask.
///
/// Holes, and anything nested inside a hole, are ignored.
pub fn find_outer_contours(mask: &Mask) -> Vec<Contour> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| Contour::new(c.points))
        .collect()
}

/// Sort contours by ascending enclosed area and drop those below `tiny_area`.
///
/// A contour exactly at `tiny_area` is kept.
pub fn sort_and_prune(contours: Vec<Contour>, tiny_area: f64) -> Vec<Contour> {
    let mut measured: Vec<(f64, Contour)> = contours
        .into_iter()
        .map(|c| (c.area(), c))
        .filter(|(area, _)| *area >= tiny_area)
        .collect();
    measured.sort_by(|a, b| a.0.total_cmp(&b.0));
    measured.into_iter().map(|(_, c)| c).collect()
}

/// Candidate regions of a mask, smallest first
#[instrument(skip(mask), fields(width = mask.width(), height = mask.height()))]
pub fn detect_regions(mask: &Mask, tiny_area: f64) -> Vec<Contour> {
    let all = find_outer_contours(mask);
    let total = all.len();
    let kept = sort_and_prune(all, tiny_area);
    debug!(total, kept = kept.len(), "Outer contours found");
    kept
}
