use image::{GrayImage, RgbImage};
use imageproc::geometry::contour_area;
use imageproc::point::Point;

/// A color scan as loaded from disk
pub type ScanImage = RgbImage;

/// Binary foreground mask: 255 marks photo material, 0 background
pub type Mask = GrayImage;

/// Closed outer boundary of one connected mask region
#[derive(Debug, Clone)]
pub struct Contour {
    pub points: Vec<Point<i32>>,
}

impl Contour {
    pub fn new(points: Vec<Point<i32>>) -> Self {
        Self { points }
    }

    /// Enclosed polygon area; fewer than three points enclose nothing
    pub fn area(&self) -> f64 {
        if self.points.len() < 3 {
            return 0.0;
        }
        contour_area(&self.points).abs()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Minimum-area rectangle around a contour, possibly rotated.
///
/// Corners run clockwise (in image coordinates) from the corner with the
/// smallest `x + y`. `width` is the length of the side `corners[0] → corners[1]`,
/// `height` the length of `corners[0] → corners[3]`.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingQuad {
    pub corners: [Point<i32>; 4],
    pub width: f64,
    pub height: f64,
    pub area: f64,
}

impl BoundingQuad {
    pub fn from_corners(corners: [Point<i32>; 4]) -> Self {
        Self {
            corners,
            width: distance(corners[0], corners[1]),
            height: distance(corners[0], corners[3]),
            area: contour_area(&corners).abs(),
        }
    }

    pub fn short_side(&self) -> f64 {
        self.width.min(self.height)
    }

    pub fn long_side(&self) -> f64 {
        self.width.max(self.height)
    }

    pub fn corners_f32(&self) -> [(f32, f32); 4] {
        self.corners.map(|p| (p.x as f32, p.y as f32))
    }
}

pub fn distance(a: Point<i32>, b: Point<i32>) -> f64 {
    let dx = (b.x - a.x) as f64;
    let dy = (b.y - a.y) as f64;
    dx.hypot(dy)
}

/// Size-filter outcome for a candidate region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionVerdict {
    /// Scanner dust or compression noise; not annotated, not extracted
    Discard,
    /// Too small to be a photo; annotated as rejected, not extracted
    Reject,
    Keep,
}

/// A classified candidate region
#[derive(Debug, Clone)]
pub struct Region {
    pub quad: BoundingQuad,
    pub verdict: RegionVerdict,
    /// Area enclosed by the source contour
    pub contour_area: f64,
}

/// A rectified photo cut out of a scan
#[derive(Debug, Clone)]
pub struct ExtractedPhoto {
    pub image: RgbImage,
    /// Sequential among kept regions, in ascending contour-area order
    pub source_index: usize,
}

impl ExtractedPhoto {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Everything one extraction run produces
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub photos: Vec<ExtractedPhoto>,
    /// Every region that survived the tiny-area filter, in processing order
    pub regions: Vec<Region>,
    /// Summary canvas, present when annotation is on and a photo was found
    pub debug_canvas: Option<RgbImage>,
}

impl Extraction {
    pub fn regions_with(&self, verdict: RegionVerdict) -> impl Iterator<Item = &Region> {
        self.regions.iter().filter(move |r| r.verdict == verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contour(coords: &[(i32, i32)]) -> Contour {
        Contour::new(coords.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    #[test]
    fn area_ignores_winding() {
        let forward = contour(&[(0, 0), (40, 30), (25, 50), (-15, 20), (10, 20)]);
        let mut backward = forward.clone();
        backward.points.reverse();
        assert_eq!(forward.area(), 1000.0);
        assert_eq!(backward.area(), 1000.0);
    }

    #[test]
    fn open_contours_have_no_area() {
        assert_eq!(contour(&[]).area(), 0.0);
        assert_eq!(contour(&[(0, 0), (10, 0)]).area(), 0.0);
    }

    #[test]
    fn quad_area_comes_from_corners() {
        let quad = BoundingQuad::from_corners([
            Point::new(0, 0),
            Point::new(30, 0),
            Point::new(30, 10),
            Point::new(0, 10),
        ]);
        assert_eq!(quad.area, 300.0);
        assert_eq!(quad.short_side(), 10.0);
    }
}
