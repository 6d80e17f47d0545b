use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_polygon_mut};
use imageproc::point::Point;
use imageproc::rect::Rect;
use photoscan::{Polarity, ThresholdConfig};
use std::path::{Path, PathBuf};

/// Scanner lid color
pub const PAPER: Rgb<u8> = Rgb([255, 255, 255]);
/// Print color used for synthetic photos on a light background
pub const INK: Rgb<u8> = Rgb([60, 60, 60]);

pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Threshold used for white-on-black fixtures
pub const MIDPOINT: u8 = 127;

/// Axis-aligned rectangle as (x, y, width, height)
pub type RectSpec = (i32, i32, u32, u32);

/// Uniform canvas with filled rectangles painted on it
pub fn scan_with_rects(
    width: u32,
    height: u32,
    background: Rgb<u8>,
    fill: Rgb<u8>,
    rects: &[RectSpec],
) -> RgbImage {
    let mut img = RgbImage::from_pixel(width, height, background);
    for &(x, y, w, h) in rects {
        draw_filled_rect_mut(&mut img, Rect::at(x, y).of_size(w, h), fill);
    }
    img
}

/// Three dark rectangles on a 400x300 white scan.
///
/// With the default configuration the first is below the tiny filter, the
/// second sits between the tiny and small filters, the third is a photo.
pub fn composite_scan() -> RgbImage {
    let rects = [(20, 20, 20, 20), (60, 200, 60, 40), (200, 60, 160, 100)];
    scan_with_rects(400, 300, PAPER, INK, &rects)
}

/// A white `length` x `breadth` rectangle turned by `degrees` around
/// (`cx`, `cy`) on a black 400x400 canvas.
pub fn rotated_rect_scan(cx: f64, cy: f64, length: f64, breadth: f64, degrees: f64) -> RgbImage {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (hl, hb) = (length / 2.0, breadth / 2.0);

    let corner = |su: f64, sv: f64| {
        let x = cx + su * hl * cos - sv * hb * sin;
        let y = cy + su * hl * sin + sv * hb * cos;
        Point::new(x.round() as i32, y.round() as i32)
    };
    let polygon = [
        corner(-1.0, -1.0),
        corner(1.0, -1.0),
        corner(1.0, 1.0),
        corner(-1.0, 1.0),
    ];

    let mut img = RgbImage::from_pixel(400, 400, BLACK);
    draw_polygon_mut(&mut img, &polygon, WHITE);
    img
}

/// Configuration for light photos on a dark background
pub fn light_foreground() -> ThresholdConfig {
    ThresholdConfig {
        polarity: Polarity::LightForeground,
        ..ThresholdConfig::default()
    }
}

/// Save an image into `dir` and return its path
pub fn save_fixture(dir: &Path, name: &str, img: &RgbImage) -> PathBuf {
    let path = dir.join(name);
    img.save(&path).expect("Failed to save fixture image");
    path
}

/// True when `actual` is within `tolerance` of `expected`
pub fn near(actual: u32, expected: u32, tolerance: u32) -> bool {
    actual.abs_diff(expected) <= tolerance
}
