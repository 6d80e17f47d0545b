//! Debug rendering: region outlines on the mask view and the summary sheet.
//!
//! Everything here is best-effort decoration. Nothing in this module can
//! change which photos are extracted.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut, draw_polygon_mut,
};
use imageproc::point::Point;
use imageproc::rect::Rect;

use crate::models::{BoundingQuad, ExtractedPhoto, Region, RegionVerdict};

pub const REJECTED_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const ACCEPTED_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const FRAME_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

/// Edge length of one summary cell
const CELL_SIZE: u32 = 320;
const GAP: u32 = 16;
const FRAME_WIDTH: u32 = 3;

/// Collects region outlines on a copy of the mask view
pub struct Annotator {
    canvas: RgbImage,
    thickness: u32,
}

impl Annotator {
    pub fn new(canvas: RgbImage, thickness: u32) -> Self {
        Self { canvas, thickness }
    }

    /// Outline a classified region; discarded regions leave no trace
    pub fn mark(&mut self, region: &Region) {
        let color = match region.verdict {
            RegionVerdict::Discard => return,
            RegionVerdict::Reject => REJECTED_COLOR,
            RegionVerdict::Keep => ACCEPTED_COLOR,
        };
        draw_quad_outline(&mut self.canvas, &region.quad, color, self.thickness);
    }

    pub fn canvas(&self) -> &RgbImage {
        &self.canvas
    }

    pub fn into_canvas(self) -> RgbImage {
        self.canvas
    }
}

pub fn draw_quad_outline(
    canvas: &mut RgbImage,
    quad: &BoundingQuad,
    color: Rgb<u8>,
    thickness: u32,
) {
    if thickness == 0 {
        return;
    }
    for i in 0..4 {
        let a = quad.corners[i];
        let b = quad.corners[(i + 1) % 4];
        draw_thick_segment(canvas, a, b, color, thickness);
    }
}

/// Line segment `thickness` pixels wide with round joins
fn draw_thick_segment(
    canvas: &mut RgbImage,
    a: Point<i32>,
    b: Point<i32>,
    color: Rgb<u8>,
    thickness: u32,
) {
    let (ax, ay) = (a.x as f32, a.y as f32);
    let (bx, by) = (b.x as f32, b.y as f32);

    if thickness == 1 {
        draw_line_segment_mut(canvas, (ax, ay), (bx, by), color);
        return;
    }

    let half = thickness as f32 / 2.0;
    let radius = (half.round() as i32).max(1);
    draw_filled_circle_mut(canvas, (a.x, a.y), radius, color);
    draw_filled_circle_mut(canvas, (b.x, b.y), radius, color);

    let len = (bx - ax).hypot(by - ay);
    if len < 1.0 {
        return;
    }
    let (nx, ny) = (-(by - ay) / len * half, (bx - ax) / len * half);
    let band = [
        Point::new((ax + nx).round() as i32, (ay + ny).round() as i32),
        Point::new((bx + nx).round() as i32, (by + ny).round() as i32),
        Point::new((bx - nx).round() as i32, (by - ny).round() as i32),
        Point::new((ax - nx).round() as i32, (ay - ny).round() as i32),
    ];
    // draw_polygon_mut refuses closed point lists
    if band[0] != band[3] {
        draw_polygon_mut(canvas, &band, color);
    }
}

/// Build the summary sheet for one scan.
///
/// Top row: the annotated mask view and the blurred grayscale, both turned
/// 90° clockwise. Bottom row: every extracted photo in a black frame.
pub fn compose_summary(
    mask_view: &RgbImage,
    gray: &GrayImage,
    photos: &[ExtractedPhoto],
) -> RgbImage {
    let columns = photos.len().max(2) as u32;
    let width = columns * CELL_SIZE + (columns + 1) * GAP;
    let height = 2 * CELL_SIZE + 3 * GAP;
    let mut sheet = RgbImage::from_pixel(width, height, BACKGROUND);

    let gray_rgb = DynamicImage::ImageLuma8(gray.clone()).to_rgb8();
    let checks = [imageops::rotate90(mask_view), imageops::rotate90(&gray_rgb)];
    for (col, view) in checks.iter().enumerate() {
        place_in_cell(&mut sheet, view, col as u32, 0, false);
    }

    for (col, photo) in photos.iter().enumerate() {
        place_in_cell(&mut sheet, &photo.image, col as u32, 1, true);
    }

    sheet
}

/// Scale an image to fit a cell and center it there
fn place_in_cell(sheet: &mut RgbImage, img: &RgbImage, col: u32, row: u32, framed: bool) {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return;
    }

    let scale = (CELL_SIZE as f32 / w as f32).min(CELL_SIZE as f32 / h as f32);
    let thumb_w = ((w as f32 * scale) as u32).clamp(1, CELL_SIZE);
    let thumb_h = ((h as f32 * scale) as u32).clamp(1, CELL_SIZE);
    let thumb = imageops::resize(img, thumb_w, thumb_h, FilterType::Triangle);

    let x = GAP + col * (CELL_SIZE + GAP) + (CELL_SIZE - thumb_w) / 2;
    let y = GAP + row * (CELL_SIZE + GAP) + (CELL_SIZE - thumb_h) / 2;
    imageops::overlay(sheet, &thumb, x.into(), y.into());

    if framed {
        for k in 1..=FRAME_WIDTH {
            let rect = Rect::at(x as i32 - k as i32, y as i32 - k as i32)
                .of_size(thumb_w + 2 * k, thumb_h + 2 * k);
            draw_hollow_rect_mut(sheet, rect, FRAME_COLOR);
        }
    }
}
