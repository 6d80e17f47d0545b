use image::{Rgb, RgbImage};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};
use tracing::{debug, instrument};

use crate::error::{ExtractError, Result};
use crate::models::BoundingQuad;

/// Fill for output pixels whose source falls outside the scan
pub const BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);

/// Quads enclosing less than this many square pixels are treated as collinear
const MIN_QUAD_AREA: f64 = 1.0;

/// Output size for a quad: side lengths truncated to whole pixels.
///
/// Width follows the side `corners[0] → corners[1]`, height the side
/// `corners[0] → corners[3]`.
pub fn destination_size(quad: &BoundingQuad) -> (u32, u32) {
    (quad.width.floor() as u32, quad.height.floor() as u32)
}

/// Warp a kept region onto an axis-aligned buffer
#[instrument(skip_all, fields(width = quad.width, height = quad.height))]
pub fn rectify(image: &RgbImage, quad: &BoundingQuad) -> Result<RgbImage> {
    if quad.area < MIN_QUAD_AREA {
        return Err(ExtractError::DegenerateRegion {
            width: quad.width,
            height: quad.height,
        });
    }
    let (width, height) = destination_size(quad);
    warp_quad(image, quad.corners_f32(), width, height)
}

/// Map four source corners onto a `width` x `height` rectangle.
///
/// Corners are taken in order top-left, top-right, bottom-right, bottom-left
/// of the result. Sampling is bilinear from the untouched source image.
pub fn warp_quad(
    image: &RgbImage,
    corners: [(f32, f32); 4],
    width: u32,
    height: u32,
) -> Result<RgbImage> {
    let degenerate = || ExtractError::DegenerateRegion {
        width: width as f64,
        height: height as f64,
    };

    if width < 2 || height < 2 {
        return Err(degenerate());
    }

    let (w, h) = ((width - 1) as f32, (height - 1) as f32);
    let target = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)];

    let projection = Projection::from_control_points(corners, target).ok_or_else(degenerate)?;

    let mut output = RgbImage::new(width, height);
    warp_into(image, &projection, Interpolation::Bilinear, BACKGROUND, &mut output);

    debug!(width, height, "Region rectified");
    Ok(output)
}
