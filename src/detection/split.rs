use image::{imageops, RgbImage};

/// Cut an image into a left and a right part at column `offset`.
///
/// `offset` is clamped to the image width, so one side may come back empty.
pub fn split_vertical(image: &RgbImage, offset: u32) -> (RgbImage, RgbImage) {
    let (width, height) = image.dimensions();
    let offset = offset.min(width);

    let left = imageops::crop_imm(image, 0, 0, offset, height).to_image();
    let right = imageops::crop_imm(image, offset, 0, width - offset, height).to_image();
    (left, right)
}
