use image::{GrayImage, Rgb, RgbImage};
use imageproc::contrast::{self, ThresholdType};
use imageproc::filter::gaussian_blur_f32;
use tracing::{debug, instrument};

use crate::config::{Polarity, ThresholdConfig};
use crate::models::Mask;

/// Output of the preprocessing stage
pub struct Preprocessed {
    /// Blurred grayscale image the mask was thresholded from
    pub gray: GrayImage,
    pub mask: Mask,
}

/// Convert image to grayscale
pub fn to_grayscale(img: &RgbImage) -> GrayImage {
    image::imageops::grayscale(img)
}

/// Apply a Gaussian blur; a kernel of width 1 leaves the image unchanged
pub fn apply_blur(img: &GrayImage, config: &ThresholdConfig) -> GrayImage {
    if config.blur_kernel <= 1 {
        return img.clone();
    }
    gaussian_blur_f32(img, config.blur_sigma())
}

/// Threshold a grayscale image into a foreground mask.
///
/// With [`Polarity::DarkForeground`] a pixel is foreground when its intensity
/// is at most `threshold`; with [`Polarity::LightForeground`] when it is above.
pub fn binarize(img: &GrayImage, threshold: u8, polarity: Polarity) -> Mask {
    let threshold_type = match polarity {
        Polarity::DarkForeground => ThresholdType::BinaryInverted,
        Polarity::LightForeground => ThresholdType::Binary,
    };
    contrast::threshold(img, threshold, threshold_type)
}

/// Grayscale, blur and binarize a color scan
#[instrument(skip_all, fields(width = img.width(), height = img.height(), threshold = threshold))]
pub fn preprocess(img: &RgbImage, threshold: u8, config: &ThresholdConfig) -> Preprocessed {
    let gray = apply_blur(&to_grayscale(img), config);
    let mask = binarize(&gray, threshold, config.polarity);

    let foreground = mask.pixels().filter(|p| p[0] > 0).count();
    debug!(foreground, sigma = config.blur_sigma(), "Mask computed");

    Preprocessed { gray, mask }
}

/// Inverted color copy of the mask (foreground black) for annotation
pub fn mask_view(mask: &Mask) -> RgbImage {
    RgbImage::from_fn(mask.width(), mask.height(), |x, y| {
        let v = 255 - mask.get_pixel(x, y)[0];
        Rgb([v, v, v])
    })
}
