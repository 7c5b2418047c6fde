use crate::models::config::PreprocessingConfig;
use image::{DynamicImage, GenericImageView, ImageBuffer, Luma};

/// Image preprocessing service applied before OCR
pub struct PreprocessingService {
    config: PreprocessingConfig,
}

impl PreprocessingService {
    /// Create a new preprocessing service with custom configuration
    pub fn new(config: PreprocessingConfig) -> Self {
        Self { config }
    }

    /// Pipeline: grayscale -> scale -> threshold, each step optional
    pub fn preprocess(&self, image: &DynamicImage) -> DynamicImage {
        let mut current = if self.config.grayscale {
            self.to_grayscale(image)
        } else {
            image.clone()
        };

        if (self.config.scale_factor - 1.0).abs() > f64::EPSILON {
            current = self.scale(&current, self.config.scale_factor);
        }

        if self.config.threshold {
            current = self.threshold(&current);
        }

        current
    }

    /// Convert image to grayscale
    pub fn to_grayscale(&self, image: &DynamicImage) -> DynamicImage {
        DynamicImage::ImageLuma8(image.to_luma8())
    }

    /// Scale image by factor, never below 1x1
    pub fn scale(&self, image: &DynamicImage, factor: f64) -> DynamicImage {
        let (width, height) = image.dimensions();
        let new_width = ((width as f64 * factor) as u32).max(1);
        let new_height = ((height as f64 * factor) as u32).max(1);

        image.resize_exact(new_width, new_height, image::imageops::FilterType::Lanczos3)
    }

    /// Apply binary thresholding (Otsu's method)
    pub fn threshold(&self, image: &DynamicImage) -> DynamicImage {
        use imageproc::contrast::otsu_level;

        let gray_img = image.to_luma8();
        let threshold_value = otsu_level(&gray_img);

        let binary = ImageBuffer::from_fn(gray_img.width(), gray_img.height(), |x, y| {
            let pixel = gray_img.get_pixel(x, y);
            if pixel[0] > threshold_value {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        });

        DynamicImage::ImageLuma8(binary)
    }
}

impl Default for PreprocessingService {
    fn default() -> Self {
        Self::new(PreprocessingConfig::default())
    }
}
