use image::imageops::{self, FilterType};
use image::RgbImage;

use crate::app::config::DetectorConfig;
use crate::{Error, Result};

pub const RGB_CHANNELS: usize = 3;

/// Square NHWC float tensor fed to the model.
#[derive(Debug, Clone)]
pub struct NormalizedTensor {
    size: u32,
    data: Box<[f32]>,
}

impl NormalizedTensor {
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[cfg(test)]
    fn pixel(&self, x: u32, y: u32) -> &[f32] {
        let offset = (y as usize * self.size as usize + x as usize) * RGB_CHANNELS;
        &self.data[offset..offset + RGB_CHANNELS]
    }
}

/// Stretches an image to the model input and maps every channel value `v` to
/// `(v - mean) / std`.
#[derive(Debug, Clone, Copy)]
pub struct ImagePreprocessor {
    target_size: u32,
    mean: f32,
    std: f32,
}

impl ImagePreprocessor {
    pub fn new(target_size: u32, mean: f32, std: f32) -> Self {
        Self {
            target_size,
            mean,
            std,
        }
    }

    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::new(config.input_size, config.norm_mean, config.norm_std)
    }

    pub fn preprocess(&self, image: &RgbImage) -> Result<NormalizedTensor> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(Error::InvalidImage { width, height });
        }

        // Aspect ratio is not kept: the decoder scales boxes by the original dimensions.
        let size = self.target_size;
        let resized = if (width, height) == (size, size) {
            image.clone()
        } else {
            imageops::resize(image, size, size, FilterType::Triangle)
        };
        tracing::trace!("resized {}x{} to {}x{}", width, height, size, size);

        let data = resized
            .as_raw()
            .iter()
            .map(|&v| (v as f32 - self.mean) / self.std)
            .collect();
        Ok(NormalizedTensor { size, data })
    }
}
