use std::path::Path;

use image::{DynamicImage, RgbImage};

use crate::app::config::DetectorConfig;
use crate::pipeline::decode::{DetectionDecoder, Detections};
use crate::pipeline::engine::InferenceEngine;
use crate::pipeline::labels::LabelTable;
use crate::pipeline::preprocess::ImagePreprocessor;
use crate::{Error, Result};

#[cfg(feature = "tflite")]
use crate::pipeline::tflite_engine::TFLiteEngine;

/// Runs resize, normalize, inference and decode for one image at a time.
///
/// The engine is owned until [`MaskDetector::close`] or drop. `detect` takes
/// `&mut self`; share a detector across threads only behind your own lock.
pub struct MaskDetector<E: InferenceEngine> {
    engine: Option<E>,
    preprocessor: ImagePreprocessor,
    decoder: DetectionDecoder,
    labels: LabelTable,
}

#[cfg(feature = "tflite")]
impl MaskDetector<TFLiteEngine<'static>> {
    /// Loads the model named by `config.model_filename`.
    pub fn open(config: &DetectorConfig) -> Result<Self> {
        config.validate()?;
        let engine = TFLiteEngine::new(config)?;
        Self::with_engine(engine, config)
    }
}

impl<E: InferenceEngine> MaskDetector<E> {
    pub fn with_engine(engine: E, config: &DetectorConfig) -> Result<Self> {
        config.validate()?;
        if engine.input_size() != config.input_size {
            return Err(Error::InvalidConfig(format!(
                "engine expects {}x{} input, configured {}x{}",
                engine.input_size(),
                engine.input_size(),
                config.input_size,
                config.input_size
            )));
        }
        if engine.capacity() != config.max_candidates {
            return Err(Error::InvalidConfig(format!(
                "engine returns up to {} candidates, configured {}",
                engine.capacity(),
                config.max_candidates
            )));
        }
        let labels = config.label_table()?;
        tracing::info!(%config, labels = labels.len(), "mask detector ready");
        Ok(Self {
            engine: Some(engine),
            preprocessor: ImagePreprocessor::from_config(config),
            decoder: DetectionDecoder::from_config(config),
            labels,
        })
    }

    pub fn detect(&mut self, image: &RgbImage) -> Result<Detections> {
        let engine = self.engine.as_mut().ok_or(Error::UninitializedEngine)?;
        let (width, height) = image.dimensions();

        let tensor = self.preprocessor.preprocess(image)?;
        let raw = engine.infer(&tensor)?;
        tracing::debug!("{} raw candidates for {}x{} image", raw.count(), width, height);

        self.decoder.decode(&raw, width, height, &self.labels)
    }

    pub fn detect_dynamic(&mut self, image: &DynamicImage) -> Result<Detections> {
        match image {
            DynamicImage::ImageRgb8(rgb) => self.detect(rgb),
            other => self.detect(&other.to_rgb8()),
        }
    }

    pub fn detect_file<P: AsRef<Path>>(&mut self, path: P) -> Result<Detections> {
        if self.is_closed() {
            return Err(Error::UninitializedEngine);
        }
        let image = image::open(path.as_ref())?;
        tracing::trace!("decoded {}", path.as_ref().display());
        self.detect_dynamic(&image)
    }

    /// Releases the engine. Later calls to `detect` fail with `UninitializedEngine`.
    pub fn close(&mut self) {
        if self.engine.take().is_some() {
            tracing::debug!("inference engine released");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.engine.is_none()
    }
}
