use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to load model {path}: {reason}")]
    ModelLoad { path: String, reason: String },
    #[error("invalid image: {width}x{height}")]
    InvalidImage { width: u32, height: u32 },
    #[error("inference engine is not initialized")]
    UninitializedEngine,
    #[error("class id {class_id} is outside the label table ({labels} labels)")]
    UnknownClassId { class_id: f32, labels: usize },
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn model_load(path: &str, reason: impl ToString) -> Self {
        Error::ModelLoad {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }
}
