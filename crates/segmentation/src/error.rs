use thiserror::Error;

#[derive(Error, Debug)]
pub enum SegmentationError {
    #[error("Failed to load segmentation model '{model}': {reason}")]
    ModelLoad { model: String, reason: String },

    #[error("No body region detected")]
    NoBodyDetected,

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Image has no pixels")]
    EmptyImage,

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Segmentation request was superseded")]
    Cancelled,

    #[error("No async runtime available to run segmentation")]
    NoRuntime,
}

pub type Result<T> = std::result::Result<T, SegmentationError>;
