//! # Body Segmentation
//!
//! Turns a photograph into a binary skin mask that marks where a tattoo
//! may be drawn. The model is a swappable trait object; the pipeline
//! downscales the photograph, runs the model, binarizes the confidence
//! map and falls back to a full-frame mask when anything goes wrong.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use segmentation::Pipeline;
//!
//! let pipeline = Pipeline::builder()
//!     .with_threshold(0.2)
//!     .with_closing(2)
//!     .build();
//!
//! let photo = image::open("photo.jpg")?.to_rgb8();
//! let mask = pipeline.run(&photo, &mut |progress| {
//!     println!("{}% {}", progress.percent, progress.status);
//! });
//! mask.image.save("mask.png")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Background Requests
//!
//! [`Segmenter`] runs the pipeline on tokio's blocking pool. Submitting a
//! new photograph supersedes any request still in flight.

pub mod error;
pub mod types;
pub mod traits;
pub mod algorithms;
pub mod models;
pub mod pipeline;
pub mod segmenter;

pub use error::{Result, SegmentationError};
pub use types::{ConfidenceMap, MaskSource, SegmentationMask, SegmentationProgress, SegmentationStage};
pub use traits::*;
pub use algorithms::*;
pub use models::{ConfidenceMapModel, SkinToneModel};
pub use pipeline::{Pipeline, builder::PipelineBuilder};
pub use segmenter::{JobPoll, SegmentationJob, Segmenter};
