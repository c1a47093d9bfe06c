//! # Studio
//!
//! The editing session around the compositor: asset store, gesture
//! handling, erasure painting, segmentation orchestration, export and a
//! scriptable command surface.
//!
//! ```rust,no_run
//! use studio::{EditorCommand, Gesture, Session, SessionConfig};
//!
//! # async fn run() -> studio::Result<()> {
//! let mut session = Session::new(SessionConfig::default())?;
//! session.set_photograph(image::open("arm.jpg").map_err(segmentation::SegmentationError::from)?.to_rgb8())?;
//! session.set_tattoo(image::open("rose.png").map_err(segmentation::SegmentationError::from)?.to_rgba8())?;
//! session.settle().await?;
//!
//! session.execute(&EditorCommand::Gesture(Gesture::Pinch { distance: 30.0, angle: 0.2 }))?;
//! session.render()?;
//! let path = session.export_composite()?;
//! println!("saved {}", path.display());
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod config;
pub mod erasure;
pub mod error;
pub mod export;
pub mod gesture;
pub mod session;
pub mod store;
pub mod view;

pub use command::EditorCommand;
pub use config::{ExportConfig, SegmentationConfig, SessionConfig};
pub use erasure::ErasureCanvas;
pub use error::{Result, StudioError};
pub use export::{ExportGuard, Exporter};
pub use gesture::{Gesture, InteractionMode, TransformController, reduce};
pub use session::Session;
pub use store::{AssetKind, AssetStore};
pub use view::{EditorTab, ViewState};
