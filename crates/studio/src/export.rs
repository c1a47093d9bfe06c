use std::{
    fs,
    io::{BufWriter, Write},
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use compositor::flatten;
use image::{Rgb, RgbaImage, codecs::jpeg::JpegEncoder};
use tracing::{error, info, warn};

use crate::{
    config::ExportConfig,
    error::{Result, StudioError},
};

/// Writes rendered frames as JPEG files.
///
/// Clones share one in-progress flag, so an export requested while another
/// is still writing is refused with [`StudioError::ExportInProgress`].
#[derive(Debug, Clone)]
pub struct Exporter {
    config: ExportConfig,
    busy: Arc<AtomicBool>,
}

/// Held while an export runs; dropping it clears the in-progress flag
#[derive(Debug)]
pub struct ExportGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for ExportGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::SeqCst);
    }
}

impl Exporter {
    pub fn new(config: ExportConfig) -> Self {
        Self {
            config,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Claim the export slot
    pub fn try_begin(&self) -> Result<ExportGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| StudioError::ExportInProgress)?;
        Ok(ExportGuard { busy: Arc::clone(&self.busy) })
    }

    /// `<prefix>_<unix millis>.jpg`
    pub fn file_name(&self, timestamp_millis: i64) -> String {
        format!("{}_{}.jpg", self.config.file_prefix, timestamp_millis)
    }

    /// Encode the frame and move it into place. Nothing is left behind on
    /// failure.
    pub fn export(&self, frame: &RgbaImage) -> Result<PathBuf> {
        let _guard = match self.try_begin() {
            Ok(guard) => guard,
            Err(e) => {
                warn!("Ignoring export request while another export is running");
                return Err(e);
            }
        };

        let result = self.write(frame);
        match &result {
            Ok(path) => info!(path = %path.display(), "Exported composite"),
            Err(e) => error!(error = %e, "Export failed"),
        }
        result
    }

    fn write(&self, frame: &RgbaImage) -> Result<PathBuf> {
        if frame.width() == 0 || frame.height() == 0 {
            return Err(StudioError::NoFrame);
        }
        let directory = &self.config.directory;
        fs::create_dir_all(directory)?;
        let target = directory.join(self.file_name(chrono::Utc::now().timestamp_millis()));

        let rgb = flatten(frame, Rgb([255, 255, 255]));
        let staging = tempfile::NamedTempFile::new_in(directory)?;
        {
            let mut writer = BufWriter::new(staging.as_file());
            JpegEncoder::new_with_quality(&mut writer, self.config.quality.clamp(1, 100))
                .encode_image(&rgb)
                .map_err(|e| StudioError::Export(e.to_string()))?;
            writer.flush()?;
        }
        staging
            .persist(&target)
            .map_err(|e| StudioError::Export(e.error.to_string()))?;
        Ok(target)
    }
}
