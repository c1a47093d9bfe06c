use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use image::RgbImage;
use tokio::{runtime::Handle, sync::{oneshot, watch}};
use tracing::debug;

use crate::{
    error::{Result, SegmentationError},
    pipeline::Pipeline,
    types::{SegmentationMask, SegmentationProgress},
};

/// Runs the segmentation pipeline off the caller's thread.
///
/// Each [`Segmenter::submit`] starts a new generation. Only the newest
/// generation may deliver a mask; older jobs report
/// [`JobPoll::Superseded`] and their results are dropped.
#[derive(Clone)]
pub struct Segmenter {
    pipeline: Arc<Pipeline>,
    latest: Arc<AtomicU64>,
    handle: Handle,
}

impl Segmenter {
    pub fn new(pipeline: Pipeline, handle: Handle) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            latest: Arc::new(AtomicU64::new(0)),
            handle,
        }
    }

    /// Bind to the tokio runtime the caller is running in
    pub fn from_current(pipeline: Pipeline) -> Result<Self> {
        let handle = Handle::try_current().map_err(|_| SegmentationError::NoRuntime)?;
        Ok(Self::new(pipeline, handle))
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Generation of the most recent submission (0 before any)
    pub fn latest_generation(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// Drop interest in every outstanding job
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }

    pub fn submit(&self, photo: Arc<RgbImage>) -> SegmentationJob {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let (progress_tx, progress_rx) = watch::channel(SegmentationProgress::default());
        let (result_tx, result_rx) = oneshot::channel();

        let pipeline = Arc::clone(&self.pipeline);
        let latest = Arc::clone(&self.latest);
        self.handle.spawn_blocking(move || {
            let is_current = || latest.load(Ordering::SeqCst) == generation;
            if !is_current() {
                debug!(generation, "Skipping superseded segmentation request");
                return;
            }

            let mask = pipeline.run(&photo, &mut |progress| {
                if is_current() {
                    let _ = progress_tx.send(progress);
                }
            });

            if is_current() {
                let _ = result_tx.send(mask);
            } else {
                debug!(generation, "Discarding stale segmentation result");
            }
        });

        debug!(generation, "Submitted segmentation request");
        SegmentationJob {
            generation,
            latest: Arc::clone(&self.latest),
            progress: progress_rx,
            result: result_rx,
        }
    }
}

/// Outcome of polling a [`SegmentationJob`]
#[derive(Debug)]
pub enum JobPoll {
    Pending,
    Ready(SegmentationMask),
    /// A newer request was submitted; this one will never deliver
    Superseded,
    /// The worker stopped without producing a mask
    Lost,
}

/// Handle to one in-flight segmentation request
#[derive(Debug)]
pub struct SegmentationJob {
    generation: u64,
    latest: Arc<AtomicU64>,
    progress: watch::Receiver<SegmentationProgress>,
    result: oneshot::Receiver<SegmentationMask>,
}

impl SegmentationJob {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.generation
    }

    /// Most recently reported progress
    pub fn progress(&self) -> SegmentationProgress {
        self.progress.borrow().clone()
    }

    pub fn progress_receiver(&self) -> watch::Receiver<SegmentationProgress> {
        self.progress.clone()
    }

    /// Non-blocking check for a result
    pub fn try_take(&mut self) -> JobPoll {
        if !self.is_current() {
            return JobPoll::Superseded;
        }
        match self.result.try_recv() {
            Ok(mask) => JobPoll::Ready(mask),
            Err(oneshot::error::TryRecvError::Empty) => JobPoll::Pending,
            Err(oneshot::error::TryRecvError::Closed) if self.is_current() => JobPoll::Lost,
            Err(oneshot::error::TryRecvError::Closed) => JobPoll::Superseded,
        }
    }

    /// Wait for the mask. Superseded jobs resolve to [`SegmentationError::Cancelled`].
    pub async fn wait(self) -> Result<SegmentationMask> {
        let generation = self.generation;
        let latest = self.latest;
        match self.result.await {
            Ok(mask) if latest.load(Ordering::SeqCst) == generation => Ok(mask),
            Ok(_) => Err(SegmentationError::Cancelled),
            Err(_) if latest.load(Ordering::SeqCst) == generation => Err(
                SegmentationError::Inference("segmentation worker stopped".into()),
            ),
            Err(_) => Err(SegmentationError::Cancelled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::ConfidenceMapModel, types::SegmentationStage};
    use image::{GrayImage, Luma, Rgb};

    fn create_test_photo() -> Arc<RgbImage> {
        let mut photo = RgbImage::from_pixel(32, 16, Rgb([20, 40, 220]));
        for y in 4..12 {
            for x in 8..24 {
                photo.put_pixel(x, y, Rgb([224, 172, 140]));
            }
        }
        Arc::new(photo)
    }

    #[tokio::test]
    async fn test_submit_and_wait() {
        let segmenter = Segmenter::from_current(Pipeline::builder().build()).unwrap();
        let job = segmenter.submit(create_test_photo());
        assert_eq!(job.generation(), 1);

        let progress = job.progress_receiver();
        let mask = job.wait().await.unwrap();
        assert_eq!(mask.dimensions(), (32, 16));
        assert!(!mask.is_fallback());
        assert_eq!(mask.image.get_pixel(16, 8).0[0], 255);
        assert_eq!(mask.image.get_pixel(0, 0).0[0], 0);
        assert_eq!(progress.borrow().stage, SegmentationStage::Complete);
    }

    #[tokio::test]
    async fn test_newer_request_supersedes_older() {
        let segmenter = Segmenter::from_current(Pipeline::builder().build()).unwrap();
        let mut first = segmenter.submit(create_test_photo());
        let second = segmenter.submit(create_test_photo());

        assert!(!first.is_current());
        assert!(second.is_current());
        assert!(matches!(first.try_take(), JobPoll::Superseded));
        assert!(matches!(first.wait().await, Err(SegmentationError::Cancelled)));
        assert!(second.wait().await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_model_falls_back_to_full_frame() {
        let pipeline = Pipeline::builder()
            .with_model(ConfidenceMapModel::from_path("/nonexistent/map.png"))
            .build();
        let segmenter = Segmenter::from_current(pipeline).unwrap();
        let mask = segmenter.submit(create_test_photo()).wait().await.unwrap();
        assert!(mask.is_fallback());
        assert_eq!(mask.coverage(), 1.0);
    }

    #[tokio::test]
    async fn test_confidence_map_is_resampled() {
        let pipeline = Pipeline::builder()
            .with_model(ConfidenceMapModel::from_image(GrayImage::from_pixel(4, 2, Luma([200]))))
            .build();
        let segmenter = Segmenter::from_current(pipeline).unwrap();
        let mask = segmenter.submit(create_test_photo()).wait().await.unwrap();
        assert_eq!(mask.dimensions(), (32, 16));
        assert_eq!(mask.coverage(), 1.0);
    }

    #[test]
    fn test_no_runtime() {
        assert!(matches!(
            Segmenter::from_current(Pipeline::builder().build()),
            Err(SegmentationError::NoRuntime)
        ));
    }
}
