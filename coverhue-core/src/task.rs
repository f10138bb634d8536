use crate::bitmap::Bitmap;
use crate::error::ExtractError;
use crate::extract::{extract_colors_on, CancelFlag, ResultColors};
use crate::quality::ScaleQuality;
use log::debug;
use palette::Srgb;
use tokio::task::JoinHandle;

/// An extraction running on tokio's blocking pool.
///
/// Dropping the handle cancels the work, so a cover that is no longer shown
/// stops burning CPU.
pub struct ExtractionTask {
    cancel: CancelFlag,
    handle: JoinHandle<Result<ResultColors, ExtractError>>,
}

impl ExtractionTask {
    pub fn spawn(bitmap: Bitmap, quality: ScaleQuality) -> Self {
        Self::spawn_with_cancel(bitmap, quality, CancelFlag::new())
    }

    pub fn spawn_with_cancel(bitmap: Bitmap, quality: ScaleQuality, cancel: CancelFlag) -> Self {
        Self::spawn_on(bitmap, quality, None, cancel)
    }

    /// Runs [`extract_colors_on`], optionally against a fixed background.
    pub fn spawn_on(
        bitmap: Bitmap,
        quality: ScaleQuality,
        background: Option<Srgb<u8>>,
        cancel: CancelFlag,
    ) -> Self {
        let worker_cancel = cancel.clone();
        let handle = tokio::task::spawn_blocking(move || {
            extract_colors_on(&bitmap, quality, background, &worker_cancel)
        });
        Self { cancel, handle }
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        debug!("Cancelling color extraction");
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub async fn join(mut self) -> Result<ResultColors, ExtractError> {
        match (&mut self.handle).await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(ExtractError::Cancelled),
            Err(e) => Err(ExtractError::Task(e.to_string())),
        }
    }
}

impl Drop for ExtractionTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
