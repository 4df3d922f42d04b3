use tabsplit_core::{Action, Session, SplitError, TabsplitConfig, Totals, TotalsOptions};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::pipeline::{PipelineError, ReceiptPipeline};
use crate::recognizer::OcrBackend;
use crate::types::ExtractedReceipt;

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Receipt recognition failed: {0}")]
    RecognitionFailed(#[source] PipelineError),
    #[error(transparent)]
    Session(#[from] SplitError),
}

/// One bill-splitting session fed by a recognition pipeline.
///
/// Submissions are serialized: while one image is being recognized a second
/// submission is rejected with [`SplitError::RecognitionInFlight`]. The session
/// lock is not held while recognition runs, so edits keep flowing.
pub struct ReceiptSession<R: OcrBackend> {
    pipeline: ReceiptPipeline<R>,
    state: Mutex<Session>,
    totals: TotalsOptions,
}

impl<R: OcrBackend> ReceiptSession<R> {
    pub fn new(recognizer: R, config: &TabsplitConfig) -> Self {
        Self {
            pipeline: ReceiptPipeline::new(recognizer, config.ocr.clone(), config.parser.clone()),
            state: Mutex::new(
                Session::new().with_auto_split_includes_blank(config.split.auto_split_includes_blank),
            ),
            totals: config.totals_options(),
        }
    }

    /// Recognize `image` and replace the item list with what it contains.
    ///
    /// On failure the previous items and assignments are kept and the session
    /// records the failure message. If the submission was cancelled while
    /// running, its result is discarded with [`SplitError::StaleRecognition`].
    pub async fn submit_image(&self, image: Vec<u8>) -> Result<ExtractedReceipt, IntakeError> {
        let ticket = self.state.lock().await.begin_recognition()?;
        tracing::info!(ticket, bytes = image.len(), "recognizing receipt");

        match self.pipeline.process_bytes(image).await {
            Ok(result) => {
                tracing::info!(
                    ticket,
                    fingerprint = %result.fingerprint,
                    items = result.extracted.items.len(),
                    "receipt recognized"
                );
                self.complete(ticket, result.extracted).await
            }
            Err(e) => {
                tracing::warn!(ticket, "receipt recognition failed: {e}");
                let failed = Action::RecognitionFailed {
                    ticket,
                    message: e.to_string(),
                };
                match self.state.lock().await.apply(failed) {
                    Ok(()) | Err(SplitError::StaleRecognition { .. }) => {}
                    Err(other) => return Err(other.into()),
                }
                Err(IntakeError::RecognitionFailed(e))
            }
        }
    }

    /// Replace the item list from already-recognized text.
    pub async fn submit_text(&self, text: String) -> Result<ExtractedReceipt, IntakeError> {
        let ticket = self.state.lock().await.begin_recognition()?;
        let result = self.pipeline.process_text(format!("text-{ticket}"), text);
        self.complete(ticket, result.extracted).await
    }

    /// Abandon the in-flight recognition; its eventual result is discarded.
    pub async fn cancel(&self) -> Result<(), SplitError> {
        self.dispatch(Action::CancelRecognition).await?;
        tracing::info!("receipt recognition cancelled");
        Ok(())
    }

    /// Apply a user intent to the session.
    pub async fn dispatch(&self, action: Action) -> Result<(), SplitError> {
        self.state.lock().await.apply(action)
    }

    pub async fn snapshot(&self) -> Session {
        self.state.lock().await.clone()
    }

    pub async fn totals(&self) -> Result<Totals, SplitError> {
        self.state.lock().await.totals(&self.totals)
    }

    async fn complete(
        &self,
        ticket: u64,
        extracted: ExtractedReceipt,
    ) -> Result<ExtractedReceipt, IntakeError> {
        let done = Action::RecognitionSucceeded {
            ticket,
            items: extracted.items.clone(),
        };
        if let Err(e) = self.state.lock().await.apply(done) {
            tracing::warn!(ticket, "discarding recognition result: {e}");
            return Err(e.into());
        }
        Ok(extracted)
    }
}
