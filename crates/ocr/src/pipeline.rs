use std::sync::Arc;

use tabsplit_core::{OcrConfig, ParserConfig};
use thiserror::Error;

use crate::extract::Extractor;
use crate::hash;
use crate::preprocess::{self, PreprocessError};
use crate::recognizer::{OcrBackend, OcrError};
use crate::types::ExtractedReceipt;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Image preprocessing failed: {0}")]
    Preprocess(#[from] PreprocessError),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
    #[error("Recognition task did not complete: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// The result of a single recognition run.
#[derive(Debug, Clone)]
pub struct OcrResult {
    /// Short SHA-256 prefix of the submitted bytes.
    pub fingerprint: String,
    /// Raw OCR text output.
    pub ocr_text: String,
    pub extracted: ExtractedReceipt,
}

/// Orchestrates: fingerprint → preprocess → OCR → extract.
pub struct ReceiptPipeline<R: OcrBackend> {
    recognizer: Arc<R>,
    ocr: OcrConfig,
    parser: ParserConfig,
}

impl<R: OcrBackend> ReceiptPipeline<R> {
    pub fn new(recognizer: R, ocr: OcrConfig, parser: ParserConfig) -> Self {
        Self {
            recognizer: Arc::new(recognizer),
            ocr,
            parser,
        }
    }

    /// Recognize a receipt image. Decoding and OCR run on the blocking pool.
    pub async fn process_bytes(&self, data: Vec<u8>) -> Result<OcrResult, PipelineError> {
        let fingerprint = hash::fingerprint(&data);
        let recognizer = Arc::clone(&self.recognizer);
        let max_dimension = self.ocr.max_dimension;

        let ocr_text = tokio::task::spawn_blocking(move || -> Result<String, PipelineError> {
            let image_bytes = preprocess::prepare_for_ocr_from_bytes(&data, max_dimension)?;
            Ok(recognizer.recognize(&image_bytes)?)
        })
        .await??;

        Ok(self.process_text(fingerprint, ocr_text))
    }

    /// Skip recognition and extract items from text that is already available.
    pub fn process_text(&self, fingerprint: String, ocr_text: String) -> OcrResult {
        let extracted = Extractor::extract(&ocr_text, &self.parser);
        tracing::debug!(
            %fingerprint,
            items = extracted.items.len(),
            unmatched = extracted.unmatched_lines,
            "extracted receipt lines"
        );
        OcrResult {
            fingerprint,
            ocr_text,
            extracted,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
