use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum OcrError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("Tesseract not available; build with `tesseract` feature")]
    NotAvailable,
}

/// Turns image bytes into raw multi-line text.
/// Implementations must be shareable across the blocking pool.
pub trait OcrBackend: Send + Sync + 'static {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError>;
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Answers every image with the same text, or the same error.
pub struct MockRecognizer {
    outcome: Result<String, OcrError>,
}

impl MockRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { outcome: Ok(text.into()) }
    }

    pub fn failing(error: OcrError) -> Self {
        Self { outcome: Err(error) }
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<String, OcrError> {
        self.outcome.clone()
    }
}

/// Stand-in used when the binary was built without an OCR engine.
pub struct UnavailableRecognizer;

impl OcrBackend for UnavailableRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<String, OcrError> {
        Err(OcrError::NotAvailable)
    }
}

// ── Tesseract backend (optional, gated behind `tesseract` feature) ─────────────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{OcrBackend, OcrError};
    use leptess::LepTess;

    pub struct TesseractRecognizer {
        data_path: Option<String>,
        lang: String,
    }

    impl TesseractRecognizer {
        pub fn new(data_path: Option<String>, lang: &str) -> Self {
            Self { data_path, lang: lang.to_string() }
        }
    }

    impl OcrBackend for TesseractRecognizer {
        fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
            // LepTess is not Sync, so each call gets its own engine.
            let mut lt = LepTess::new(self.data_path.as_deref(), &self.lang)
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            lt.set_image_from_mem(image_bytes)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            lt.get_utf8_text().map_err(|e| OcrError::Engine(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_returns_preset_text() {
        let r = MockRecognizer::new("Pizza 250\nCoke 50");
        assert_eq!(r.recognize(b"fake image data").unwrap(), "Pizza 250\nCoke 50");
        assert_eq!(r.recognize(b"").unwrap(), "Pizza 250\nCoke 50");
    }

    #[test]
    fn failing_mock_returns_error() {
        let r = MockRecognizer::failing(OcrError::Engine("no text found".into()));
        assert!(matches!(r.recognize(b"img"), Err(OcrError::Engine(m)) if m == "no text found"));
    }

    #[test]
    fn unavailable_recognizer_reports_missing_engine() {
        assert!(matches!(
            UnavailableRecognizer.recognize(b"img"),
            Err(OcrError::NotAvailable)
        ));
    }
}
