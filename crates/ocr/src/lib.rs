pub mod extract;
pub mod hash;
pub mod intake;
pub mod pipeline;
pub mod preprocess;
pub mod recognizer;
pub mod types;

pub use extract::{cleaned_lines, parse_items, parse_line, Extractor};
pub use hash::{fingerprint, sha256_bytes, to_hex};
pub use intake::{IntakeError, ReceiptSession};
pub use pipeline::{OcrResult, PipelineError, ReceiptPipeline};
pub use preprocess::{prepare_for_ocr_from_bytes, PreprocessError};
pub use recognizer::{MockRecognizer, OcrBackend, OcrError, UnavailableRecognizer};
pub use types::ExtractedReceipt;
