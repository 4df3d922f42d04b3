pub mod assignment;
pub mod config;
pub mod error;
pub mod item;
pub mod money;
pub mod participant;
pub mod session;
pub mod totals;

pub use assignment::{AssignmentStore, Bounds};
pub use config::{ConfigError, DisplayConfig, OcrConfig, ParserConfig, SplitConfig, TabsplitConfig};
pub use error::{IndexKind, SplitError};
pub use item::Item;
pub use money::Money;
pub use participant::ParticipantRegistry;
pub use session::{Action, RecognitionStatus, Session};
pub use totals::{compute_totals, ParticipantTotal, SplitMode, Totals, TotalsOptions};
