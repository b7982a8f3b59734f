pub mod config;
pub mod dialog;
pub mod errors;
pub mod labels;
pub mod tracker;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat, Thresholds};
pub use dialog::{
    get_intent, ActionKind, AppletSummary, Confirmation, DialogAction, DialogPolicy, IntentType,
    ParseResult, Side, Slot, SlotPrediction, SlotState,
};
pub use errors::{DialogError, LabelError, ParserError, ProtocolError};
pub use labels::{LabelCatalog, LabelDescriber};
pub use tracker::{DialogStatus, DialogSummary, DialogTracker};
