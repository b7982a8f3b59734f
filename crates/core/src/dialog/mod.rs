pub mod action;
pub mod intent;
pub mod parse;
pub mod policy;
pub mod slot;
pub mod state;

pub use action::{ActionKind, AppletSummary, DialogAction};
pub use intent::{get_intent, IntentType};
pub use parse::{ParseResult, SlotPrediction};
pub use policy::{ConfidenceBand, DialogPolicy};
pub use slot::{Confirmation, Side, Slot};
pub use state::{Channel, ConfirmationOutcome, Field, Function, SlotState};
