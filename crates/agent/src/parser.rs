use applet_dialog_core::dialog::{Confirmation, IntentType, ParseResult, SlotState};
use applet_dialog_core::errors::ParserError;

pub const YES_UTTERANCES: [&str; 5] = ["yes", "yep", "yeah", "yea", "yo"];
pub const NO_UTTERANCES: [&str; 4] = ["no", "nope", "nah", "nay"];

/// Turns a user utterance into confidence-scored slot predictions.
///
/// The contract per intent:
/// - `FreeForm` returns a prediction for every slot.
/// - A slot intent returns a prediction for that slot. Function intents only
///   consider functions of the channel currently held in `state`.
/// - `Confirm` returns a confirmation.
pub trait UtteranceParser: Send + Sync {
    fn parse(
        &self,
        utterance: &str,
        intent: IntentType,
        state: &SlotState,
    ) -> Result<ParseResult, ParserError>;
}

/// Reads a yes/no answer. Only a bare yes-word or no-word counts.
pub fn parse_confirmation(utterance: &str) -> Confirmation {
    let normalized = utterance.trim().to_lowercase();
    if YES_UTTERANCES.contains(&normalized.as_str()) {
        Confirmation::Yes
    } else if NO_UTTERANCES.contains(&normalized.as_str()) {
        Confirmation::No
    } else {
        Confirmation::Unknown
    }
}
