use serde::{Deserialize, Serialize};
use tracing::error;

use crate::dialog::action::DialogAction;
use crate::dialog::slot::Slot;
use crate::errors::ProtocolError;

/// Which narrow reading the parser should apply to the next user utterance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentType {
    FreeForm,
    TriggerChannel,
    TriggerFn,
    ActionChannel,
    ActionFn,
    Confirm,
}

impl IntentType {
    pub fn for_slot(slot: Slot) -> Self {
        match slot {
            Slot::TriggerChannel => Self::TriggerChannel,
            Slot::TriggerFn => Self::TriggerFn,
            Slot::ActionChannel => Self::ActionChannel,
            Slot::ActionFn => Self::ActionFn,
        }
    }

    /// The slot this intent narrows the parse to, if any.
    pub fn slot(self) -> Option<Slot> {
        match self {
            Self::TriggerChannel => Some(Slot::TriggerChannel),
            Self::TriggerFn => Some(Slot::TriggerFn),
            Self::ActionChannel => Some(Slot::ActionChannel),
            Self::ActionFn => Some(Slot::ActionFn),
            Self::FreeForm | Self::Confirm => None,
        }
    }
}

/// Infers what kind of answer `action` asks the user for. Assumes the user
/// answers the question that was put to them.
pub fn get_intent(action: &DialogAction) -> Result<IntentType, ProtocolError> {
    match action {
        DialogAction::Greet => Ok(IntentType::FreeForm),
        DialogAction::Reword { previous } => get_intent(previous),
        DialogAction::AskSlot { slot } => Ok(IntentType::for_slot(*slot)),
        DialogAction::Confirm { .. } | DialogAction::Inform { .. } => Ok(IntentType::Confirm),
        DialogAction::Close => {
            error!(
                event_name = "dialog.intent.illegal_action",
                action = action.kind().as_str(),
                "no intent follows a close action"
            );
            Err(ProtocolError::NoIntent(action.kind()))
        }
    }
}
