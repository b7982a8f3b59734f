use serde::{Deserialize, Serialize};

use crate::dialog::slot::Slot;
use crate::dialog::state::SlotState;

/// The four values presented to the user in the final summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppletSummary {
    pub trigger_channel: String,
    pub trigger_fn: String,
    pub action_channel: String,
    pub action_fn: String,
}

impl AppletSummary {
    pub fn from_state(state: &SlotState) -> Self {
        Self {
            trigger_channel: state.id(Slot::TriggerChannel).to_string(),
            trigger_fn: state.id(Slot::TriggerFn).to_string(),
            action_channel: state.id(Slot::ActionChannel).to_string(),
            action_fn: state.id(Slot::ActionFn).to_string(),
        }
    }

    pub fn value(&self, slot: Slot) -> &str {
        match slot {
            Slot::TriggerChannel => &self.trigger_channel,
            Slot::TriggerFn => &self.trigger_fn,
            Slot::ActionChannel => &self.action_channel,
            Slot::ActionFn => &self.action_fn,
        }
    }

    pub fn entries(&self) -> [(Slot, &str); 4] {
        Slot::ALL.map(|slot| (slot, self.value(slot)))
    }
}

/// An agent move. Created fresh by the policy on every turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DialogAction {
    Greet,
    /// Stands in for `previous`; the answer to a reword is read as the answer
    /// to `previous`.
    Reword { previous: Box<DialogAction> },
    AskSlot { slot: Slot },
    Confirm { slot: Slot, value: String },
    Inform { summary: AppletSummary },
    Close,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Greet,
    Reword,
    AskSlot,
    Confirm,
    Inform,
    Close,
}

impl ActionKind {
    /// Utterance units this action adds to the dialog length.
    pub fn utterance_weight(self) -> u32 {
        match self {
            Self::Close => 1,
            Self::Greet | Self::Reword | Self::AskSlot | Self::Confirm | Self::Inform => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Greet => "greet",
            Self::Reword => "reword",
            Self::AskSlot => "ask_slot",
            Self::Confirm => "confirm",
            Self::Inform => "inform",
            Self::Close => "close",
        }
    }
}

impl DialogAction {
    /// Builds a reword for `previous`. Rewording a reword points at the
    /// original action, so the back-link is always a single hop.
    pub fn reword(previous: DialogAction) -> Self {
        match previous {
            Self::Reword { previous } => Self::Reword { previous },
            other => Self::Reword { previous: Box::new(other) },
        }
    }

    pub fn ask_slot(slot: Slot) -> Self {
        Self::AskSlot { slot }
    }

    pub fn confirm(slot: Slot, value: impl Into<String>) -> Self {
        Self::Confirm { slot, value: value.into() }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Greet => ActionKind::Greet,
            Self::Reword { .. } => ActionKind::Reword,
            Self::AskSlot { .. } => ActionKind::AskSlot,
            Self::Confirm { .. } => ActionKind::Confirm,
            Self::Inform { .. } => ActionKind::Inform,
            Self::Close => ActionKind::Close,
        }
    }

    pub fn slot(&self) -> Option<Slot> {
        match self {
            Self::AskSlot { slot } | Self::Confirm { slot, .. } => Some(*slot),
            _ => None,
        }
    }

    pub fn previous(&self) -> Option<&DialogAction> {
        match self {
            Self::Reword { previous } => Some(previous),
            _ => None,
        }
    }

    /// The action the user is effectively answering: the reworded action for
    /// a reword, the action itself otherwise.
    pub fn answered(&self) -> &DialogAction {
        self.previous().unwrap_or(self)
    }

    pub fn is_close(&self) -> bool {
        matches!(self, Self::Close)
    }
}

#[cfg(test)]
mod tests {
    use super::{ActionKind, AppletSummary, DialogAction};
    use crate::dialog::slot::Slot;

    #[test]
    fn reword_of_reword_keeps_a_single_hop() {
        let ask = DialogAction::ask_slot(Slot::TriggerFn);
        let once = DialogAction::reword(ask.clone());
        let twice = DialogAction::reword(once.clone());

        assert_eq!(once, twice);
        assert_eq!(twice.previous(), Some(&ask));
        assert_eq!(twice.answered(), &ask);
    }

    #[test]
    fn close_weighs_one_utterance_unit_and_the_rest_two() {
        assert_eq!(ActionKind::Close.utterance_weight(), 1);
        for kind in [
            ActionKind::Greet,
            ActionKind::Reword,
            ActionKind::AskSlot,
            ActionKind::Confirm,
            ActionKind::Inform,
        ] {
            assert_eq!(kind.utterance_weight(), 2, "{kind:?}");
        }
    }

    #[test]
    fn summary_entries_follow_resolution_order() {
        let summary = AppletSummary {
            trigger_channel: "facebook".to_string(),
            trigger_fn: "facebook.new_photo".to_string(),
            action_channel: "dropbox".to_string(),
            action_fn: "dropbox.add_file".to_string(),
        };

        let slots = summary.entries().map(|(slot, _)| slot);
        assert_eq!(slots, Slot::ALL);
        assert_eq!(summary.value(Slot::ActionFn), "dropbox.add_file");
    }

    #[test]
    fn action_serializes_with_type_tag() {
        let json = serde_json::to_value(DialogAction::confirm(Slot::TriggerChannel, "facebook"))
            .expect("serialize confirm");
        assert_eq!(json["type"], "confirm");
        assert_eq!(json["slot"], "trigger_channel");
        assert_eq!(json["value"], "facebook");
    }
}
