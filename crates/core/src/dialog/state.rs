use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dialog::parse::{ParseResult, SlotPrediction};
use crate::dialog::slot::{Confirmation, Side, Slot};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub id: String,
    pub value: String,
    pub confidence: f64,
}

/// A trigger or action function. A non-empty `id` is always qualified as
/// `<channel_id>.<function_name>`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub id: String,
    pub confidence: f64,
    pub fields: Vec<Field>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub confidence: f64,
    pub function: Function,
}

impl Channel {
    fn from_prediction(prediction: &SlotPrediction) -> Self {
        Self {
            id: prediction.label.clone(),
            confidence: prediction.confidence,
            function: Function::default(),
        }
    }

    /// Builds the function entry for `prediction`, or an empty function when
    /// its channel prefix does not name this channel.
    fn function_from_prediction(&self, prediction: &SlotPrediction) -> Function {
        if prediction.label.is_empty() {
            return Function::default();
        }
        match prediction.label.split_once('.') {
            Some((channel, _)) if channel == self.id => Function {
                id: prediction.label.clone(),
                confidence: prediction.confidence,
                fields: Vec::new(),
            },
            _ => {
                warn!(
                    event_name = "dialog.state.function_rejected",
                    function = %prediction.label,
                    channel = %self.id,
                    "parsed function does not belong to the channel in state"
                );
                Function::default()
            }
        }
    }
}

/// Result of applying a yes/no answer to one slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    Affirmed,
    Denied,
    Unchanged,
    /// The confirmed value is no longer the one held in state.
    Mismatch,
}

/// Belief state over both sides of the applet being built.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotState {
    pub trigger: Channel,
    pub action: Channel,
}

impl SlotState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channel(&self, side: Side) -> &Channel {
        match side {
            Side::Trigger => &self.trigger,
            Side::Action => &self.action,
        }
    }

    fn channel_mut(&mut self, side: Side) -> &mut Channel {
        match side {
            Side::Trigger => &mut self.trigger,
            Side::Action => &mut self.action,
        }
    }

    pub fn id(&self, slot: Slot) -> &str {
        let channel = self.channel(slot.side());
        if slot.is_channel() {
            &channel.id
        } else {
            &channel.function.id
        }
    }

    pub fn confidence(&self, slot: Slot) -> f64 {
        let channel = self.channel(slot.side());
        if slot.is_channel() {
            channel.confidence
        } else {
            channel.function.confidence
        }
    }

    fn entry_mut(&mut self, slot: Slot) -> (&mut String, &mut f64) {
        let channel = self.channel_mut(slot.side());
        if slot.is_channel() {
            (&mut channel.id, &mut channel.confidence)
        } else {
            (&mut channel.function.id, &mut channel.function.confidence)
        }
    }

    /// Merges every channel and function prediction of `parse` into the state.
    ///
    /// Slots are applied in resolution order. A new channel replaces the whole
    /// side, function included, so a function in the same parse is checked
    /// against the channel it arrived with.
    pub fn update_non_field_slots(&mut self, parse: &ParseResult) {
        for slot in Slot::ALL {
            let Some(prediction) = parse.slot(slot) else {
                continue;
            };
            let side = slot.side();
            if slot.is_channel() {
                *self.channel_mut(side) = Channel::from_prediction(prediction);
            } else {
                let function = self.channel(side).function_from_prediction(prediction);
                self.channel_mut(side).function = function;
            }
            debug!(
                event_name = "dialog.state.slot_updated",
                slot = %slot,
                id = %self.id(slot),
                confidence = self.confidence(slot),
                "slot updated from parse"
            );
        }
    }

    /// Applies the user's answer to "is `value` right for `slot`?".
    pub fn update_from_confirmation(
        &mut self,
        slot: Slot,
        value: &str,
        response: Confirmation,
    ) -> ConfirmationOutcome {
        if response == Confirmation::Unknown {
            return ConfirmationOutcome::Unchanged;
        }

        if self.id(slot) != value {
            warn!(
                event_name = "dialog.state.confirmation_mismatch",
                slot = %slot,
                confirmed_value = %value,
                state_value = %self.id(slot),
                response = ?response,
                "confirmed value does not exist in state; leaving state unchanged"
            );
            return ConfirmationOutcome::Mismatch;
        }

        let (id, confidence) = self.entry_mut(slot);
        match response {
            Confirmation::Yes => {
                *confidence = 1.0;
                ConfirmationOutcome::Affirmed
            }
            Confirmation::No => {
                id.clear();
                *confidence = 0.0;
                ConfirmationOutcome::Denied
            }
            Confirmation::Unknown => ConfirmationOutcome::Unchanged,
        }
    }
}

impl fmt::Display for SlotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for side in [Side::Trigger, Side::Action] {
            let channel = self.channel(side);
            let label = if side == Side::Trigger { "IF" } else { "THEN" };
            writeln!(
                f,
                "{label}: {} ({:.2}) -> {} ({:.2})",
                channel.id, channel.confidence, channel.function.id, channel.function.confidence
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfirmationOutcome, SlotState};
    use crate::dialog::parse::ParseResult;
    use crate::dialog::slot::{Confirmation, Slot};

    #[test]
    fn fresh_state_is_empty_with_zero_confidence() {
        let state = SlotState::new();
        for slot in Slot::ALL {
            assert_eq!(state.id(slot), "");
            assert_eq!(state.confidence(slot), 0.0);
        }
        assert!(state.trigger.function.fields.is_empty());
    }

    #[test]
    fn function_with_matching_channel_prefix_is_accepted() {
        let mut state = SlotState::new();
        state.update_non_field_slots(
            &ParseResult::new()
                .with_slot(Slot::TriggerChannel, "facebook", 0.9)
                .with_slot(Slot::TriggerFn, "facebook.new_photo", 0.6),
        );

        assert_eq!(state.id(Slot::TriggerFn), "facebook.new_photo");
        assert_eq!(state.confidence(Slot::TriggerFn), 0.6);
    }

    #[test]
    fn function_from_another_channel_reverts_to_empty() {
        let mut state = SlotState::new();
        state.update_non_field_slots(
            &ParseResult::new()
                .with_slot(Slot::ActionChannel, "dropbox", 0.9)
                .with_slot(Slot::ActionFn, "gmail.send_email", 0.95),
        );

        assert_eq!(state.id(Slot::ActionChannel), "dropbox");
        assert_eq!(state.id(Slot::ActionFn), "");
        assert_eq!(state.confidence(Slot::ActionFn), 0.0);
    }

    #[test]
    fn unqualified_function_id_is_rejected() {
        let mut state = SlotState::new();
        state.update_non_field_slots(
            &ParseResult::new().with_slot(Slot::TriggerChannel, "rss", 0.9),
        );
        state.update_non_field_slots(&ParseResult::new().with_slot(Slot::TriggerFn, "rss", 0.9));

        assert_eq!(state.id(Slot::TriggerFn), "");
    }

    #[test]
    fn new_channel_resets_the_function_on_that_side() {
        let mut state = SlotState::new();
        state.update_non_field_slots(
            &ParseResult::new()
                .with_slot(Slot::TriggerChannel, "facebook", 0.9)
                .with_slot(Slot::TriggerFn, "facebook.new_photo", 0.9),
        );
        state.update_non_field_slots(
            &ParseResult::new().with_slot(Slot::TriggerChannel, "instagram", 0.5),
        );

        assert_eq!(state.id(Slot::TriggerChannel), "instagram");
        assert_eq!(state.id(Slot::TriggerFn), "");
        assert_eq!(state.confidence(Slot::TriggerFn), 0.0);
    }

    #[test]
    fn affirmation_fixes_confidence_at_one() {
        let mut state = SlotState::new();
        state.update_non_field_slots(
            &ParseResult::new().with_slot(Slot::TriggerChannel, "facebook", 0.5),
        );

        let outcome =
            state.update_from_confirmation(Slot::TriggerChannel, "facebook", Confirmation::Yes);
        assert_eq!(outcome, ConfirmationOutcome::Affirmed);
        assert_eq!(state.confidence(Slot::TriggerChannel), 1.0);
    }

    #[test]
    fn denial_clears_the_slot() {
        let mut state = SlotState::new();
        state.update_non_field_slots(
            &ParseResult::new().with_slot(Slot::TriggerChannel, "facebook", 0.5),
        );

        let outcome =
            state.update_from_confirmation(Slot::TriggerChannel, "facebook", Confirmation::No);
        assert_eq!(outcome, ConfirmationOutcome::Denied);
        assert_eq!(state.id(Slot::TriggerChannel), "");
        assert_eq!(state.confidence(Slot::TriggerChannel), 0.0);
    }

    #[test]
    fn confirming_a_stale_value_leaves_state_untouched() {
        let mut state = SlotState::new();
        state.update_non_field_slots(
            &ParseResult::new().with_slot(Slot::ActionChannel, "dropbox", 0.5),
        );
        let before = state.clone();

        let affirm = state.update_from_confirmation(Slot::ActionChannel, "box", Confirmation::Yes);
        let deny = state.update_from_confirmation(Slot::ActionChannel, "box", Confirmation::No);

        assert_eq!(affirm, ConfirmationOutcome::Mismatch);
        assert_eq!(deny, ConfirmationOutcome::Mismatch);
        assert_eq!(state, before);
    }

    #[test]
    fn unknown_response_is_a_no_op() {
        let mut state = SlotState::new();
        state.update_non_field_slots(
            &ParseResult::new().with_slot(Slot::ActionChannel, "dropbox", 0.5),
        );
        let before = state.clone();

        let outcome =
            state.update_from_confirmation(Slot::ActionChannel, "dropbox", Confirmation::Unknown);
        assert_eq!(outcome, ConfirmationOutcome::Unchanged);
        assert_eq!(state, before);
    }
}
