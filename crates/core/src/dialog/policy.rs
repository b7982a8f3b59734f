use tracing::{debug, error};

use crate::config::Thresholds;
use crate::dialog::action::{AppletSummary, DialogAction};
use crate::dialog::parse::ParseResult;
use crate::dialog::slot::{Confirmation, Slot};
use crate::dialog::state::SlotState;
use crate::errors::ProtocolError;

/// Where a confidence falls relative to `beta` and `alpha`. Each band is
/// closed on its lower edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfidenceBand {
    /// Below `beta`: the value has to be asked for.
    Low,
    /// In `[beta, alpha)`: the value is confirmed explicitly.
    Uncertain,
    /// At or above `alpha`: the value is accepted silently.
    Fixed,
}

/// Decides the agent's next move from the belief state, the previous agent
/// action and the parse of the user's answer to it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DialogPolicy {
    thresholds: Thresholds,
}

impl DialogPolicy {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn band(&self, confidence: f64) -> ConfidenceBand {
        if confidence >= self.thresholds.alpha() {
            ConfidenceBand::Fixed
        } else if confidence >= self.thresholds.beta() {
            ConfidenceBand::Uncertain
        } else {
            ConfidenceBand::Low
        }
    }

    /// Computes the next agent action.
    ///
    /// `previous` is `None` only when the session opens. A reword must be
    /// unwrapped to the action it stands for before it is passed here; a
    /// reword or a close as `previous` is a wiring error.
    pub fn next_action(
        &self,
        state: &SlotState,
        previous: Option<&DialogAction>,
        parse: Option<&ParseResult>,
    ) -> Result<DialogAction, ProtocolError> {
        let Some(previous) = previous else {
            return Ok(DialogAction::Greet);
        };

        let next = match previous {
            DialogAction::Greet => self.after_greet(state),
            DialogAction::AskSlot { slot } => self.after_ask_slot(state, previous, *slot),
            DialogAction::Confirm { slot, .. } => match confirmation(previous, parse)? {
                Confirmation::Unknown => DialogAction::reword(previous.clone()),
                Confirmation::No => DialogAction::ask_slot(*slot),
                Confirmation::Yes => self.resolve(state, false),
            },
            DialogAction::Inform { .. } => match confirmation(previous, parse)? {
                Confirmation::Unknown => DialogAction::reword(previous.clone()),
                Confirmation::No => DialogAction::Close,
                Confirmation::Yes => self.resolve(state, true),
            },
            DialogAction::Reword { .. } | DialogAction::Close => {
                error!(
                    event_name = "dialog.policy.illegal_previous_action",
                    action = previous.kind().as_str(),
                    "policy asked to act after an action it cannot follow"
                );
                return Err(ProtocolError::IllegalPreviousAction(previous.kind()));
            }
        };

        debug!(
            event_name = "dialog.policy.decided",
            previous = previous.kind().as_str(),
            next = next.kind().as_str(),
            slot = next.slot().map(Slot::as_str).unwrap_or("none"),
            "policy chose next action"
        );
        Ok(next)
    }

    fn after_greet(&self, state: &SlotState) -> DialogAction {
        // Only a wholly unusable free-form opening is reworded; later turns
        // fall through to the resolution pass.
        let unusable =
            Slot::ALL.iter().all(|slot| self.band(state.confidence(*slot)) == ConfidenceBand::Low);
        if unusable {
            return DialogAction::reword(DialogAction::Greet);
        }
        self.resolve(state, false)
    }

    fn after_ask_slot(
        &self,
        state: &SlotState,
        previous: &DialogAction,
        slot: Slot,
    ) -> DialogAction {
        match self.band(state.confidence(slot)) {
            ConfidenceBand::Fixed => self.resolve(state, false),
            ConfidenceBand::Uncertain => DialogAction::confirm(slot, state.id(slot)),
            ConfidenceBand::Low => DialogAction::reword(previous.clone()),
        }
    }

    /// Scans the slots in resolution order and acts on the first one that is
    /// not fixed. With every slot fixed, summarizes, or closes when the
    /// summary was already approved.
    pub fn resolve(&self, state: &SlotState, summary_approved: bool) -> DialogAction {
        for slot in Slot::ALL {
            match self.band(state.confidence(slot)) {
                ConfidenceBand::Low => return DialogAction::ask_slot(slot),
                ConfidenceBand::Uncertain => return DialogAction::confirm(slot, state.id(slot)),
                ConfidenceBand::Fixed => {}
            }
        }

        if summary_approved {
            DialogAction::Close
        } else {
            DialogAction::Inform { summary: AppletSummary::from_state(state) }
        }
    }
}

fn confirmation(
    previous: &DialogAction,
    parse: Option<&ParseResult>,
) -> Result<Confirmation, ProtocolError> {
    parse.and_then(ParseResult::confirmation).ok_or_else(|| {
        error!(
            event_name = "dialog.policy.missing_confirmation",
            action = previous.kind().as_str(),
            "parse carries no confirmation for a yes/no question"
        );
        ProtocolError::MissingConfirmation(previous.kind())
    })
}

#[cfg(test)]
mod tests {
    use super::{ConfidenceBand, DialogPolicy};
    use crate::config::Thresholds;
    use crate::dialog::action::{ActionKind, AppletSummary, DialogAction};
    use crate::dialog::parse::ParseResult;
    use crate::dialog::slot::{Confirmation, Slot};
    use crate::dialog::state::{Channel, Function, SlotState};
    use crate::errors::ProtocolError;

    const IDS: [&str; 4] = ["facebook", "facebook.new_photo", "dropbox", "dropbox.add_file"];

    fn policy() -> DialogPolicy {
        DialogPolicy::new(Thresholds::new(0.75, 0.25).expect("valid thresholds"))
    }

    fn state_with(confidences: [f64; 4]) -> SlotState {
        let side = |channel: usize| Channel {
            id: IDS[channel].to_string(),
            confidence: confidences[channel],
            function: Function {
                id: IDS[channel + 1].to_string(),
                confidence: confidences[channel + 1],
                fields: Vec::new(),
            },
        };
        SlotState { trigger: side(0), action: side(2) }
    }

    fn yes() -> ParseResult {
        ParseResult::confirmation_only(Confirmation::Yes)
    }

    fn no() -> ParseResult {
        ParseResult::confirmation_only(Confirmation::No)
    }

    fn unknown() -> ParseResult {
        ParseResult::confirmation_only(Confirmation::Unknown)
    }

    fn inform_for(state: &SlotState) -> DialogAction {
        DialogAction::Inform { summary: AppletSummary::from_state(state) }
    }

    #[test]
    fn session_opens_with_greet() {
        let action = policy().next_action(&SlotState::new(), None, None).expect("greet");
        assert_eq!(action, DialogAction::Greet);
    }

    #[test]
    fn unusable_free_form_parse_is_reworded() {
        let state = state_with([0.0; 4]);
        let action =
            policy().next_action(&state, Some(&DialogAction::Greet), None).expect("reword");

        assert_eq!(action, DialogAction::reword(DialogAction::Greet));
    }

    #[test]
    fn fixed_trigger_channel_moves_on_to_trigger_fn() {
        let state = state_with([0.9, 0.0, 0.0, 0.0]);
        let action = policy().next_action(&state, Some(&DialogAction::Greet), None).expect("ask");

        assert_eq!(action, DialogAction::ask_slot(Slot::TriggerFn));
    }

    #[test]
    fn all_fixed_after_greet_informs_with_every_value() {
        let state = state_with([0.9; 4]);
        let action =
            policy().next_action(&state, Some(&DialogAction::Greet), None).expect("inform");

        let DialogAction::Inform { summary } = action else {
            panic!("expected inform, got {action:?}");
        };
        assert_eq!(summary.entries().map(|(_, value)| value), IDS);
    }

    #[test]
    fn approved_summary_closes_the_dialog() {
        let state = state_with([1.0; 4]);
        let inform = inform_for(&state);
        let action = policy().next_action(&state, Some(&inform), Some(&yes())).expect("close");

        assert_eq!(action, DialogAction::Close);
    }

    #[test]
    fn rejected_summary_closes_the_dialog() {
        let state = state_with([1.0; 4]);
        let inform = inform_for(&state);
        let action = policy().next_action(&state, Some(&inform), Some(&no())).expect("close");

        assert_eq!(action, DialogAction::Close);
    }

    #[test]
    fn unclear_answer_to_summary_is_reworded() {
        let state = state_with([1.0; 4]);
        let inform = inform_for(&state);
        let action =
            policy().next_action(&state, Some(&inform), Some(&unknown())).expect("reword");

        assert_eq!(action, DialogAction::reword(inform));
    }

    #[test]
    fn approved_summary_with_open_slot_resumes_resolution() {
        let state = state_with([1.0, 1.0, 0.5, 1.0]);
        let inform = inform_for(&state_with([1.0; 4]));
        let action = policy().next_action(&state, Some(&inform), Some(&yes())).expect("confirm");

        assert_eq!(action, DialogAction::confirm(Slot::ActionChannel, "dropbox"));
    }

    #[test]
    fn denied_confirmation_asks_for_the_slot_again() {
        let mut state = state_with([0.5, 0.0, 0.0, 0.0]);
        state.update_from_confirmation(Slot::TriggerChannel, "facebook", Confirmation::No);
        let confirm = DialogAction::confirm(Slot::TriggerChannel, "facebook");

        let action = policy().next_action(&state, Some(&confirm), Some(&no())).expect("ask");

        assert_eq!(action, DialogAction::ask_slot(Slot::TriggerChannel));
        assert_eq!(state.id(Slot::TriggerChannel), "");
        assert_eq!(state.confidence(Slot::TriggerChannel), 0.0);
    }

    #[test]
    fn affirmed_confirmation_picks_the_next_open_slot() {
        let state = state_with([1.0, 0.5, 0.9, 0.9]);
        let confirm = DialogAction::confirm(Slot::TriggerChannel, "facebook");
        let action = policy().next_action(&state, Some(&confirm), Some(&yes())).expect("confirm");

        assert_eq!(action, DialogAction::confirm(Slot::TriggerFn, "facebook.new_photo"));
    }

    #[test]
    fn affirmed_last_confirmation_informs_rather_than_closes() {
        let state = state_with([1.0; 4]);
        let confirm = DialogAction::confirm(Slot::ActionFn, "dropbox.add_file");
        let action = policy().next_action(&state, Some(&confirm), Some(&yes())).expect("inform");

        assert_eq!(action.kind(), ActionKind::Inform);
    }

    #[test]
    fn unclear_confirmation_is_reworded() {
        let state = state_with([0.5, 0.0, 0.0, 0.0]);
        let confirm = DialogAction::confirm(Slot::TriggerChannel, "facebook");
        let action =
            policy().next_action(&state, Some(&confirm), Some(&unknown())).expect("reword");

        assert_eq!(action, DialogAction::reword(confirm));
    }

    #[test]
    fn all_low_after_confirmation_asks_instead_of_rewording() {
        let state = state_with([0.0; 4]);
        let confirm = DialogAction::confirm(Slot::TriggerChannel, "facebook");
        let action = policy().next_action(&state, Some(&confirm), Some(&yes())).expect("ask");

        assert_eq!(action, DialogAction::ask_slot(Slot::TriggerChannel));
    }

    #[test]
    fn answered_slot_request_is_rechecked() {
        let ask = DialogAction::ask_slot(Slot::ActionChannel);

        let fixed = state_with([1.0, 1.0, 0.8, 0.0]);
        let uncertain = state_with([1.0, 1.0, 0.3, 0.0]);
        let low = state_with([1.0, 1.0, 0.1, 0.0]);

        assert_eq!(
            policy().next_action(&fixed, Some(&ask), None).expect("next slot"),
            DialogAction::ask_slot(Slot::ActionFn)
        );
        assert_eq!(
            policy().next_action(&uncertain, Some(&ask), None).expect("confirm"),
            DialogAction::confirm(Slot::ActionChannel, "dropbox")
        );
        assert_eq!(
            policy().next_action(&low, Some(&ask), None).expect("reword"),
            DialogAction::reword(ask)
        );
    }

    #[test]
    fn answered_slot_request_only_looks_at_the_requested_slot() {
        // Trigger fn is still open but the answer concerned the action fn.
        let state = state_with([1.0, 0.0, 1.0, 0.1]);
        let ask = DialogAction::ask_slot(Slot::ActionFn);
        let action = policy().next_action(&state, Some(&ask), None).expect("reword");

        assert_eq!(action, DialogAction::reword(ask));
    }

    #[test]
    fn thresholds_are_closed_on_their_lower_edge() {
        let policy = policy();
        assert_eq!(policy.band(0.75), ConfidenceBand::Fixed);
        assert_eq!(policy.band(0.25), ConfidenceBand::Uncertain);
        assert_eq!(policy.band(0.249_999), ConfidenceBand::Low);
        assert_eq!(policy.band(0.749_999), ConfidenceBand::Uncertain);

        let state = state_with([0.75, 0.25, 0.0, 0.0]);
        let action =
            policy.next_action(&state, Some(&DialogAction::Greet), None).expect("confirm");
        assert_eq!(action, DialogAction::confirm(Slot::TriggerFn, "facebook.new_photo"));
    }

    #[test]
    fn low_trigger_channel_always_wins() {
        let grid = [0.0, 0.3, 0.8, 1.0];
        let policy = policy();
        for trigger_fn in grid {
            for action_channel in grid {
                for action_fn in grid {
                    let state = state_with([0.1, trigger_fn, action_channel, action_fn]);
                    assert_eq!(
                        policy.resolve(&state, false),
                        DialogAction::ask_slot(Slot::TriggerChannel)
                    );
                    assert_eq!(
                        policy.resolve(&state, true),
                        DialogAction::ask_slot(Slot::TriggerChannel)
                    );
                }
            }
        }
    }

    #[test]
    fn affirmed_slot_stays_fixed_across_passes() {
        let mut state = state_with([0.5, 0.0, 0.0, 0.0]);
        state.update_from_confirmation(Slot::TriggerChannel, "facebook", Confirmation::Yes);
        let policy = policy();

        for _ in 0..3 {
            let action = policy.resolve(&state, false);
            assert_ne!(action.slot(), Some(Slot::TriggerChannel));
        }
        assert_eq!(policy.band(state.confidence(Slot::TriggerChannel)), ConfidenceBand::Fixed);
    }

    #[test]
    fn missing_confirmation_is_a_protocol_error() {
        let confirm = DialogAction::confirm(Slot::TriggerChannel, "facebook");
        let error = policy()
            .next_action(&SlotState::new(), Some(&confirm), Some(&ParseResult::new()))
            .expect_err("confirmation is required");

        assert_eq!(error, ProtocolError::MissingConfirmation(ActionKind::Confirm));
    }

    #[test]
    fn close_and_reword_cannot_precede_a_decision() {
        let policy = policy();
        let state = SlotState::new();

        let after_close = policy.next_action(&state, Some(&DialogAction::Close), Some(&yes()));
        let after_reword = policy.next_action(
            &state,
            Some(&DialogAction::reword(DialogAction::Greet)),
            Some(&yes()),
        );

        assert_eq!(after_close, Err(ProtocolError::IllegalPreviousAction(ActionKind::Close)));
        assert_eq!(after_reword, Err(ProtocolError::IllegalPreviousAction(ActionKind::Reword)));
    }
}
