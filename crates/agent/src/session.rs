use std::fmt;
use std::sync::Arc;

use applet_dialog_core::dialog::{
    get_intent, Confirmation, DialogAction, DialogPolicy, ParseResult, SlotState,
};
use applet_dialog_core::errors::{DialogError, ProtocolError};
use applet_dialog_core::labels::LabelDescriber;
use applet_dialog_core::tracker::{DialogSummary, DialogTracker};
use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::io::{InputSource, OutputSink};
use crate::parser::UtteranceParser;
use crate::prompts;

/// Utterance that ends the dialog immediately.
pub const STOP_UTTERANCE: &str = "stop";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    AwaitingOpen,
    AwaitingUserTurn,
    Closed,
}

impl SessionPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AwaitingOpen => "awaiting_open",
            Self::AwaitingUserTurn => "awaiting_user_turn",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runs one dialog session: owns the belief state, the current action and the
/// session statistics, and turns each user utterance into the next prompt.
pub struct DialogAgent {
    session_id: Uuid,
    policy: DialogPolicy,
    parser: Arc<dyn UtteranceParser>,
    labels: Arc<dyn LabelDescriber>,
    state: SlotState,
    action: Option<DialogAction>,
    tracker: DialogTracker,
    phase: SessionPhase,
}

impl DialogAgent {
    pub fn new(
        policy: DialogPolicy,
        parser: Arc<dyn UtteranceParser>,
        labels: Arc<dyn LabelDescriber>,
    ) -> Self {
        let session_id = Uuid::new_v4();
        Self {
            session_id,
            policy,
            parser,
            labels,
            state: SlotState::new(),
            action: None,
            tracker: DialogTracker::new(session_id),
            phase: SessionPhase::AwaitingOpen,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn state(&self) -> &SlotState {
        &self.state
    }

    pub fn current_action(&self) -> Option<&DialogAction> {
        self.action.as_ref()
    }

    pub fn tracker(&self) -> &DialogTracker {
        &self.tracker
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn summary(&self) -> DialogSummary {
        self.tracker.summary()
    }

    /// Takes the opening action and returns its prompt.
    pub fn open_dialog(&mut self) -> Result<String, DialogError> {
        self.ensure_phase(SessionPhase::AwaitingOpen, "open the dialog")?;

        let action = self.policy.next_action(&self.state, None, None)?;
        self.phase = SessionPhase::AwaitingUserTurn;
        info!(
            event_name = "dialog.session.opened",
            session_id = %self.session_id,
            alpha = self.policy.thresholds().alpha(),
            beta = self.policy.thresholds().beta(),
            "dialog session opened"
        );
        self.respond(action)
    }

    /// Consumes one user utterance and returns the next system utterance.
    pub fn generate_system_response(
        &mut self,
        user_utterance: &str,
    ) -> Result<String, DialogError> {
        self.ensure_phase(SessionPhase::AwaitingUserTurn, "answer a user turn")?;
        let action = self.action.clone().ok_or(ProtocolError::InvalidPhase {
            operation: "answer a user turn",
            phase: "without a current action",
        })?;

        let utterance = user_utterance.trim().trim_end_matches('.').trim();
        if utterance.eq_ignore_ascii_case(STOP_UTTERANCE) {
            self.tracker.set_terminated();
            return self.respond(DialogAction::Close);
        }

        let intent = get_intent(&action)?;
        let parse = self.parser.parse(utterance, intent, &self.state)?;
        debug!(
            event_name = "dialog.turn.parsed",
            session_id = %self.session_id,
            action = action.kind().as_str(),
            intent = ?intent,
            confirmation = ?parse.confirmation(),
            "user utterance parsed"
        );

        self.apply_parse(&action, &parse)?;
        let next = self.policy.next_action(&self.state, Some(action.answered()), Some(&parse))?;

        if next.is_close() {
            match parse.confirmation() {
                Some(Confirmation::Yes) => self.tracker.set_success(),
                Some(Confirmation::No) => self.tracker.set_failure(),
                Some(Confirmation::Unknown) | None => {}
            }
        }
        self.respond(next)
    }

    /// Drives a whole session over `input` and `output`. Utterances are
    /// trimmed and lower-cased on read. Running out of input before the
    /// dialog closes marks it incomplete.
    pub fn run_session<I, O>(
        &mut self,
        input: &mut I,
        output: &mut O,
    ) -> Result<DialogSummary, DialogError>
    where
        I: InputSource + ?Sized,
        O: OutputSink + ?Sized,
    {
        let span = info_span!("dialog_session", session_id = %self.session_id);
        let _entered = span.enter();

        let greeting = self.open_dialog()?;
        output.write(&greeting)?;

        while self.phase != SessionPhase::Closed {
            let Some(line) = input.read()? else {
                self.tracker.set_incomplete();
                warn!(
                    event_name = "dialog.session.incomplete",
                    session_id = %self.session_id,
                    "input ended before the dialog closed"
                );
                break;
            };

            let reply = self.generate_system_response(&line.trim().to_lowercase())?;
            output.write(&reply)?;
        }

        Ok(self.tracker.summary())
    }

    fn apply_parse(
        &mut self,
        action: &DialogAction,
        parse: &ParseResult,
    ) -> Result<(), ProtocolError> {
        match action {
            DialogAction::Greet => self.state.update_non_field_slots(parse),
            DialogAction::Reword { previous } => self.apply_parse(previous, parse)?,
            DialogAction::AskSlot { slot } => {
                self.tracker.increase_slot_requests();
                let relevant = parse.restricted_to(*slot).ok_or_else(|| {
                    error!(
                        event_name = "dialog.session.missing_slot",
                        session_id = %self.session_id,
                        slot = %slot,
                        "parse does not contain the requested slot"
                    );
                    ProtocolError::MissingSlot { slot: *slot, action: action.kind() }
                })?;
                self.state.update_non_field_slots(&relevant);
            }
            DialogAction::Confirm { slot, value } => {
                let response = self.require_confirmation(action, parse)?;
                self.state.update_from_confirmation(*slot, value, response);
                self.count_confirmation(response);
            }
            DialogAction::Inform { .. } => {
                let response = self.require_confirmation(action, parse)?;
                self.count_confirmation(response);
            }
            DialogAction::Close => {}
        }
        Ok(())
    }

    fn require_confirmation(
        &self,
        action: &DialogAction,
        parse: &ParseResult,
    ) -> Result<Confirmation, ProtocolError> {
        parse.confirmation().ok_or_else(|| {
            error!(
                event_name = "dialog.session.missing_confirmation",
                session_id = %self.session_id,
                action = action.kind().as_str(),
                "parse does not contain a confirmation"
            );
            ProtocolError::MissingConfirmation(action.kind())
        })
    }

    fn count_confirmation(&mut self, response: Confirmation) {
        match response {
            Confirmation::Yes => self.tracker.increase_affirms(),
            Confirmation::No => self.tracker.increase_denies(),
            Confirmation::Unknown => {}
        }
    }

    fn respond(&mut self, action: DialogAction) -> Result<String, DialogError> {
        let prompt = prompts::render(&action, &self.state, self.labels.as_ref())?;
        self.tracker.increase_dialog_length(action.kind().utterance_weight());

        debug!(
            event_name = "dialog.turn.system_action",
            session_id = %self.session_id,
            action = action.kind().as_str(),
            dialog_length = self.tracker.dialog_length(),
            "system action rendered"
        );

        if action.is_close() {
            self.phase = SessionPhase::Closed;
            info!(
                event_name = "dialog.session.closed",
                session_id = %self.session_id,
                status = self.tracker.status().map(|status| status.as_str()).unwrap_or("open"),
                dialog_length = self.tracker.dialog_length(),
                slot_requests = self.tracker.num_slot_requests(),
                affirms = self.tracker.num_affirms(),
                denies = self.tracker.num_denies(),
                "dialog session closed"
            );
        }

        self.action = Some(action);
        Ok(prompt)
    }

    fn ensure_phase(
        &self,
        expected: SessionPhase,
        operation: &'static str,
    ) -> Result<(), ProtocolError> {
        if self.phase == expected {
            return Ok(());
        }
        error!(
            event_name = "dialog.session.invalid_phase",
            session_id = %self.session_id,
            operation,
            phase = self.phase.as_str(),
            "session operation called in the wrong phase"
        );
        Err(ProtocolError::InvalidPhase { operation, phase: self.phase.as_str() })
    }
}
