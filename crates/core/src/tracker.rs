use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a dialog ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogStatus {
    /// The user approved the final summary.
    Success,
    /// The user rejected the final summary.
    Failure,
    /// The user typed the stop word.
    Terminated,
    /// Input ended before the dialog closed.
    Incomplete,
}

impl DialogStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Terminated => "terminated",
            Self::Incomplete => "incomplete",
        }
    }
}

impl fmt::Display for DialogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-session counters. The length is measured in utterance units: every
/// prompt but the closing one counts for itself and the user's reply.
#[derive(Clone, Debug)]
pub struct DialogTracker {
    session_id: Uuid,
    dialog_length: u32,
    num_slot_requests: u32,
    num_affirms: u32,
    num_denies: u32,
    status: Option<DialogStatus>,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl DialogTracker {
    pub fn new(session_id: Uuid) -> Self {
        Self {
            session_id,
            dialog_length: 0,
            num_slot_requests: 0,
            num_affirms: 0,
            num_denies: 0,
            status: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn dialog_length(&self) -> u32 {
        self.dialog_length
    }

    pub fn num_slot_requests(&self) -> u32 {
        self.num_slot_requests
    }

    pub fn num_affirms(&self) -> u32 {
        self.num_affirms
    }

    pub fn num_denies(&self) -> u32 {
        self.num_denies
    }

    pub fn status(&self) -> Option<DialogStatus> {
        self.status
    }

    pub fn increase_dialog_length(&mut self, units: u32) {
        self.dialog_length += units;
    }

    pub fn increase_slot_requests(&mut self) {
        self.num_slot_requests += 1;
    }

    pub fn increase_affirms(&mut self) {
        self.num_affirms += 1;
    }

    pub fn increase_denies(&mut self) {
        self.num_denies += 1;
    }

    pub fn set_success(&mut self) {
        self.finish(DialogStatus::Success);
    }

    pub fn set_failure(&mut self) {
        self.finish(DialogStatus::Failure);
    }

    pub fn set_terminated(&mut self) {
        self.finish(DialogStatus::Terminated);
    }

    pub fn set_incomplete(&mut self) {
        self.finish(DialogStatus::Incomplete);
    }

    fn finish(&mut self, status: DialogStatus) {
        self.status = Some(status);
        self.finished_at = Some(Utc::now());
    }

    pub fn summary(&self) -> DialogSummary {
        DialogSummary {
            session_id: self.session_id,
            status: self.status,
            dialog_length: self.dialog_length,
            num_slot_requests: self.num_slot_requests,
            num_affirms: self.num_affirms,
            num_denies: self.num_denies,
            started_at: self.started_at,
            finished_at: self.finished_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogSummary {
    pub session_id: Uuid,
    pub status: Option<DialogStatus>,
    pub dialog_length: u32,
    pub num_slot_requests: u32,
    pub num_affirms: u32,
    pub num_denies: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}
