use std::path::PathBuf;

use thiserror::Error;

use crate::dialog::{ActionKind, Slot};

/// Wiring bugs between policy, controller and parser. Fatal for a session.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("policy cannot choose an action after a `{0:?}` action")]
    IllegalPreviousAction(ActionKind),
    #[error("parse is missing slot `{slot}` requested by `{action:?}`")]
    MissingSlot { slot: Slot, action: ActionKind },
    #[error("parse is missing a confirmation in answer to `{0:?}`")]
    MissingConfirmation(ActionKind),
    #[error("no user intent follows a `{0:?}` action")]
    NoIntent(ActionKind),
    #[error("cannot {operation} while the session is {phase}")]
    InvalidPhase { operation: &'static str, phase: &'static str },
}

#[derive(Debug, Error)]
pub enum LabelError {
    #[error("`{id}` is not a known {slot} label")]
    UnknownLabel { slot: Slot, id: String },
    #[error("could not read label file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: csv::Error },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("utterance parser failed: {message}")]
pub struct ParserError {
    pub message: String,
}

impl ParserError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Everything that can end a session abnormally.
#[derive(Debug, Error)]
pub enum DialogError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error(transparent)]
    Label(#[from] LabelError),
    #[error(transparent)]
    Parser(#[from] ParserError),
    #[error("dialog stream failure: {0}")]
    Io(#[from] std::io::Error),
}

impl DialogError {
    /// Short machine-readable class used in operator reports.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Protocol(_) => "protocol_violation",
            Self::Label(_) => "label_description",
            Self::Parser(_) => "parser_failure",
            Self::Io(_) => "stream_failure",
        }
    }
}
