use std::fs;
use std::path::Path;

use applet_dialog_agent::{ScriptedSource, TranscriptSink};
use applet_dialog_core::config::LoadOptions;
use applet_dialog_core::tracker::{DialogStatus, DialogSummary};
use serde::Serialize;
use tracing::info;

use super::runtime::{dialog_failure, DialogRuntime};
use super::{CommandResult, EXIT_CONFIG, EXIT_INCOMPLETE, EXIT_IO};
use crate::logging;

const COMMAND: &str = "replay";

#[derive(Debug, Serialize)]
struct ReplayReport {
    command: &'static str,
    status: &'static str,
    transcript: String,
    unused_utterances: usize,
    system_utterances: Vec<String>,
    summary: DialogSummary,
}

pub fn run(options: LoadOptions, transcript: &Path) -> CommandResult {
    let runtime = match DialogRuntime::load(options) {
        Ok(runtime) => runtime,
        Err(error) => return error.into_command_result(COMMAND),
    };
    if let Err(error) = logging::init(&runtime.config.logging) {
        return CommandResult::failure(COMMAND, "logging", error.to_string(), EXIT_CONFIG);
    }

    execute(&runtime, transcript)
}

/// Plays one session with the non-blank lines of `transcript` as user turns.
/// Exits non-zero when the transcript ends before the dialog closes.
pub fn execute(runtime: &DialogRuntime, transcript: &Path) -> CommandResult {
    let raw = match fs::read_to_string(transcript) {
        Ok(raw) => raw,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "transcript_read",
                format!("could not read transcript `{}`: {error}", transcript.display()),
                EXIT_IO,
            );
        }
    };

    let mut input = ScriptedSource::new(
        raw.lines().map(str::trim).filter(|line| !line.is_empty() && !line.starts_with('#')),
    );
    let mut output = TranscriptSink::new();
    let mut agent = runtime.new_agent();

    let summary = match agent.run_session(&mut input, &mut output) {
        Ok(summary) => summary,
        Err(error) => return dialog_failure(COMMAND, &error),
    };

    let incomplete = summary.status == Some(DialogStatus::Incomplete);
    info!(
        event_name = "cli.replay.finished",
        session_id = %summary.session_id,
        status = summary.status.map(|status| status.as_str()).unwrap_or("unknown"),
        dialog_length = summary.dialog_length,
        "transcript replayed"
    );

    let report = ReplayReport {
        command: COMMAND,
        status: if incomplete { "incomplete" } else { "ok" },
        transcript: transcript.display().to_string(),
        unused_utterances: input.remaining(),
        system_utterances: output.into_utterances(),
        summary,
    };
    CommandResult::report(if incomplete { EXIT_INCOMPLETE } else { 0 }, &report)
}
