use std::io;

use applet_dialog_agent::{InputSource, LineSource, OutputSink, PeekableSource, WriterSink};
use applet_dialog_core::config::LoadOptions;
use applet_dialog_core::errors::DialogError;
use applet_dialog_core::tracker::{DialogStatus, DialogSummary};
use serde::Serialize;
use tracing::{error, info};

use super::runtime::{dialog_failure, DialogRuntime};
use super::{CommandResult, EXIT_CONFIG};
use crate::logging;

const COMMAND: &str = "chat";

#[derive(Debug, Serialize)]
struct ChatReport {
    command: &'static str,
    status: &'static str,
    failed_sessions: u32,
    sessions: Vec<DialogSummary>,
}

pub fn run(options: LoadOptions, sessions: Option<u32>) -> CommandResult {
    let runtime = match DialogRuntime::load(options) {
        Ok(runtime) => runtime,
        Err(error) => return error.into_command_result(COMMAND),
    };
    if let Err(error) = logging::init(&runtime.config.logging) {
        return CommandResult::failure(COMMAND, "logging", error.to_string(), EXIT_CONFIG);
    }

    let stdin = io::stdin();
    let mut input = LineSource::new(stdin.lock());
    let mut output = WriterSink::new(io::stdout());
    execute(&runtime, sessions, &mut input, &mut output)
}

/// Runs sessions back to back on the same streams until `limit` sessions
/// have ended or the input runs out. The first session greets straight
/// away; later ones are only opened once another user turn is waiting. A
/// session that fails on a protocol, label or parser error is logged and
/// dropped; stream failures end the command.
pub fn execute<I, O>(
    runtime: &DialogRuntime,
    limit: Option<u32>,
    input: &mut I,
    output: &mut O,
) -> CommandResult
where
    I: InputSource + ?Sized,
    O: OutputSink + ?Sized,
{
    let mut input = PeekableSource::new(input);
    let mut summaries = Vec::new();
    let mut failed_sessions = 0_u32;

    loop {
        let ended = summaries.len() as u64 + u64::from(failed_sessions);
        if limit.is_some_and(|limit| ended >= u64::from(limit)) {
            break;
        }
        if ended > 0 {
            match input.peek() {
                Ok(Some(_)) => {}
                Ok(None) => break,
                Err(source) => return dialog_failure(COMMAND, &DialogError::Io(source)),
            }
        }

        let mut agent = runtime.new_agent();
        match agent.run_session(&mut input, output) {
            Ok(summary) => {
                info!(
                    event_name = "cli.chat.session_ended",
                    session_id = %summary.session_id,
                    status = summary.status.map(|status| status.as_str()).unwrap_or("unknown"),
                    dialog_length = summary.dialog_length,
                    num_slot_requests = summary.num_slot_requests,
                    "dialog session ended"
                );
                let exhausted = summary.status == Some(DialogStatus::Incomplete);
                summaries.push(summary);
                if exhausted {
                    break;
                }
            }
            Err(DialogError::Io(source)) => {
                return dialog_failure(COMMAND, &DialogError::Io(source));
            }
            Err(dialog_error) => {
                error!(
                    event_name = "cli.chat.session_failed",
                    session_id = %agent.session_id(),
                    error_class = dialog_error.error_class(),
                    error = %dialog_error,
                    "dialog session failed"
                );
                failed_sessions += 1;
            }
        }
    }

    info!(
        event_name = "cli.chat.finished",
        sessions = summaries.len(),
        failed_sessions,
        "chat finished"
    );
    CommandResult::report(
        0,
        &ChatReport { command: COMMAND, status: "ok", failed_sessions, sessions: summaries },
    )
}
