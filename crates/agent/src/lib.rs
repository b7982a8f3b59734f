//! Dialog agent - runs slot-filling sessions for applet creation
//!
//! This crate wires the deterministic dialog core to the outside world:
//! - Drives a session turn by turn (`session`)
//! - Renders agent actions as English prompts (`prompts`)
//! - Defines the boundary to utterance parsers (`parser`) and ships a
//!   string-similarity baseline (`keyword`)
//! - Reads user turns and writes system turns over pluggable streams (`io`)
//!
//! # Turn loop
//!
//! 1. **Open** - the policy greets the user
//! 2. **Parse** - the utterance is read under the intent implied by the
//!    current action
//! 3. **Update** - the parse is merged into the slot state
//! 4. **Decide** - the policy picks the next action, which is rendered and
//!    counted toward the dialog length
//!
//! The parser never decides what the agent does next. It only reports
//! labels and confidences; the policy owns every decision.

pub mod io;
pub mod keyword;
pub mod parser;
pub mod prompts;
pub mod session;

pub use io::{
    InputSource, LineSource, OutputSink, PeekableSource, ScriptedSource, TranscriptSink,
    WriterSink,
};
pub use keyword::KeywordParser;
pub use parser::UtteranceParser;
pub use session::{DialogAgent, SessionPhase};
