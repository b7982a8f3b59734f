pub mod commands;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use applet_dialog_core::config::{ConfigOverrides, LoadOptions};
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "applet-dialog",
    about = "Slot-filling dialog agent for trigger/action applets",
    long_about = "Build trigger/action applets through a confirm-or-ask dialog, replay \
                  scripted transcripts, and inspect runtime configuration.",
    after_help = "Examples:\n  applet-dialog chat\n  applet-dialog replay --transcript \
                  demos/instagram-to-dropbox.txt\n  applet-dialog doctor --json"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to an applet-dialog.toml config file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Run interactive dialog sessions on stdin/stdout")]
    Chat {
        #[command(flatten)]
        policy: PolicyArgs,
        #[arg(long, help = "Stop after this many sessions instead of at end of input")]
        sessions: Option<u32>,
    },
    #[command(about = "Play one session from a transcript of user turns and report its outcome")]
    Replay {
        #[arg(long, help = "File with one user utterance per line")]
        transcript: PathBuf,
        #[command(flatten)]
        policy: PolicyArgs,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, label catalog, and label consistency")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

/// Command-line overrides that win over file and environment config.
#[derive(Debug, Default, Args)]
pub struct PolicyArgs {
    #[arg(long, help = "Confidence at or above which a slot is accepted without asking")]
    pub alpha: Option<f64>,
    #[arg(long, help = "Confidence below which a slot is asked for again")]
    pub beta: Option<f64>,
    #[arg(long, help = "Directory holding the four label CSV files")]
    pub labels_dir: Option<PathBuf>,
    #[arg(long, help = "Log level filter, e.g. info or debug")]
    pub log_level: Option<String>,
}

impl PolicyArgs {
    pub fn load_options(self, config_path: Option<PathBuf>) -> LoadOptions {
        LoadOptions {
            require_file: config_path.is_some(),
            config_path,
            overrides: ConfigOverrides {
                alpha: self.alpha,
                beta: self.beta,
                labels_dir: self.labels_dir,
                log_level: self.log_level,
            },
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Chat { policy, sessions } => {
            commands::chat::run(policy.load_options(cli.config), sessions)
        }
        Command::Replay { transcript, policy } => {
            commands::replay::run(policy.load_options(cli.config), &transcript)
        }
        Command::Config => commands::config::run(cli.config.as_deref()),
        Command::Doctor { json } => commands::doctor::run(cli.config.as_deref(), json),
    };

    if !result.output.is_empty() {
        println!("{}", result.output);
    }
    ExitCode::from(result.exit_code)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;

    use super::{Cli, Command};

    #[test]
    fn replay_accepts_policy_overrides_and_global_config() {
        let cli = Cli::try_parse_from([
            "applet-dialog",
            "replay",
            "--transcript",
            "turns.txt",
            "--alpha",
            "0.9",
            "--labels-dir",
            "labels",
            "--config",
            "custom.toml",
        ])
        .expect("replay arguments parse");

        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        let Command::Replay { transcript, policy } = cli.command else {
            panic!("expected replay command");
        };
        assert_eq!(transcript, PathBuf::from("turns.txt"));

        let options = policy.load_options(cli.config);
        assert!(options.require_file);
        assert_eq!(options.overrides.alpha, Some(0.9));
        assert_eq!(options.overrides.beta, None);
        assert_eq!(options.overrides.labels_dir, Some(PathBuf::from("labels")));
    }

    #[test]
    fn chat_without_config_does_not_require_a_file() {
        let cli = Cli::try_parse_from(["applet-dialog", "chat", "--sessions", "2"])
            .expect("chat arguments parse");

        let Command::Chat { policy, sessions } = cli.command else {
            panic!("expected chat command");
        };
        assert_eq!(sessions, Some(2));
        assert!(!policy.load_options(None).require_file);
    }

    #[test]
    fn replay_requires_a_transcript() {
        assert!(Cli::try_parse_from(["applet-dialog", "replay"]).is_err());
    }
}
