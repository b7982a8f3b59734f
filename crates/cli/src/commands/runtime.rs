use std::sync::Arc;

use applet_dialog_agent::{DialogAgent, KeywordParser};
use applet_dialog_core::config::{AppConfig, ConfigError, LoadOptions};
use applet_dialog_core::dialog::DialogPolicy;
use applet_dialog_core::errors::{DialogError, LabelError};
use applet_dialog_core::labels::LabelCatalog;
use thiserror::Error;
use tracing::info;

use super::{CommandResult, EXIT_CONFIG, EXIT_DIALOG, EXIT_IO, EXIT_LABELS};

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Labels(#[from] LabelError),
}

impl RuntimeError {
    pub fn into_command_result(self, command: &str) -> CommandResult {
        match self {
            Self::Config(error) => {
                CommandResult::failure(command, "config_validation", error.to_string(), EXIT_CONFIG)
            }
            Self::Labels(error) => {
                CommandResult::failure(command, "label_catalog", error.to_string(), EXIT_LABELS)
            }
        }
    }
}

/// Everything needed to start sessions: validated config, the policy built
/// from it and the shared label catalog.
pub struct DialogRuntime {
    pub config: AppConfig,
    policy: DialogPolicy,
    catalog: Arc<LabelCatalog>,
}

impl DialogRuntime {
    pub fn load(options: LoadOptions) -> Result<Self, RuntimeError> {
        let config = AppConfig::load(options)?;
        let policy = DialogPolicy::new(config.thresholds()?);
        let catalog = Arc::new(LabelCatalog::load(&config.labels.dir)?);

        info!(
            event_name = "cli.runtime.ready",
            labels_dir = %config.labels.dir.display(),
            alpha = policy.thresholds().alpha(),
            beta = policy.thresholds().beta(),
            "dialog runtime ready"
        );
        Ok(Self { config, policy, catalog })
    }

    pub fn new_agent(&self) -> DialogAgent {
        let parser = KeywordParser::new(Arc::clone(&self.catalog));
        DialogAgent::new(self.policy, Arc::new(parser), self.catalog.clone())
    }
}

pub fn dialog_failure(command: &str, error: &DialogError) -> CommandResult {
    let exit_code = match error {
        DialogError::Io(_) => EXIT_IO,
        DialogError::Label(_) => EXIT_LABELS,
        DialogError::Protocol(_) | DialogError::Parser(_) => EXIT_DIALOG,
    };
    CommandResult::failure(command, error.error_class(), error.to_string(), exit_code)
}
