use std::env;
use std::fs;
use std::path::Path;

use applet_dialog_core::config::{
    resolve_config_path, AppConfig, LoadOptions, ENV_LABELS_DIR, ENV_LOGGING_FORMAT,
    ENV_LOGGING_LEVEL, ENV_LOG_FORMAT, ENV_LOG_LEVEL, ENV_POLICY_ALPHA, ENV_POLICY_BETA,
};
use toml::Value;

use super::{CommandResult, EXIT_CONFIG};

pub fn run(config_path: Option<&Path>) -> CommandResult {
    let options = LoadOptions {
        config_path: config_path.map(Path::to_path_buf),
        require_file: config_path.is_some(),
        ..LoadOptions::default()
    };
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::text(EXIT_CONFIG, format!("config validation failed: {error}"))
        }
    };

    CommandResult::text(0, render(&config, config_path))
}

fn render(config: &AppConfig, explicit_path: Option<&Path>) -> String {
    let file_path = resolve_config_path(explicit_path);
    let file_doc = load_config_file_doc(file_path.as_deref());

    let fields: [(&str, String, &[&str]); 5] = [
        ("policy.alpha", config.policy.alpha.to_string(), &[ENV_POLICY_ALPHA]),
        ("policy.beta", config.policy.beta.to_string(), &[ENV_POLICY_BETA]),
        ("labels.dir", config.labels.dir.display().to_string(), &[ENV_LABELS_DIR]),
        ("logging.level", config.logging.level.clone(), &[ENV_LOGGING_LEVEL, ENV_LOG_LEVEL]),
        (
            "logging.format",
            format!("{:?}", config.logging.format),
            &[ENV_LOGGING_FORMAT, ENV_LOG_FORMAT],
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key_path, value, env_keys) in fields {
        let source = field_source(key_path, env_keys, file_doc.as_ref(), file_path.as_deref());
        lines.push(render_line(key_path, &value, source));
    }
    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

/// Command-line overrides are not visible here, so `env` is the highest
/// source reported.
fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    let is_set = |key: &str| env::var(key).is_ok_and(|value| !value.trim().is_empty());
    if let Some(env_key) = env_keys.iter().copied().find(|&key| is_set(key)) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
