use std::path::Path;

use applet_dialog_core::config::{AppConfig, LoadOptions};
use applet_dialog_core::dialog::{Side, Slot};
use applet_dialog_core::labels::{label_file_name, LabelCatalog};
use serde::Serialize;

use super::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

impl DoctorCheck {
    fn skipped(name: &'static str, reason: &str) -> Self {
        Self { name, status: CheckStatus::Skipped, details: format!("skipped because {reason}") }
    }
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(config_path: Option<&Path>, json_output: bool) -> CommandResult {
    let report = build_report(config_path);
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    if json_output {
        let output = serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
        return CommandResult::text(exit_code, output);
    }

    CommandResult::text(exit_code, render_human(&report))
}

fn build_report(config_path: Option<&Path>) -> DoctorReport {
    let options = LoadOptions {
        config_path: config_path.map(Path::to_path_buf),
        require_file: config_path.is_some(),
        ..LoadOptions::default()
    };

    let mut checks = Vec::new();
    match AppConfig::load(options) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: format!(
                    "configuration loaded and validated (alpha {}, beta {})",
                    config.policy.alpha, config.policy.beta
                ),
            });
            checks.extend(check_labels(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck::skipped("label_catalog", "configuration did not load"));
            checks.push(DoctorCheck::skipped("label_consistency", "configuration did not load"));
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_labels(config: &AppConfig) -> [DoctorCheck; 2] {
    let catalog = match LabelCatalog::load(&config.labels.dir) {
        Ok(catalog) => catalog,
        Err(error) => {
            return [
                DoctorCheck {
                    name: "label_catalog",
                    status: CheckStatus::Fail,
                    details: error.to_string(),
                },
                DoctorCheck::skipped("label_consistency", "the label catalog did not load"),
            ];
        }
    };

    let empty: Vec<&str> = Slot::ALL
        .iter()
        .filter(|slot| catalog.len(**slot) == 0)
        .map(|slot| label_file_name(*slot))
        .collect();
    let catalog_check = if empty.is_empty() {
        DoctorCheck {
            name: "label_catalog",
            status: CheckStatus::Pass,
            details: format!(
                "loaded {} trigger channels, {} trigger functions, {} action channels, {} action \
                 functions from `{}`",
                catalog.len(Slot::TriggerChannel),
                catalog.len(Slot::TriggerFn),
                catalog.len(Slot::ActionChannel),
                catalog.len(Slot::ActionFn),
                config.labels.dir.display()
            ),
        }
    } else {
        DoctorCheck {
            name: "label_catalog",
            status: CheckStatus::Fail,
            details: format!("label files without entries: {}", empty.join(", ")),
        }
    };

    [catalog_check, check_consistency(&catalog)]
}

/// Every function label must be `<channel>.<name>` with a channel known on
/// the same side.
fn check_consistency(catalog: &LabelCatalog) -> DoctorCheck {
    let mut orphans = Vec::new();
    for side in [Side::Trigger, Side::Action] {
        let channel_slot = side.channel_slot();
        for (label, _) in catalog.labels(side.function_slot()) {
            let known = label
                .split_once('.')
                .is_some_and(|(channel, _)| catalog.contains(channel_slot, channel));
            if !known {
                orphans.push(label.to_string());
            }
        }
    }

    if orphans.is_empty() {
        DoctorCheck {
            name: "label_consistency",
            status: CheckStatus::Pass,
            details: "every function label belongs to a known channel".to_string(),
        }
    } else {
        DoctorCheck {
            name: "label_consistency",
            status: CheckStatus::Fail,
            details: format!("function labels without a known channel: {}", orphans.join(", ")),
        }
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
