//! Human-readable descriptions of channel and function labels.
//!
//! Label maps live in four CSV files with a `label,description` header, one
//! file per slot.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::dialog::Slot;
use crate::errors::LabelError;

pub const TRIGGER_CHANNELS_FILE: &str = "trigger-channels.csv";
pub const TRIGGER_FUNCTIONS_FILE: &str = "trigger-functions.csv";
pub const ACTION_CHANNELS_FILE: &str = "action-channels.csv";
pub const ACTION_FUNCTIONS_FILE: &str = "action-functions.csv";

/// Maps a slot label to the text shown to the user.
pub trait LabelDescriber: Send + Sync {
    /// Describes `id` for `slot`. An empty id describes as the empty string.
    fn describe(&self, slot: Slot, id: &str) -> Result<String, LabelError>;
}

pub fn label_file_name(slot: Slot) -> &'static str {
    match slot {
        Slot::TriggerChannel => TRIGGER_CHANNELS_FILE,
        Slot::TriggerFn => TRIGGER_FUNCTIONS_FILE,
        Slot::ActionChannel => ACTION_CHANNELS_FILE,
        Slot::ActionFn => ACTION_FUNCTIONS_FILE,
    }
}

#[derive(Debug, Deserialize)]
struct LabelRow {
    label: String,
    description: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelCatalog {
    trigger_channels: BTreeMap<String, String>,
    trigger_functions: BTreeMap<String, String>,
    action_channels: BTreeMap<String, String>,
    action_functions: BTreeMap<String, String>,
}

impl LabelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads all four label maps from `dir`.
    pub fn load(dir: &Path) -> Result<Self, LabelError> {
        let mut catalog = Self::new();
        for slot in Slot::ALL {
            let path = dir.join(label_file_name(slot));
            let mut reader = csv::ReaderBuilder::new()
                .trim(csv::Trim::All)
                .from_path(&path)
                .map_err(|source| LabelError::ReadFile { path: path.clone(), source })?;

            for row in reader.deserialize::<LabelRow>() {
                let row =
                    row.map_err(|source| LabelError::ReadFile { path: path.clone(), source })?;
                catalog.insert(slot, row.label, row.description);
            }
        }

        info!(
            event_name = "dialog.labels.loaded",
            dir = %dir.display(),
            trigger_channels = catalog.len(Slot::TriggerChannel),
            trigger_functions = catalog.len(Slot::TriggerFn),
            action_channels = catalog.len(Slot::ActionChannel),
            action_functions = catalog.len(Slot::ActionFn),
            "label catalog loaded"
        );
        Ok(catalog)
    }

    pub fn insert(&mut self, slot: Slot, label: impl Into<String>, description: impl Into<String>) {
        self.map_mut(slot).insert(label.into(), description.into());
    }

    pub fn with_label(mut self, slot: Slot, label: &str, description: &str) -> Self {
        self.insert(slot, label, description);
        self
    }

    /// `(label, description)` pairs for `slot`, ordered by label.
    pub fn labels(&self, slot: Slot) -> impl Iterator<Item = (&str, &str)> {
        self.map(slot).iter().map(|(label, description)| (label.as_str(), description.as_str()))
    }

    /// Function labels of `slot` that belong to `channel`.
    pub fn functions_of<'a>(
        &'a self,
        slot: Slot,
        channel: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.labels(slot).filter(move |(label, _)| {
            label.split_once('.').is_some_and(|(prefix, _)| prefix == channel)
        })
    }

    pub fn contains(&self, slot: Slot, label: &str) -> bool {
        self.map(slot).contains_key(label)
    }

    pub fn len(&self, slot: Slot) -> usize {
        self.map(slot).len()
    }

    fn map(&self, slot: Slot) -> &BTreeMap<String, String> {
        match slot {
            Slot::TriggerChannel => &self.trigger_channels,
            Slot::TriggerFn => &self.trigger_functions,
            Slot::ActionChannel => &self.action_channels,
            Slot::ActionFn => &self.action_functions,
        }
    }

    fn map_mut(&mut self, slot: Slot) -> &mut BTreeMap<String, String> {
        match slot {
            Slot::TriggerChannel => &mut self.trigger_channels,
            Slot::TriggerFn => &mut self.trigger_functions,
            Slot::ActionChannel => &mut self.action_channels,
            Slot::ActionFn => &mut self.action_functions,
        }
    }
}

impl LabelDescriber for LabelCatalog {
    fn describe(&self, slot: Slot, id: &str) -> Result<String, LabelError> {
        if id.is_empty() {
            debug!(
                event_name = "dialog.labels.empty_id",
                slot = %slot,
                "describing empty label id"
            );
            return Ok(String::new());
        }

        self.map(slot)
            .get(id)
            .cloned()
            .ok_or_else(|| LabelError::UnknownLabel { slot, id: id.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::{label_file_name, LabelCatalog, LabelDescriber};
    use crate::dialog::Slot;
    use crate::errors::LabelError;

    fn write_maps(dir: &TempDir) {
        let files = [
            (Slot::TriggerChannel, "label,description\nfacebook,Facebook\ninstagram,Instagram\n"),
            (
                Slot::TriggerFn,
                "label,description\nfacebook.new_photo,when you post a new photo\n\
                 instagram.new_photo,when you share a new photo\n",
            ),
            (Slot::ActionChannel, "label,description\ndropbox,Dropbox\n"),
            (Slot::ActionFn, "label,description\ndropbox.add_file,save the file to Dropbox\n"),
        ];
        for (slot, contents) in files {
            fs::write(dir.path().join(label_file_name(slot)), contents).expect("write label map");
        }
    }

    #[test]
    fn load_reads_all_four_maps() {
        let dir = TempDir::new().expect("tempdir");
        write_maps(&dir);

        let catalog = LabelCatalog::load(dir.path()).expect("load catalog");

        assert_eq!(catalog.len(Slot::TriggerChannel), 2);
        assert_eq!(catalog.len(Slot::TriggerFn), 2);
        assert_eq!(catalog.len(Slot::ActionChannel), 1);
        assert_eq!(
            catalog.describe(Slot::ActionFn, "dropbox.add_file").expect("known label"),
            "save the file to Dropbox"
        );
    }

    #[test]
    fn missing_file_names_its_path() {
        let dir = TempDir::new().expect("tempdir");
        let error = LabelCatalog::load(dir.path()).expect_err("empty dir cannot load");

        assert!(matches!(
            error,
            LabelError::ReadFile { ref path, .. } if path.ends_with("trigger-channels.csv")
        ));
    }

    #[test]
    fn empty_id_describes_as_empty_text() {
        let catalog = LabelCatalog::new();
        assert_eq!(catalog.describe(Slot::TriggerChannel, "").expect("empty id"), "");
    }

    #[test]
    fn unknown_id_is_an_error() {
        let catalog = LabelCatalog::new().with_label(Slot::TriggerChannel, "facebook", "Facebook");
        let error = catalog.describe(Slot::TriggerChannel, "myspace").expect_err("unknown label");

        assert!(matches!(error, LabelError::UnknownLabel { slot: Slot::TriggerChannel, .. }));
    }

    #[test]
    fn functions_of_filters_by_channel_prefix() {
        let catalog = LabelCatalog::new()
            .with_label(Slot::TriggerFn, "facebook.new_photo", "new photo")
            .with_label(Slot::TriggerFn, "facebook.new_status", "new status")
            .with_label(Slot::TriggerFn, "facebooks.any", "lookalike channel");

        let labels: Vec<&str> =
            catalog.functions_of(Slot::TriggerFn, "facebook").map(|(label, _)| label).collect();
        assert_eq!(labels, vec!["facebook.new_photo", "facebook.new_status"]);
    }
}
