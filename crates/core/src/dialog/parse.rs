use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dialog::slot::{Confirmation, Slot};

/// A label predicted for one slot together with the parser's confidence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlotPrediction {
    pub label: String,
    pub confidence: f64,
}

impl SlotPrediction {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self { label: label.into(), confidence }
    }
}

/// Output of the external utterance parser for a single user turn.
///
/// Holds a prediction for any subset of the four slots and, for yes/no
/// questions, the confirmation reading of the utterance.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    slots: BTreeMap<Slot, SlotPrediction>,
    confirmation: Option<Confirmation>,
}

impl ParseResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn confirmation_only(confirmation: Confirmation) -> Self {
        Self { slots: BTreeMap::new(), confirmation: Some(confirmation) }
    }

    pub fn with_slot(mut self, slot: Slot, label: impl Into<String>, confidence: f64) -> Self {
        self.insert_slot(slot, SlotPrediction::new(label, confidence));
        self
    }

    pub fn with_confirmation(mut self, confirmation: Confirmation) -> Self {
        self.confirmation = Some(confirmation);
        self
    }

    pub fn insert_slot(&mut self, slot: Slot, prediction: SlotPrediction) {
        self.slots.insert(slot, prediction);
    }

    pub fn slot(&self, slot: Slot) -> Option<&SlotPrediction> {
        self.slots.get(&slot)
    }

    pub fn slots(&self) -> impl Iterator<Item = (Slot, &SlotPrediction)> {
        self.slots.iter().map(|(slot, prediction)| (*slot, prediction))
    }

    pub fn confirmation(&self) -> Option<Confirmation> {
        self.confirmation
    }

    /// Keeps only the prediction for `slot`, dropping everything else.
    pub fn restricted_to(&self, slot: Slot) -> Option<Self> {
        let prediction = self.slots.get(&slot)?.clone();
        Some(Self::new().with_slot(slot, prediction.label, prediction.confidence))
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty() && self.confirmation.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::ParseResult;
    use crate::dialog::slot::{Confirmation, Slot};

    #[test]
    fn restricting_keeps_only_the_requested_slot() {
        let parse = ParseResult::new()
            .with_slot(Slot::TriggerChannel, "facebook", 0.8)
            .with_slot(Slot::TriggerFn, "facebook.new_photo", 0.4)
            .with_confirmation(Confirmation::Yes);

        let restricted = parse.restricted_to(Slot::TriggerFn).expect("trigger fn is present");
        assert_eq!(restricted.slots().count(), 1);
        assert_eq!(
            restricted.slot(Slot::TriggerFn).map(|p| p.label.as_str()),
            Some("facebook.new_photo")
        );
        assert!(restricted.confirmation().is_none());
        assert!(parse.restricted_to(Slot::ActionFn).is_none());
    }

    #[test]
    fn empty_parse_reports_empty() {
        assert!(ParseResult::new().is_empty());
        assert!(!ParseResult::confirmation_only(Confirmation::Unknown).is_empty());
    }
}
