//! Deterministic string-similarity parser over the label catalog.

use std::sync::Arc;

use applet_dialog_core::dialog::{IntentType, ParseResult, Side, Slot, SlotPrediction, SlotState};
use applet_dialog_core::errors::ParserError;
use applet_dialog_core::labels::LabelCatalog;
use tracing::debug;

use crate::parser::{parse_confirmation, UtteranceParser};

/// Confidence given when a label's name appears verbatim inside a longer
/// utterance.
const CONTAINED_CONFIDENCE: f64 = 0.9;
const SIDE_SEPARATOR: &str = " then ";

#[derive(Clone, Debug)]
pub struct KeywordParser {
    catalog: Arc<LabelCatalog>,
}

impl KeywordParser {
    pub fn new(catalog: Arc<LabelCatalog>) -> Self {
        Self { catalog }
    }

    fn best_channel(&self, slot: Slot, text: &str) -> SlotPrediction {
        best_match(self.catalog.labels(slot), |label, description| {
            channel_score(text, label, description)
        })
    }

    fn best_function(&self, slot: Slot, channel: &str, text: &str) -> SlotPrediction {
        best_match(self.catalog.functions_of(slot, channel), |label, description| {
            function_score(text, label, description)
        })
    }

    fn parse_side(&self, side: Side, text: &str, parse: &mut ParseResult) {
        let channel = self.best_channel(side.channel_slot(), text);
        let function = self.best_function(side.function_slot(), &channel.label, text);
        parse.insert_slot(side.channel_slot(), channel);
        parse.insert_slot(side.function_slot(), function);
    }

    fn parse_free_form(&self, utterance: &str) -> ParseResult {
        let (trigger_text, action_text) =
            utterance.split_once(SIDE_SEPARATOR).unwrap_or((utterance, utterance));

        let mut parse = ParseResult::new();
        self.parse_side(Side::Trigger, trigger_text.trim(), &mut parse);
        self.parse_side(Side::Action, action_text.trim(), &mut parse);
        parse
    }
}

impl UtteranceParser for KeywordParser {
    fn parse(
        &self,
        utterance: &str,
        intent: IntentType,
        state: &SlotState,
    ) -> Result<ParseResult, ParserError> {
        let text = utterance.trim().to_lowercase();
        let parse = match intent {
            IntentType::FreeForm => self.parse_free_form(&text),
            IntentType::TriggerChannel | IntentType::ActionChannel => {
                let slot = intent.slot().ok_or_else(|| ParserError::new("channel intent"))?;
                let mut parse = ParseResult::new();
                parse.insert_slot(slot, self.best_channel(slot, &text));
                parse
            }
            IntentType::TriggerFn | IntentType::ActionFn => {
                let slot = intent.slot().ok_or_else(|| ParserError::new("function intent"))?;
                let channel = &state.channel(slot.side()).id;
                let mut parse = ParseResult::new();
                parse.insert_slot(slot, self.best_function(slot, channel, &text));
                parse
            }
            IntentType::Confirm => ParseResult::confirmation_only(parse_confirmation(&text)),
        };

        debug!(
            event_name = "dialog.parser.keyword",
            intent = ?intent,
            predictions = parse.slots().count(),
            "keyword parse complete"
        );
        Ok(parse)
    }
}

fn best_match<'a>(
    candidates: impl Iterator<Item = (&'a str, &'a str)>,
    score: impl Fn(&str, &str) -> f64,
) -> SlotPrediction {
    let mut best = SlotPrediction::new("", 0.0);
    for (label, description) in candidates {
        let confidence = score(label, description);
        if confidence > best.confidence {
            best = SlotPrediction::new(label, confidence);
        }
    }
    best
}

fn channel_score(text: &str, label: &str, description: &str) -> f64 {
    let description = description.to_lowercase();
    let label_words = label.replace('_', " ");
    if text == description || text == label_words {
        return 1.0;
    }

    let tokens = tokenize(text);
    if contains_phrase(&tokens, &tokenize(&description))
        || contains_phrase(&tokens, &tokenize(&label_words))
    {
        return CONTAINED_CONFIDENCE;
    }

    strsim::normalized_levenshtein(text, &description)
        .max(strsim::normalized_levenshtein(text, &label_words))
}

fn function_score(text: &str, label: &str, description: &str) -> f64 {
    let description = description.to_lowercase();
    if text == description {
        return 1.0;
    }
    let name = label.split_once('.').map_or(label, |(_, name)| name).replace('_', " ");

    token_recall(&tokenize(text), &tokenize(&description))
        .max(strsim::sorensen_dice(text, &description))
        .max(strsim::sorensen_dice(text, &name))
}

fn tokenize(text: &str) -> Vec<String> {
    let mut sanitized = String::with_capacity(text.len());
    for character in text.chars() {
        if character.is_alphanumeric() {
            sanitized.extend(character.to_lowercase());
        } else {
            sanitized.push(' ');
        }
    }
    sanitized.split_whitespace().map(|token| token.to_string()).collect()
}

fn contains_phrase(haystack: &[String], needle: &[String]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|window| window == needle)
}

/// Share of `reference` tokens present in `tokens`.
fn token_recall(tokens: &[String], reference: &[String]) -> f64 {
    if reference.is_empty() {
        return 0.0;
    }
    let found = reference.iter().filter(|token| tokens.contains(token)).count();
    found as f64 / reference.len() as f64
}
