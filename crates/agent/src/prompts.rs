//! Fixed English prompts for every agent action.

use applet_dialog_core::dialog::{AppletSummary, DialogAction, Side, Slot, SlotState};
use applet_dialog_core::errors::LabelError;
use applet_dialog_core::labels::LabelDescriber;

pub const GREET_PROMPT: &str = "Hi! Please describe the applet you want to create for automating \
                                the task you have on your mind.";
pub const REWORD_PROMPT: &str =
    "Sorry, I didn't get that. Could you please reword your previous message?";
pub const CLOSE_PROMPT: &str = "Ok, bye!";

/// Renders `action` as the system utterance shown to the user. Channel and
/// function ids are replaced by their descriptions.
pub fn render(
    action: &DialogAction,
    state: &SlotState,
    labels: &dyn LabelDescriber,
) -> Result<String, LabelError> {
    match action {
        DialogAction::Greet => Ok(GREET_PROMPT.to_string()),
        DialogAction::Reword { .. } => Ok(REWORD_PROMPT.to_string()),
        DialogAction::AskSlot { slot } => ask_slot(*slot, state, labels),
        DialogAction::Confirm { slot, value } => confirm(*slot, value, labels),
        DialogAction::Inform { summary } => inform(summary, labels),
        DialogAction::Close => Ok(CLOSE_PROMPT.to_string()),
    }
}

fn ask_slot(
    slot: Slot,
    state: &SlotState,
    labels: &dyn LabelDescriber,
) -> Result<String, LabelError> {
    let prompt = match slot {
        Slot::TriggerChannel => {
            "Which service should I use to look for an event when you want the applet to run?"
                .to_string()
        }
        Slot::TriggerFn => {
            let channel = channel_in_state(Side::Trigger, state, labels)?;
            format!(
                "Which event on the {channel} service should I be looking for to run the applet?"
            )
        }
        Slot::ActionChannel => "Which service should I use to perform the desired action every \
                                time the applet runs?"
            .to_string(),
        Slot::ActionFn => {
            let channel = channel_in_state(Side::Action, state, labels)?;
            format!("What should I do on the {channel} service every time the applet runs?")
        }
    };
    Ok(prompt)
}

fn channel_in_state(
    side: Side,
    state: &SlotState,
    labels: &dyn LabelDescriber,
) -> Result<String, LabelError> {
    labels.describe(side.channel_slot(), &state.channel(side).id)
}

fn confirm(slot: Slot, value: &str, labels: &dyn LabelDescriber) -> Result<String, LabelError> {
    let described = labels.describe(slot, value)?;
    let prompt = match slot {
        Slot::TriggerChannel => {
            format!(
                "Do you want an event on the {described} service to trigger the applet? (yes/no)"
            )
        }
        Slot::TriggerFn => format!("Do you want to trigger the applet {described}? (yes/no)"),
        Slot::ActionChannel => format!(
            "Do you want to use the {described} service to perform the desired action every time \
             the applet is triggered? (yes/no)"
        ),
        Slot::ActionFn => {
            format!("Do you want to {described} every time the applet is triggered? (yes/no)")
        }
    };
    Ok(prompt)
}

fn inform(summary: &AppletSummary, labels: &dyn LabelDescriber) -> Result<String, LabelError> {
    let trigger_channel = labels.describe(Slot::TriggerChannel, &summary.trigger_channel)?;
    let trigger_fn = labels.describe(Slot::TriggerFn, &summary.trigger_fn)?;
    let action_channel = labels.describe(Slot::ActionChannel, &summary.action_channel)?;
    let action_fn = labels.describe(Slot::ActionFn, &summary.action_fn)?;

    Ok(format!(
        "The applet will trigger {trigger_fn}. It will use the {trigger_channel} service to look \
         for this event. The action taken will be to {action_fn}. This action will be performed \
         using the {action_channel} service. Is this what you wanted? (yes/no)"
    ))
}
