use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the four resolvable fields of an applet.
///
/// The declaration order is the resolution order: trigger before action and,
/// within a side, channel before function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    TriggerChannel,
    TriggerFn,
    ActionChannel,
    ActionFn,
}

impl Slot {
    pub const ALL: [Slot; 4] =
        [Slot::TriggerChannel, Slot::TriggerFn, Slot::ActionChannel, Slot::ActionFn];

    pub fn side(self) -> Side {
        match self {
            Self::TriggerChannel | Self::TriggerFn => Side::Trigger,
            Self::ActionChannel | Self::ActionFn => Side::Action,
        }
    }

    pub fn is_channel(self) -> bool {
        matches!(self, Self::TriggerChannel | Self::ActionChannel)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TriggerChannel => "trigger_channel",
            Self::TriggerFn => "trigger_fn",
            Self::ActionChannel => "action_channel",
            Self::ActionFn => "action_fn",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Trigger,
    Action,
}

impl Side {
    pub fn channel_slot(self) -> Slot {
        match self {
            Self::Trigger => Slot::TriggerChannel,
            Self::Action => Slot::ActionChannel,
        }
    }

    pub fn function_slot(self) -> Slot {
        match self {
            Self::Trigger => Slot::TriggerFn,
            Self::Action => Slot::ActionFn,
        }
    }
}

/// Tri-state answer to a yes/no question.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confirmation {
    Yes,
    No,
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::{Side, Slot};

    #[test]
    fn resolution_order_is_trigger_first_channel_first() {
        let mut sorted = Slot::ALL;
        sorted.sort();
        assert_eq!(sorted, Slot::ALL);
        assert_eq!(Slot::ALL[0], Slot::TriggerChannel);
        assert_eq!(Slot::ALL[3], Slot::ActionFn);
    }

    #[test]
    fn sides_map_back_to_their_slots() {
        for slot in Slot::ALL {
            let side = slot.side();
            if slot.is_channel() {
                assert_eq!(side.channel_slot(), slot);
            } else {
                assert_eq!(side.function_slot(), slot);
            }
        }
        assert_eq!(Side::Action.function_slot(), Slot::ActionFn);
    }
}
