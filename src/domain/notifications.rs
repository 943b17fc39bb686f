use std::fmt;

use serde::{Deserialize, Serialize};

use super::ship::PlayerId;

pub const ENTERED_COMBAT_TEXT: &str = "Entered COMBAT MODE";
pub const ENTERED_PEACE_TEXT: &str = "Entered PEACE MODE";

/// Font colors understood by the host chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageColor {
    White,
    Red,
    Blue,
}

impl fmt::Display for MessageColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageColor::White => "White",
            MessageColor::Red => "Red",
            MessageColor::Blue => "Blue",
        };
        f.write_str(name)
    }
}

/// Queued chat message for a single pilot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombatMessage {
    pub recipient: PlayerId,
    pub text: String,
    pub color: MessageColor,
}

impl CombatMessage {
    pub fn entered_combat(recipient: PlayerId) -> Self {
        Self {
            recipient,
            text: ENTERED_COMBAT_TEXT.to_string(),
            color: MessageColor::Red,
        }
    }

    pub fn entered_peace(recipient: PlayerId) -> Self {
        Self {
            recipient,
            text: ENTERED_PEACE_TEXT.to_string(),
            color: MessageColor::Blue,
        }
    }

    pub fn exit_countdown(recipient: PlayerId, seconds_left: u32) -> Self {
        Self {
            recipient,
            text: format!("Exiting COMBAT MODE in...{seconds_left} secs"),
            color: MessageColor::Blue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_countdown_message_is_built_then_text_carries_seconds() {
        let message = CombatMessage::exit_countdown(7, 3);

        assert_eq!(message.text, "Exiting COMBAT MODE in...3 secs");
        assert_eq!(message.color, MessageColor::Blue);
        assert_eq!(message.recipient, 7);
    }
}
