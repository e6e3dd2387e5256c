//! The `/platecheck <plate>` chat command.
//!
//! The chat transport is somebody else's problem: a message's text comes in,
//! and the actions to perform on it go back out, in order.

use crate::client::ResourceClient;
use crate::format::{self, ChatMessage};
use crate::platecheck;
use log::{debug, info};
use serde::Serialize;

pub const TRIGGER: &str = "/platecheck";
/// Eyes, so the sender knows the lookup is underway.
pub const ACK_REACTION: &str = "\u{1f440}";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BotAction {
    React { emoji: String },
    Reply { text: String },
    Send { text: String, styled: bool },
}

impl From<ChatMessage> for BotAction {
    fn from(message: ChatMessage) -> BotAction {
        match message {
            ChatMessage::Reply(text) => BotAction::Reply { text },
            ChatMessage::Send(text) => BotAction::Send {
                text,
                styled: false,
            },
            ChatMessage::SendStyled(text) => BotAction::Send { text, styled: true },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `/platecheck` with nothing after it.
    MissingPlate,
    Check(String),
}

/// Returns `None` for messages that are not a `/platecheck` command.
/// The plate is whatever follows the first run of whitespace.
pub fn parse_command(text: &str) -> Option<Command> {
    let rest = text.strip_prefix(TRIGGER)?;
    // Same word boundary as `^/platecheck\b`.
    if rest
        .chars()
        .next()
        .map_or(false, |c| c.is_alphanumeric() || c == '_')
    {
        return None;
    }
    let plate = text
        .splitn(2, char::is_whitespace)
        .nth(1)
        .map(str::trim)
        .unwrap_or("");
    if plate.is_empty() {
        Some(Command::MissingPlate)
    } else {
        Some(Command::Check(plate.to_uppercase()))
    }
}

pub async fn handle(client: &ResourceClient, text: &str) -> Vec<BotAction> {
    let command = match parse_command(text) {
        Some(command) => command,
        None => {
            debug!("Ignoring message that is not a plate check");
            return Vec::new();
        }
    };
    let mut actions = vec![BotAction::React {
        emoji: ACK_REACTION.to_string(),
    }];
    match command {
        Command::MissingPlate => actions.push(BotAction::Reply {
            text: format::NO_PLATE_DETECTED.to_string(),
        }),
        Command::Check(plate) => {
            info!("Plate check requested for {}", plate);
            let result = platecheck::check_plate(client, &plate).await;
            actions.push(format::chat_message(&result).into());
        }
    }
    actions
}
