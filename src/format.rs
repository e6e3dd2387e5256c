//! User-facing text for the form and the chat command.

use crate::client::ClientError;
use crate::platecheck::{PlateCheck, QueryError};
use crate::saga::SightingReceipt;
use std::fmt;

pub const FORM_SUCCESS: &str = "Sighting submitted successfully!";
pub const NO_PLATE_DETECTED: &str = "No plate detected in message";
pub const PLATE_NOT_FOUND: &str = "No Plate Found";
pub const ADD_COMMAND: &str = "/plateadd";

const TIMED_OUT: &str = "Unable to connect to Platitude: Request timed out. Try again later.";
const NETWORK_DOWN: &str =
    "Unable to connect to Platitude: Network error. Check your connection and try again later.";
const UNAVAILABLE: &str = "Unable to connect to Platitude try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Markup {
    Plain,
    /// Chat styled text, where `**` toggles bold.
    Styled,
}

impl Markup {
    pub fn bold(self, text: &str) -> String {
        match self {
            Markup::Plain => text.to_string(),
            Markup::Styled => format!("**{}**", text),
        }
    }
}

/// What the chat command says back, and how.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatMessage {
    /// A quoted reply to the triggering message.
    Reply(String),
    Send(String),
    SendStyled(String),
}

pub fn form_message<E: fmt::Display>(result: &Result<SightingReceipt, E>) -> String {
    match result {
        Ok(_) => FORM_SUCCESS.to_string(),
        Err(e) => format!("Error: {}", e),
    }
}

pub fn chat_message(result: &Result<PlateCheck, QueryError>) -> ChatMessage {
    match result {
        Ok(PlateCheck::NotFound { .. }) => ChatMessage::Reply(PLATE_NOT_FOUND.to_string()),
        Ok(PlateCheck::NoSightings { code }) => ChatMessage::Send(format!(
            "No Sightings found for plate {} please use {} to add the plate",
            code, ADD_COMMAND
        )),
        Ok(PlateCheck::Found(summary)) => ChatMessage::SendStyled(summary.render(Markup::Styled)),
        Err(e) => ChatMessage::Reply(connectivity_message(e).to_string()),
    }
}

/// Short explanation of a failed lookup, telling timeouts and unreachable
/// backends apart from everything else.
pub fn connectivity_message(err: &QueryError) -> &'static str {
    match err {
        QueryError::Backend(ClientError::Timeout) => TIMED_OUT,
        QueryError::Backend(ClientError::NetworkUnreachable(_)) => NETWORK_DOWN,
        _ => UNAVAILABLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platecheck::{SightingLine, SightingSummary};
    use crate::types::Id;

    #[test]
    fn form_success_and_error_text() {
        let ok: Result<SightingReceipt, String> = Ok(SightingReceipt {
            sighting_id: Id::Number(3),
            plate_id: Id::Number(2),
            vehicle_id: None,
        });
        assert_eq!(form_message(&ok), "Sighting submitted successfully!");

        let err: Result<SightingReceipt, String> =
            Err("Plate creation error: request timed out".to_string());
        assert_eq!(
            form_message(&err),
            "Error: Plate creation error: request timed out"
        );
    }

    #[test]
    fn connectivity_messages_are_distinguished() {
        assert_eq!(
            connectivity_message(&QueryError::Backend(ClientError::Timeout)),
            TIMED_OUT
        );
        assert_eq!(
            connectivity_message(&QueryError::Backend(ClientError::NetworkUnreachable(
                "refused".to_string()
            ))),
            NETWORK_DOWN
        );
        assert_eq!(
            connectivity_message(&QueryError::Backend(ClientError::UnexpectedStatus {
                status: 500,
                body: String::new()
            })),
            UNAVAILABLE
        );
        assert_eq!(
            connectivity_message(&QueryError::InvalidInput("bad".to_string())),
            UNAVAILABLE
        );
    }

    #[test]
    fn chat_outcomes() {
        assert_eq!(
            chat_message(&Ok(PlateCheck::NotFound {
                code: "ABC".to_string()
            })),
            ChatMessage::Reply("No Plate Found".to_string())
        );
        assert_eq!(
            chat_message(&Ok(PlateCheck::NoSightings {
                code: "ABC".to_string()
            })),
            ChatMessage::Send(
                "No Sightings found for plate ABC please use /plateadd to add the plate"
                    .to_string()
            )
        );
    }

    #[test]
    fn summaries_are_styled_for_chat() {
        let summary = SightingSummary {
            plate: "XYZ999".to_string(),
            vehicle: None,
            lines: vec![SightingLine {
                longitude: "2.0".to_string(),
                latitude: "1.0".to_string(),
                time: "10:00 AM on Jan 01, 2024".to_string(),
            }],
        };
        assert_eq!(
            chat_message(&Ok(PlateCheck::Found(summary))),
            ChatMessage::SendStyled(
                "--**1 Sighting found**--\n\
                 **Plate**: XYZ999\n\
                 VEHICLE INFO UNKNOWN\n\
                 **Location**:2.0,1.0 || **Time**:10:00 AM on Jan 01, 2024"
                    .to_string()
            )
        );
    }
}
