//! The turn contract with the transport layer.

use serde::{Deserialize, Serialize};

/// One inbound message handed to the engine by the transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnInput {
    /// Conversation identifier (phone number or user id).
    pub conversation_id: String,

    /// Display name reported by the transport, used only for logging.
    #[serde(default)]
    pub display_name: String,

    /// Raw message text.
    pub text: String,

    /// Whether the message came from a group chat. Group messages are
    /// logged and kept silent; they never enter retrieval.
    #[serde(default)]
    pub is_group: bool,
}

/// Reference to a synthesized audio rendition of a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioRef(pub String);

/// Kind of reply, relayed verbatim to the transport layer.
///
/// The wire values are the ones the existing transport expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplyTag {
    /// Menu text or any prompt asking the user to pick/type something.
    #[serde(rename = "menu")]
    Menu,
    /// A delivered answer or closing message.
    #[serde(rename = "resposta")]
    Answer,
    /// A user-correctable error (invalid option, blocked question).
    #[serde(rename = "erro")]
    Error,
}

/// The engine's reply for one turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnOutput {
    /// Reply text to deliver.
    pub text: String,

    /// Reply kind.
    pub tag: ReplyTag,

    /// Optional audio rendition of the reply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioRef>,
}

impl TurnOutput {
    /// A menu-tagged reply.
    pub fn menu(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tag: ReplyTag::Menu,
            audio: None,
        }
    }

    /// An answer-tagged reply.
    pub fn answer(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tag: ReplyTag::Answer,
            audio: None,
        }
    }

    /// An error-tagged reply.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tag: ReplyTag::Error,
            audio: None,
        }
    }

    /// Attach an audio reference.
    pub fn with_audio(mut self, audio: Option<AudioRef>) -> Self {
        self.audio = audio;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_tag_wire_values() {
        assert_eq!(
            serde_json::to_string(&ReplyTag::Menu).unwrap(),
            "\"menu\""
        );
        assert_eq!(
            serde_json::to_string(&ReplyTag::Answer).unwrap(),
            "\"resposta\""
        );
        assert_eq!(
            serde_json::to_string(&ReplyTag::Error).unwrap(),
            "\"erro\""
        );
    }

    #[test]
    fn test_audio_omitted_when_absent() {
        let out = TurnOutput::answer("done");
        let json = serde_json::to_string(&out).unwrap();
        assert!(!json.contains("audio"));

        let with_audio = out.with_audio(Some(AudioRef("reply.mp3".to_string())));
        let json = serde_json::to_string(&with_audio).unwrap();
        assert!(json.contains("reply.mp3"));
    }
}
