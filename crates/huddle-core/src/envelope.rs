//! Wire envelope exchanged with clients and queued inside the hub.
//!
//! One JSON object per text frame:
//!
//! ```json
//! { "sender": "0192…", "recipient": "", "content": "hi" }
//! ```
//!
//! Empty fields are omitted when encoding and default to empty when decoding.
//! System notices carry only `content`; chat messages carry `sender` and
//! `content`. `recipient` is kept for wire compatibility and never used for
//! routing.

use serde::{Deserialize, Serialize};

use crate::ids::ClientId;

/// Content of the notice sent to existing members when a client joins.
pub const CONNECTED_NOTICE: &str = "connected";

/// Content of the notice sent to remaining members when a client leaves.
pub const DISCONNECTED_NOTICE: &str = "disconnected";

/// Errors raised while encoding or decoding an [`Envelope`].
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    /// The envelope could not be serialized.
    #[error("failed to encode envelope: {0}")]
    Encode(#[source] serde_json::Error),

    /// The frame was not a valid envelope object.
    #[error("failed to decode envelope: {0}")]
    Decode(#[source] serde_json::Error),
}

/// A single broadcast unit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Envelope {
    /// Originating client id; empty for system notices.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub sender: String,
    /// Reserved addressee. Never populated by broadcast logic.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub recipient: String,
    /// Opaque text payload.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub content: String,
}

impl Envelope {
    /// Chat message read from `sender`'s stream.
    pub fn chat(sender: &ClientId, content: impl Into<String>) -> Self {
        Self {
            sender: sender.as_str().to_owned(),
            recipient: String::new(),
            content: content.into(),
        }
    }

    /// System notice with no sender.
    pub fn notice(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Notice broadcast to existing members when someone joins.
    pub fn connected() -> Self {
        Self::notice(CONNECTED_NOTICE)
    }

    /// Notice broadcast to remaining members when someone leaves.
    pub fn disconnected() -> Self {
        Self::notice(DISCONNECTED_NOTICE)
    }

    /// Whether this envelope was generated by the hub rather than a client.
    pub fn is_notice(&self) -> bool {
        self.sender.is_empty()
    }

    /// Encode to the JSON text carried in one frame.
    pub fn to_json(&self) -> Result<String, EnvelopeError> {
        serde_json::to_string(self).map_err(EnvelopeError::Encode)
    }

    /// Decode a frame's JSON text.
    pub fn from_json(text: &str) -> Result<Self, EnvelopeError> {
        serde_json::from_str(text).map_err(EnvelopeError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn chat_message_wire_shape() {
        let env = Envelope::chat(&ClientId::from("A"), "hi");
        insta::assert_json_snapshot!(env, @r#"
        {
          "sender": "A",
          "content": "hi"
        }
        "#);
    }

    #[test]
    fn connected_notice_wire_shape() {
        insta::assert_json_snapshot!(Envelope::connected(), @r#"
        {
          "content": "connected"
        }
        "#);
    }

    #[test]
    fn disconnected_notice_wire_shape() {
        assert_eq!(
            Envelope::disconnected().to_json().unwrap(),
            r#"{"content":"disconnected"}"#
        );
    }

    #[test]
    fn recipient_is_emitted_only_when_set() {
        let mut env = Envelope::chat(&ClientId::from("A"), "hi");
        env.recipient = "B".into();
        assert_eq!(
            env.to_json().unwrap(),
            r#"{"sender":"A","recipient":"B","content":"hi"}"#
        );
    }

    #[test]
    fn empty_envelope_encodes_as_empty_object() {
        assert_eq!(Envelope::default().to_json().unwrap(), "{}");
    }

    #[test]
    fn missing_fields_decode_as_empty() {
        let env = Envelope::from_json(r#"{"content":"x"}"#).unwrap();
        assert!(env.sender.is_empty());
        assert!(env.recipient.is_empty());
        assert_eq!(env.content, "x");
        assert!(env.is_notice());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let env = Envelope::from_json(r#"{"sender":"A","content":"x","extra":1}"#).unwrap();
        assert_eq!(env.sender, "A");
        assert!(!env.is_notice());
    }

    #[test]
    fn malformed_frame_is_a_decode_error() {
        assert_matches!(Envelope::from_json("not json"), Err(EnvelopeError::Decode(_)));
    }
}
