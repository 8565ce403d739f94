//! Chat payloads delivered to sessions.

use serde::{Deserialize, Serialize};

/// Tag attached to message-of-the-day announcements.
pub const MOTD_TAG: &str = "MOTD";

/// Chat channel a message is delivered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChatChannel {
    /// Server notices.
    #[default]
    System,
    /// Realm-wide announcements.
    Realm,
}

/// A single chat line pushed to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub channel: ChatChannel,

    /// Sender label shown by the client, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    pub text: String,
}

impl ChatMessage {
    /// Untagged notice on the system channel.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            channel: ChatChannel::System,
            tag: None,
            text: text.into(),
        }
    }

    pub fn tagged(text: impl Into<String>, tag: impl Into<String>, channel: ChatChannel) -> Self {
        Self {
            channel,
            tag: Some(tag.into()),
            text: text.into(),
        }
    }

    /// Message-of-the-day announcement on the realm channel.
    pub fn motd(text: impl Into<String>) -> Self {
        Self::tagged(text, MOTD_TAG, ChatChannel::Realm)
    }
}
