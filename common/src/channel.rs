use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A board channel (tab).
///
/// Serialized as the Japanese tab label so stored snapshots stay readable
/// by clients that wrote them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Project postings (案件): structured listings with a comment thread.
    #[serde(rename = "案件")]
    Project,
    /// Casual chat (雑談).
    #[serde(rename = "雑談")]
    Chat,
    /// Scam-alert chat (詐欺).
    #[serde(rename = "詐欺")]
    ScamAlert,
}

impl Channel {
    /// All channels in tab order.
    pub const ALL: [Channel; 3] = [Channel::Project, Channel::Chat, Channel::ScamAlert];

    pub fn label(self) -> &'static str {
        match self {
            Channel::Project => "案件",
            Channel::Chat => "雑談",
            Channel::ScamAlert => "詐欺",
        }
    }

    /// Whether submissions to this channel go through the rate limiter.
    ///
    /// Project postings are exempt; only the chat-like channels are throttled.
    pub fn is_rate_limited(self) -> bool {
        !matches!(self, Channel::Project)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseChannelError(pub String);

impl fmt::Display for ParseChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown channel '{}' (expected 案件/雑談/詐欺 or project/chat/scam)",
            self.0
        )
    }
}

impl std::error::Error for ParseChannelError {}

impl FromStr for Channel {
    type Err = ParseChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "案件" | "project" => Ok(Channel::Project),
            "雑談" | "chat" => Ok(Channel::Chat),
            "詐欺" | "scam" => Ok(Channel::ScamAlert),
            other => Err(ParseChannelError(other.to_string())),
        }
    }
}
