use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::channel::Channel;
use crate::validation::FieldErrors;

/// Unique identifier for a message or comment.
///
/// Stored as the decimal millisecond timestamp of creation, bumped past the
/// last issued id when two items are created within the same millisecond.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl MessageId {
    /// Next id for an item created at `now`, never at or below `last`.
    pub fn next(now: DateTime<Utc>, last: Option<i64>) -> MessageId {
        let now_ms = now.timestamp_millis();
        let value = match last {
            Some(last) if last >= now_ms => last.checked_add(1).unwrap_or(now_ms),
            _ => now_ms,
        };
        MessageId(value.to_string())
    }

    /// Numeric value of the id, if it is one.
    pub fn as_millis(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        MessageId(value.to_string())
    }
}

/// A reply in a project posting's thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadComment {
    pub id: MessageId,
    pub nickname: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub content: String,
    /// Poster's verification status when the comment was written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}

/// A job listing in the project channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMessage {
    pub id: MessageId,
    pub nickname: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub project_name: String,
    pub phone_number: String,
    /// Free-form, e.g. "15,000円/日". Never parsed.
    pub price: String,
    pub description: String,
    /// Append-only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub thread_comments: Vec<ThreadComment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}

impl ProjectMessage {
    pub fn add_comment(&mut self, comment: ThreadComment) {
        self.thread_comments.push(comment);
    }

    pub fn comments(&self) -> &[ThreadComment] {
        &self.thread_comments
    }

    pub fn comment_count(&self) -> usize {
        self.thread_comments.len()
    }
}

/// A plain chat line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleMessage {
    pub id: MessageId,
    pub nickname: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}

/// A board message, discriminated by its channel tab.
///
/// Immutable once posted, except that a project posting's thread grows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tab")]
pub enum Message {
    #[serde(rename = "案件")]
    Project(ProjectMessage),
    #[serde(rename = "雑談")]
    Chat(SimpleMessage),
    #[serde(rename = "詐欺")]
    ScamAlert(SimpleMessage),
}

impl Message {
    /// Wrap a chat line for `channel`. `None` for the project channel.
    pub fn simple(channel: Channel, message: SimpleMessage) -> Option<Message> {
        match channel {
            Channel::Project => None,
            Channel::Chat => Some(Message::Chat(message)),
            Channel::ScamAlert => Some(Message::ScamAlert(message)),
        }
    }

    pub fn channel(&self) -> Channel {
        match self {
            Message::Project(_) => Channel::Project,
            Message::Chat(_) => Channel::Chat,
            Message::ScamAlert(_) => Channel::ScamAlert,
        }
    }

    pub fn id(&self) -> &MessageId {
        match self {
            Message::Project(m) => &m.id,
            Message::Chat(m) | Message::ScamAlert(m) => &m.id,
        }
    }

    pub fn nickname(&self) -> &str {
        match self {
            Message::Project(m) => &m.nickname,
            Message::Chat(m) | Message::ScamAlert(m) => &m.nickname,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Message::Project(m) => m.timestamp,
            Message::Chat(m) | Message::ScamAlert(m) => m.timestamp,
        }
    }

    /// Records without the flag predate verification and count as unverified.
    pub fn is_verified(&self) -> bool {
        let verified = match self {
            Message::Project(m) => m.verified,
            Message::Chat(m) | Message::ScamAlert(m) => m.verified,
        };
        verified.unwrap_or(false)
    }

    pub fn as_project(&self) -> Option<&ProjectMessage> {
        match self {
            Message::Project(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_project_mut(&mut self) -> Option<&mut ProjectMessage> {
        match self {
            Message::Project(m) => Some(m),
            _ => None,
        }
    }
}

/// Raw project-posting input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectForm {
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub description: String,
}

impl ProjectForm {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.require("projectName", &self.project_name, "案件名を入力してください");
        errors.require_phone("phoneNumber", &self.phone_number);
        errors.require("price", &self.price, "料金を入力してください");
        errors.require("description", &self.description, "概要を入力してください");
        errors
    }

    /// Validate and build a posting with trimmed fields and an empty thread.
    pub fn build(
        &self,
        id: MessageId,
        nickname: &str,
        timestamp: DateTime<Utc>,
        verified: Option<bool>,
    ) -> Result<ProjectMessage, FieldErrors> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(ProjectMessage {
            id,
            nickname: nickname.to_string(),
            timestamp,
            project_name: self.project_name.trim().to_string(),
            phone_number: self.phone_number.trim().to_string(),
            price: self.price.trim().to_string(),
            description: self.description.trim().to_string(),
            thread_comments: Vec::new(),
            verified,
        })
    }
}
