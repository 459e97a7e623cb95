use chrono::{DateTime, Utc};

use kamotsu_common::channel::Channel;
use kamotsu_common::message::{Message, MessageId, ThreadComment};

use crate::error::BoardError;
use crate::store::{load_json, save_json, Store, StoreError, MESSAGES_KEY};

/// All posted messages, in posting order. Every mutation persists the full
/// snapshot.
#[derive(Debug, Clone, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
    /// Highest numeric id issued or seen, across messages and comments.
    last_id: Option<i64>,
}

impl MessageStore {
    pub fn load(store: &impl Store) -> Self {
        let messages: Vec<Message> = load_json(store, MESSAGES_KEY);
        let last_id = messages
            .iter()
            .flat_map(|m| {
                let comments = m.as_project().map(|p| p.comments()).unwrap_or_default();
                std::iter::once(m.id()).chain(comments.iter().map(|c| &c.id))
            })
            .filter_map(MessageId::as_millis)
            // An id at i64::MAX has no successor.
            .filter(|ms| ms.checked_add(1).is_some())
            .max();
        Self { messages, last_id }
    }

    /// Issue a fresh id for content created at `now`.
    pub fn next_id(&mut self, now: DateTime<Utc>) -> MessageId {
        let id = MessageId::next(now, self.last_id);
        self.last_id = id.as_millis();
        id
    }

    pub fn append(&mut self, store: &mut impl Store, message: Message) -> Result<(), StoreError> {
        self.messages.push(message);
        if let Err(e) = self.persist(store) {
            self.messages.pop();
            return Err(e);
        }
        Ok(())
    }

    /// Append `comment` to the thread of project posting `id`.
    pub fn add_comment(
        &mut self,
        store: &mut impl Store,
        id: &MessageId,
        comment: ThreadComment,
    ) -> Result<(), BoardError> {
        let project = self.project_mut(id)?;
        project.add_comment(comment);

        if let Err(e) = self.persist(store) {
            if let Ok(project) = self.project_mut(id) {
                project.thread_comments.pop();
            }
            return Err(e.into());
        }
        Ok(())
    }

    /// Ensure `id` names a project posting.
    pub fn require_project(&self, id: &MessageId) -> Result<(), BoardError> {
        match self.get(id) {
            None => Err(BoardError::MessageNotFound(id.clone())),
            Some(m) if m.as_project().is_none() => Err(BoardError::NotAProjectMessage(id.clone())),
            Some(_) => Ok(()),
        }
    }

    fn project_mut(
        &mut self,
        id: &MessageId,
    ) -> Result<&mut kamotsu_common::message::ProjectMessage, BoardError> {
        let message = self
            .messages
            .iter_mut()
            .find(|m| m.id() == id)
            .ok_or_else(|| BoardError::MessageNotFound(id.clone()))?;
        message
            .as_project_mut()
            .ok_or_else(|| BoardError::NotAProjectMessage(id.clone()))
    }

    fn persist(&self, store: &mut impl Store) -> Result<(), StoreError> {
        save_json(store, MESSAGES_KEY, &self.messages).inspect_err(|e| {
            tracing::error!("failed to persist messages: {e}");
        })
    }

    pub fn get(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id() == id)
    }

    pub fn by_channel(&self, channel: Channel) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(move |m| m.channel() == channel)
    }

    pub fn all(&self) -> &[Message] {
        &self.messages
    }
}
