use serde::{Deserialize, Serialize};

use kamotsu_common::account::{Account, AccountForm};
use kamotsu_common::channel::Channel;
use kamotsu_common::message::{Message, MessageId, ProjectForm, ThreadComment};
use kamotsu_common::rate_limit::{BlockStatus, Rejection};
use kamotsu_common::validation::FieldErrors;

use crate::board::Board;
use crate::clock::Clock;
use crate::error::BoardError;
use crate::store::Store;

/// Requests a front end can make of the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BoardRequest {
    // Identity
    SetupNickname(String),
    CreateAccount(AccountForm),
    Logout,
    WhoAmI,
    ViewAccount(String),

    // Content
    PostProject(ProjectForm),
    PostSimple { channel: Channel, content: String },
    AddComment { message_id: MessageId, content: String },
    ListMessages(Channel),
    GetMessage(MessageId),

    // Throttling
    RateLimitStatus(Channel),
}

/// Responses from the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BoardResponse {
    Identity {
        nickname: Option<String>,
        account: Option<Account>,
    },
    Account(Account),
    Posted(Message),
    Commented(ThreadComment),
    Messages(Vec<Message>),
    Message(Message),
    RateLimit(BlockStatus),
    LoggedOut,
    /// The user must set a nickname first.
    NicknameRequired,
    /// Field-level validation errors, keyed by field name.
    Rejected(FieldErrors),
    RateLimited(Rejection),
    Error(String),
}

impl From<BoardError> for BoardResponse {
    fn from(e: BoardError) -> Self {
        match e {
            BoardError::NicknameRequired => BoardResponse::NicknameRequired,
            BoardError::Invalid(errors) => BoardResponse::Rejected(errors),
            BoardError::RateLimited(rejection) => BoardResponse::RateLimited(rejection),
            other => BoardResponse::Error(other.to_string()),
        }
    }
}

impl<S: Store, C: Clock> Board<S, C> {
    pub fn handle_request(&mut self, request: BoardRequest) -> BoardResponse {
        let result = match request {
            BoardRequest::SetupNickname(raw) => {
                self.setup_nickname(&raw).map(|_| self.identity_response())
            }
            BoardRequest::CreateAccount(form) => self.create_account(&form).map(BoardResponse::Account),
            BoardRequest::Logout => self.logout().map(|()| BoardResponse::LoggedOut),
            BoardRequest::WhoAmI => Ok(self.identity_response()),
            BoardRequest::ViewAccount(nickname) => self
                .view_account(&nickname)
                .map(|account| BoardResponse::Account(account.clone())),
            BoardRequest::PostProject(form) => self.post_project(&form).map(BoardResponse::Posted),
            BoardRequest::PostSimple { channel, content } => {
                self.post_simple(channel, &content).map(BoardResponse::Posted)
            }
            BoardRequest::AddComment { message_id, content } => self
                .add_comment(&message_id, &content)
                .map(BoardResponse::Commented),
            BoardRequest::ListMessages(channel) => Ok(BoardResponse::Messages(
                self.messages(channel).cloned().collect(),
            )),
            BoardRequest::GetMessage(id) => self
                .message(&id)
                .cloned()
                .map(BoardResponse::Message)
                .ok_or(BoardError::MessageNotFound(id)),
            BoardRequest::RateLimitStatus(channel) => {
                Ok(BoardResponse::RateLimit(self.rate_limit_status(channel)))
            }
        };
        result.unwrap_or_else(BoardResponse::from)
    }

    fn identity_response(&self) -> BoardResponse {
        let identity = self.identity();
        BoardResponse::Identity {
            nickname: identity.nickname().map(str::to_string),
            account: identity.account().cloned(),
        }
    }
}
