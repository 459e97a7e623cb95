use std::fmt;

use kamotsu_common::channel::Channel;
use kamotsu_common::message::MessageId;
use kamotsu_common::rate_limit::Rejection;
use kamotsu_common::validation::FieldErrors;

use crate::store::StoreError;

/// Errors from board operations. All of them leave the board usable.
#[derive(Debug)]
pub enum BoardError {
    /// No session nickname; the user must set one before posting.
    NicknameRequired,
    Invalid(FieldErrors),
    RateLimited(Rejection),
    /// Chat lines cannot be posted to the project channel.
    WrongChannel(Channel),
    MessageNotFound(MessageId),
    /// Threads only exist on project postings.
    NotAProjectMessage(MessageId),
    AccountNotFound(String),
    /// Viewing account details requires holding an account.
    AccountViewForbidden,
    Storage(StoreError),
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NicknameRequired => write!(f, "ニックネームを設定してください"),
            Self::Invalid(errors) => write!(f, "{errors}"),
            Self::RateLimited(rejection) => write!(f, "{rejection}"),
            Self::WrongChannel(channel) => {
                write!(f, "{channel}には案件フォームから投稿してください")
            }
            Self::MessageNotFound(id) => write!(f, "投稿が見つかりません: {id}"),
            Self::NotAProjectMessage(id) => {
                write!(f, "スレッドは案件投稿にのみあります: {id}")
            }
            Self::AccountNotFound(nickname) => {
                write!(f, "アカウントが見つかりません: {nickname}")
            }
            Self::AccountViewForbidden => {
                write!(f, "アカウント情報を見るにはアカウントを作成してください")
            }
            Self::Storage(e) => write!(f, "保存に失敗しました: {e}"),
        }
    }
}

impl std::error::Error for BoardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Invalid(errors) => Some(errors),
            Self::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for BoardError {
    fn from(e: StoreError) -> Self {
        Self::Storage(e)
    }
}

impl From<FieldErrors> for BoardError {
    fn from(errors: FieldErrors) -> Self {
        Self::Invalid(errors)
    }
}
