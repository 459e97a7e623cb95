use kamotsu_common::account::{Account, AccountForm};
use kamotsu_common::channel::Channel;
use kamotsu_common::identity::Identity;
use kamotsu_common::message::{Message, MessageId, ProjectForm, SimpleMessage, ThreadComment};
use kamotsu_common::rate_limit::{BlockStatus, RateLimitDecision};
use kamotsu_common::validation::{validate_content, validate_nickname};

use crate::account_registry::AccountRegistry;
use crate::clock::{Clock, SystemClock};
use crate::error::BoardError;
use crate::identity_store::IdentityStore;
use crate::message_store::MessageStore;
use crate::rate_limiter::RateLimiter;
use crate::store::Store;

const EMPTY_MESSAGE: &str = "メッセージを入力してください";
const EMPTY_COMMENT: &str = "コメントを入力してください";

/// The bulletin board: session identity, account registry, messages and
/// per-channel throttling over a single store.
///
/// All authored content goes through this type. It assumes it is the only
/// writer to its store.
#[derive(Debug)]
pub struct Board<S, C = SystemClock> {
    store: S,
    clock: C,
    identity: IdentityStore,
    accounts: AccountRegistry,
    messages: MessageStore,
    limiter: RateLimiter,
}

impl<S: Store> Board<S> {
    pub fn with_system_clock(store: S) -> Self {
        Self::open(store, SystemClock)
    }
}

impl<S: Store, C: Clock> Board<S, C> {
    /// Load all persisted state. Corrupt values fall back to defaults.
    pub fn open(store: S, clock: C) -> Self {
        let identity = IdentityStore::load(&store);
        let accounts = AccountRegistry::load(&store);
        let messages = MessageStore::load(&store);
        tracing::debug!(
            accounts = accounts.all().len(),
            messages = messages.all().len(),
            "board loaded"
        );
        Self {
            store,
            clock,
            identity,
            accounts,
            messages,
            limiter: RateLimiter::default(),
        }
    }

    pub fn identity(&self) -> &Identity {
        self.identity.identity()
    }

    // ------------------------------------------------------------------
    // Identity
    // ------------------------------------------------------------------

    /// Set the session nickname. Returns the trimmed nickname.
    pub fn setup_nickname(&mut self, raw: &str) -> Result<String, BoardError> {
        let nickname = validate_nickname(raw)?;
        self.identity.set_nickname(&mut self.store, nickname.clone())?;
        tracing::debug!(%nickname, "nickname set");
        Ok(nickname)
    }

    /// Create a verified account, make it the session account and register it.
    pub fn create_account(&mut self, form: &AccountForm) -> Result<Account, BoardError> {
        let account = form.build()?;
        self.accounts.upsert(&mut self.store, account.clone())?;
        self.identity.set_account(&mut self.store, account.clone())?;
        tracing::info!(
            nickname = account.nickname(),
            kind = account.kind().label(),
            "account created"
        );
        Ok(account)
    }

    pub fn logout(&mut self) -> Result<(), BoardError> {
        self.identity.logout(&mut self.store)?;
        tracing::info!("logged out");
        Ok(())
    }

    pub fn resolve_account(&self, nickname: &str) -> Option<&Account> {
        self.accounts.find(nickname)
    }

    /// Identity details behind a badge; only account holders may look.
    pub fn view_account(&self, nickname: &str) -> Result<&Account, BoardError> {
        if !self.identity().can_view_accounts() {
            return Err(BoardError::AccountViewForbidden);
        }
        self.resolve_account(nickname)
            .ok_or_else(|| BoardError::AccountNotFound(nickname.to_string()))
    }

    pub fn accounts(&self) -> &[Account] {
        self.accounts.all()
    }

    fn require_nickname(&self) -> Result<String, BoardError> {
        self.identity()
            .nickname()
            .map(str::to_string)
            .ok_or(BoardError::NicknameRequired)
    }

    // ------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------

    /// Post to the project channel. Project postings are not throttled.
    pub fn post_project(&mut self, form: &ProjectForm) -> Result<Message, BoardError> {
        let nickname = self.require_nickname()?;
        let now = self.clock.now();
        let id = self.messages.next_id(now);
        let stamp = self.identity().verification_stamp();
        let project = form.build(id, &nickname, now, stamp)?;
        let message = Message::Project(project);
        self.messages.append(&mut self.store, message.clone())?;
        tracing::debug!(id = %message.id(), %nickname, "project posted");
        Ok(message)
    }

    /// Post a chat line to a chat-like channel, subject to the rate limiter.
    pub fn post_simple(&mut self, channel: Channel, content: &str) -> Result<Message, BoardError> {
        if channel == Channel::Project {
            return Err(BoardError::WrongChannel(channel));
        }
        let nickname = self.require_nickname()?;
        let content = validate_content(content, EMPTY_MESSAGE)?;

        let now = self.clock.now();
        if channel.is_rate_limited() {
            let decision = self.limiter.check(&mut self.store, channel, &nickname, now)?;
            if let RateLimitDecision::Rejected(rejection) = decision {
                return Err(BoardError::RateLimited(rejection));
            }
        }

        let line = SimpleMessage {
            id: self.messages.next_id(now),
            nickname,
            timestamp: now,
            content,
            verified: self.identity().verification_stamp(),
        };
        let message = Message::simple(channel, line).ok_or(BoardError::WrongChannel(channel))?;
        self.messages.append(&mut self.store, message.clone())?;
        tracing::debug!(id = %message.id(), channel = channel.label(), "message posted");
        Ok(message)
    }

    /// Reply in a project posting's thread.
    pub fn add_comment(&mut self, message_id: &MessageId, content: &str) -> Result<ThreadComment, BoardError> {
        let nickname = self.require_nickname()?;
        let content = validate_content(content, EMPTY_COMMENT)?;
        self.messages.require_project(message_id)?;

        let now = self.clock.now();
        let comment = ThreadComment {
            id: self.messages.next_id(now),
            nickname,
            timestamp: now,
            content,
            verified: self.identity().verification_stamp(),
        };
        self.messages
            .add_comment(&mut self.store, message_id, comment.clone())?;
        tracing::debug!(id = %comment.id, thread = %message_id, "comment added");
        Ok(comment)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn messages(&self, channel: Channel) -> impl Iterator<Item = &Message> {
        self.messages.by_channel(channel)
    }

    pub fn all_messages(&self) -> &[Message] {
        self.messages.all()
    }

    pub fn message(&self, id: &MessageId) -> Option<&Message> {
        self.messages.get(id)
    }

    /// Block status for the session nickname. Open without a nickname.
    pub fn rate_limit_status(&self, channel: Channel) -> BlockStatus {
        match self.identity().nickname() {
            Some(nickname) if channel.is_rate_limited() => {
                self.limiter
                    .status(&self.store, channel, nickname, self.clock.now())
            }
            _ => BlockStatus::Open,
        }
    }

    /// Countdown refresh: clears an expired block for the session nickname.
    pub fn tick_rate_limit(&mut self, channel: Channel) -> Result<BlockStatus, BoardError> {
        let Some(nickname) = self.identity().nickname().map(str::to_string) else {
            return Ok(BlockStatus::Open);
        };
        if !channel.is_rate_limited() {
            return Ok(BlockStatus::Open);
        }
        let now = self.clock.now();
        Ok(self.limiter.tick(&mut self.store, channel, &nickname, now)?)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
