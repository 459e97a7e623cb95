use crate::account::Account;

/// The current session: the nickname posts are made under, plus the
/// account that upgrades them to verified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    nickname: Option<String>,
    account: Option<Account>,
}

impl Identity {
    /// An account is only attached to the nickname it belongs to; an
    /// orphaned or foreign account is dropped.
    pub fn new(nickname: Option<String>, account: Option<Account>) -> Self {
        let account = account.filter(|a| nickname.as_deref() == Some(a.nickname()));
        Self { nickname, account }
    }

    /// Whether setting `nickname` would detach the attached account.
    pub fn detaches_account(&self, nickname: &str) -> bool {
        self.account.as_ref().is_some_and(|a| a.nickname() != nickname)
    }

    pub fn nickname(&self) -> Option<&str> {
        self.nickname.as_deref()
    }

    pub fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    /// Set the session nickname. An attached account for a different
    /// nickname is detached; returns true if that happened.
    pub fn set_nickname(&mut self, nickname: String) -> bool {
        let detached = self.detaches_account(&nickname);
        if detached {
            self.account = None;
        }
        self.nickname = Some(nickname);
        detached
    }

    /// Attach an account; the session nickname follows the account.
    pub fn attach_account(&mut self, account: Account) {
        self.nickname = Some(account.nickname().to_string());
        self.account = Some(account);
    }

    /// Drop the attached account, keeping the nickname.
    pub fn detach_account(&mut self) {
        self.account = None;
    }

    pub fn clear(&mut self) {
        self.nickname = None;
        self.account = None;
    }

    pub fn is_verified(&self) -> bool {
        self.account.as_ref().is_some_and(Account::is_verified)
    }

    /// Only account holders may inspect the identity behind a verified badge.
    pub fn can_view_accounts(&self) -> bool {
        self.account.is_some()
    }

    /// Point-in-time snapshot stamped onto newly authored content.
    pub fn verification_stamp(&self) -> Option<bool> {
        Some(self.is_verified())
    }
}
