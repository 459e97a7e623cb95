use kamotsu_common::account::Account;
use kamotsu_common::identity::Identity;

use crate::store::{load_json_opt, save_json, Store, StoreError, ACCOUNT_KEY, NICKNAME_KEY};

/// Persisted session identity.
#[derive(Debug, Clone, Default)]
pub struct IdentityStore {
    identity: Identity,
}

impl IdentityStore {
    /// Restore the session. The account is only restored alongside a nickname.
    pub fn load(store: &impl Store) -> Self {
        let nickname = store.get(NICKNAME_KEY).filter(|n| !n.is_empty());
        let account = if nickname.is_some() {
            load_json_opt::<Account>(store, ACCOUNT_KEY)
        } else {
            None
        };
        Self {
            identity: Identity::new(nickname, account),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn set_nickname(&mut self, store: &mut impl Store, nickname: String) -> Result<(), StoreError> {
        // The stored nickname never pairs with a foreign account.
        let detach = self.identity.detaches_account(&nickname);
        if detach {
            store.remove(ACCOUNT_KEY)?;
            self.identity.detach_account();
        }
        store.set(NICKNAME_KEY, nickname.clone())?;
        self.identity.set_nickname(nickname);
        if detach {
            tracing::info!("nickname changed; session account detached");
        }
        Ok(())
    }

    pub fn set_account(&mut self, store: &mut impl Store, account: Account) -> Result<(), StoreError> {
        save_json(store, ACCOUNT_KEY, &account)?;
        store.set(NICKNAME_KEY, account.nickname().to_string())?;
        self.identity.attach_account(account);
        Ok(())
    }

    /// Forget the session. Registry, messages and limiter state are kept.
    pub fn logout(&mut self, store: &mut impl Store) -> Result<(), StoreError> {
        store.remove(NICKNAME_KEY)?;
        store.remove(ACCOUNT_KEY)?;
        self.identity.clear();
        Ok(())
    }
}
