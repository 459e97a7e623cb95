use kamotsu_common::account::Account;

use crate::store::{load_json, save_json, Store, StoreError, ALL_ACCOUNTS_KEY};

/// Every account created on this device, unique by nickname.
#[derive(Debug, Clone, Default)]
pub struct AccountRegistry {
    accounts: Vec<Account>,
}

impl AccountRegistry {
    pub fn load(store: &impl Store) -> Self {
        Self {
            accounts: load_json(store, ALL_ACCOUNTS_KEY),
        }
    }

    /// Insert, or replace in place when the nickname is already registered.
    pub fn upsert(&mut self, store: &mut impl Store, account: Account) -> Result<(), StoreError> {
        let position = self
            .accounts
            .iter()
            .position(|a| a.nickname() == account.nickname());
        let previous = match position {
            Some(i) => Some((i, std::mem::replace(&mut self.accounts[i], account))),
            None => {
                self.accounts.push(account);
                None
            }
        };

        if let Err(e) = save_json(store, ALL_ACCOUNTS_KEY, &self.accounts) {
            tracing::error!("failed to persist account registry: {e}");
            match previous {
                Some((i, old)) => self.accounts[i] = old,
                None => {
                    self.accounts.pop();
                }
            }
            return Err(e);
        }
        Ok(())
    }

    pub fn find(&self, nickname: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.nickname() == nickname)
    }

    pub fn all(&self) -> &[Account] {
        &self.accounts
    }
}
