use chrono::{DateTime, Utc};

use kamotsu_common::channel::Channel;
use kamotsu_common::rate_limit::{BlockStatus, RateLimitConfig, RateLimitDecision, RateLimitState};

use crate::store::{load_json, rate_limit_key, save_json, Store, StoreError};

/// Per (channel, nickname) submission throttle backed by the store.
///
/// State is read on every call and written back whenever it changes, so the
/// limiter itself holds nothing but its configuration.
#[derive(Debug, Clone, Default)]
pub struct RateLimiter {
    config: RateLimitConfig,
}

impl RateLimiter {
    /// Stored state for a key; missing or corrupt records read as fresh.
    pub fn state(&self, store: &impl Store, channel: Channel, nickname: &str) -> RateLimitState {
        load_json(store, &rate_limit_key(channel, nickname))
    }

    pub fn check(
        &self,
        store: &mut impl Store,
        channel: Channel,
        nickname: &str,
        now: DateTime<Utc>,
    ) -> Result<RateLimitDecision, StoreError> {
        let key = rate_limit_key(channel, nickname);
        let before: RateLimitState = load_json(store, &key);
        let mut state = before;
        let decision = state.check(now, &self.config);

        if state != before {
            save_json(store, &key, &state)?;
        }
        if let RateLimitDecision::Rejected(rejection) = &decision {
            tracing::warn!(
                channel = channel.label(),
                nickname,
                retry_after_secs = rejection.retry_after_secs,
                "submission rate limited"
            );
        }
        Ok(decision)
    }

    /// Clear an expired block and report what remains.
    pub fn tick(
        &self,
        store: &mut impl Store,
        channel: Channel,
        nickname: &str,
        now: DateTime<Utc>,
    ) -> Result<BlockStatus, StoreError> {
        let key = rate_limit_key(channel, nickname);
        let before: RateLimitState = load_json(store, &key);
        let mut state = before;
        let status = state.tick(now);
        if state != before {
            tracing::debug!(channel = channel.label(), nickname, "rate limit block expired");
            save_json(store, &key, &state)?;
        }
        Ok(status)
    }

    /// Read-only status for display.
    pub fn status(
        &self,
        store: &impl Store,
        channel: Channel,
        nickname: &str,
        now: DateTime<Utc>,
    ) -> BlockStatus {
        self.state(store, channel, nickname).status_at(now)
    }
}
