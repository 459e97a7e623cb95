use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::time::ceil_secs;

/// Length of the counting window.
pub const RATE_LIMIT_WINDOW_MS: i64 = 30_000;

/// Submissions accepted per window before the sender is blocked.
pub const RATE_LIMIT_MAX_MESSAGES: u32 = 5;

/// How long a block lasts once triggered.
pub const BLOCK_DURATION_MS: i64 = 60_000;

/// Throttling parameters. Fixed in production; see [`RateLimitConfig::default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub max_messages: u32,
    pub block: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: Duration::milliseconds(RATE_LIMIT_WINDOW_MS),
            max_messages: RATE_LIMIT_MAX_MESSAGES,
            block: Duration::milliseconds(BLOCK_DURATION_MS),
        }
    }
}

/// Per-(channel, nickname) throttling state.
///
/// The window resets wholesale once it has elapsed since the first tracked
/// submission; it does not slide per message. A zeroed state (epoch
/// `first_message_time`) accepts the next submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitState {
    pub count: u32,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub first_message_time: DateTime<Utc>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub blocked_until: Option<DateTime<Utc>>,
}

/// Why a submission was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectionKind {
    /// A block was already in force.
    StillBlocked,
    /// This attempt exceeded the window budget and started a block.
    JustBlocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub kind: RejectionKind,
    pub retry_after_secs: u64,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            RejectionKind::StillBlocked => write!(
                f,
                "連投制限中です。あと{}秒お待ちください。",
                self.retry_after_secs
            ),
            RejectionKind::JustBlocked => write!(
                f,
                "連投が多すぎます。{}秒間投稿できません。",
                self.retry_after_secs
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Accepted,
    Rejected(Rejection),
}

impl RateLimitDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, RateLimitDecision::Accepted)
    }
}

/// Display-side view of a key's block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockStatus {
    Open,
    Blocked { remaining_ms: i64 },
}

impl BlockStatus {
    pub fn is_blocked(&self) -> bool {
        matches!(self, BlockStatus::Blocked { .. })
    }

    /// Remaining block time rounded up to whole seconds; zero when open.
    pub fn remaining_secs(&self) -> u64 {
        match self {
            BlockStatus::Open => 0,
            BlockStatus::Blocked { remaining_ms } => ceil_secs(*remaining_ms),
        }
    }
}

impl RateLimitState {
    /// Block status at `now`, without changing state.
    pub fn status_at(&self, now: DateTime<Utc>) -> BlockStatus {
        match self.blocked_until {
            Some(until) if now < until => BlockStatus::Blocked {
                remaining_ms: (until - now).num_milliseconds(),
            },
            _ => BlockStatus::Open,
        }
    }

    fn clear_expired_block(&mut self, now: DateTime<Utc>) {
        if matches!(self.blocked_until, Some(until) if now >= until) {
            self.blocked_until = None;
            self.count = 0;
        }
    }

    /// Decide whether a submission at `now` may proceed, updating the state.
    pub fn check(&mut self, now: DateTime<Utc>, config: &RateLimitConfig) -> RateLimitDecision {
        if let BlockStatus::Blocked { remaining_ms } = self.status_at(now) {
            return RateLimitDecision::Rejected(Rejection {
                kind: RejectionKind::StillBlocked,
                retry_after_secs: ceil_secs(remaining_ms),
            });
        }
        self.clear_expired_block(now);

        // Strict: a submission exactly one window after the first still counts.
        if now - self.first_message_time > config.window {
            self.count = 1;
            self.first_message_time = now;
            return RateLimitDecision::Accepted;
        }

        if self.count >= config.max_messages {
            self.blocked_until = Some(now + config.block);
            return RateLimitDecision::Rejected(Rejection {
                kind: RejectionKind::JustBlocked,
                retry_after_secs: ceil_secs(config.block.num_milliseconds()),
            });
        }

        self.count += 1;
        RateLimitDecision::Accepted
    }

    /// Periodic refresh for countdown displays: clears an expired block and
    /// reports what remains.
    pub fn tick(&mut self, now: DateTime<Utc>) -> BlockStatus {
        self.clear_expired_block(now);
        self.status_at(now)
    }
}
