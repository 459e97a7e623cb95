pub mod account;
pub mod channel;
pub mod identity;
pub mod message;
pub mod rate_limit;
pub mod time;
pub mod validation;
