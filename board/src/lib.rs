//! Local state for the freight bulletin board.
//!
//! Everything lives behind a [`store::Store`]: the session identity, the
//! account registry, the message list and one rate-limit record per
//! (channel, nickname). [`board::Board`] is the single path through which
//! content is authored.

pub mod account_registry;
pub mod board;
pub mod clock;
pub mod error;
pub mod identity_store;
pub mod message_store;
pub mod rate_limiter;
pub mod request;
pub mod store;
pub mod ticker;

pub use board::Board;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::BoardError;
pub use request::{BoardRequest, BoardResponse};
pub use store::{FileStore, MemoryStore, Store, StoreError};
