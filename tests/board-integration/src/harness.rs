use std::path::Path;

use chrono::Duration;

use kamotsu_board::{Board, FileStore, ManualClock, MemoryStore, Store};
use kamotsu_common::account::AccountForm;

use crate::{company_form, driver_form, start_time};

/// The people taking turns at the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Who {
    /// Posts under a nickname only; never verified.
    Taro,
    /// Company account.
    Hanako,
    /// Driver account.
    Jiro,
}

impl Who {
    pub fn nickname(self) -> &'static str {
        match self {
            Who::Taro => "Taro",
            Who::Hanako => "Hanako",
            Who::Jiro => "Jiro",
        }
    }

    pub fn account_form(self) -> Option<AccountForm> {
        match self {
            Who::Taro => None,
            Who::Hanako => Some(company_form("Hanako", "花子運送")),
            Who::Jiro => Some(driver_form("Jiro", 34)),
        }
    }
}

/// One board on one device, shared by the participants in turn, with a
/// clock the test controls.
pub struct TestHarness<S: Store = MemoryStore> {
    pub clock: ManualClock,
    board: Board<S, ManualClock>,
}

impl TestHarness<MemoryStore> {
    pub fn setup() -> Self {
        Self::with_store(MemoryStore::new())
    }
}

impl TestHarness<FileStore> {
    pub fn on_disk(path: &Path) -> Self {
        Self::with_store(FileStore::open(path))
    }
}

impl<S: Store> TestHarness<S> {
    pub fn with_store(store: S) -> Self {
        tracing_subscriber::fmt::try_init().ok();
        let clock = ManualClock::starting_at(start_time());
        Self {
            board: Board::open(store, clock.clone()),
            clock,
        }
    }

    pub fn board(&self) -> &Board<S, ManualClock> {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board<S, ManualClock> {
        &mut self.board
    }

    /// Log out whoever is at the board and start a session for `who`,
    /// creating their account if they have one.
    pub fn sign_in(&mut self, who: Who) -> &mut Board<S, ManualClock> {
        self.board.logout().unwrap();
        match who.account_form() {
            Some(form) => {
                self.board.create_account(&form).unwrap();
            }
            None => {
                self.board.setup_nickname(who.nickname()).unwrap();
            }
        }
        tracing::debug!(who = who.nickname(), "signed in");
        &mut self.board
    }

    pub fn advance_secs(&self, secs: i64) {
        self.clock.advance(Duration::seconds(secs));
    }

    pub fn advance_millis(&self, millis: i64) {
        self.clock.advance(Duration::milliseconds(millis));
    }

    /// Reload everything from the store, as a restarted client would.
    pub fn reopen(self) -> Self {
        let store = self.board.into_store();
        Self {
            board: Board::open(store, self.clock.clone()),
            clock: self.clock,
        }
    }

    pub fn into_store(self) -> S {
        self.board.into_store()
    }
}
