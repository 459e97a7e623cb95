//! Shared fixtures for board integration tests.

use chrono::{DateTime, Utc};

use kamotsu_common::account::{AccountForm, AccountKind};
use kamotsu_common::message::ProjectForm;

pub mod harness;

/// Fixed start time for every harness clock.
pub const T0_MILLIS: i64 = 1_700_000_000_000;

pub fn start_time() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(T0_MILLIS).unwrap_or_default()
}

/// A complete company account form.
pub fn company_form(nickname: &str, company_name: &str) -> AccountForm {
    AccountForm {
        nickname: nickname.to_string(),
        company_name: company_name.to_string(),
        representative_name: format!("{nickname} 代表"),
        driver_count: "3".to_string(),
        phone_number: "03-1234-5678".to_string(),
        email: format!("{}@example.jp", nickname.to_lowercase()),
        ..AccountForm::new(AccountKind::Company)
    }
}

/// A complete driver account form.
pub fn driver_form(nickname: &str, age: u32) -> AccountForm {
    AccountForm {
        nickname: nickname.to_string(),
        name: format!("{nickname} 運転手"),
        age: age.to_string(),
        phone_number: "090-8765-4321".to_string(),
        ..AccountForm::new(AccountKind::Driver)
    }
}

/// A valid job listing.
pub fn project_form(name: &str) -> ProjectForm {
    ProjectForm {
        project_name: name.to_string(),
        phone_number: "045-000-1111".to_string(),
        price: "10,000円".to_string(),
        description: format!("{name}: 軽バン1台、午前指定"),
    }
}
