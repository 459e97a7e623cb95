use serde::{Deserialize, Serialize};

use crate::validation::{is_valid_age, is_valid_email, FieldErrors};

/// Which kind of account a user registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Company,
    Driver,
}

impl AccountKind {
    /// Display label (法人 / 個人ドライバー).
    pub fn label(self) -> &'static str {
        match self {
            AccountKind::Company => "法人",
            AccountKind::Driver => "個人ドライバー",
        }
    }
}

/// A shipping company or dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyAccount {
    pub nickname: String,
    pub company_name: String,
    pub representative_name: String,
    /// Free-form, e.g. "10名".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_count: Option<String>,
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub verified: bool,
}

/// An individual delivery driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverAccount {
    pub nickname: String,
    pub name: String,
    /// Numeric string, kept as entered.
    pub age: String,
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub verified: bool,
}

/// A registered account. The nickname is its unique key.
///
/// Accounts are immutable once created; re-registering the same nickname
/// replaces the earlier record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Account {
    Company(CompanyAccount),
    Driver(DriverAccount),
}

impl Account {
    pub fn kind(&self) -> AccountKind {
        match self {
            Account::Company(_) => AccountKind::Company,
            Account::Driver(_) => AccountKind::Driver,
        }
    }

    pub fn nickname(&self) -> &str {
        match self {
            Account::Company(a) => &a.nickname,
            Account::Driver(a) => &a.nickname,
        }
    }

    pub fn phone_number(&self) -> &str {
        match self {
            Account::Company(a) => &a.phone_number,
            Account::Driver(a) => &a.phone_number,
        }
    }

    pub fn email(&self) -> Option<&str> {
        match self {
            Account::Company(a) => a.email.as_deref(),
            Account::Driver(a) => a.email.as_deref(),
        }
    }

    /// Self-asserted at creation; no external check backs this flag.
    pub fn is_verified(&self) -> bool {
        match self {
            Account::Company(a) => a.verified,
            Account::Driver(a) => a.verified,
        }
    }
}

/// Raw account-creation input, as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountForm {
    pub kind: AccountKind,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub representative_name: String,
    #[serde(default)]
    pub driver_count: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub email: String,
}

impl AccountForm {
    pub fn new(kind: AccountKind) -> Self {
        Self {
            kind,
            nickname: String::new(),
            company_name: String::new(),
            representative_name: String::new(),
            driver_count: String::new(),
            name: String::new(),
            age: String::new(),
            phone_number: String::new(),
            email: String::new(),
        }
    }

    /// Field errors for this form. Fields belonging to the other account
    /// kind are ignored.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.require("nickname", &self.nickname, "ニックネームを入力してください");
        errors.require_phone("phoneNumber", &self.phone_number);

        match self.kind {
            AccountKind::Company => {
                errors.require("companyName", &self.company_name, "会社名を入力してください");
                errors.require(
                    "representativeName",
                    &self.representative_name,
                    "代表者名を入力してください",
                );
            }
            AccountKind::Driver => {
                if errors.require("age", &self.age, "年齢を入力してください")
                    && !is_valid_age(&self.age)
                {
                    errors.insert("age", "正しい年齢を入力してください");
                }
                errors.require("name", &self.name, "名前を入力してください");
            }
        }

        if !self.email.is_empty() && !is_valid_email(&self.email) {
            errors.insert("email", "正しいメールアドレスを入力してください");
        }
        errors
    }

    /// Validate and build the account. Every built account is verified.
    pub fn build(&self) -> Result<Account, FieldErrors> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }

        let nickname = self.nickname.trim().to_string();
        let phone_number = self.phone_number.trim().to_string();
        let email = non_empty(&self.email);

        let account = match self.kind {
            AccountKind::Company => Account::Company(CompanyAccount {
                nickname,
                company_name: self.company_name.trim().to_string(),
                representative_name: self.representative_name.trim().to_string(),
                driver_count: non_empty(&self.driver_count),
                phone_number,
                email,
                verified: true,
            }),
            AccountKind::Driver => Account::Driver(DriverAccount {
                nickname,
                name: self.name.trim().to_string(),
                age: self.age.trim().to_string(),
                phone_number,
                email,
                verified: true,
            }),
        };
        Ok(account)
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
