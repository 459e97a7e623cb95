//! Plain-text rendering of board content for the terminal.

use std::fmt::{Display, Write};

use chrono::TimeZone;

use kamotsu_common::account::Account;
use kamotsu_common::message::{Message, ProjectMessage, ThreadComment};
use kamotsu_common::rate_limit::BlockStatus;
use kamotsu_common::time::format_timestamp;

fn badge(verified: bool) -> &'static str {
    if verified {
        " ✔"
    } else {
        ""
    }
}

/// One entry of a channel listing.
pub fn message<Tz>(message: &Message, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let header = format!(
        "[{}] {} {}{}",
        message.id(),
        format_timestamp(message.timestamp(), tz),
        message.nickname(),
        badge(message.is_verified()),
    );
    match message {
        Message::Project(project) => {
            let mut out = header;
            project_body(&mut out, project);
            let _ = write!(out, "\n  コメント {}件", project.comment_count());
            out
        }
        Message::Chat(line) | Message::ScamAlert(line) => format!("{header}\n  {}", line.content),
    }
}

fn project_body(out: &mut String, project: &ProjectMessage) {
    let _ = write!(
        out,
        "\n  案件名: {}\n  電話番号: {}\n  料金: {}\n  概要: {}",
        project.project_name, project.phone_number, project.price, project.description
    );
}

fn comment<Tz>(comment: &ThreadComment, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "  └ {} {}{}: {}",
        format_timestamp(comment.timestamp, tz),
        comment.nickname,
        badge(comment.verified.unwrap_or(false)),
        comment.content
    )
}

/// A project posting followed by its whole thread.
pub fn thread<Tz>(project: &ProjectMessage, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = format!(
        "[{}] {} {}{}",
        project.id,
        format_timestamp(project.timestamp, tz),
        project.nickname,
        badge(project.verified.unwrap_or(false)),
    );
    project_body(&mut out, project);
    if project.comments().is_empty() {
        out.push_str("\n  (コメントはまだありません)");
    }
    for c in project.comments() {
        out.push('\n');
        out.push_str(&comment(c, tz));
    }
    out
}

pub fn account(account: &Account) -> String {
    let mut out = format!("{} ({})", account.nickname(), account.kind().label());
    match account {
        Account::Company(company) => {
            let _ = write!(
                out,
                "\n  会社名: {}\n  代表者名: {}",
                company.company_name, company.representative_name
            );
            if let Some(count) = &company.driver_count {
                let _ = write!(out, "\n  ドライバー数: {count}");
            }
        }
        Account::Driver(driver) => {
            let _ = write!(out, "\n  名前: {}\n  年齢: {}", driver.name, driver.age);
        }
    }
    let _ = write!(out, "\n  電話番号: {}", account.phone_number());
    if let Some(email) = account.email() {
        let _ = write!(out, "\n  メール: {email}");
    }
    if account.is_verified() {
        out.push_str("\n  ✔ 認証済み");
    }
    out
}

pub fn block_status(status: BlockStatus) -> String {
    match status {
        BlockStatus::Open => "投稿できます".to_string(),
        BlockStatus::Blocked { .. } => {
            format!("連投制限中です。あと{}秒お待ちください。", status.remaining_secs())
        }
    }
}
