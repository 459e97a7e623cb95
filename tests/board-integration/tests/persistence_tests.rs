//! Board state on disk: reload fidelity, stored layout and damaged files.

use kamotsu_board::{Board, FileStore, ManualClock, Store};
use kamotsu_common::channel::Channel;
use kamotsu_common::message::MessageId;
use kamotsu_common::rate_limit::RateLimitState;

use kamotsu_board_integration::harness::{TestHarness, Who};
use kamotsu_board_integration::{project_form, start_time};

fn rate_limit_state<S: Store>(store: &S, key: &str) -> RateLimitState {
    serde_json::from_str(&store.get(key).unwrap()).unwrap()
}

#[test]
fn everything_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.json");

    let mut h = TestHarness::on_disk(&path);
    let project = h.sign_in(Who::Jiro).post_project(&project_form("横浜港")).unwrap();
    h.sign_in(Who::Hanako).add_comment(project.id(), "お願いします").unwrap();
    for _ in 0..6 {
        let _ = h.board_mut().post_simple(Channel::Chat, "連絡");
    }

    let before_messages = h.board().all_messages().to_vec();
    let before_accounts = h.board().accounts().to_vec();
    let before_identity = h.board().identity().clone();
    let before_limit = rate_limit_state(h.board().store(), "rateLimit_雑談_Hanako");
    let clock = h.clock.clone();
    drop(h);

    let board = Board::open(FileStore::open(&path), clock);
    assert_eq!(board.all_messages(), &before_messages[..]);
    assert_eq!(board.accounts(), &before_accounts[..]);
    assert_eq!(board.identity(), &before_identity);
    assert_eq!(rate_limit_state(board.store(), "rateLimit_雑談_Hanako"), before_limit);
    assert!(board.rate_limit_status(Channel::Chat).is_blocked());
}

#[test]
fn stored_values_use_the_web_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.json");

    let mut h = TestHarness::on_disk(&path);
    h.sign_in(Who::Hanako).post_simple(Channel::ScamAlert, "不審な電話").unwrap();
    drop(h);

    let file: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(file["nickname"], "Hanako");

    let account: serde_json::Value = serde_json::from_str(file["account"].as_str().unwrap()).unwrap();
    assert_eq!(account["type"], "company");
    assert_eq!(account["companyName"], "花子運送");
    assert_eq!(account["verified"], true);

    let messages: serde_json::Value = serde_json::from_str(file["messages"].as_str().unwrap()).unwrap();
    let first = &messages[0];
    assert_eq!(first["tab"], "詐欺");
    assert_eq!(first["content"], "不審な電話");
    assert_eq!(first["timestamp"], start_time().timestamp_millis());
    assert_eq!(first["verified"], true);

    assert!(file.get("all_accounts").is_some());
    assert!(file.get("rateLimit_詐欺_Hanako").is_some());
}

#[test]
fn data_written_by_the_web_client_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.json");

    let messages = serde_json::json!([
        {
            "id": "1699999990000",
            "tab": "案件",
            "nickname": "Saburo",
            "timestamp": 1_699_999_990_000_i64,
            "projectName": "羽田 → 成田",
            "phoneNumber": "03-9999-0000",
            "price": "20000",
            "description": "夜間",
            "threadComments": [
                {
                    "id": "1699999995000",
                    "nickname": "Shiro",
                    "timestamp": 1_699_999_995_000_i64,
                    "content": "空いてます"
                }
            ]
        },
        {
            "id": "1699999996000",
            "tab": "雑談",
            "nickname": "Shiro",
            "timestamp": 1_699_999_996_000_i64,
            "content": "こんばんは"
        }
    ]);
    let file = serde_json::json!({
        "nickname": "Shiro",
        "messages": messages.to_string(),
        "rateLimit_雑談_Shiro": serde_json::json!({
            "count": 3,
            "firstMessageTime": 1_699_999_990_000_i64
        }).to_string(),
    });
    std::fs::write(&path, file.to_string()).unwrap();

    let clock = ManualClock::starting_at(start_time());
    let mut board = Board::open(FileStore::open(&path), clock);
    assert_eq!(board.identity().nickname(), Some("Shiro"));
    assert!(!board.identity().is_verified());

    let project = board
        .message(&MessageId::from("1699999990000"))
        .unwrap()
        .as_project()
        .unwrap();
    assert_eq!(project.comment_count(), 1);
    assert!(!board.all_messages()[1].is_verified());

    // The stored window is over 10 s old but still open, so count continues.
    board.post_simple(Channel::Chat, "再開").unwrap();
    let state = rate_limit_state(board.store(), "rateLimit_雑談_Shiro");
    assert_eq!(state.count, 4);

    // New ids never collide with stored ones.
    let comment = board
        .add_comment(&MessageId::from("1699999990000"), "了解")
        .unwrap();
    assert!(comment.id.as_millis().unwrap() > 1_699_999_996_000);
}

#[test]
fn damaged_file_starts_empty_and_recovers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.json");
    std::fs::write(&path, "{ this is not json").unwrap();

    let mut h = TestHarness::on_disk(&path);
    assert!(h.board().all_messages().is_empty());
    assert_eq!(h.board().identity().nickname(), None);

    h.sign_in(Who::Taro).post_simple(Channel::Chat, "復旧").unwrap();
    let store = h.into_store();

    let reopened = FileStore::open(store.path());
    assert_eq!(reopened.get("nickname").as_deref(), Some("Taro"));
}

#[test]
fn damaged_values_degrade_individually() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.json");
    let file = serde_json::json!({
        "nickname": "Taro",
        "messages": "[not json",
        "all_accounts": "{}",
        "rateLimit_雑談_Taro": "???",
    });
    std::fs::write(&path, file.to_string()).unwrap();

    let mut h = TestHarness::on_disk(&path);
    assert_eq!(h.board().identity().nickname(), Some("Taro"));
    assert!(h.board().all_messages().is_empty());
    assert!(h.board().accounts().is_empty());
    h.board_mut().post_simple(Channel::Chat, "ok").unwrap();
}
