//! End-to-end board scenarios with several participants sharing one device.

use kamotsu_board::{BoardError, BoardRequest, BoardResponse, Store};
use kamotsu_common::channel::Channel;
use kamotsu_common::message::Message;
use kamotsu_common::rate_limit::RejectionKind;

use kamotsu_board_integration::harness::{TestHarness, Who};
use kamotsu_board_integration::project_form;

fn rate_limited(result: Result<Message, BoardError>) -> kamotsu_common::rate_limit::Rejection {
    match result {
        Err(BoardError::RateLimited(rejection)) => rejection,
        other => panic!("expected a rate-limit rejection, got {other:?}"),
    }
}

#[test]
fn taro_is_blocked_then_released() {
    let mut h = TestHarness::setup();
    h.sign_in(Who::Taro);

    for i in 0..5 {
        h.board_mut()
            .post_simple(Channel::Chat, &format!("おはよう {i}"))
            .unwrap();
        h.advance_secs(2);
    }

    let rejection = rate_limited(h.board_mut().post_simple(Channel::Chat, "six"));
    assert_eq!(rejection.kind, RejectionKind::JustBlocked);
    assert_eq!(rejection.to_string(), "連投が多すぎます。60秒間投稿できません。");

    h.advance_secs(30);
    let rejection = rate_limited(h.board_mut().post_simple(Channel::Chat, "still"));
    assert_eq!(rejection.kind, RejectionKind::StillBlocked);
    assert_eq!(rejection.to_string(), "連投制限中です。あと30秒お待ちください。");

    h.advance_secs(31);
    h.board_mut().post_simple(Channel::Chat, "released").unwrap();

    let raw = h.board().store().get("rateLimit_雑談_Taro").unwrap();
    let state: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(state["count"], 1);
    assert!(state.get("blockedUntil").is_none());
    assert_eq!(h.board().messages(Channel::Chat).count(), 6);
}

#[test]
fn block_expires_exactly_at_its_deadline() {
    let mut h = TestHarness::setup();
    h.sign_in(Who::Taro);
    for _ in 0..5 {
        h.board_mut().post_simple(Channel::ScamAlert, "注意").unwrap();
    }
    rate_limited(h.board_mut().post_simple(Channel::ScamAlert, "注意"));

    h.advance_millis(59_999);
    let rejection = rate_limited(h.board_mut().post_simple(Channel::ScamAlert, "注意"));
    assert_eq!(rejection.retry_after_secs, 1);

    h.advance_millis(1);
    h.board_mut().post_simple(Channel::ScamAlert, "注意").unwrap();
}

#[test]
fn blocks_are_per_channel_and_per_nickname() {
    let mut h = TestHarness::setup();
    h.sign_in(Who::Taro);
    for _ in 0..5 {
        h.board_mut().post_simple(Channel::Chat, "spam").unwrap();
    }
    rate_limited(h.board_mut().post_simple(Channel::Chat, "spam"));
    h.board_mut().post_simple(Channel::ScamAlert, "別チャンネル").unwrap();

    h.sign_in(Who::Hanako);
    h.board_mut().post_simple(Channel::Chat, "別の人").unwrap();

    // Logging out does not lift Taro's block.
    h.sign_in(Who::Taro);
    assert!(h.board().rate_limit_status(Channel::Chat).is_blocked());
    rate_limited(h.board_mut().post_simple(Channel::Chat, "spam"));
}

#[test]
fn verification_follows_the_session() {
    let mut h = TestHarness::setup();
    let verified = h.sign_in(Who::Hanako).post_simple(Channel::Chat, "よろしく").unwrap();
    let project = h.board_mut().post_project(&project_form("品川→大井")).unwrap();
    let unverified = h.sign_in(Who::Taro).post_simple(Channel::Chat, "どうも").unwrap();

    assert!(verified.is_verified());
    assert!(project.is_verified());
    assert!(!unverified.is_verified());

    let chat: Vec<_> = h.board().messages(Channel::Chat).collect();
    assert_eq!(chat.len(), 2);
    assert!(chat[0].is_verified());
    assert!(!chat[1].is_verified());
}

#[test]
fn thread_grows_append_only() {
    let mut h = TestHarness::setup();
    let project = h.sign_in(Who::Jiro).post_project(&project_form("川崎 倉庫間")).unwrap();

    h.advance_secs(5);
    h.sign_in(Who::Hanako).add_comment(project.id(), "単価の相談は可能ですか").unwrap();
    h.advance_secs(5);
    h.sign_in(Who::Taro).add_comment(project.id(), "興味あります").unwrap();

    let before = h.board().message(project.id()).unwrap().as_project().unwrap().comments().to_vec();

    h.advance_secs(5);
    h.sign_in(Who::Jiro).add_comment(project.id(), "可能です").unwrap();

    let h = h.reopen();
    let thread = h.board().message(project.id()).unwrap().as_project().unwrap();
    assert_eq!(thread.comment_count(), 3);
    assert_eq!(&thread.comments()[..2], &before[..]);

    let authors: Vec<_> = thread.comments().iter().map(|c| c.nickname.as_str()).collect();
    assert_eq!(authors, ["Hanako", "Taro", "Jiro"]);
    let stamps: Vec<_> = thread.comments().iter().map(|c| c.verified).collect();
    assert_eq!(stamps, [Some(true), Some(false), Some(true)]);
}

#[test]
fn comments_are_not_throttled() {
    let mut h = TestHarness::setup();
    let project = h.sign_in(Who::Taro).post_project(&project_form("深夜便")).unwrap();
    for i in 0..10 {
        h.board_mut()
            .add_comment(project.id(), &format!("追記 {i}"))
            .unwrap();
    }
    let thread = h.board().message(project.id()).unwrap().as_project().unwrap();
    assert_eq!(thread.comment_count(), 10);
}

#[test]
fn only_account_holders_can_view_accounts() {
    let mut h = TestHarness::setup();
    h.sign_in(Who::Hanako);

    let err = h.sign_in(Who::Taro).view_account("Hanako").unwrap_err();
    assert!(matches!(err, BoardError::AccountViewForbidden));

    let hanako = h.sign_in(Who::Jiro).view_account("Hanako").unwrap().clone();
    assert_eq!(hanako.phone_number(), "03-1234-5678");
    assert_eq!(h.board().accounts().len(), 2);
}

#[test]
fn request_interface_drives_the_same_pipeline() {
    let mut h = TestHarness::setup();
    let board = h.board_mut();

    let response = board.handle_request(BoardRequest::PostSimple {
        channel: Channel::Chat,
        content: "anonymous".into(),
    });
    assert!(matches!(response, BoardResponse::NicknameRequired));

    board.handle_request(BoardRequest::SetupNickname("Taro".into()));
    for _ in 0..5 {
        let response = board.handle_request(BoardRequest::PostSimple {
            channel: Channel::Chat,
            content: "hi".into(),
        });
        assert!(matches!(response, BoardResponse::Posted(_)));
    }

    match board.handle_request(BoardRequest::PostSimple {
        channel: Channel::Chat,
        content: "hi".into(),
    }) {
        BoardResponse::RateLimited(rejection) => assert_eq!(rejection.retry_after_secs, 60),
        other => panic!("unexpected response: {other:?}"),
    }

    match board.handle_request(BoardRequest::RateLimitStatus(Channel::Chat)) {
        BoardResponse::RateLimit(status) => assert_eq!(status.remaining_secs(), 60),
        other => panic!("unexpected response: {other:?}"),
    }

    match board.handle_request(BoardRequest::PostProject(project_form(""))) {
        BoardResponse::Rejected(errors) => assert!(errors.contains("projectName")),
        other => panic!("unexpected response: {other:?}"),
    }
}
