//! Coordination scenarios across use cases, wired the same way as the
//! server binary but with an in-process pusher and short negotiation
//! windows.

use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::sync::{Mutex, mpsc};

use musubi_server::{
    domain::{Lobby, LobbyError, LobbyRepository, MessageContent, ParticipantId, ThoughtText},
    infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::InMemoryLobbyRepository,
        timer::NegotiationTimers,
    },
    usecase::{
        AcceptChatUseCase, ChatStatusUseCase, CloseChatUseCase, ConnectParticipantUseCase,
        DisconnectParticipantUseCase, RequestChatError, RequestChatUseCase, ResolveRequestUseCase,
        SendMessageUseCase, SubmitThoughtUseCase,
    },
};
use musubi_shared::time::SystemClock;

struct Harness {
    repository: Arc<InMemoryLobbyRepository>,
    timers: Arc<NegotiationTimers>,
    connect: Arc<ConnectParticipantUseCase>,
    disconnect: Arc<DisconnectParticipantUseCase>,
    submit: Arc<SubmitThoughtUseCase>,
    request: Arc<RequestChatUseCase>,
    accept: Arc<AcceptChatUseCase>,
    close: Arc<CloseChatUseCase>,
    send: Arc<SendMessageUseCase>,
}

fn harness(accept_window: Duration, response_window: Duration) -> Harness {
    let repository = Arc::new(InMemoryLobbyRepository::new(Arc::new(Mutex::new(
        Lobby::new(),
    ))));
    let pusher = Arc::new(WebSocketMessagePusher::new(Arc::new(Mutex::new(
        HashMap::new(),
    ))));
    let timers = Arc::new(NegotiationTimers::new());
    let clock = Arc::new(SystemClock);
    let chat_status = Arc::new(ChatStatusUseCase::new(
        repository.clone(),
        pusher.clone(),
    ));
    let resolver = Arc::new(ResolveRequestUseCase::new(
        repository.clone(),
        timers.clone(),
        chat_status.clone(),
    ));
    Harness {
        connect: Arc::new(ConnectParticipantUseCase::new(
            repository.clone(),
            pusher.clone(),
            chat_status.clone(),
            clock.clone(),
        )),
        disconnect: Arc::new(DisconnectParticipantUseCase::new(
            repository.clone(),
            pusher.clone(),
            timers.clone(),
            chat_status.clone(),
        )),
        submit: Arc::new(SubmitThoughtUseCase::new(
            repository.clone(),
            pusher.clone(),
            clock.clone(),
        )),
        request: Arc::new(RequestChatUseCase::with_windows(
            repository.clone(),
            pusher.clone(),
            timers.clone(),
            chat_status.clone(),
            resolver,
            clock.clone(),
            accept_window,
            response_window,
        )),
        accept: Arc::new(AcceptChatUseCase::new(
            repository.clone(),
            pusher.clone(),
            timers.clone(),
            chat_status.clone(),
            clock.clone(),
        )),
        close: Arc::new(CloseChatUseCase::new(
            repository.clone(),
            pusher.clone(),
            chat_status,
        )),
        send: Arc::new(SendMessageUseCase::new(
            repository.clone(),
            pusher.clone(),
            clock,
        )),
        repository,
        timers,
    }
}

fn pid(s: &str) -> ParticipantId {
    ParticipantId::new(s.to_string()).unwrap()
}

fn thought(s: &str) -> ThoughtText {
    ThoughtText::new(s.to_string()).unwrap()
}

fn content(s: &str) -> MessageContent {
    MessageContent::new(s.to_string()).unwrap()
}

async fn connect(h: &Harness, who: &str) -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    h.connect.execute(pid(who), tx).await.unwrap();
    rx
}

/// Drain everything currently queued on a client channel.
fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<String> {
    let mut messages = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        messages.push(msg);
    }
    messages
}

#[tokio::test]
async fn full_negotiation_flow_from_search_to_close() {
    // テスト項目: 検索 → リクエスト → 受諾 → メッセージ → 終了の一連の
    //             フローが期待通りに動く
    // given (前提条件):
    let h = harness(Duration::from_secs(5), Duration::from_secs(6));

    h.submit
        .execute(pid("bob"), thought("I hate sunny days"))
        .await
        .unwrap();
    let ranked = h
        .submit
        .execute(pid("alice"), thought("I love rainy days"))
        .await
        .unwrap();
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].participant_id.as_str(), "bob");

    let mut alice_rx = connect(&h, "alice").await;
    let mut bob_rx = connect(&h, "bob").await;
    drain(&mut alice_rx);
    drain(&mut bob_rx);

    // when (操作): alice が bob にリクエストし、bob が受諾する
    h.request
        .execute(pid("alice"), pid("bob"), thought("I love rainy days"))
        .await
        .unwrap();
    let bob_inbox = drain(&mut bob_rx);
    assert!(bob_inbox.iter().any(|m| m.contains(r#""type":"chatRequest""#)));

    h.accept.execute(&pid("alice"), &pid("bob")).await.unwrap();
    assert!(
        drain(&mut alice_rx)
            .iter()
            .any(|m| m.contains(r#""type":"chatAccepted""#))
    );

    // then (期待する結果): セッション内メッセージが相手にだけ届く
    h.send
        .execute(pid("alice"), pid("bob"), content("hello bob"))
        .await
        .unwrap();
    assert!(
        drain(&mut bob_rx)
            .iter()
            .any(|m| m.contains(r#""text":"hello bob""#))
    );

    // 終了で相手に closeChat が届き、両者が解放される
    h.close.execute(&pid("alice"), &pid("bob")).await;
    assert!(
        drain(&mut bob_rx)
            .iter()
            .any(|m| m.contains(r#""type":"closeChat""#))
    );
    assert!(!h.repository.is_busy(&pid("alice")).await);
    assert!(!h.repository.is_busy(&pid("bob")).await);

    // 終了後のメッセージは捨てられる
    let result = h
        .send
        .execute(pid("alice"), pid("bob"), content("are you still there?"))
        .await;
    assert!(result.is_err());
    assert!(drain(&mut bob_rx).iter().all(|m| !m.contains("still there")));
}

#[tokio::test]
async fn unanswered_request_expires_and_cannot_be_accepted() {
    // テスト項目: 放置されたリクエストが期限切れになり、その後の受諾が
    //             no-op になる（復活しない）
    // given (前提条件): 受諾期限 50ms / 応答タイムアウト 80ms
    let h = harness(Duration::from_millis(50), Duration::from_millis(80));
    let _alice_rx = connect(&h, "alice").await;
    let _bob_rx = connect(&h, "bob").await;

    h.request
        .execute(pid("alice"), pid("bob"), thought("rainy"))
        .await
        .unwrap();
    assert!(h.repository.is_busy(&pid("bob")).await);

    // when (操作): 期限まで待つ
    tokio::time::sleep(Duration::from_millis(150)).await;

    // then (期待する結果): 両者の保留状態が消えている
    assert!(!h.repository.is_busy(&pid("alice")).await);
    assert!(!h.repository.is_busy(&pid("bob")).await);
    assert_eq!(h.timers.active_count().await, 0);

    // 期限切れ後の受諾は RequestNotFound の no-op
    let late_accept = h.accept.execute(&pid("alice"), &pid("bob")).await;
    assert!(late_accept.unwrap_err().is_request_not_found());
    assert!(h.repository.active_session_of(&pid("alice")).await.is_none());
}

#[tokio::test]
async fn accepted_request_never_sees_stale_expiry() {
    // テスト項目: 受諾済みセッションが stale な期限タイマーに壊されない
    // given (前提条件): 短い受諾期限
    let h = harness(Duration::from_millis(60), Duration::from_millis(100));
    let _alice_rx = connect(&h, "alice").await;
    let _bob_rx = connect(&h, "bob").await;

    h.request
        .execute(pid("alice"), pid("bob"), thought("rainy"))
        .await
        .unwrap();
    h.accept.execute(&pid("alice"), &pid("bob")).await.unwrap();

    // when (操作): 元の期限が過ぎるまで待つ
    tokio::time::sleep(Duration::from_millis(200)).await;

    // then (期待する結果): セッションは生きたまま
    assert!(h.repository.active_session_of(&pid("alice")).await.is_some());
    assert!(h.repository.is_busy(&pid("bob")).await);
}

#[tokio::test]
async fn concurrent_accepts_promote_exactly_one_pair() {
    // テスト項目: 同じターゲットへの並行受諾で昇格するのは 1 ペアだけで、
    //             受諾後に他の保留リクエストが残らない
    // given (前提条件): alice と bob が charlie にリクエスト
    let h = harness(Duration::from_secs(5), Duration::from_secs(6));
    let _alice_rx = connect(&h, "alice").await;
    let _bob_rx = connect(&h, "bob").await;
    let _charlie_rx = connect(&h, "charlie").await;

    h.request
        .execute(pid("alice"), pid("charlie"), thought("rainy"))
        .await
        .unwrap();
    h.request
        .execute(pid("bob"), pid("charlie"), thought("rainy"))
        .await
        .unwrap();

    // when (操作): 両方の受諾を並行に走らせる
    let accept1 = {
        let accept = h.accept.clone();
        tokio::spawn(async move { accept.execute(&pid("alice"), &pid("charlie")).await })
    };
    let accept2 = {
        let accept = h.accept.clone();
        tokio::spawn(async move { accept.execute(&pid("bob"), &pid("charlie")).await })
    };
    let results = [accept1.await.unwrap(), accept2.await.unwrap()];

    // then (期待する結果):
    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    let lobby = h.repository.get_lobby().await;
    assert_eq!(lobby.active_sessions.len(), 1);
    assert!(lobby.pending_requests.is_empty());
    assert_eq!(h.timers.active_count().await, 0);
}

#[tokio::test]
async fn requesting_busy_participant_is_rejected() {
    // テスト項目: セッション中の相手へのリクエストが AlreadyBusy で拒否される
    // given (前提条件): bob と charlie がセッション中
    let h = harness(Duration::from_secs(5), Duration::from_secs(6));
    let _alice_rx = connect(&h, "alice").await;
    let _bob_rx = connect(&h, "bob").await;
    let _charlie_rx = connect(&h, "charlie").await;

    h.request
        .execute(pid("bob"), pid("charlie"), thought("rainy"))
        .await
        .unwrap();
    h.accept.execute(&pid("bob"), &pid("charlie")).await.unwrap();

    // when (操作):
    let result = h
        .request
        .execute(pid("alice"), pid("bob"), thought("rainy"))
        .await;

    // then (期待する結果):
    assert!(matches!(
        result,
        Err(RequestChatError::Lobby(LobbyError::AlreadyBusy(_)))
    ));
    assert!(!h.repository.is_busy(&pid("alice")).await);
}

#[tokio::test]
async fn disconnect_mid_session_frees_counterpart_within_one_broadcast() {
    // テスト項目: セッション中の切断で相手が解放され、closeChat と更新後の
    //             chatStatus が届く
    // given (前提条件):
    let h = harness(Duration::from_secs(5), Duration::from_secs(6));
    let mut alice_rx = connect(&h, "alice").await;
    let mut bob_rx = connect(&h, "bob").await;

    h.request
        .execute(pid("alice"), pid("bob"), thought("rainy"))
        .await
        .unwrap();
    h.accept.execute(&pid("alice"), &pid("bob")).await.unwrap();
    drain(&mut alice_rx);
    drain(&mut bob_rx);

    // when (操作): alice が突然切断
    h.disconnect.execute(pid("alice")).await;

    // then (期待する結果):
    let bob_inbox = drain(&mut bob_rx);
    assert!(bob_inbox.iter().any(|m| m.contains(r#""type":"closeChat""#)));
    let last_status = bob_inbox
        .iter()
        .rev()
        .find(|m| m.contains(r#""type":"chatStatus""#))
        .expect("status broadcast after disconnect");
    assert!(last_status.contains(r#""activeChats":[]"#));
    assert!(!h.repository.is_busy(&pid("bob")).await);
}

#[tokio::test]
async fn disconnect_mid_request_cancels_timers_and_requests() {
    // テスト項目: リクエスト保留中に送信者が切断すると、リクエストと
    //             タイマーが消え、ターゲットが解放される
    // given (前提条件):
    let h = harness(Duration::from_secs(5), Duration::from_secs(6));
    let _alice_rx = connect(&h, "alice").await;
    let _bob_rx = connect(&h, "bob").await;

    h.request
        .execute(pid("alice"), pid("bob"), thought("rainy"))
        .await
        .unwrap();
    assert_eq!(h.timers.active_count().await, 1);

    // when (操作):
    h.disconnect.execute(pid("alice")).await;

    // then (期待する結果):
    assert_eq!(h.timers.active_count().await, 0);
    assert!(!h.repository.is_busy(&pid("bob")).await);

    // 切断の重複配送も安全
    h.disconnect.execute(pid("alice")).await;
}

#[tokio::test]
async fn requester_timeout_cancels_when_target_never_responds() {
    // テスト項目: 受諾期限より長い応答タイムアウトが、期限タイマーの
    //             消えた後の保険として機能する（どちらが先でも保留は消える）
    // given (前提条件): 応答タイムアウトだけが現実的に発火する構成
    let h = harness(Duration::from_secs(30), Duration::from_millis(60));
    let _alice_rx = connect(&h, "alice").await;
    let _bob_rx = connect(&h, "bob").await;

    h.request
        .execute(pid("alice"), pid("bob"), thought("rainy"))
        .await
        .unwrap();

    // when (操作):
    tokio::time::sleep(Duration::from_millis(150)).await;

    // then (期待する結果): Cancelled 経由で保留が消えている
    assert!(!h.repository.is_busy(&pid("alice")).await);
    assert!(!h.repository.is_busy(&pid("bob")).await);
    assert_eq!(h.timers.active_count().await, 0);
}

#[tokio::test]
async fn duplicate_connection_is_rejected_while_first_is_alive() {
    // テスト項目: 同じ ID の二重接続が拒否され、最初の接続が生き続ける
    // given (前提条件):
    let h = harness(Duration::from_secs(5), Duration::from_secs(6));
    let _alice_rx = connect(&h, "alice").await;

    // when (操作):
    let (tx, _rx) = mpsc::unbounded_channel();
    let result = h.connect.execute(pid("alice"), tx).await;

    // then (期待する結果):
    assert!(result.is_err());
    assert!(h.repository.get_lobby().await.has_participant(&pid("alice")));

    // 切断後は同じ ID で再接続できる
    h.disconnect.execute(pid("alice")).await;
    let (tx2, _rx2) = mpsc::unbounded_channel();
    assert!(h.connect.execute(pid("alice"), tx2).await.is_ok());
}

#[tokio::test]
async fn status_pull_reflects_current_busy_set() {
    // テスト項目: chatStatus スナップショットが busy 集合を正しく反映する
    // given (前提条件):
    let h = harness(Duration::from_secs(5), Duration::from_secs(6));
    let _alice_rx = connect(&h, "alice").await;
    let _bob_rx = connect(&h, "bob").await;
    let _charlie_rx = connect(&h, "charlie").await;

    h.request
        .execute(pid("alice"), pid("bob"), thought("rainy"))
        .await
        .unwrap();

    // when (操作):
    let status = h.repository.chat_status().await;

    // then (期待する結果): 保留中は activeChats は空で pendingRequests に載る
    assert!(status.active_chats.is_empty());
    assert_eq!(status.pending_requests.len(), 1);

    h.accept.execute(&pid("alice"), &pid("bob")).await.unwrap();
    let status = h.repository.chat_status().await;
    assert!(status.active_chats.contains(&pid("alice")));
    assert!(status.active_chats.contains(&pid("bob")));
    assert!(status.pending_requests.is_empty());
    assert!(!status.active_chats.contains(&pid("charlie")));
}
