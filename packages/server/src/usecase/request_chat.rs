//! UseCase: チャットリクエスト作成処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RequestChatUseCase::execute() メソッド
//! - busy 検証、リクエスト登録、ターゲット通知、期限タイマーの起動
//!
//! ### なぜこのテストが必要か
//! - 交渉ウィンドウの正しさはここが起点（期限タイマーはクライアントの
//!   生存に依存してはならない）
//! - busy なターゲットへのリクエストが状態を一切変えないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：リクエスト作成とターゲットへの着信通知
//! - 異常系：busy なターゲット、自分自身へのリクエスト、未接続ターゲット
//! - エッジケース：放置されたリクエストの自動期限切れ

use std::sync::Arc;
use std::time::Duration;

use musubi_shared::time::Clock;

use crate::domain::{
    ChatRequest, LobbyRepository, MessagePusher, ParticipantId, RequestIdFactory, RequestOutcome,
    ThoughtText, Timestamp,
};
use crate::infrastructure::dto::websocket::ChatRequestMessage;
use crate::infrastructure::timer::NegotiationTimers;

use super::chat_status::ChatStatusUseCase;
use super::error::RequestChatError;
use super::resolve_request::ResolveRequestUseCase;

/// ターゲット側の受諾期限（この時間内に受諾が無ければ Expired）
pub const ACCEPT_WINDOW: Duration = Duration::from_secs(5);

/// リクエスト側の応答タイムアウト（この時間で Cancelled）
pub const RESPONSE_WINDOW: Duration = Duration::from_secs(6);

/// チャットリクエスト作成のユースケース
pub struct RequestChatUseCase {
    repository: Arc<dyn LobbyRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    timers: Arc<NegotiationTimers>,
    chat_status: Arc<ChatStatusUseCase>,
    resolver: Arc<ResolveRequestUseCase>,
    clock: Arc<dyn Clock>,
    accept_window: Duration,
    response_window: Duration,
}

impl RequestChatUseCase {
    pub fn new(
        repository: Arc<dyn LobbyRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        timers: Arc<NegotiationTimers>,
        chat_status: Arc<ChatStatusUseCase>,
        resolver: Arc<ResolveRequestUseCase>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_windows(
            repository,
            message_pusher,
            timers,
            chat_status,
            resolver,
            clock,
            ACCEPT_WINDOW,
            RESPONSE_WINDOW,
        )
    }

    /// 交渉ウィンドウを指定して作成（テスト・設定用）
    #[allow(clippy::too_many_arguments)]
    pub fn with_windows(
        repository: Arc<dyn LobbyRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        timers: Arc<NegotiationTimers>,
        chat_status: Arc<ChatStatusUseCase>,
        resolver: Arc<ResolveRequestUseCase>,
        clock: Arc<dyn Clock>,
        accept_window: Duration,
        response_window: Duration,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            timers,
            chat_status,
            resolver,
            clock,
            accept_window,
            response_window,
        }
    }

    /// チャットリクエスト作成を実行
    ///
    /// 成功すると、ターゲットに `chatRequest` が届き、サーバ側で 2 本の
    /// 期限タイマー（受諾期限 / 応答タイムアウト）が走り始める。
    pub async fn execute(
        &self,
        from: ParticipantId,
        to: ParticipantId,
        thought_text: ThoughtText,
    ) -> Result<ChatRequest, RequestChatError> {
        if from == to {
            return Err(RequestChatError::SelfRequest);
        }
        if !self.repository.participant_ids().await.contains(&to) {
            return Err(RequestChatError::TargetUnavailable(to.into_string()));
        }

        let created_at = Timestamp::new(self.clock.now_millis());
        let deadline = created_at.plus_millis(self.accept_window.as_millis() as i64);
        let request = ChatRequest::new(
            RequestIdFactory::generate()?,
            from.clone(),
            to.clone(),
            thought_text,
            created_at,
            deadline,
        );

        // busy 検証と登録は Repository の 1 ロック内で原子的に行われる
        self.repository.create_request(request.clone()).await?;

        // ターゲットへの着信通知。失敗しても期限タイマーが後始末する。
        let notification = serde_json::to_string(&ChatRequestMessage::from(request.clone())).unwrap();
        if let Err(e) = self.message_pusher.push_to(&to, &notification).await {
            tracing::warn!("Failed to notify '{}' of chat request: {}", to, e);
        }

        // 期限タイマーはサーバが所有する。どちらが先に発火しても、後から
        // 来たものは解決済みリクエストへの no-op になる。
        let expiry = {
            let resolver = self.resolver.clone();
            let from = from.clone();
            let to = to.clone();
            let window = self.accept_window;
            tokio::spawn(async move {
                tokio::time::sleep(window).await;
                resolver.execute(&from, &to, RequestOutcome::Expired).await;
            })
        };
        let timeout = {
            let resolver = self.resolver.clone();
            let from = from.clone();
            let to = to.clone();
            let window = self.response_window;
            tokio::spawn(async move {
                tokio::time::sleep(window).await;
                resolver.execute(&from, &to, RequestOutcome::Cancelled).await;
            })
        };
        self.timers
            .register(request.id.clone(), vec![expiry, timeout])
            .await;

        tracing::info!(
            "Chat request created: '{}' -> '{}' (expires at {})",
            from,
            to,
            deadline.value()
        );

        self.chat_status.broadcast().await;

        Ok(request)
    }
}
