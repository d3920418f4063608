//! UseCase: チャットリクエスト受諾処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - AcceptChatUseCase::execute() メソッド
//! - 受諾時の再検証、セッション昇格、他リクエストの一括キャンセル、
//!   タイマー中断、両当事者への通知
//!
//! ### なぜこのテストが必要か
//! - 並行受諾の競合はこのシステムで最も壊れやすい点。昇格できるのは
//!   常に 1 ペアだけであることを保証する
//! - 受諾後に他のリクエストの stale タイマーが発火しないことを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：受諾 → 昇格 → 両者への chatAccepted 通知
//! - 異常系：解決済みリクエストの受諾（no-op）、受諾時点で busy
//! - エッジケース：複数の受信リクエストのうち 1 つを受諾

use std::sync::Arc;

use musubi_shared::time::Clock;

use crate::domain::{ChatRequest, LobbyRepository, MessagePusher, ParticipantId, Timestamp};
use crate::infrastructure::dto::websocket::{ChatAcceptedMessage, MessageType};
use crate::infrastructure::timer::NegotiationTimers;

use super::chat_status::ChatStatusUseCase;
use super::error::AcceptChatError;

/// チャットリクエスト受諾のユースケース
pub struct AcceptChatUseCase {
    repository: Arc<dyn LobbyRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    timers: Arc<NegotiationTimers>,
    chat_status: Arc<ChatStatusUseCase>,
    clock: Arc<dyn Clock>,
}

impl AcceptChatUseCase {
    pub fn new(
        repository: Arc<dyn LobbyRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        timers: Arc<NegotiationTimers>,
        chat_status: Arc<ChatStatusUseCase>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            timers,
            chat_status,
            clock,
        }
    }

    /// 受諾を実行
    ///
    /// `from` は元のリクエスト送信者、`to` は受諾するターゲット。
    /// 成功すると両者が関与していた他の保留リクエストは全てキャンセル
    /// され、それらのタイマーも中断される。
    pub async fn execute(
        &self,
        from: &ParticipantId,
        to: &ParticipantId,
    ) -> Result<ChatRequest, AcceptChatError> {
        let opened_at = Timestamp::new(self.clock.now_millis());

        // 検証・昇格・一括キャンセルは Repository の 1 ロック内で原子的
        let (accepted, cancelled) = self.repository.accept_request(from, to, opened_at).await?;

        self.timers.cancel(&accepted.id).await;
        for request in &cancelled {
            self.timers.cancel(&request.id).await;
            tracing::info!(
                "Chat request from '{}' to '{}' cancelled: counterpart accepted another chat",
                request.from,
                request.to
            );
        }

        let notification = serde_json::to_string(&ChatAcceptedMessage {
            r#type: MessageType::ChatAccepted,
            from_user_id: from.as_str().to_string(),
            to_user_id: to.as_str().to_string(),
        })
        .unwrap();
        for party in [from, to] {
            if let Err(e) = self.message_pusher.push_to(party, &notification).await {
                tracing::warn!("Failed to push chatAccepted to '{}': {}", party, e);
            }
        }

        tracing::info!("Chat session opened: '{}' <-> '{}'", from, to);

        self.chat_status.broadcast().await;

        Ok(accepted)
    }
}
