//! UseCase: 参加者切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() メソッド
//! - 切断時の巻き戻し一式：保留リクエストのキャンセル、セッション解放と
//!   相手方への通知、思考の取り下げ、参加者の削除、ステータス配信
//!
//! ### なぜこのテストが必要か
//! - 切断はこのシステムの第一のキャンセルシグナル。巻き戻しが決定的かつ
//!   冪等であることを保証する
//! - 切断した参加者が busy のまま残ると相手が永久にブロックされる
//!
//! ### どのような状況を想定しているか
//! - 正常系：セッション中の切断、リクエスト保留中の切断
//! - エッジケース：何も関与していない参加者の切断、二重切断

use std::sync::Arc;

use crate::domain::{LobbyRepository, MessagePusher, ParticipantId};
use crate::infrastructure::dto::websocket::{
    CloseChatMessage, DeletedDataMessage, MessageType,
};
use crate::infrastructure::timer::NegotiationTimers;

use super::chat_status::ChatStatusUseCase;

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    repository: Arc<dyn LobbyRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    timers: Arc<NegotiationTimers>,
    chat_status: Arc<ChatStatusUseCase>,
}

impl DisconnectParticipantUseCase {
    pub fn new(
        repository: Arc<dyn LobbyRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        timers: Arc<NegotiationTimers>,
        chat_status: Arc<ChatStatusUseCase>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            timers,
            chat_status,
        }
    }

    /// 参加者切断を実行
    ///
    /// 明示的な終了と同じ遷移（release / Cancelled）をこの参加者の関与分
    /// 全てに適用し、更新後のステータスを配信する。各ステップは対象が
    /// 不在なら no-op であり、重複配送されても安全（冪等）。
    pub async fn execute(&self, id: ParticipantId) {
        // 1. 送信チャンネルを解除（以降のプッシュはこの参加者に届かない）
        self.message_pusher.unregister_client(&id).await;

        // 2. 関与する保留リクエストを全てキャンセル
        let requests = self.repository.take_requests_involving(&id).await;
        for request in &requests {
            self.timers.cancel(&request.id).await;
            tracing::info!(
                "Chat request from '{}' to '{}' cancelled: '{}' disconnected",
                request.from,
                request.to,
                id
            );
        }

        // 3. アクティブセッションを解放し、相手方に closeChat を通知
        if let Some(session) = self.repository.active_session_of(&id).await {
            self.repository
                .release(&session.participant_a, &session.participant_b)
                .await;
            if let Some(counterpart) = session.counterpart(&id) {
                let notification = serde_json::to_string(&CloseChatMessage {
                    r#type: MessageType::CloseChat,
                    from_user_id: id.as_str().to_string(),
                    to_user_id: counterpart.as_str().to_string(),
                })
                .unwrap();
                if let Err(e) = self.message_pusher.push_to(counterpart, &notification).await {
                    tracing::warn!("Failed to push closeChat to '{}': {}", counterpart, e);
                }
                tracing::info!(
                    "Chat session released: '{}' disconnected, '{}' is free again",
                    id,
                    counterpart
                );
            }
        }

        // 4. 思考を取り下げ、候補の消滅を配信
        if let Some(thought) = self.repository.take_thought(&id, None).await {
            let targets: Vec<ParticipantId> = self
                .repository
                .participant_ids()
                .await
                .into_iter()
                .filter(|other| other != &id)
                .collect();
            let deleted = serde_json::to_string(&DeletedDataMessage {
                r#type: MessageType::DeletedData,
                id: thought.id.into_string(),
            })
            .unwrap();
            if let Err(e) = self.message_pusher.broadcast(targets, &deleted).await {
                tracing::warn!("Failed to broadcast deletedData: {}", e);
            }
        }

        // 5. 参加者を削除
        self.repository.remove_participant(&id).await;
        tracing::info!("Client '{}' disconnected and removed from lobby", id);

        // 6. 解放されたターゲットを他クライアントが即座に再有効化できるよう
        //    ステータスを配信
        self.chat_status.broadcast().await;
    }
}
