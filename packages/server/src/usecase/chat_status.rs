//! UseCase: チャットステータスの取得・配信
//!
//! `chatStatus` スナップショットは busy 状態の唯一の外部表現であり、
//! 登録・受諾・解放・切断など状態が変わるたびに全クライアントへ
//! 配信される。他のユースケースはこのユースケース経由で配信する。

use std::sync::Arc;

use crate::domain::{ChatStatus, LobbyRepository, MessagePusher, ParticipantId};
use crate::infrastructure::dto::websocket::ChatStatusMessage;

/// チャットステータス取得・配信のユースケース
pub struct ChatStatusUseCase {
    repository: Arc<dyn LobbyRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl ChatStatusUseCase {
    pub fn new(repository: Arc<dyn LobbyRepository>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 現在のスナップショットを取得
    pub async fn execute(&self) -> ChatStatus {
        self.repository.chat_status().await
    }

    /// スナップショットを特定クライアントへ送信（プル要求への応答）
    pub async fn push_to(&self, id: &ParticipantId) {
        let json = self.snapshot_json().await;
        if let Err(e) = self.message_pusher.push_to(id, &json).await {
            tracing::warn!("Failed to push chat status to '{}': {}", id, e);
        }
    }

    /// スナップショットを接続中の全クライアントへ配信
    pub async fn broadcast(&self) {
        let json = self.snapshot_json().await;
        let targets = self.repository.participant_ids().await;
        if let Err(e) = self.message_pusher.broadcast(targets, &json).await {
            tracing::warn!("Failed to broadcast chat status: {}", e);
        }
    }

    async fn snapshot_json(&self) -> String {
        let status = self.repository.chat_status().await;
        let message = ChatStatusMessage::from(status);
        serde_json::to_string(&message).unwrap()
    }
}
