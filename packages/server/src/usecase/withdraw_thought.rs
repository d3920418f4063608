//! UseCase: 思考の取り下げ処理
//!
//! `DELETE /search/{user_id}/{query}` の本体。現在の思考のテキストが
//! 一致するときだけ取り下げ、他の接続中クライアントへ `deletedData` を
//! 配信する。

use std::sync::Arc;

use crate::domain::{LobbyRepository, MessagePusher, ParticipantId, Thought};
use crate::infrastructure::dto::websocket::{DeletedDataMessage, MessageType};

use super::error::WithdrawThoughtError;

/// 思考取り下げのユースケース
pub struct WithdrawThoughtUseCase {
    repository: Arc<dyn LobbyRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl WithdrawThoughtUseCase {
    pub fn new(
        repository: Arc<dyn LobbyRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 思考取り下げを実行
    pub async fn execute(
        &self,
        participant_id: &ParticipantId,
        text: &str,
    ) -> Result<Thought, WithdrawThoughtError> {
        let thought = self
            .repository
            .take_thought(participant_id, Some(text))
            .await
            .ok_or(WithdrawThoughtError::ThoughtNotFound)?;

        let targets: Vec<ParticipantId> = self
            .repository
            .participant_ids()
            .await
            .into_iter()
            .filter(|id| id != participant_id)
            .collect();
        let deleted = serde_json::to_string(&DeletedDataMessage {
            r#type: MessageType::DeletedData,
            id: thought.id.as_str().to_string(),
        })
        .unwrap();
        if let Err(e) = self.message_pusher.broadcast(targets, &deleted).await {
            tracing::warn!("Failed to broadcast deletedData: {}", e);
        }

        tracing::info!("Thought withdrawn by '{}'", participant_id);

        Ok(thought)
    }
}
