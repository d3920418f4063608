//! UseCase: チャットセッション終了処理
//!
//! どちらか一方の明示的な終了でペアのセッションを解放し、相手方に
//! `closeChat` を通知する。解放は冪等（既に解放済みなら no-op）。

use std::sync::Arc;

use crate::domain::{LobbyRepository, MessagePusher, ParticipantId};
use crate::infrastructure::dto::websocket::{CloseChatMessage, MessageType};

use super::chat_status::ChatStatusUseCase;

/// チャットセッション終了のユースケース
pub struct CloseChatUseCase {
    repository: Arc<dyn LobbyRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    chat_status: Arc<ChatStatusUseCase>,
}

impl CloseChatUseCase {
    pub fn new(
        repository: Arc<dyn LobbyRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        chat_status: Arc<ChatStatusUseCase>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            chat_status,
        }
    }

    /// セッション終了を実行
    ///
    /// `from` が終了を要求した側、`to` が相手方。
    pub async fn execute(&self, from: &ParticipantId, to: &ParticipantId) {
        match self.repository.release(from, to).await {
            Some(session) => {
                let message_count = session.messages.len();
                tracing::info!(
                    "Chat session closed by '{}': '{}' <-> '{}' ({} messages)",
                    from,
                    session.participant_a,
                    session.participant_b,
                    message_count
                );

                let notification = serde_json::to_string(&CloseChatMessage {
                    r#type: MessageType::CloseChat,
                    from_user_id: from.as_str().to_string(),
                    to_user_id: to.as_str().to_string(),
                })
                .unwrap();
                if let Err(e) = self.message_pusher.push_to(to, &notification).await {
                    tracing::warn!("Failed to push closeChat to '{}': {}", to, e);
                }

                self.chat_status.broadcast().await;
            }
            None => {
                tracing::debug!(
                    "Close for absent session '{}' <-> '{}', ignoring",
                    from,
                    to
                );
            }
        }
    }
}
