//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - セッション内ルーティング（相手方への配送、履歴への追記）
//!
//! ### なぜこのテストが必要か
//! - 「メッセージが届くのはアクティブセッションの相手方だけ」という
//!   排他配送の保証はここが境界
//! - セッション外のメッセージがコア状態にも相手のストリームにも
//!   残らないことを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：セッション内のメッセージ配送と順序保存
//! - 異常系：セッション外の送信（黙って捨てる）、履歴容量超過

use std::sync::Arc;

use musubi_shared::time::Clock;

use crate::domain::{
    ChatMessage, LobbyError, LobbyRepository, MessageContent, MessagePusher, ParticipantId,
    Timestamp,
};
use crate::infrastructure::dto::websocket as dto;

use super::error::SendMessageError;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    repository: Arc<dyn LobbyRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    pub fn new(
        repository: Arc<dyn LobbyRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            clock,
        }
    }

    /// メッセージ送信を実行
    ///
    /// 送信者と宛先が現在アクティブセッションを共有しているときだけ
    /// 履歴に追記して相手方へ配送する。そうでなければ NoActiveSession を
    /// 返す。呼び出し側はこれをログに残すだけで、送信者への通知はしない
    /// （セッション外配送はサポートされる意味論ではない）。
    pub async fn execute(
        &self,
        from: ParticipantId,
        to: ParticipantId,
        content: MessageContent,
    ) -> Result<(), SendMessageError> {
        let message = ChatMessage::new(from, to, content, Timestamp::new(self.clock.now_millis()));

        self.repository
            .append_message(message.clone())
            .await
            .map_err(|e| match e {
                LobbyError::NoActiveSession { from, to } => SendMessageError::NoActiveSession {
                    from: from.into_string(),
                    to: to.into_string(),
                },
                LobbyError::MessageCapacityExceeded => SendMessageError::CapacityExceeded,
                other => SendMessageError::PushFailed(other.to_string()),
            })?;

        let delivery = serde_json::to_string(&dto::ChatMessage::from(message.clone())).unwrap();
        self.message_pusher
            .push_to(&message.to, &delivery)
            .await
            .map_err(|e| SendMessageError::PushFailed(e.to_string()))?;

        Ok(())
    }
}
