//! UseCase: 参加者接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::execute() メソッド
//! - 参加者の接続処理（重複チェック、チャンネル登録、初期ステータス送信）
//!
//! ### なぜこのテストが必要か
//! - 「1 参加者 = 1 接続」の保証はここが境界
//! - 接続直後のクライアントが busy 状態を即座に知れることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規参加者の接続
//! - 異常系：重複した ID での接続試行、定員超過

use std::sync::Arc;

use musubi_shared::time::Clock;

use crate::domain::{
    LobbyError, LobbyRepository, MessagePusher, ParticipantId, PusherChannel, Timestamp,
};

use super::chat_status::ChatStatusUseCase;
use super::error::ConnectError;

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    repository: Arc<dyn LobbyRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    chat_status: Arc<ChatStatusUseCase>,
    clock: Arc<dyn Clock>,
}

impl ConnectParticipantUseCase {
    pub fn new(
        repository: Arc<dyn LobbyRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        chat_status: Arc<ChatStatusUseCase>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            chat_status,
            clock,
        }
    }

    /// 参加者接続を実行
    ///
    /// # Returns
    ///
    /// * `Ok(Timestamp)` - 接続成功（接続時刻を返す）
    /// * `Err(ConnectError)` - 重複 ID または定員超過
    pub async fn execute(
        &self,
        id: ParticipantId,
        sender: PusherChannel,
    ) -> Result<Timestamp, ConnectError> {
        let connected_at = Timestamp::new(self.clock.now_millis());

        match self.repository.add_participant(id.clone(), connected_at).await {
            Ok(()) => {}
            Err(LobbyError::DuplicateParticipant(dup)) => {
                return Err(ConnectError::DuplicateParticipantId(dup.into_string()));
            }
            Err(_) => return Err(ConnectError::LobbyFull),
        }

        self.message_pusher.register_client(id.clone(), sender).await;

        // 接続直後に現在の busy 状態を知らせる
        self.chat_status.push_to(&id).await;

        Ok(connected_at)
    }
}
