//! UseCase: 思考の提出と候補ランキング
//!
//! `GET /search` の本体。提出者の思考を保存（既存があれば置換）し、他の
//! 接続中クライアントへ `newData`（置換時は先に `deletedData`）を配信した
//! うえで、提出者自身を除く全候補集合をクエリとの類似度でランキングして
//! 返す。ランキングは差分ではなく毎回全集合に対して行う。

use std::sync::Arc;

use musubi_shared::time::Clock;

use crate::domain::{
    LobbyRepository, MessagePusher, ParticipantId, RankedCandidate, Thought, ThoughtIdFactory,
    ThoughtText, Timestamp, rank,
};
use crate::infrastructure::dto::websocket::{DeletedDataMessage, MessageType, NewDataMessage};

use super::error::SubmitThoughtError;

/// 思考提出のユースケース
pub struct SubmitThoughtUseCase {
    repository: Arc<dyn LobbyRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl SubmitThoughtUseCase {
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

    /// 思考提出を実行し、ランキング済み候補を返す
    ///
    /// 提出者はまだ WebSocket 接続前でもよい（検索 → 結果画面 → 接続の
    /// 順に進むため）。その場合デルタ配信は接続中の他クライアントにだけ
    /// 届く。
    pub async fn execute(
        &self,
        participant_id: ParticipantId,
        text: ThoughtText,
    ) -> Result<Vec<RankedCandidate>, SubmitThoughtError> {
        let thought = Thought::new(
            ThoughtIdFactory::generate()?,
            participant_id.clone(),
            text.clone(),
            Timestamp::new(self.clock.now_millis()),
        );

        let replaced = self.repository.upsert_thought(thought.clone()).await;

        let targets: Vec<ParticipantId> = self
            .repository
            .participant_ids()
            .await
            .into_iter()
            .filter(|id| id != &participant_id)
            .collect();

        // 置換時は古い候補の取り下げを先に配信する
        if let Some(old) = replaced {
            let deleted = serde_json::to_string(&DeletedDataMessage {
                r#type: MessageType::DeletedData,
                id: old.id.into_string(),
            })
            .unwrap();
            if let Err(e) = self.message_pusher.broadcast(targets.clone(), &deleted).await {
                tracing::warn!("Failed to broadcast deletedData: {}", e);
            }
        }

        let new_data = serde_json::to_string(&NewDataMessage::from(thought)).unwrap();
        if let Err(e) = self.message_pusher.broadcast(targets, &new_data).await {
            tracing::warn!("Failed to broadcast newData: {}", e);
        }

        let candidates = self.repository.candidates_for(&participant_id).await;
        tracing::info!(
            "Thought submitted by '{}', ranked {} candidates",
            participant_id,
            candidates.len()
        );

        Ok(rank(text.as_str(), &candidates))
    }
}
