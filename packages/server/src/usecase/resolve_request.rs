//! UseCase: チャットリクエストの終端処理（decline / expire / cancel）
//!
//! 受諾以外の 3 つの終端遷移が合流する共通経路。リクエストを保留集合から
//! 取り除き、タイマーを中断し、更新後のステータスを全クライアントへ
//! 配信する。既に解決済みのリクエストに対しては何もしない（冪等）。
//! タイマー発火・明示的な辞退・切断のどれが先に来ても、後から来たものは
//! no-op になる。

use std::sync::Arc;

use crate::domain::{ChatRequest, LobbyRepository, ParticipantId, RequestOutcome};
use crate::infrastructure::timer::NegotiationTimers;

use super::chat_status::ChatStatusUseCase;

/// リクエスト終端のユースケース
pub struct ResolveRequestUseCase {
    repository: Arc<dyn LobbyRepository>,
    timers: Arc<NegotiationTimers>,
    chat_status: Arc<ChatStatusUseCase>,
}

impl ResolveRequestUseCase {
    pub fn new(
        repository: Arc<dyn LobbyRepository>,
        timers: Arc<NegotiationTimers>,
        chat_status: Arc<ChatStatusUseCase>,
    ) -> Self {
        Self {
            repository,
            timers,
            chat_status,
        }
    }

    /// リクエストを終端させる
    ///
    /// `outcome` は Declined / Expired / Cancelled のいずれか（Accepted の
    /// 経路は `AcceptChatUseCase`）。解決できた場合は取り除いたリクエストを
    /// 返し、既に解決済みなら None を返す。
    pub async fn execute(
        &self,
        from: &ParticipantId,
        to: &ParticipantId,
        outcome: RequestOutcome,
    ) -> Option<ChatRequest> {
        let request = match self.repository.resolve_request(from, to).await {
            Some(request) => request,
            None => {
                tracing::debug!(
                    "No pending request from '{}' to '{}' to mark {}, ignoring",
                    from,
                    to,
                    outcome
                );
                return None;
            }
        };

        self.timers.cancel(&request.id).await;
        tracing::info!("Chat request from '{}' to '{}' {}", from, to, outcome);

        // 保留表示を消すのはステータス配信のみ。専用のプッシュは無い。
        self.chat_status.broadcast().await;

        Some(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Lobby, RequestIdFactory, ThoughtText, Timestamp};
    use crate::infrastructure::message_pusher::WebSocketMessagePusher;
    use crate::infrastructure::repository::InMemoryLobbyRepository;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    fn pid(s: &str) -> ParticipantId {
        ParticipantId::new(s.to_string()).unwrap()
    }

    fn create_test_usecase() -> (ResolveRequestUseCase, Arc<InMemoryLobbyRepository>) {
        let repository = Arc::new(InMemoryLobbyRepository::new(Arc::new(Mutex::new(
            Lobby::new(),
        ))));
        let pusher = Arc::new(WebSocketMessagePusher::new(Arc::new(Mutex::new(
            HashMap::new(),
        ))));
        let chat_status = Arc::new(ChatStatusUseCase::new(repository.clone(), pusher.clone()));
        let usecase = ResolveRequestUseCase::new(
            repository.clone(),
            Arc::new(NegotiationTimers::new()),
            chat_status,
        );
        (usecase, repository)
    }

    async fn create_pending_request(repository: &InMemoryLobbyRepository, from: &str, to: &str) {
        repository
            .create_request(ChatRequest::new(
                RequestIdFactory::generate().unwrap(),
                pid(from),
                pid(to),
                ThoughtText::new("rainy".to_string()).unwrap(),
                Timestamp::new(1000),
                Timestamp::new(6000),
            ))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_resolve_removes_pending_request() {
        // テスト項目: 終端処理でリクエストが保留集合から消える
        // given (前提条件):
        let (usecase, repository) = create_test_usecase();
        create_pending_request(&repository, "alice", "bob").await;

        // when (操作):
        let resolved = usecase
            .execute(&pid("alice"), &pid("bob"), RequestOutcome::Declined)
            .await;

        // then (期待する結果):
        assert!(resolved.is_some());
        assert!(!repository.is_busy(&pid("alice")).await);
        assert!(!repository.is_busy(&pid("bob")).await);
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent() {
        // テスト項目: 解決済みリクエストの再終端は no-op（復活しない）
        // given (前提条件):
        let (usecase, repository) = create_test_usecase();
        create_pending_request(&repository, "alice", "bob").await;
        usecase
            .execute(&pid("alice"), &pid("bob"), RequestOutcome::Expired)
            .await;

        // when (操作):
        let second = usecase
            .execute(&pid("alice"), &pid("bob"), RequestOutcome::Cancelled)
            .await;

        // then (期待する結果):
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn test_resolve_unknown_request_is_noop() {
        // テスト項目: 存在しないリクエストの終端は no-op
        // given (前提条件):
        let (usecase, _repository) = create_test_usecase();

        // when (操作):
        let resolved = usecase
            .execute(&pid("ghost"), &pid("nobody"), RequestOutcome::Declined)
            .await;

        // then (期待する結果):
        assert!(resolved.is_none());
    }
}
