//! InMemory Lobby Repository 実装
//!
//! ドメイン層が定義する LobbyRepository trait の具体的な実装。
//! `Mutex<Lobby>` をインメモリストアとして使用します。
//!
//! 各メソッドは 1 回のロック取得の中で完結する。これが並行する
//! リクエスト作成・受諾・解放を直列化する唯一の点であり、`is_busy` が
//! 中途半端な状態を観測しないことを保証する。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ChatMessage, ChatRequest, ChatSession, ChatStatus, Lobby, LobbyError, LobbyRepository,
    Participant, ParticipantId, Thought, Timestamp,
};

/// インメモリ Lobby Repository 実装
pub struct InMemoryLobbyRepository {
    lobby: Arc<Mutex<Lobby>>,
}

impl InMemoryLobbyRepository {
    /// 新しい InMemoryLobbyRepository を作成
    pub fn new(lobby: Arc<Mutex<Lobby>>) -> Self {
        Self { lobby }
    }
}

#[async_trait]
impl LobbyRepository for InMemoryLobbyRepository {
    async fn get_lobby(&self) -> Lobby {
        let lobby = self.lobby.lock().await;
        lobby.clone()
    }

    async fn add_participant(
        &self,
        id: ParticipantId,
        connected_at: Timestamp,
    ) -> Result<(), LobbyError> {
        let mut lobby = self.lobby.lock().await;
        lobby.add_participant(Participant::new(id, connected_at))
    }

    async fn remove_participant(&self, id: &ParticipantId) {
        let mut lobby = self.lobby.lock().await;
        lobby.remove_participant(id);
    }

    async fn participant_ids(&self) -> Vec<ParticipantId> {
        let lobby = self.lobby.lock().await;
        lobby.participant_ids()
    }

    async fn upsert_thought(&self, thought: Thought) -> Option<Thought> {
        let mut lobby = self.lobby.lock().await;
        lobby.upsert_thought(thought)
    }

    async fn take_thought(&self, id: &ParticipantId, text: Option<&str>) -> Option<Thought> {
        let mut lobby = self.lobby.lock().await;
        lobby.take_thought(id, text)
    }

    async fn candidates_for(&self, exclude: &ParticipantId) -> Vec<Thought> {
        let lobby = self.lobby.lock().await;
        lobby.candidates_for(exclude)
    }

    async fn is_busy(&self, id: &ParticipantId) -> bool {
        let lobby = self.lobby.lock().await;
        lobby.is_busy(id)
    }

    async fn create_request(&self, request: ChatRequest) -> Result<(), LobbyError> {
        let mut lobby = self.lobby.lock().await;
        lobby.create_request(request)
    }

    async fn accept_request(
        &self,
        from: &ParticipantId,
        to: &ParticipantId,
        opened_at: Timestamp,
    ) -> Result<(ChatRequest, Vec<ChatRequest>), LobbyError> {
        let mut lobby = self.lobby.lock().await;
        lobby.accept_request(from, to, opened_at)
    }

    async fn resolve_request(
        &self,
        from: &ParticipantId,
        to: &ParticipantId,
    ) -> Option<ChatRequest> {
        let mut lobby = self.lobby.lock().await;
        lobby.resolve_request(from, to)
    }

    async fn take_requests_involving(&self, id: &ParticipantId) -> Vec<ChatRequest> {
        let mut lobby = self.lobby.lock().await;
        lobby.take_requests_involving(id)
    }

    async fn release(&self, a: &ParticipantId, b: &ParticipantId) -> Option<ChatSession> {
        let mut lobby = self.lobby.lock().await;
        lobby.release(a, b)
    }

    async fn active_session_of(&self, id: &ParticipantId) -> Option<ChatSession> {
        let lobby = self.lobby.lock().await;
        lobby.active_session_of(id).cloned()
    }

    async fn append_message(&self, message: ChatMessage) -> Result<(), LobbyError> {
        let mut lobby = self.lobby.lock().await;
        lobby.append_message(message)
    }

    async fn chat_status(&self) -> ChatStatus {
        let lobby = self.lobby.lock().await;
        lobby.chat_status()
    }
}
