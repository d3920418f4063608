//! Repository trait 定義
//!
//! ドメイン層が必要とするロビー状態アクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::entity::{ChatMessage, ChatRequest, ChatSession, ChatStatus, Lobby, Thought};
use super::error::LobbyError;
use super::value_object::{ParticipantId, Timestamp};

/// Lobby Repository trait
///
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には
/// 依存しない。
///
/// ## 原子性
///
/// 各メソッドは実装側で 1 回のロック取得の中で完結させること。
/// `is_busy` が中途半端な状態を観測したり、並行する 2 つの受諾が両方
/// 昇格してしまうことを防ぐための、このシステムで唯一の直列化点である。
#[async_trait]
pub trait LobbyRepository: Send + Sync {
    /// Lobby 全体のスナップショットを取得（デバッグ用）
    async fn get_lobby(&self) -> Lobby;

    /// 参加者を追加
    async fn add_participant(
        &self,
        id: ParticipantId,
        connected_at: Timestamp,
    ) -> Result<(), LobbyError>;

    /// 参加者を削除（不在なら no-op）
    async fn remove_participant(&self, id: &ParticipantId);

    /// 接続中の全参加者 ID を取得
    async fn participant_ids(&self) -> Vec<ParticipantId>;

    /// 思考を提出・置換（置き換えた既存の思考を返す）
    async fn upsert_thought(&self, thought: Thought) -> Option<Thought>;

    /// 思考を取り下げる（`text` が Some の場合は一致時のみ）
    async fn take_thought(&self, id: &ParticipantId, text: Option<&str>) -> Option<Thought>;

    /// 指定参加者を除いた候補集合を取得
    async fn candidates_for(&self, exclude: &ParticipantId) -> Vec<Thought>;

    /// busy 判定（アクティブセッション中または保留リクエストに関与）
    async fn is_busy(&self, id: &ParticipantId) -> bool;

    /// 保留リクエストを作成
    async fn create_request(&self, request: ChatRequest) -> Result<(), LobbyError>;

    /// リクエストを受諾して昇格し、両者が関与する他リクエストを
    /// 一括キャンセルする（原子的）
    async fn accept_request(
        &self,
        from: &ParticipantId,
        to: &ParticipantId,
        opened_at: Timestamp,
    ) -> Result<(ChatRequest, Vec<ChatRequest>), LobbyError>;

    /// 保留リクエストを終端させる（既に解決済みなら None）
    async fn resolve_request(
        &self,
        from: &ParticipantId,
        to: &ParticipantId,
    ) -> Option<ChatRequest>;

    /// 指定参加者が関与する全保留リクエストを取り除く
    async fn take_requests_involving(&self, id: &ParticipantId) -> Vec<ChatRequest>;

    /// ペアのセッションを解放して返す（不在なら None、冪等）
    async fn release(&self, a: &ParticipantId, b: &ParticipantId) -> Option<ChatSession>;

    /// 指定参加者のアクティブセッションを取得
    async fn active_session_of(&self, id: &ParticipantId) -> Option<ChatSession>;

    /// メッセージをセッション履歴に追記
    async fn append_message(&self, message: ChatMessage) -> Result<(), LobbyError>;

    /// 全クライアント向けステータススナップショットを取得
    async fn chat_status(&self) -> ChatStatus;
}
