//! ドメインエンティティ定義
//!
//! `Lobby` が集約ルート。参加者・思考・保留中リクエスト・アクティブ
//! セッションを一括して所有し、排他制約（1 参加者 = 最大 1 セッション）を
//! ここで守ります。Lobby のメソッドは全て同期であり、呼び出し側
//! （Repository 実装）が 1 回のロック取得の中で呼ぶことで原子性を
//! 保証します。

use serde::Serialize;

use super::error::LobbyError;
use super::value_object::{
    MessageContent, ParticipantId, RequestId, ThoughtId, ThoughtText, Timestamp,
};

/// 接続中の参加者
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub connected_at: Timestamp,
}

impl Participant {
    pub fn new(id: ParticipantId, connected_at: Timestamp) -> Self {
        Self { id, connected_at }
    }
}

/// 提出された思考
///
/// 1 参加者につき現在の思考は 1 つ。再提出で置き換え、取り下げ・切断で消える。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Thought {
    pub id: ThoughtId,
    pub participant_id: ParticipantId,
    pub text: ThoughtText,
    pub submitted_at: Timestamp,
}

impl Thought {
    pub fn new(
        id: ThoughtId,
        participant_id: ParticipantId,
        text: ThoughtText,
        submitted_at: Timestamp,
    ) -> Self {
        Self {
            id,
            participant_id,
            text,
            submitted_at,
        }
    }
}

/// 保留中のチャットリクエスト
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub id: RequestId,
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub thought_text: ThoughtText,
    pub created_at: Timestamp,
    /// ターゲット側の受諾期限
    pub deadline: Timestamp,
}

impl ChatRequest {
    pub fn new(
        id: RequestId,
        from: ParticipantId,
        to: ParticipantId,
        thought_text: ThoughtText,
        created_at: Timestamp,
        deadline: Timestamp,
    ) -> Self {
        Self {
            id,
            from,
            to,
            thought_text,
            created_at,
            deadline,
        }
    }

    /// 指定の参加者が送信者または宛先として関与しているか
    pub fn involves(&self, id: &ParticipantId) -> bool {
        &self.from == id || &self.to == id
    }

    pub fn is_between(&self, from: &ParticipantId, to: &ParticipantId) -> bool {
        &self.from == from && &self.to == to
    }
}

/// リクエストの終端遷移
///
/// Created から到達する 4 つの終端状態。終端に達したリクエストは
/// Lobby から取り除かれ、二度と復活しない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RequestOutcome {
    Accepted,
    Declined,
    Expired,
    Cancelled,
}

impl std::fmt::Display for RequestOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RequestOutcome::Accepted => "accepted",
            RequestOutcome::Declined => "declined",
            RequestOutcome::Expired => "expired",
            RequestOutcome::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// セッション内の 1 メッセージ（作成後は不変）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub content: MessageContent,
    pub timestamp: Timestamp,
}

impl ChatMessage {
    pub fn new(
        from: ParticipantId,
        to: ParticipantId,
        content: MessageContent,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            from,
            to,
            content,
            timestamp,
        }
    }
}

/// アクティブな 1 対 1 チャットセッション
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatSession {
    pub participant_a: ParticipantId,
    pub participant_b: ParticipantId,
    pub messages: Vec<ChatMessage>,
    pub opened_at: Timestamp,
}

impl ChatSession {
    pub fn new(
        participant_a: ParticipantId,
        participant_b: ParticipantId,
        opened_at: Timestamp,
    ) -> Self {
        Self {
            participant_a,
            participant_b,
            messages: Vec::new(),
            opened_at,
        }
    }

    pub fn involves(&self, id: &ParticipantId) -> bool {
        &self.participant_a == id || &self.participant_b == id
    }

    /// 順序を問わず 2 参加者がこのセッションのペアか
    pub fn is_between(&self, x: &ParticipantId, y: &ParticipantId) -> bool {
        (&self.participant_a == x && &self.participant_b == y)
            || (&self.participant_a == y && &self.participant_b == x)
    }

    /// 指定の参加者から見た相手
    pub fn counterpart(&self, id: &ParticipantId) -> Option<&ParticipantId> {
        if &self.participant_a == id {
            Some(&self.participant_b)
        } else if &self.participant_b == id {
            Some(&self.participant_a)
        } else {
            None
        }
    }
}

/// 全クライアントに配信する読み取り専用スナップショット
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatStatus {
    pub active_chats: Vec<ParticipantId>,
    pub pending_requests: Vec<ChatRequest>,
}

/// ロビー集約
///
/// 登録済み参加者、提出済み思考、保留中リクエスト、アクティブセッションを
/// 所有する単一の状態オブジェクト。busy 判定はここにしか無い。
#[derive(Debug, Clone, Serialize)]
pub struct Lobby {
    pub participants: Vec<Participant>,
    pub thoughts: Vec<Thought>,
    pub pending_requests: Vec<ChatRequest>,
    pub active_sessions: Vec<ChatSession>,
    participant_capacity: usize,
    message_capacity: usize,
}

impl Lobby {
    pub const DEFAULT_PARTICIPANT_CAPACITY: usize = 100;
    pub const DEFAULT_MESSAGE_CAPACITY: usize = 500;

    pub fn new() -> Self {
        Self::with_capacity(
            Self::DEFAULT_PARTICIPANT_CAPACITY,
            Self::DEFAULT_MESSAGE_CAPACITY,
        )
    }

    pub fn with_capacity(participant_capacity: usize, message_capacity: usize) -> Self {
        Self {
            participants: Vec::new(),
            thoughts: Vec::new(),
            pending_requests: Vec::new(),
            active_sessions: Vec::new(),
            participant_capacity,
            message_capacity,
        }
    }

    // ----- 参加者 -----

    pub fn add_participant(&mut self, participant: Participant) -> Result<(), LobbyError> {
        if self.has_participant(&participant.id) {
            return Err(LobbyError::DuplicateParticipant(participant.id));
        }
        if self.participants.len() >= self.participant_capacity {
            return Err(LobbyError::LobbyFull);
        }
        self.participants.push(participant);
        Ok(())
    }

    /// 参加者を取り除く（存在しなければ何もしない）
    pub fn remove_participant(&mut self, id: &ParticipantId) {
        self.participants.retain(|p| &p.id != id);
    }

    pub fn has_participant(&self, id: &ParticipantId) -> bool {
        self.participants.iter().any(|p| &p.id == id)
    }

    pub fn participant_ids(&self) -> Vec<ParticipantId> {
        self.participants.iter().map(|p| p.id.clone()).collect()
    }

    // ----- 思考 -----

    /// 思考を提出する。既存の思考があれば置き換え、置き換えた方を返す。
    pub fn upsert_thought(&mut self, thought: Thought) -> Option<Thought> {
        let replaced = self.take_thought(&thought.participant_id, None);
        self.thoughts.push(thought);
        replaced
    }

    /// 思考を取り下げる。
    ///
    /// `text` が Some の場合は現在の思考のテキストが一致するときのみ
    /// 取り下げる（HTTP の取り下げ経路）。None は無条件（切断経路）。
    pub fn take_thought(&mut self, participant_id: &ParticipantId, text: Option<&str>) -> Option<Thought> {
        let pos = self.thoughts.iter().position(|t| {
            &t.participant_id == participant_id
                && text.is_none_or(|expected| t.text.as_str() == expected)
        })?;
        Some(self.thoughts.remove(pos))
    }

    /// 指定参加者自身を除いた候補集合（挿入順を保つ）
    pub fn candidates_for(&self, exclude: &ParticipantId) -> Vec<Thought> {
        self.thoughts
            .iter()
            .filter(|t| &t.participant_id != exclude)
            .cloned()
            .collect()
    }

    // ----- busy 判定 -----

    /// 参加者が「busy」か
    ///
    /// アクティブセッションに入っているか、保留中リクエストに送信者・宛先の
    /// いずれかとして関与していれば true。busy の定義はこの関数が唯一の
    /// 権威であり、他の場所で 2 つのリストから再計算してはならない。
    pub fn is_busy(&self, id: &ParticipantId) -> bool {
        self.active_sessions.iter().any(|s| s.involves(id))
            || self.pending_requests.iter().any(|r| r.involves(id))
    }

    fn in_active_session(&self, id: &ParticipantId) -> bool {
        self.active_sessions.iter().any(|s| s.involves(id))
    }

    // ----- リクエスト -----

    pub fn find_request(&self, from: &ParticipantId, to: &ParticipantId) -> Option<&ChatRequest> {
        self.pending_requests.iter().find(|r| r.is_between(from, to))
    }

    /// 保留中リクエストを作成する。
    ///
    /// 拒否条件:
    /// - 送信者または宛先がアクティブセッション中（AlreadyBusy）
    /// - 送信者が既に別の送信済みリクエストを持つ（AlreadyBusy —
    ///   1 参加者につき未解決の送信リクエストは 1 つまで）
    /// - 同一ペア間に未解決リクエストが既にある（DuplicateRequest）
    ///
    /// 宛先が他の受信リクエストを持つだけの場合は許容する。受信側での
    /// 複数リクエストのキューイングは仕様上許される（受諾時に他を一括
    /// キャンセル）。
    pub fn create_request(&mut self, request: ChatRequest) -> Result<(), LobbyError> {
        if self.in_active_session(&request.from) {
            return Err(LobbyError::AlreadyBusy(request.from));
        }
        if self.in_active_session(&request.to) {
            return Err(LobbyError::AlreadyBusy(request.to));
        }
        if self
            .pending_requests
            .iter()
            .any(|r| r.from == request.from)
        {
            return Err(LobbyError::AlreadyBusy(request.from));
        }
        if self.find_request(&request.from, &request.to).is_some()
            || self.find_request(&request.to, &request.from).is_some()
        {
            return Err(LobbyError::DuplicateRequest {
                from: request.from,
                to: request.to,
            });
        }
        self.pending_requests.push(request);
        Ok(())
    }

    /// リクエストを受諾し、ペアをアクティブセッションへ昇格する。
    ///
    /// 1 回の呼び出しで原子的に行うこと:
    /// 1. (from, to) の保留中リクエストを検証（無ければ RequestNotFound）
    /// 2. 両者がアクティブセッションに居ないことを受諾時点で再検証
    ///    （AlreadyBusy — この場合リクエストは保留のまま残し、期限切れに任せる）
    /// 3. 当該リクエストを取り除き、両者が関与する他の全保留リクエストも
    ///    取り除く
    /// 4. セッションを作成する
    ///
    /// 戻り値は（受諾されたリクエスト, キャンセルされた他リクエスト）。
    pub fn accept_request(
        &mut self,
        from: &ParticipantId,
        to: &ParticipantId,
        opened_at: Timestamp,
    ) -> Result<(ChatRequest, Vec<ChatRequest>), LobbyError> {
        let accepted_pos = self
            .pending_requests
            .iter()
            .position(|r| r.is_between(from, to))
            .ok_or_else(|| LobbyError::RequestNotFound {
                from: from.clone(),
                to: to.clone(),
            })?;
        if self.in_active_session(from) {
            return Err(LobbyError::AlreadyBusy(from.clone()));
        }
        if self.in_active_session(to) {
            return Err(LobbyError::AlreadyBusy(to.clone()));
        }

        let accepted = self.pending_requests.remove(accepted_pos);

        let mut cancelled = Vec::new();
        self.pending_requests.retain(|r| {
            if r.involves(from) || r.involves(to) {
                cancelled.push(r.clone());
                false
            } else {
                true
            }
        });

        self.active_sessions
            .push(ChatSession::new(from.clone(), to.clone(), opened_at));

        Ok((accepted, cancelled))
    }

    /// 保留中リクエストを終端させて取り除く。
    ///
    /// 既に解決済み（存在しない）の場合は None。冪等であり、同じ
    /// リクエストを二度解決しても状態は変わらない。
    pub fn resolve_request(
        &mut self,
        from: &ParticipantId,
        to: &ParticipantId,
    ) -> Option<ChatRequest> {
        let pos = self
            .pending_requests
            .iter()
            .position(|r| r.is_between(from, to))?;
        Some(self.pending_requests.remove(pos))
    }

    /// 指定参加者が関与する全保留リクエストを取り除いて返す（切断経路）
    pub fn take_requests_involving(&mut self, id: &ParticipantId) -> Vec<ChatRequest> {
        let mut taken = Vec::new();
        self.pending_requests.retain(|r| {
            if r.involves(id) {
                taken.push(r.clone());
                false
            } else {
                true
            }
        });
        taken
    }

    // ----- セッション -----

    /// ペアをアクティブセッションへ昇格する。
    ///
    /// いずれかが既に別セッション中なら AlreadyBusy。受諾経路は
    /// `accept_request` を使うこと（こちらはリクエストを伴わない昇格の
    /// 最小契約）。
    pub fn promote(
        &mut self,
        a: &ParticipantId,
        b: &ParticipantId,
        opened_at: Timestamp,
    ) -> Result<(), LobbyError> {
        if self.in_active_session(a) {
            return Err(LobbyError::AlreadyBusy(a.clone()));
        }
        if self.in_active_session(b) {
            return Err(LobbyError::AlreadyBusy(b.clone()));
        }
        self.active_sessions
            .push(ChatSession::new(a.clone(), b.clone(), opened_at));
        Ok(())
    }

    /// ペアのセッションを解放して返す。不在なら None（冪等）。
    pub fn release(&mut self, a: &ParticipantId, b: &ParticipantId) -> Option<ChatSession> {
        let pos = self
            .active_sessions
            .iter()
            .position(|s| s.is_between(a, b))?;
        Some(self.active_sessions.remove(pos))
    }

    pub fn active_session_of(&self, id: &ParticipantId) -> Option<&ChatSession> {
        self.active_sessions.iter().find(|s| s.involves(id))
    }

    /// メッセージをセッション履歴に追記する。
    ///
    /// 送信者と宛先が現在アクティブセッションを共有していなければ
    /// NoActiveSession。履歴上限超過は MessageCapacityExceeded。
    pub fn append_message(&mut self, message: ChatMessage) -> Result<(), LobbyError> {
        let capacity = self.message_capacity;
        let session = self
            .active_sessions
            .iter_mut()
            .find(|s| s.is_between(&message.from, &message.to))
            .ok_or_else(|| LobbyError::NoActiveSession {
                from: message.from.clone(),
                to: message.to.clone(),
            })?;
        if session.messages.len() >= capacity {
            return Err(LobbyError::MessageCapacityExceeded);
        }
        session.messages.push(message);
        Ok(())
    }

    // ----- スナップショット -----

    /// 全クライアント向けの読み取り専用ステータス
    ///
    /// `active_chats` はアクティブセッション中の参加者 ID の列挙。
    pub fn chat_status(&self) -> ChatStatus {
        let mut active_chats = Vec::new();
        for session in &self.active_sessions {
            active_chats.push(session.participant_a.clone());
            active_chats.push(session.participant_b.clone());
        }
        ChatStatus {
            active_chats,
            pending_requests: self.pending_requests.clone(),
        }
    }
}

impl Default for Lobby {
    fn default() -> Self {
        Self::new()
    }
}
