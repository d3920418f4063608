//! ドメイン層のエラー定義

use thiserror::Error;

use super::value_object::ParticipantId;

/// 値オブジェクトのバリデーションエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} exceeds {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} contains control characters")]
    ControlCharacter { field: &'static str },
}

/// Lobby 集約の操作エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LobbyError {
    /// 相手または自分が既にセッション中・リクエスト中
    #[error("participant '{0}' is already busy")]
    AlreadyBusy(ParticipantId),

    /// 対象のリクエストが存在しない（既に解決済みを含む）
    #[error("no pending request from '{from}' to '{to}'")]
    RequestNotFound { from: ParticipantId, to: ParticipantId },

    /// 同一ペア間に未解決のリクエストが既に存在する
    #[error("request from '{from}' to '{to}' already pending")]
    DuplicateRequest { from: ParticipantId, to: ParticipantId },

    #[error("participant '{0}' is already registered")]
    DuplicateParticipant(ParticipantId),

    #[error("participant '{0}' is not registered")]
    ParticipantNotFound(ParticipantId),

    #[error("lobby participant capacity exceeded")]
    LobbyFull,

    /// 送信者と宛先の間にアクティブセッションが無い
    #[error("no active session between '{from}' and '{to}'")]
    NoActiveSession { from: ParticipantId, to: ParticipantId },

    #[error("session message capacity exceeded")]
    MessageCapacityExceeded,
}

/// メッセージ送信（push）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("client '{0}' not found")]
    ClientNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),
}
