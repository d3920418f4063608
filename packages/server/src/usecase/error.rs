//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{LobbyError, ValueObjectError};

/// 参加者接続のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    /// 同じ ID のクライアントが既に接続している
    #[error("client '{0}' is already connected")]
    DuplicateParticipantId(String),

    /// ロビーの定員超過
    #[error("lobby is full")]
    LobbyFull,
}

/// 思考提出のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitThoughtError {
    #[error(transparent)]
    Validation(#[from] ValueObjectError),
}

/// 思考取り下げのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WithdrawThoughtError {
    /// 一致する思考が無い
    #[error("no matching thought to withdraw")]
    ThoughtNotFound,
}

/// チャットリクエスト作成のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestChatError {
    /// 自分自身へのリクエスト
    #[error("cannot request a chat with yourself")]
    SelfRequest,

    /// 宛先が接続していない
    #[error("participant '{0}' is not connected")]
    TargetUnavailable(String),

    #[error(transparent)]
    Validation(#[from] ValueObjectError),

    /// AlreadyBusy / DuplicateRequest はここに包まれる
    #[error(transparent)]
    Lobby(#[from] LobbyError),
}

/// チャットリクエスト受諾のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcceptChatError {
    /// RequestNotFound / AlreadyBusy はここに包まれる
    #[error(transparent)]
    Lobby(#[from] LobbyError),
}

impl AcceptChatError {
    /// 解決済み・未知のリクエストへの受諾か（no-op 扱いにする判定）
    pub fn is_request_not_found(&self) -> bool {
        matches!(self, Self::Lobby(LobbyError::RequestNotFound { .. }))
    }
}

/// メッセージ送信のエラー
///
/// NoActiveSession は「セッション外配送」であり、送信者へのエラー返却は
/// しない（ハンドラ側でログに残して捨てる）。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error("no active session between '{from}' and '{to}'")]
    NoActiveSession { from: String, to: String },

    #[error("session message capacity exceeded")]
    CapacityExceeded,

    #[error("failed to push message: {0}")]
    PushFailed(String),
}
