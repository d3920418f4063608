//! MessagePusher trait 定義
//!
//! クライアントへのメッセージ通知の抽象化。WebSocket 実装は
//! Infrastructure 層が提供します。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::error::MessagePushError;
use super::value_object::ParticipantId;

/// クライアントへの送信チャンネル
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// メッセージ通知の trait
///
/// broadcast は各チャンネルへの fire-and-forget であり、一部クライアント
/// への送信失敗は全体を失敗させない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// クライアントのチャンネルを登録
    async fn register_client(&self, id: ParticipantId, sender: PusherChannel);

    /// クライアントのチャンネルを解除
    async fn unregister_client(&self, id: &ParticipantId);

    /// 特定クライアントへ送信
    async fn push_to(&self, id: &ParticipantId, content: &str) -> Result<(), MessagePushError>;

    /// 指定ターゲット群へ送信（部分失敗を許容）
    async fn broadcast(
        &self,
        targets: Vec<ParticipantId>,
        content: &str,
    ) -> Result<(), MessagePushError>;
}
