//! WebSocket イベントの DTO 定義
//!
//! 全てのワイヤメッセージは camelCase の `type` タグ付き JSON。
//! クライアント発イベントは `ClientEvent`（タグ付き enum）で一括パースし、
//! 未知のタグや欠損フィールドは境界で弾く。サーバ発プッシュは
//! メッセージごとの構造体で、`r#type` フィールドに種別を持たせる。

use serde::{Deserialize, Serialize};

/// サーバ発プッシュの種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageType {
    ChatStatus,
    NewData,
    DeletedData,
    ChatRequest,
    ChatAccepted,
    CloseChat,
    Message,
}

/// クライアント発イベント
///
/// `type` フィールドで判別する。パースに失敗したペイロードはコア状態に
/// 到達させず、警告ログだけ残して捨てる。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientEvent {
    #[serde(rename_all = "camelCase")]
    ChatRequest {
        from_user_id: String,
        to_user_id: String,
        thought_text: String,
    },
    #[serde(rename_all = "camelCase")]
    AcceptChat {
        from_user_id: String,
        to_user_id: String,
    },
    #[serde(rename_all = "camelCase")]
    DeclineChat {
        from_user_id: String,
        to_user_id: String,
    },
    #[serde(rename_all = "camelCase")]
    CloseChat {
        from_user_id: String,
        to_user_id: String,
    },
    #[serde(rename_all = "camelCase")]
    Message {
        from_user_id: String,
        to_user_id: String,
        text: String,
    },
    ChatStatus {},
}

/// 保留中リクエストのワイヤ表現
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRequestInfo {
    pub from_user_id: String,
    pub to_user_id: String,
    pub thought_text: String,
}

/// chatStatus プッシュ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatStatusMessage {
    pub r#type: MessageType,
    pub active_chats: Vec<String>,
    pub pending_requests: Vec<PendingRequestInfo>,
}

/// newData プッシュ（候補の追加）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDataMessage {
    pub r#type: MessageType,
    pub id: String,
    pub user_id: String,
    pub text: String,
}

/// deletedData プッシュ（候補の取り下げ）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedDataMessage {
    pub r#type: MessageType,
    pub id: String,
}

/// chatRequest プッシュ（ターゲットへの着信通知）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequestMessage {
    pub r#type: MessageType,
    pub from_user_id: String,
    pub to_user_id: String,
    pub thought_text: String,
    /// 受諾期限（Unix ミリ秒）
    pub expires_at: i64,
}

/// chatAccepted プッシュ（両当事者へ）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatAcceptedMessage {
    pub r#type: MessageType,
    pub from_user_id: String,
    pub to_user_id: String,
}

/// closeChat プッシュ（相手方へ）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseChatMessage {
    pub r#type: MessageType,
    pub from_user_id: String,
    pub to_user_id: String,
}

/// message プッシュ（セッション内メッセージの配送）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub r#type: MessageType,
    pub from_user_id: String,
    pub to_user_id: String,
    pub text: String,
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_event_chat_request_roundtrip() {
        // テスト項目: chatRequest イベントが camelCase タグでパースされる
        // given (前提条件):
        let json = r#"{"type":"chatRequest","fromUserId":"alice","toUserId":"bob","thoughtText":"I love rainy days"}"#;

        // when (操作):
        let event: ClientEvent = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        assert_eq!(
            event,
            ClientEvent::ChatRequest {
                from_user_id: "alice".to_string(),
                to_user_id: "bob".to_string(),
                thought_text: "I love rainy days".to_string(),
            }
        );
    }

    #[test]
    fn test_client_event_chat_status_pull() {
        // テスト項目: ペイロードなしの chatStatus プルがパースされる
        // given (前提条件):
        let json = r#"{"type":"chatStatus"}"#;

        // when (操作):
        let event: ClientEvent = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        assert_eq!(event, ClientEvent::ChatStatus {});
    }

    #[test]
    fn test_client_event_rejects_unknown_tag() {
        // テスト項目: 未知のタグは境界で拒否される
        // given (前提条件):
        let json = r#"{"type":"selfDestruct","fromUserId":"alice"}"#;

        // when (操作):
        let result = serde_json::from_str::<ClientEvent>(json);

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_client_event_rejects_missing_field() {
        // テスト項目: 必須フィールド欠損は境界で拒否される
        // given (前提条件):
        let json = r#"{"type":"message","fromUserId":"alice","text":"hi"}"#;

        // when (操作):
        let result = serde_json::from_str::<ClientEvent>(json);

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_chat_status_message_serializes_camel_case() {
        // テスト項目: chatStatus プッシュが camelCase で直列化される
        // given (前提条件):
        let msg = ChatStatusMessage {
            r#type: MessageType::ChatStatus,
            active_chats: vec!["alice".to_string()],
            pending_requests: vec![PendingRequestInfo {
                from_user_id: "bob".to_string(),
                to_user_id: "charlie".to_string(),
                thought_text: "rainy".to_string(),
            }],
        };

        // when (操作):
        let json = serde_json::to_string(&msg).unwrap();

        // then (期待する結果):
        assert!(json.contains(r#""type":"chatStatus""#));
        assert!(json.contains(r#""activeChats":["alice"]"#));
        assert!(json.contains(r#""fromUserId":"bob""#));
    }

    #[test]
    fn test_chat_request_message_carries_deadline() {
        // テスト項目: chatRequest プッシュが expiresAt を運ぶ
        // given (前提条件):
        let msg = ChatRequestMessage {
            r#type: MessageType::ChatRequest,
            from_user_id: "alice".to_string(),
            to_user_id: "bob".to_string(),
            thought_text: "I love rainy days".to_string(),
            expires_at: 1672531205000,
        };

        // when (操作):
        let json = serde_json::to_string(&msg).unwrap();

        // then (期待する結果):
        assert!(json.contains(r#""expiresAt":1672531205000"#));
    }
}
