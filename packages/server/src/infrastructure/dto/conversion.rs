//! DTO とドメインモデルの変換ロジック

use crate::domain::{entity, similarity::RankedCandidate};
use crate::infrastructure::dto::http::SearchResultDto;
use crate::infrastructure::dto::websocket as dto;

// ========================================
// Domain Model → DTO
// ========================================

impl From<entity::ChatRequest> for dto::PendingRequestInfo {
    fn from(model: entity::ChatRequest) -> Self {
        Self {
            from_user_id: model.from.into_string(),
            to_user_id: model.to.into_string(),
            thought_text: model.thought_text.into_string(),
        }
    }
}

impl From<entity::ChatStatus> for dto::ChatStatusMessage {
    fn from(model: entity::ChatStatus) -> Self {
        Self {
            r#type: dto::MessageType::ChatStatus,
            active_chats: model
                .active_chats
                .into_iter()
                .map(|id| id.into_string())
                .collect(),
            pending_requests: model
                .pending_requests
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}

impl From<entity::Thought> for dto::NewDataMessage {
    fn from(model: entity::Thought) -> Self {
        Self {
            r#type: dto::MessageType::NewData,
            id: model.id.into_string(),
            user_id: model.participant_id.into_string(),
            text: model.text.into_string(),
        }
    }
}

impl From<entity::ChatRequest> for dto::ChatRequestMessage {
    fn from(model: entity::ChatRequest) -> Self {
        Self {
            r#type: dto::MessageType::ChatRequest,
            from_user_id: model.from.into_string(),
            to_user_id: model.to.into_string(),
            thought_text: model.thought_text.into_string(),
            expires_at: model.deadline.value(),
        }
    }
}

impl From<entity::ChatMessage> for dto::ChatMessage {
    fn from(model: entity::ChatMessage) -> Self {
        Self {
            r#type: dto::MessageType::Message,
            from_user_id: model.from.into_string(),
            to_user_id: model.to.into_string(),
            text: model.content.into_string(),
            timestamp: model.timestamp.value(),
        }
    }
}

impl From<RankedCandidate> for SearchResultDto {
    fn from(model: RankedCandidate) -> Self {
        Self {
            id: model.thought_id.into_string(),
            user_id: model.participant_id.into_string(),
            text: model.text.into_string(),
            score: model.score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        MessageContent, ParticipantId, RequestIdFactory, ThoughtIdFactory, ThoughtText, Timestamp,
    };

    fn pid(s: &str) -> ParticipantId {
        ParticipantId::new(s.to_string()).unwrap()
    }

    #[test]
    fn test_domain_chat_request_to_pending_request_info() {
        // テスト項目: ドメインの ChatRequest が PendingRequestInfo に変換される
        // given (前提条件):
        let request = entity::ChatRequest::new(
            RequestIdFactory::generate().unwrap(),
            pid("alice"),
            pid("bob"),
            ThoughtText::new("I love rainy days".to_string()).unwrap(),
            Timestamp::new(1000),
            Timestamp::new(6000),
        );

        // when (操作):
        let info: dto::PendingRequestInfo = request.into();

        // then (期待する結果):
        assert_eq!(info.from_user_id, "alice");
        assert_eq!(info.to_user_id, "bob");
        assert_eq!(info.thought_text, "I love rainy days");
    }

    #[test]
    fn test_domain_chat_request_to_request_message_keeps_deadline() {
        // テスト項目: ChatRequestMessage が期限を expiresAt として保持する
        // given (前提条件):
        let request = entity::ChatRequest::new(
            RequestIdFactory::generate().unwrap(),
            pid("alice"),
            pid("bob"),
            ThoughtText::new("rainy".to_string()).unwrap(),
            Timestamp::new(1000),
            Timestamp::new(6000),
        );

        // when (操作):
        let msg: dto::ChatRequestMessage = request.into();

        // then (期待する結果):
        assert_eq!(msg.expires_at, 6000);
        assert!(matches!(msg.r#type, dto::MessageType::ChatRequest));
    }

    #[test]
    fn test_domain_chat_message_to_dto() {
        // テスト項目: ドメインの ChatMessage が DTO に変換される
        // given (前提条件):
        let message = entity::ChatMessage::new(
            pid("alice"),
            pid("bob"),
            MessageContent::new("Hello!".to_string()).unwrap(),
            Timestamp::new(2000),
        );

        // when (操作):
        let msg: dto::ChatMessage = message.into();

        // then (期待する結果):
        assert_eq!(msg.from_user_id, "alice");
        assert_eq!(msg.to_user_id, "bob");
        assert_eq!(msg.text, "Hello!");
        assert_eq!(msg.timestamp, 2000);
    }

    #[test]
    fn test_ranked_candidate_to_search_result() {
        // テスト項目: RankedCandidate が SearchResultDto に変換される
        // given (前提条件):
        let candidate = RankedCandidate {
            thought_id: ThoughtIdFactory::generate().unwrap(),
            participant_id: pid("bob"),
            text: ThoughtText::new("I love rainy days".to_string()).unwrap(),
            score: 1.0,
        };

        // when (操作):
        let dto: SearchResultDto = candidate.into();

        // then (期待する結果):
        assert_eq!(dto.user_id, "bob");
        assert_eq!(dto.text, "I love rainy days");
        assert!((dto.score - 1.0).abs() < f64::EPSILON);
    }
}
