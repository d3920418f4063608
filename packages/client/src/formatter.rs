//! Terminal formatting for server pushes and search results.

use musubi_server::infrastructure::dto::http::SearchResultDto;
use musubi_server::infrastructure::dto::websocket::{
    ChatMessage, ChatRequestMessage, ChatStatusMessage, NewDataMessage,
};
use musubi_shared::time::timestamp_to_rfc3339;

/// Formats incoming events for terminal display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the ranked candidate list returned by the search endpoint.
    pub fn format_search_results(results: &[SearchResultDto]) -> String {
        if results.is_empty() {
            return "\nNo similar thoughts yet. Waiting for others...\n".to_string();
        }

        let mut out = String::from("\nSimilar thoughts:\n");
        for result in results {
            out.push_str(&format!(
                "  [{:>3}%] {} ({})\n",
                (result.score * 100.0).round() as i64,
                result.text,
                result.user_id
            ));
        }
        out.push_str("Use /request <userId> to start a chat.\n");
        out
    }

    /// Format an incoming chat request with its acceptance deadline.
    pub fn format_chat_request(request: &ChatRequestMessage) -> String {
        format!(
            "\n>>> '{}' wants to chat about: \"{}\"\n>>> Accept with /accept {} (expires at {})\n",
            request.from_user_id,
            request.thought_text,
            request.from_user_id,
            timestamp_to_rfc3339(request.expires_at)
        )
    }

    /// Format the session-opened notice.
    pub fn format_chat_accepted(counterpart: &str) -> String {
        format!(
            "\n*** Chat opened with '{}'. Type to talk, /close to leave. Chats are anonymous. ***\n",
            counterpart
        )
    }

    /// Format the session-closed notice.
    pub fn format_close_chat(counterpart: &str) -> String {
        format!("\n*** Chat with '{}' closed. ***\n", counterpart)
    }

    /// Format an in-session message.
    pub fn format_chat_message(message: &ChatMessage) -> String {
        format!("\n[{}] {}\n", message.from_user_id, message.text)
    }

    /// Format a new candidate delta.
    pub fn format_new_data(delta: &NewDataMessage) -> String {
        format!("\n+ new thought from '{}': \"{}\"\n", delta.user_id, delta.text)
    }

    /// Format a withdrawn candidate delta.
    pub fn format_deleted_data(thought_id: &str) -> String {
        format!("\n- a thought was withdrawn ({})\n", thought_id)
    }

    /// Format a chat status snapshot.
    pub fn format_chat_status(status: &ChatStatusMessage) -> String {
        let mut out = String::from("\nStatus:\n");
        if status.active_chats.is_empty() {
            out.push_str("  active chats: none\n");
        } else {
            out.push_str(&format!(
                "  active chats: {}\n",
                status.active_chats.join(", ")
            ));
        }
        if status.pending_requests.is_empty() {
            out.push_str("  pending requests: none\n");
        } else {
            for request in &status.pending_requests {
                out.push_str(&format!(
                    "  pending: {} -> {}\n",
                    request.from_user_id, request.to_user_id
                ));
            }
        }
        out
    }

    /// Fallback for unrecognized pushes.
    pub fn format_raw_message(text: &str) -> String {
        format!("\n(raw) {}\n", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use musubi_server::infrastructure::dto::websocket::{MessageType, PendingRequestInfo};

    #[test]
    fn test_format_search_results_shows_percentage_and_order() {
        // テスト項目: 検索結果がスコア百分率付きで並ぶ
        // given (前提条件):
        let results = vec![
            SearchResultDto {
                id: "t1".to_string(),
                user_id: "charlie".to_string(),
                text: "I love rainy days".to_string(),
                score: 1.0,
            },
            SearchResultDto {
                id: "t2".to_string(),
                user_id: "bob".to_string(),
                text: "I hate sunny days".to_string(),
                score: 0.42,
            },
        ];

        // when (操作):
        let formatted = MessageFormatter::format_search_results(&results);

        // then (期待する結果):
        assert!(formatted.contains("[100%] I love rainy days (charlie)"));
        assert!(formatted.contains("[ 42%] I hate sunny days (bob)"));
        let charlie_pos = formatted.find("charlie").unwrap();
        let bob_pos = formatted.find("bob").unwrap();
        assert!(charlie_pos < bob_pos);
    }

    #[test]
    fn test_format_search_results_empty() {
        // テスト項目: 候補ゼロのときの表示
        // given (前提条件):
        let results: Vec<SearchResultDto> = Vec::new();

        // when (操作):
        let formatted = MessageFormatter::format_search_results(&results);

        // then (期待する結果):
        assert!(formatted.contains("No similar thoughts yet"));
    }

    #[test]
    fn test_format_chat_request_names_sender_and_deadline() {
        // テスト項目: 着信リクエストの表示に送信者と期限が含まれる
        // given (前提条件):
        let request = ChatRequestMessage {
            r#type: MessageType::ChatRequest,
            from_user_id: "alice".to_string(),
            to_user_id: "bob".to_string(),
            thought_text: "I love rainy days".to_string(),
            expires_at: 1672531205000,
        };

        // when (操作):
        let formatted = MessageFormatter::format_chat_request(&request);

        // then (期待する結果):
        assert!(formatted.contains("'alice' wants to chat"));
        assert!(formatted.contains("/accept alice"));
        assert!(formatted.contains("2023-01-01"));
    }

    #[test]
    fn test_format_chat_status_lists_pending_pairs() {
        // テスト項目: ステータス表示が保留ペアを列挙する
        // given (前提条件):
        let status = ChatStatusMessage {
            r#type: MessageType::ChatStatus,
            active_chats: vec!["dave".to_string(), "erin".to_string()],
            pending_requests: vec![PendingRequestInfo {
                from_user_id: "alice".to_string(),
                to_user_id: "bob".to_string(),
                thought_text: "rainy".to_string(),
            }],
        };

        // when (操作):
        let formatted = MessageFormatter::format_chat_status(&status);

        // then (期待する結果):
        assert!(formatted.contains("active chats: dave, erin"));
        assert!(formatted.contains("pending: alice -> bob"));
    }

    #[test]
    fn test_format_chat_message() {
        // テスト項目: セッション内メッセージの表示
        // given (前提条件):
        let message = ChatMessage {
            r#type: MessageType::Message,
            from_user_id: "alice".to_string(),
            to_user_id: "bob".to_string(),
            text: "hello".to_string(),
            timestamp: 1672531200000,
        };

        // when (操作):
        let formatted = MessageFormatter::format_chat_message(&message);

        // then (期待する結果):
        assert_eq!(formatted, "\n[alice] hello\n");
    }
}
