//! Input line parsing for the interactive loop.
//!
//! Pure logic, separated from the session so it can be tested without a
//! terminal or a connection.

/// A parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/request <userId>` — send a chat request to a candidate
    Request { to: String },
    /// `/accept <userId>` — accept the pending request from that user
    Accept { from: String },
    /// `/decline <userId>` — decline the pending request from that user
    Decline { from: String },
    /// `/close` — close the current chat session
    Close,
    /// `/status` — pull a fresh chat status snapshot
    Status,
    /// `/quit` — leave
    Quit,
    /// Anything else — a chat message to the current counterpart
    Say { text: String },
}

/// Parse one input line. Returns None for blank lines.
pub fn parse_line(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if let Some(rest) = line.strip_prefix('/') {
        let mut parts = rest.splitn(2, char::is_whitespace);
        let verb = parts.next().unwrap_or_default();
        let arg = parts.next().map(str::trim).unwrap_or_default();

        return match (verb, arg) {
            ("request", to) if !to.is_empty() => Some(Command::Request { to: to.to_string() }),
            ("accept", from) if !from.is_empty() => Some(Command::Accept {
                from: from.to_string(),
            }),
            ("decline", from) if !from.is_empty() => Some(Command::Decline {
                from: from.to_string(),
            }),
            ("close", _) => Some(Command::Close),
            ("status", _) => Some(Command::Status),
            ("quit", _) | ("exit", _) => Some(Command::Quit),
            // Unknown slash commands are not silently turned into messages
            _ => None,
        };
    }

    Some(Command::Say {
        text: line.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request_command() {
        // テスト項目: /request がターゲット付きでパースされる
        // given (前提条件):
        let line = "/request bob";

        // when (操作):
        let command = parse_line(line);

        // then (期待する結果):
        assert_eq!(
            command,
            Some(Command::Request {
                to: "bob".to_string()
            })
        );
    }

    #[test]
    fn test_parse_plain_text_as_message() {
        // テスト項目: スラッシュで始まらない行はメッセージになる
        // given (前提条件):
        let line = "hello there";

        // when (操作):
        let command = parse_line(line);

        // then (期待する結果):
        assert_eq!(
            command,
            Some(Command::Say {
                text: "hello there".to_string()
            })
        );
    }

    #[test]
    fn test_parse_blank_line_is_none() {
        // テスト項目: 空行は無視される
        // given (前提条件):
        let line = "   ";

        // when (操作):
        let command = parse_line(line);

        // then (期待する結果):
        assert_eq!(command, None);
    }

    #[test]
    fn test_parse_request_without_target_is_rejected() {
        // テスト項目: ターゲットの無い /request は無効
        // given (前提条件):
        let line = "/request";

        // when (操作):
        let command = parse_line(line);

        // then (期待する結果):
        assert_eq!(command, None);
    }

    #[test]
    fn test_parse_unknown_slash_command_is_rejected() {
        // テスト項目: 未知のスラッシュコマンドはメッセージ扱いにならない
        // given (前提条件):
        let line = "/frobnicate bob";

        // when (操作):
        let command = parse_line(line);

        // then (期待する結果):
        assert_eq!(command, None);
    }

    #[test]
    fn test_parse_close_and_status_and_quit() {
        // テスト項目: 引数なしコマンドがパースされる
        // given (前提条件):

        // when (操作):
        // then (期待する結果):
        assert_eq!(parse_line("/close"), Some(Command::Close));
        assert_eq!(parse_line("/status"), Some(Command::Status));
        assert_eq!(parse_line("/quit"), Some(Command::Quit));
        assert_eq!(parse_line("/exit"), Some(Command::Quit));
    }
}
