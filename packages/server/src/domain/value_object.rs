//! 値オブジェクト定義
//!
//! 境界でバリデーションされた不変の値。生の `String` / `i64` はドメイン層に
//! 持ち込まず、必ずここで値オブジェクトに変換してから扱います。

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValueObjectError;

/// 参加者 ID
///
/// クライアントが自己申告する不透明な文字列。認証はしない（プロセス生存中の
/// 一意性のみ接続時に保証する）。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub const MAX_LENGTH: usize = 64;

    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::Empty {
                field: "participant id",
            });
        }
        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(ValueObjectError::TooLong {
                field: "participant id",
                max: Self::MAX_LENGTH,
            });
        }
        if trimmed.chars().any(char::is_control) {
            return Err(ValueObjectError::ControlCharacter {
                field: "participant id",
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ParticipantId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 思考テキスト
///
/// マッチングのために提出される自由文。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThoughtText(String);

impl ThoughtText {
    pub const MAX_LENGTH: usize = 280;

    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::Empty {
                field: "thought text",
            });
        }
        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(ValueObjectError::TooLong {
                field: "thought text",
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ThoughtText {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// チャットメッセージ本文
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageContent(String);

impl MessageContent {
    pub const MAX_LENGTH: usize = 1000;

    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() {
            return Err(ValueObjectError::Empty {
                field: "message content",
            });
        }
        if value.chars().count() > Self::MAX_LENGTH {
            return Err(ValueObjectError::TooLong {
                field: "message content",
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageContent {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unix タイムスタンプ（ミリ秒、UTC）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// このタイムスタンプに期間（ミリ秒）を加算した新しいタイムスタンプ
    pub fn plus_millis(&self, millis: i64) -> Self {
        Self(self.0 + millis)
    }
}

/// 思考 ID（UUID v4）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThoughtId(String);

impl ThoughtId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() {
            return Err(ValueObjectError::Empty {
                field: "thought id",
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// ThoughtId のファクトリ
pub struct ThoughtIdFactory;

impl ThoughtIdFactory {
    pub fn generate() -> Result<ThoughtId, ValueObjectError> {
        ThoughtId::new(Uuid::new_v4().to_string())
    }
}

/// チャットリクエスト ID（UUID v4）
///
/// ワイヤ上のリクエストは (from, to) ペアで識別されるが、タイマーの
/// キーとして内部的に一意な ID を持たせる。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() {
            return Err(ValueObjectError::Empty {
                field: "request id",
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// RequestId のファクトリ
pub struct RequestIdFactory;

impl RequestIdFactory {
    pub fn generate() -> Result<RequestId, ValueObjectError> {
        RequestId::new(Uuid::new_v4().to_string())
    }
}
