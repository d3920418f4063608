//! ドメイン層
//!
//! 参加者・思考・チャットリクエスト・チャットセッションのドメインモデルと、
//! 類似度ランキングの純粋ロジック、および Infrastructure 層が実装する
//! インターフェース（Repository / MessagePusher）を定義します。

pub mod entity;
pub mod error;
pub mod pusher;
pub mod repository;
pub mod similarity;
pub mod value_object;

pub use entity::{
    ChatMessage, ChatRequest, ChatSession, ChatStatus, Lobby, Participant, RequestOutcome, Thought,
};
pub use error::{LobbyError, MessagePushError, ValueObjectError};
pub use pusher::{MessagePusher, PusherChannel};
pub use repository::LobbyRepository;
pub use similarity::{RankedCandidate, rank, similarity_score};
pub use value_object::{
    MessageContent, ParticipantId, RequestId, RequestIdFactory, ThoughtId, ThoughtIdFactory,
    ThoughtText, Timestamp,
};
