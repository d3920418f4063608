//! UseCase 層
//!
//! 1 ユースケース 1 ファイル。各ユースケースは Repository / MessagePusher /
//! タイマーの抽象に依存し、トランスポート（axum ハンドラ）から呼ばれる。

mod accept_chat;
mod chat_status;
mod close_chat;
mod connect_participant;
mod disconnect_participant;
pub mod error;
mod request_chat;
mod resolve_request;
mod send_message;
mod submit_thought;
mod withdraw_thought;

pub use accept_chat::AcceptChatUseCase;
pub use chat_status::ChatStatusUseCase;
pub use close_chat::CloseChatUseCase;
pub use connect_participant::ConnectParticipantUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{
    AcceptChatError, ConnectError, RequestChatError, SendMessageError, SubmitThoughtError,
    WithdrawThoughtError,
};
pub use request_chat::RequestChatUseCase;
pub use resolve_request::ResolveRequestUseCase;
pub use send_message::SendMessageUseCase;
pub use submit_thought::SubmitThoughtUseCase;
pub use withdraw_thought::WithdrawThoughtUseCase;
