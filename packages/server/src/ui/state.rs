//! Server state shared across handlers.

use std::sync::Arc;

use crate::domain::LobbyRepository;
use crate::usecase::{
    AcceptChatUseCase, ChatStatusUseCase, CloseChatUseCase, ConnectParticipantUseCase,
    DisconnectParticipantUseCase, RequestChatUseCase, ResolveRequestUseCase, SendMessageUseCase,
    SubmitThoughtUseCase, WithdrawThoughtUseCase,
};

/// Shared application state
pub struct AppState {
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    pub submit_thought_usecase: Arc<SubmitThoughtUseCase>,
    pub withdraw_thought_usecase: Arc<WithdrawThoughtUseCase>,
    pub request_chat_usecase: Arc<RequestChatUseCase>,
    pub accept_chat_usecase: Arc<AcceptChatUseCase>,
    pub resolve_request_usecase: Arc<ResolveRequestUseCase>,
    pub close_chat_usecase: Arc<CloseChatUseCase>,
    pub send_message_usecase: Arc<SendMessageUseCase>,
    pub chat_status_usecase: Arc<ChatStatusUseCase>,
    /// Repository handle for the debug endpoint
    pub repository: Arc<dyn LobbyRepository>,
}
