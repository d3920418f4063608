//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get},
};
use tower_http::trace::TraceLayer;

use crate::domain::LobbyRepository;
use crate::usecase::{
    AcceptChatUseCase, ChatStatusUseCase, CloseChatUseCase, ConnectParticipantUseCase,
    DisconnectParticipantUseCase, RequestChatUseCase, ResolveRequestUseCase, SendMessageUseCase,
    SubmitThoughtUseCase, WithdrawThoughtUseCase,
};

use super::{
    handler::{
        http::{debug_lobby_state, health_check, search, withdraw_thought},
        websocket::websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Musubi coordination server
///
/// Owns the wired use cases and exposes them over one WebSocket endpoint
/// plus a small HTTP API.
pub struct Server {
    connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    submit_thought_usecase: Arc<SubmitThoughtUseCase>,
    withdraw_thought_usecase: Arc<WithdrawThoughtUseCase>,
    request_chat_usecase: Arc<RequestChatUseCase>,
    accept_chat_usecase: Arc<AcceptChatUseCase>,
    resolve_request_usecase: Arc<ResolveRequestUseCase>,
    close_chat_usecase: Arc<CloseChatUseCase>,
    send_message_usecase: Arc<SendMessageUseCase>,
    chat_status_usecase: Arc<ChatStatusUseCase>,
    repository: Arc<dyn LobbyRepository>,
}

impl Server {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        connect_participant_usecase: Arc<ConnectParticipantUseCase>,
        disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
        submit_thought_usecase: Arc<SubmitThoughtUseCase>,
        withdraw_thought_usecase: Arc<WithdrawThoughtUseCase>,
        request_chat_usecase: Arc<RequestChatUseCase>,
        accept_chat_usecase: Arc<AcceptChatUseCase>,
        resolve_request_usecase: Arc<ResolveRequestUseCase>,
        close_chat_usecase: Arc<CloseChatUseCase>,
        send_message_usecase: Arc<SendMessageUseCase>,
        chat_status_usecase: Arc<ChatStatusUseCase>,
        repository: Arc<dyn LobbyRepository>,
    ) -> Self {
        Self {
            connect_participant_usecase,
            disconnect_participant_usecase,
            submit_thought_usecase,
            withdraw_thought_usecase,
            request_chat_usecase,
            accept_chat_usecase,
            resolve_request_usecase,
            close_chat_usecase,
            send_message_usecase,
            chat_status_usecase,
            repository,
        }
    }

    /// Run the coordination server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address
    /// or if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app_state = Arc::new(AppState {
            connect_participant_usecase: self.connect_participant_usecase,
            disconnect_participant_usecase: self.disconnect_participant_usecase,
            submit_thought_usecase: self.submit_thought_usecase,
            withdraw_thought_usecase: self.withdraw_thought_usecase,
            request_chat_usecase: self.request_chat_usecase,
            accept_chat_usecase: self.accept_chat_usecase,
            resolve_request_usecase: self.resolve_request_usecase,
            close_chat_usecase: self.close_chat_usecase,
            send_message_usecase: self.send_message_usecase,
            chat_status_usecase: self.chat_status_usecase,
            repository: self.repository,
        });

        // Define handlers
        let app = Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/search", get(search))
            .route("/search/{user_id}/{query}", delete(withdraw_thought))
            .route("/api/health", get(health_check))
            .route("/debug/lobby", get(debug_lobby_state))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state);

        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        // Start the server
        tracing::info!(
            "Musubi coordination server listening on {}",
            listener.local_addr()?
        );
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        // Set up graceful shutdown signal handler
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
