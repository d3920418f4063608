//! Musubi coordination server.
//!
//! Participants submit a thought, see similarity-ranked candidates, and
//! negotiate ephemeral one-to-one chat sessions over WebSocket.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin musubi-server
//! cargo run --bin musubi-server -- --host 0.0.0.0 --port 3000
//! ```

use std::{collections::HashMap, sync::Arc, time::Duration};

use clap::Parser;
use tokio::sync::Mutex;

use musubi_server::{
    domain::Lobby,
    infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::InMemoryLobbyRepository,
        timer::NegotiationTimers,
    },
    ui::Server,
    usecase::{
        AcceptChatUseCase, ChatStatusUseCase, CloseChatUseCase, ConnectParticipantUseCase,
        DisconnectParticipantUseCase, RequestChatUseCase, ResolveRequestUseCase,
        SendMessageUseCase, SubmitThoughtUseCase, WithdrawThoughtUseCase,
    },
};
use musubi_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "musubi-server")]
#[command(about = "Anonymous thought-matching chat coordination server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Seconds a chat request stays acceptable before it expires
    #[arg(long, default_value = "5")]
    accept_window_secs: u64,

    /// Seconds the requester waits for a response before giving up
    #[arg(long, default_value = "6")]
    response_window_secs: u64,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Repository
    // 2. MessagePusher
    // 3. Timers / Clock
    // 4. UseCases
    // 5. Server

    // 1. Create Repository (in-memory lobby)
    let lobby = Arc::new(Mutex::new(Lobby::new()));
    let repository = Arc::new(InMemoryLobbyRepository::new(lobby));

    // 2. Create MessagePusher (WebSocket implementation)
    let pusher_clients = Arc::new(Mutex::new(HashMap::new()));
    let message_pusher = Arc::new(WebSocketMessagePusher::new(pusher_clients));

    // 3. Create negotiation timers and clock
    let timers = Arc::new(NegotiationTimers::new());
    let clock = Arc::new(SystemClock);

    // 4. Create UseCases
    let chat_status_usecase = Arc::new(ChatStatusUseCase::new(
        repository.clone(),
        message_pusher.clone(),
    ));
    let connect_participant_usecase = Arc::new(ConnectParticipantUseCase::new(
        repository.clone(),
        message_pusher.clone(),
        chat_status_usecase.clone(),
        clock.clone(),
    ));
    let disconnect_participant_usecase = Arc::new(DisconnectParticipantUseCase::new(
        repository.clone(),
        message_pusher.clone(),
        timers.clone(),
        chat_status_usecase.clone(),
    ));
    let submit_thought_usecase = Arc::new(SubmitThoughtUseCase::new(
        repository.clone(),
        message_pusher.clone(),
        clock.clone(),
    ));
    let withdraw_thought_usecase = Arc::new(WithdrawThoughtUseCase::new(
        repository.clone(),
        message_pusher.clone(),
    ));
    let resolve_request_usecase = Arc::new(ResolveRequestUseCase::new(
        repository.clone(),
        timers.clone(),
        chat_status_usecase.clone(),
    ));
    let request_chat_usecase = Arc::new(RequestChatUseCase::with_windows(
        repository.clone(),
        message_pusher.clone(),
        timers.clone(),
        chat_status_usecase.clone(),
        resolve_request_usecase.clone(),
        clock.clone(),
        Duration::from_secs(args.accept_window_secs),
        Duration::from_secs(args.response_window_secs),
    ));
    let accept_chat_usecase = Arc::new(AcceptChatUseCase::new(
        repository.clone(),
        message_pusher.clone(),
        timers.clone(),
        chat_status_usecase.clone(),
        clock.clone(),
    ));
    let close_chat_usecase = Arc::new(CloseChatUseCase::new(
        repository.clone(),
        message_pusher.clone(),
        chat_status_usecase.clone(),
    ));
    let send_message_usecase = Arc::new(SendMessageUseCase::new(
        repository.clone(),
        message_pusher.clone(),
        clock.clone(),
    ));

    // 5. Create and run the server
    let server = Server::new(
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
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
