//! WebSocket client session management.

use std::io::Write as _;
use std::sync::{Arc, Mutex};

use futures_util::{SinkExt, StreamExt};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use musubi_server::infrastructure::dto::http::SearchResultDto;
use musubi_server::infrastructure::dto::websocket::{
    ChatAcceptedMessage, ChatMessage, ChatRequestMessage, ChatStatusMessage, ClientEvent,
    DeletedDataMessage, NewDataMessage,
};

use crate::command::{Command, parse_line};
use crate::error::ClientError;
use crate::formatter::MessageFormatter;

/// The chat counterpart, shared between the read and write tasks.
type PeerHandle = Arc<Mutex<Option<String>>>;

/// Print the prompt again after asynchronous output interrupted it.
fn redisplay_prompt(user_id: &str) {
    print!("{}> ", user_id);
    let _ = std::io::stdout().flush();
}

/// Submit the thought and print the ranked candidate list.
async fn submit_thought(
    server: &str,
    user_id: &str,
    thought: &str,
) -> Result<Vec<SearchResultDto>, ClientError> {
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/search", server))
        .query(&[("user_id", user_id), ("query", thought)])
        .send()
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

    if !response.status().is_success() {
        return Err(ClientError::ServerError(format!(
            "search failed with status {}",
            response.status()
        )));
    }

    response
        .json::<Vec<SearchResultDto>>()
        .await
        .map_err(|e| ClientError::ServerError(e.to_string()))
}

/// Run the client session: submit the thought, connect, and hand control to
/// the interactive loop.
pub async fn run_client_session(
    server: &str,
    user_id: &str,
    thought: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    // 1. Submit the thought over HTTP and show the ranked candidates
    let results = submit_thought(server, user_id, thought).await?;
    print!("{}", MessageFormatter::format_search_results(&results));

    // 2. Open the WebSocket with the same identity
    let ws_base = if let Some(rest) = server.strip_prefix("https") {
        format!("wss{}", rest)
    } else if let Some(rest) = server.strip_prefix("http") {
        format!("ws{}", rest)
    } else {
        server.to_string()
    };
    let url = format!("{}/ws?client_id={}", ws_base, user_id);

    let (ws_stream, response) = match connect_async(&url).await {
        Ok(result) => result,
        Err(e) => {
            let error_msg = e.to_string();
            if error_msg.contains("409") || error_msg.contains("Conflict") {
                return Err(Box::new(ClientError::DuplicateUserId(user_id.to_string())));
            }
            return Err(Box::new(ClientError::ConnectionError(error_msg)));
        }
    };
    if response.status().as_u16() == 409 {
        return Err(Box::new(ClientError::DuplicateUserId(user_id.to_string())));
    }

    tracing::info!("Connected to coordination server");
    println!(
        "\nYou are '{}'. /request <userId> to chat, /accept <userId> on incoming requests,\n\
         plain text to talk, /close to leave a chat, /quit to exit.\n",
        user_id
    );

    let (mut write, mut read) = ws_stream.split();
    let peer: PeerHandle = Arc::new(Mutex::new(None));

    // 3. Read task: render server pushes and track the current counterpart
    let peer_for_read = peer.clone();
    let user_id_for_read = user_id.to_string();
    let mut read_task = tokio::spawn(async move {
        let mut connection_error = false;

        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    render_push(&text, &user_id_for_read, &peer_for_read);
                    redisplay_prompt(&user_id_for_read);
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    connection_error = true;
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    connection_error = true;
                    break;
                }
                _ => {}
            }
        }

        connection_error
    });

    // 4. Readline thread feeding the write task
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();
    let user_id_for_prompt = user_id.to_string();
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        let prompt = format!("{}> ", user_id_for_prompt);

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    // 5. Write task: turn input lines into protocol events
    let peer_for_write = peer.clone();
    let user_id_for_write = user_id.to_string();
    let thought_for_write = thought.to_string();
    let mut write_task = tokio::spawn(async move {
        let mut write_error = false;

        while let Some(line) = input_rx.recv().await {
            let Some(command) = parse_line(&line) else {
                println!("Unrecognized command: {}", line);
                continue;
            };

            let event = match command {
                Command::Quit => break,
                Command::Request { to } => ClientEvent::ChatRequest {
                    from_user_id: user_id_for_write.clone(),
                    to_user_id: to,
                    thought_text: thought_for_write.clone(),
                },
                Command::Accept { from } => ClientEvent::AcceptChat {
                    from_user_id: from,
                    to_user_id: user_id_for_write.clone(),
                },
                Command::Decline { from } => ClientEvent::DeclineChat {
                    from_user_id: from,
                    to_user_id: user_id_for_write.clone(),
                },
                Command::Status => ClientEvent::ChatStatus {},
                Command::Close => {
                    let Some(counterpart) = peer_for_write.lock().unwrap().take() else {
                        println!("No active chat to close.");
                        continue;
                    };
                    ClientEvent::CloseChat {
                        from_user_id: user_id_for_write.clone(),
                        to_user_id: counterpart,
                    }
                }
                Command::Say { text } => {
                    let Some(counterpart) = peer_for_write.lock().unwrap().clone() else {
                        println!("No active chat. /request <userId> first.");
                        continue;
                    };
                    // Local echo; the server only delivers to the counterpart
                    println!("[{}] {}", user_id_for_write, text);
                    ClientEvent::Message {
                        from_user_id: user_id_for_write.clone(),
                        to_user_id: counterpart,
                        text,
                    }
                }
            };

            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to serialize event: {}", e);
                    continue;
                }
            };

            if let Err(e) = write.send(Message::Text(json.into())).await {
                tracing::warn!("Failed to send event: {}", e);
                write_error = true;
                break;
            }
        }

        write_error
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        read_result = &mut read_task => {
            write_task.abort();
            if read_result.unwrap_or(false) {
                return Err(Box::new(ClientError::ConnectionError(
                    "Connection lost".to_string(),
                )));
            }
        }
        write_result = &mut write_task => {
            read_task.abort();
            if write_result.unwrap_or(false) {
                return Err(Box::new(ClientError::ConnectionError(
                    "Connection lost".to_string(),
                )));
            }
        }
    }

    Ok(())
}

/// Render one server push, updating the tracked counterpart as chats open
/// and close. Pushes are dispatched on their `type` tag.
fn render_push(text: &str, user_id: &str, peer: &PeerHandle) {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(text) else {
        print!("{}", MessageFormatter::format_raw_message(text));
        return;
    };

    match value.get("type").and_then(|t| t.as_str()) {
        Some("chatStatus") => {
            if let Ok(status) = serde_json::from_value::<ChatStatusMessage>(value) {
                print!("{}", MessageFormatter::format_chat_status(&status));
            }
        }
        Some("newData") => {
            if let Ok(delta) = serde_json::from_value::<NewDataMessage>(value) {
                print!("{}", MessageFormatter::format_new_data(&delta));
            }
        }
        Some("deletedData") => {
            if let Ok(delta) = serde_json::from_value::<DeletedDataMessage>(value) {
                print!("{}", MessageFormatter::format_deleted_data(&delta.id));
            }
        }
        Some("chatRequest") => {
            if let Ok(request) = serde_json::from_value::<ChatRequestMessage>(value) {
                print!("{}", MessageFormatter::format_chat_request(&request));
            }
        }
        Some("chatAccepted") => {
            if let Ok(accepted) = serde_json::from_value::<ChatAcceptedMessage>(value) {
                let counterpart = if accepted.from_user_id == user_id {
                    accepted.to_user_id
                } else {
                    accepted.from_user_id
                };
                *peer.lock().unwrap() = Some(counterpart.clone());
                print!("{}", MessageFormatter::format_chat_accepted(&counterpart));
            }
        }
        Some("closeChat") => {
            let counterpart = peer.lock().unwrap().take();
            print!(
                "{}",
                MessageFormatter::format_close_chat(counterpart.as_deref().unwrap_or("?"))
            );
        }
        Some("message") => {
            if let Ok(message) = serde_json::from_value::<ChatMessage>(value) {
                print!("{}", MessageFormatter::format_chat_message(&message));
            }
        }
        _ => {
            print!("{}", MessageFormatter::format_raw_message(text));
        }
    }
}
