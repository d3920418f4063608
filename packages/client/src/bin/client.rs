//! Musubi CLI client.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin musubi-client -- --user-id alice --thought "I love rainy days"
//! cargo run --bin musubi-client -- --server http://127.0.0.1:3000 --user-id bob --thought "..."
//! ```

use clap::Parser;

use musubi_client::session::run_client_session;
use musubi_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "musubi-client")]
#[command(about = "CLI client for the Musubi thought-matching chat", long_about = None)]
struct Args {
    /// Base URL of the coordination server
    #[arg(short, long, default_value = "http://127.0.0.1:8080")]
    server: String,

    /// Participant id to register as
    #[arg(short, long)]
    user_id: String,

    /// The thought to submit for matching
    #[arg(short, long)]
    thought: String,
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "warn");

    let args = Args::parse();

    if let Err(e) = run_client_session(&args.server, &args.user_id, &args.thought).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
