use clap::Parser;
use gpubot::{Bot, ConfigRegistry, UserStore};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "gpubot")]
#[command(about = "Chat-driven remote control for AutoDL GPU instances")]
#[command(version)]
struct Cli {
    /// Chat user id to act as
    #[arg(long, env = "GPUBOT_USER_ID", default_value_t = 0)]
    user: i64,
    /// Credential store location (defaults to ~/.gpubot/users.ini)
    #[arg(long)]
    store: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Read chat messages from stdin and print the replies, one detached task
/// per inbound line, the way a chat transport would dispatch updates.
async fn run(cli: Cli) -> gpubot::Result<()> {
    let store = match cli.store {
        Some(path) => UserStore::at_path(path),
        None => UserStore::new()?,
    };
    info!("Using credential store at {}", store.path().display());

    let registry = ConfigRegistry::load(store)?;
    let bot = Arc::new(Bot::new(registry));
    let user_id = cli.user;
    info!("gpubot started, acting as user {}", user_id);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let bot = Arc::clone(&bot);
        tokio::spawn(async move {
            let reply = bot.handle_message(user_id, &line).await;
            println!("{}", reply);
        });
    }
    Ok(())
}
