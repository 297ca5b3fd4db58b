//! Nightfall: hosts one mafia game over the console.
//!
//! Host commands are read from stdin, one per line (`join`, `start`, `say`,
//! `leave`, `quit`). Everything a player sees is written to stdout, one
//! `@<name> ...` line per delivery. Logs go to stderr.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use nightfall::config::GameConfig;
use nightfall::engine::Game;
use nightfall::game::{Player, PlayerId};
use nightfall::host::ConsoleHost;
use nightfall::logging::{init_logging, LogFormat};
use nightfall::protocol::{parse_command, Command};
use nightfall::session::{self, Input};

#[derive(Debug, Parser)]
#[command(name = "nightfall", version, about = "Host a mafia game over stdin/stdout")]
struct Cli {
    /// JSON file with phase timings.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Role shuffle seed (0 = random). Overrides the config file.
    #[arg(long, env = "NIGHTFALL_SEED")]
    seed: Option<u64>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Human)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.verbose);

    let mut config = match &cli.config {
        Some(path) => match GameConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                error!(error = %e, "failed to load config");
                eprintln!("nightfall: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => GameConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    let (game, ticks) = Game::new(config, ConsoleHost::new(std::io::stdout()));
    let (tx, rx) = mpsc::channel(64);
    tokio::spawn(read_commands(tx));

    info!("hosting");
    session::run(game, ticks, rx).await;
    ExitCode::SUCCESS
}

/// Reads host commands from stdin until `quit` or end of input.
async fn read_commands(tx: mpsc::Sender<Input>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ids: HashMap<String, PlayerId> = HashMap::new();
    let mut next_id = 0u32;

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "failed to read stdin");
                break;
            }
        };
        let Some(cmd) = parse_command(&line) else {
            continue;
        };

        let input = match cmd {
            Command::Join { name } => {
                let id = *ids.entry(name.clone()).or_insert_with(|| {
                    next_id += 1;
                    PlayerId(next_id)
                });
                Input::Join(Player { id, username: name })
            }
            Command::Start => Input::Start,
            Command::Say { name, text } => match ids.get(&name) {
                Some(&from) => Input::Message { from, text },
                None => {
                    warn!(player = %name, "say from a player who never joined");
                    continue;
                }
            },
            Command::Leave { name } => match ids.get(&name) {
                Some(&id) => Input::Leave(id),
                None => {
                    warn!(player = %name, "leave from a player who never joined");
                    continue;
                }
            },
            Command::Quit => break,
        };
        if tx.send(input).await.is_err() {
            return;
        }
    }
    let _ = tx.send(Input::Shutdown).await;
}
