#![warn(clippy::perf)]
#![warn(clippy::unwrap_used)]

use std::process::ExitCode;

use clap::Parser;
use thisslime::TracingError;
use tracing::{info, warn};

use mastermind::{
    config::AppConfig,
    random::{Randomness, Remote},
    store::{GameStoreAsync, Memory, MongoDb},
    Error,
};

mod cli;
use cli::{Cli, Command};

mod console;
use console::{Console, ConsoleError};

mod logging;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    logging::init_tracing();

    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config_path()) {
        Ok(config) => config,
        Err(err) => {
            err.trace();
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };

    let result = match config.store.url.as_deref() {
        Some(url) => match MongoDb::connect(url, &config.store.database).await {
            Ok(store) => {
                info!(database = %config.store.database, "using mongodb game store");
                run(&cli, &config, store).await
            }
            Err(err) => {
                warn!(error = %err, "couldn't connect to mongodb, games won't outlive this run");
                run(&cli, &config, Memory::default()).await
            }
        },
        None => run(&cli, &config, Memory::default()).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            err.trace();
            eprintln!("{err}");

            match err {
                ConsoleError::Game(Error::InvalidConfiguration(_)) => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

async fn run<S>(cli: &Cli, config: &AppConfig, store: S) -> Result<(), ConsoleError>
where
    S: GameStoreAsync,
{
    let mut console = Console::stdio(store);

    match cli.command() {
        Command::Play => {
            let source = Randomness::from_config(&config.random, cli.local);
            console.play_rounds(config.game, &source).await.map(|_| ())
        }
        Command::History => console.history().await,
        Command::Clear => console.clear().await,
        Command::Quota => {
            let remote = Remote::new(&config.random)?;
            console.quota(&remote).await
        }
    }
}
