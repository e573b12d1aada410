use std::path::PathBuf;

#[derive(clap::Parser, Debug, Clone)]
#[command(version, about = "Guess the secret code")]
pub struct Cli {
    /// TOML config file. Defaults to `$MASTERMIND_TOML` or `./mastermind.toml`.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Skip random.org and draw secrets locally.
    #[arg(long)]
    pub local: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.unwrap_or_default()
    }

    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(mastermind::AppConfig::path_from_env)
    }
}

#[derive(clap::Subcommand, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Command {
    /// Play a game, resuming the last one if it was left unfinished.
    #[default]
    Play,

    /// List stored games.
    History,

    /// Delete every stored game.
    Clear,

    /// Show how many random bits random.org still allows today.
    Quota,
}
