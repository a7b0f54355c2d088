#[derive(clap::Parser, Debug, Clone)]
pub struct Cli {
    /// Path to the bot's TOML configuration, overriding `CONNECTIONSBOT_CONFIG`.
    #[arg(long)]
    pub config_path: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn notify_on_start(&self) -> bool {
        if let Command::Start(start) = &self.command {
            start.notify()
        } else {
            false
        }
    }
}

#[derive(clap::Subcommand, Debug, Clone)]
pub enum Command {
    /// Connect to Discord and start watching for scores.
    Start(Start),

    /// Print the parsed configuration.
    Config,

    /// Have the agent play every game from a number onwards.
    Train(Train),

    /// Re-derive every stored score from its transcript.
    Rescore,
}

impl Command {
    pub fn is_start(&self) -> bool {
        matches!(self, Self::Start(..))
    }
}

#[derive(clap::Args, Debug, Clone)]
pub struct Start {
    /// Say "ready!" in the status channel once connected.
    #[arg(long)]
    notify: bool,
}

impl Start {
    pub fn notify(&self) -> bool {
        self.notify
    }
}

#[derive(clap::Args, Debug, Clone)]
pub struct Train {
    #[arg(long)]
    from: u32,
}

impl Train {
    pub fn from(&self) -> u32 {
        self.from
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use pretty_assertions::assert_eq;

    use super::{Cli, Command};

    #[test]
    fn start_with_notify() {
        let cli = Cli::try_parse_from(["connectionsbot", "start", "--notify"]).unwrap();

        assert!(cli.command.is_start());
        assert!(cli.notify_on_start());
    }

    #[test]
    fn train_from() {
        let cli = Cli::try_parse_from(["connectionsbot", "train", "--from", "300"]).unwrap();

        let Command::Train(ref train) = cli.command else {
            panic!("should parse as train");
        };
        assert_eq!(train.from(), 300);
        assert!(!cli.notify_on_start());
    }

    #[test]
    fn config_path() {
        let cli =
            Cli::try_parse_from(["connectionsbot", "--config-path", "bot.toml", "rescore"]).unwrap();

        assert_eq!(cli.config_path.as_deref(), Some("bot.toml"));
        assert!(matches!(cli.command, Command::Rescore));
    }
}
