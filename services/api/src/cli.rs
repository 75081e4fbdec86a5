use crate::demo::{run_demo, DemoArgs};
use crate::listen::{run_listen, ListenArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use hris::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "HRIS Notifications",
    about = "Run the leave/absence workflow service and watch its notifications",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Subscribe through Redis as a user and print the live feed
    Listen(ListenArgs),
    /// Run an in-process scenario and print every delivered message
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// JSON file with employees and department supervisors
    #[arg(long)]
    pub(crate) seed: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Listen(args) => run_listen(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["hris-api"]).expect("parse");
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["hris-api", "listen", "--user", "sup-finance"])
            .expect("parse");
        match cli.command {
            Some(Command::Listen(args)) => assert_eq!(args.user, "sup-finance"),
            other => panic!("expected listen, got {other:?}"),
        }
    }
}
