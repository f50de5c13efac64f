use crate::commands::{
    run_fechas, run_rif_check, run_rif_complete, run_session, FechasArgs, SessionCommand,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use clinica::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "clinica",
    about = "Medical-center backend: RIF validation, availability and convenio registry",
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
    /// Validate or complete RIF tax identifiers
    Rif {
        #[command(subcommand)]
        command: RifCommand,
    },
    /// Print the bookable dates of a professional
    Fechas(FechasArgs),
    /// Manage the locally stored session used for upstream calls
    Session {
        #[command(subcommand)]
        command: SessionCommand,
    },
}

#[derive(Subcommand, Debug)]
enum RifCommand {
    /// Check a full RIF (letter, 8 digits, check digit)
    Check {
        /// RIF as typed, separators allowed (e.g. J-12345678-4)
        rif: String,
    },
    /// Compute the check digit for a letter + 8 digit body
    Complete {
        /// Body as typed (e.g. J-12345678)
        body: String,
    },
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Rif {
            command: RifCommand::Check { rif },
        } => run_rif_check(&rif),
        Command::Rif {
            command: RifCommand::Complete { body },
        } => run_rif_complete(&body),
        Command::Fechas(args) => run_fechas(args).await,
        Command::Session { command } => run_session(command),
    }
}
