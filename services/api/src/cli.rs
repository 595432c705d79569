use crate::records::{run_applications, ApplicationsCommand};
use crate::server;
use crate::walkthrough::{run_walkthrough, WalkthroughArgs};
use clap::{Args, Parser, Subcommand};
use job_intake::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Job Application Intake",
    about = "Run the job application intake service and inspect submitted applications",
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
    /// Inspect the durable application list without starting the server
    Applications {
        /// Override the configured application data file
        #[arg(long, global = true)]
        data_file: Option<PathBuf>,
        #[command(subcommand)]
        command: ApplicationsCommand,
    },
    /// Fill in the wizard from an answers file and submit it to a running service
    Walkthrough(WalkthroughArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the configured application data file
    #[arg(long)]
    pub(crate) data_file: Option<PathBuf>,
    /// Override the configured upload directory
    #[arg(long)]
    pub(crate) upload_dir: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Applications { data_file, command } => run_applications(data_file, command),
        Command::Walkthrough(args) => run_walkthrough(args).await,
    }
}
