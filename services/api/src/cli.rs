use crate::demo::{run_demo, run_rates_validate, DemoArgs, RatesValidateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};

use admit_ai::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Admission Evaluation Service",
    about = "Run and demonstrate the admission financial evaluation pipeline from the command line",
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
    /// Rate-schedule utilities
    Rates {
        #[command(subcommand)]
        command: RatesCommand,
    },
    /// Evaluate the built-in sample referrals and print the breakdowns
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum RatesCommand {
    /// Validate a rate-schedule CSV export and summarize its contracts
    Validate(RatesValidateArgs),
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
        Command::Rates {
            command: RatesCommand::Validate(args),
        } => run_rates_validate(args),
        Command::Demo(args) => run_demo(args),
    }
}
