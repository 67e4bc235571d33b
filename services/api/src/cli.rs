use crate::demo::{run_demo, run_recommend, DemoArgs, RecommendArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use jobmatch::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Job Board Matcher",
    about = "Run and demonstrate the job recommendation service from the command line",
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
    /// Inspect the recommendation engine against the demo fixture
    Matcher {
        #[command(subcommand)]
        command: MatcherCommand,
    },
    /// Run an end-to-end CLI demo covering recommendations and swiping
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum MatcherCommand {
    /// Print the ranked recommendation batch for a fixture seeker
    Recommend(RecommendArgs),
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
        Command::Matcher {
            command: MatcherCommand::Recommend(args),
        } => run_recommend(args),
        Command::Demo(args) => run_demo(args),
    }
}
