mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "minwin",
    version,
    about = "A minimal native window driven by a non-blocking message pump"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the default configuration file
    Init,
    /// Open the window and pump messages until it is closed
    Run(commands::run::RunArgs),
    /// Run the message pump against a scripted message sequence
    ///
    /// The queue is drained once. If no close or quit message ends the
    /// sequence, the window is closed afterwards and the report shows the
    /// cleanup.
    Replay(commands::replay::ReplayArgs),
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Run(args) => commands::run::execute(&args),
        Commands::Replay(args) => commands::replay::execute(&args),
    }
}
