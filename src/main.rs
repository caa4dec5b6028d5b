use clap::{Parser, Subcommand};
use greenwave::demand::DemandSchedule;
use std::process;
use tracing::{error, info, Level};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Whitespace separated vehicles-per-slice counts.
    #[arg(global = true, short, long, default_value = "data/demand.txt")]
    demand: String,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Genetic search over the tuned lights' phase offsets.
    Search(cmd::search::SearchArgs),
    /// Run one episode under a fixed or scheduled phase plan.
    Replay(cmd::replay::ReplayArgs),
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("🚦 Initializing greenwave...");

    let demand = DemandSchedule::load_from_file(&cli.demand).unwrap_or_else(|e| {
        error!("❌ {}", e);
        process::exit(1);
    });
    info!(
        "   {} slices, {} vehicles",
        demand.len(),
        demand.total_vehicles()
    );

    let result = match cli.command {
        Commands::Search(args) => cmd::search::run(args, &demand),
        Commands::Replay(args) => cmd::replay::run(args, &demand),
    };

    if let Err(e) = result {
        error!("\n❌ FATAL ERROR:");
        error!("   {}", e);
        process::exit(1);
    }
}
