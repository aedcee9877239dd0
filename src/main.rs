use anyhow::Result;
use clap::{Parser, Subcommand};

use vigil::cli::{events, init, record, reset, summary};

#[derive(Parser)]
#[command(name = "vigil")]
#[command(about = "Periodic screen recording with AI classification and daily reports")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "~/.vigil/config.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start scheduled recording
    Record {
        /// Record a single event and exit
        #[arg(long)]
        oneshot: bool,
    },

    /// Create the config file interactively
    Init,

    /// List events for a date
    Events {
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },

    /// Generate the daily summary report
    Summary {
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,

        /// Output format: text|markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Delete events for a date (requires confirmation)
    Reset {
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },

    /// Display version
    Version,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Record { oneshot } => record::run(&cli.config, oneshot),
        Commands::Init => init::run(&cli.config),
        Commands::Events { date } => events::run(&cli.config, date.as_deref()),
        Commands::Summary { date, format } => {
            summary::run(&cli.config, date.as_deref(), &format)
        }
        Commands::Reset { date } => reset::run(&cli.config, date.as_deref()),
        Commands::Version => {
            println!("vigil version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
