use clap::{Parser, Subcommand};

use crate::commands;

#[derive(Parser)]
#[command(name = "finviser")]
#[command(about = "Regional market-data dashboard backend", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = 8000)]
        port: u16,
    },
    /// Build and print the company database for one region
    Database {
        /// Region: usa, india or europe
        #[arg(short, long, default_value = "usa")]
        region: String,
    },
    /// Fetch the detail payload for one ticker
    Detail {
        /// Ticker symbol
        #[arg(short, long)]
        ticker: String,
        /// Charting period: 1D, 1W, 1M, 3M or 1Y
        #[arg(short, long, default_value = "1M")]
        period: String,
    },
}

pub async fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            commands::serve::run(port).await;
        }
        Commands::Database { region } => {
            commands::database::run(&region).await;
        }
        Commands::Detail { ticker, period } => {
            commands::detail::run(&ticker, &period).await;
        }
    }
}
