use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "buildscan")]
#[command(about = "Submit building address batches and watch them being classified", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: ~/.config/buildscan/config.json)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload a CSV of addresses, follow the job, and print the report
    Scan {
        /// CSV file with street_number, street_name and zip_code columns
        #[arg(required = true)]
        file: PathBuf,

        /// Print the final report as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show service health and the remaining building quota
    Status,

    /// List the jobs the service currently holds
    Jobs,

    /// Print the effective configuration
    Config,
}
