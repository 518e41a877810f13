//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "solace")]
#[command(about = "Diary journaling backend with LLM reflections", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Log at debug level regardless of config
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new workspace
    Init {
        /// Directory to initialize (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Database file, relative to .solace/ unless absolute
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// View or modify configuration
    Config {
        /// Config key to get or set (e.g. journal.day_boundary)
        key: Option<String>,

        /// Value to set (if provided, sets the key)
        value: Option<String>,

        /// List all configuration
        #[arg(short, long)]
        list: bool,
    },

    /// Run the HTTP API
    Serve {
        /// Override server.host
        #[arg(long)]
        host: Option<String>,

        /// Override server.port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List a user's entries, newest first
    List {
        /// User id
        #[arg(short, long)]
        user: i64,

        /// Start date (DD-MM-YYYY, inclusive)
        #[arg(long)]
        from: Option<String>,

        /// End date (DD-MM-YYYY, inclusive)
        #[arg(long)]
        to: Option<String>,

        /// Maximum number of entries
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Run the reflection calls over a stored entry
    Analyze {
        /// Entry id
        entry_id: i64,
    },
}
