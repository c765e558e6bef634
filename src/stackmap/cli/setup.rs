use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "stackmap")]
#[command(about = "Catalog of a firm's apps, the functions they serve, and how they integrate", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Data directory (defaults to $STACKMAP_HOME, then the platform data dir)
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List apps with their functions and levels
    #[command(alias = "ls")]
    Apps,

    /// List functions grouped with the apps that fill them
    #[command(alias = "fn")]
    Functions {
        /// Only show functions with no apps
        #[arg(long)]
        unused: bool,
    },

    /// Add an app to the catalog
    AddApp {
        /// Display name
        name: String,
    },

    /// Assign a function to an app (created by name if new)
    Assign {
        /// App name or id
        app: String,
        /// Function name or id
        function: String,
    },

    /// Rotate an assignment through available → primary → evaluating
    Cycle {
        /// App name or id
        app: String,
        /// Function name or id
        function: String,
    },

    /// Record an integration between two apps
    Pair {
        /// App name or id
        a: String,
        /// App name or id
        b: String,
        /// Mark as a direct integration, with an optional note
        #[arg(long, num_args = 0..=1, default_missing_value = "")]
        direct: Option<String>,
        /// Mark as a Zapier integration, with an optional note
        #[arg(long, num_args = 0..=1, default_missing_value = "")]
        zapier: Option<String>,
    },

    /// Show every integration of one app
    Pairs {
        /// App name or id
        app: String,
    },

    /// Show where resources and merge-field tokens are used
    Usage,

    /// Export the whole catalog as JSON (stdout if no file)
    Export {
        file: Option<PathBuf>,
    },

    /// Merge an exported JSON document into the catalog
    Import {
        file: PathBuf,
    },

    /// Discard all data and restore the sample catalog
    Reset,
}
