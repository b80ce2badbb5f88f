use clap::{Parser, Subcommand};
use logbook::domains::Collection;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "logbook", bin_name = "logbook", version)]
#[command(about = "Keep small collections of records from an interactive menu", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding the collection files
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub data_dir: Option<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "FILE", help_heading = "Options")]
    pub config: Option<PathBuf>,

    /// Save only when leaving the menu
    #[arg(long, global = true, help_heading = "Options")]
    pub save_on_exit: bool,

    /// Do not add sample records to a new collection
    #[arg(long, global = true, help_heading = "Options")]
    pub no_seed: bool,

    /// Disable coloured output
    #[arg(long, global = true, help_heading = "Options")]
    pub no_color: bool,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count, help_heading = "Options")]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open the books menu
    Books,

    /// Open the expenses menu
    Expenses,

    /// Open the tasks menu
    Tasks,

    /// Show or set configuration
    Config {
        /// Key to show or set
        key: Option<String>,

        /// New value
        value: Option<String>,
    },

    /// Print the data directory and collection files
    Path,
}

impl Commands {
    /// The collection this command opens, if any.
    pub fn collection(&self) -> Option<Collection> {
        match self {
            Commands::Books => Some(Collection::Books),
            Commands::Expenses => Some(Collection::Expenses),
            Commands::Tasks => Some(Collection::Tasks),
            Commands::Config { .. } | Commands::Path => None,
        }
    }
}
