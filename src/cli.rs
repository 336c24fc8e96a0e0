use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing_subscriber::filter::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing_subscriber::filter::LevelFilter::ERROR,
            LogLevel::Warn => tracing_subscriber::filter::LevelFilter::WARN,
            LogLevel::Info => tracing_subscriber::filter::LevelFilter::INFO,
            LogLevel::Debug => tracing_subscriber::filter::LevelFilter::DEBUG,
            LogLevel::Trace => tracing_subscriber::filter::LevelFilter::TRACE,
        }
    }
}

/// `taskwise` — AI-assisted task analysis and context-driven suggestions
#[derive(Parser, Debug)]
#[command(name = "taskwise", version, about = "Analyze tasks and propose new ones from context")]
pub struct Cli {
    /// TOML file with an `[llm]` table
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(long, value_enum, default_value = "warn")]
    pub log_level: LogLevel,

    /// Extra attempts after a failed model call
    #[arg(long, default_value_t = 0)]
    pub retries: usize,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Ask the model for priority, deadline, category and more for one task
    Analyze {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// JSON file holding an array of context entries
        #[arg(long)]
        context: Option<PathBuf>,
        /// Clamp out-of-range model values instead of rejecting the reply
        #[arg(long)]
        clamp: bool,
    },
    /// Propose tasks from context entries without calling a model
    Suggest {
        /// JSON file holding an array of context entries
        #[arg(long)]
        context: PathBuf,
    },
    /// List keyword categories found in a piece of text
    Classify { text: String },
}
