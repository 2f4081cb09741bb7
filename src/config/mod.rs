pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand, ValueEnum};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "pringles")]
#[command(about = "Compose DEVS models and translate them for CD++ and the DEVS diagrammer")]
pub struct CliConfig {
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List the atomic kinds found in the built-in models and a user directory
    Discover {
        #[arg(long)]
        models_dir: Option<PathBuf>,
    },
    /// Print the top model of a project file
    Render {
        #[arg(short, long, default_value = "pringles.toml")]
        project: PathBuf,

        #[arg(long, value_enum, default_value_t = OutputFormat::Ma)]
        format: OutputFormat,
    },
    /// Write the model and events files and print the engine arguments
    Export {
        #[arg(short, long, default_value = "pringles.toml")]
        project: PathBuf,

        /// Overrides `project.working_dir`
        #[arg(long)]
        working_dir: Option<PathBuf>,
    },
    /// Print the diagram renderer URL for the top model
    DisplayUrl {
        #[arg(short, long, default_value = "pringles.toml")]
        project: PathBuf,
    },
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Ma,
    Json,
}
