//! This module defines the command line arguments reelay accepts.

use std::path::PathBuf;
use termcolor::ColorChoice;


#[derive(Debug, clap::Parser)]
#[command(about = "In-memory video catalog served via a GraphQL Relay API.")]
pub(crate) struct Args {
    #[command(subcommand)]
    pub(crate) cmd: Command,

    /// Whether to use colors in the output.
    #[arg(long, global = true, default_value = "auto")]
    pub(crate) color: Color,
}

#[derive(Debug, clap::Subcommand)]
pub(crate) enum Command {
    /// Starts the HTTP server.
    Serve {
        #[command(flatten)]
        shared: Shared,
    },

    /// Outputs a template for the configuration file (which includes
    /// descriptions or all options).
    WriteConfig {
        /// Target file. If not specified, the template is written to stdout.
        target: Option<PathBuf>,
    },

    /// Exports the API as GraphQL schema.
    ExportApiSchema {
        /// Target file. If not specified, the schema is written to stdout.
        target: Option<PathBuf>,
    },
}

#[derive(Debug, clap::Args)]
pub(crate) struct Shared {
    /// Path to the configuration file. If this is not specified, reelay will
    /// try opening `config.toml` or `/etc/reelay/config.toml`.
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum Color {
    Auto,
    Always,
    Never,
}

impl Args {
    pub(crate) fn stdout_color(&self) -> ColorChoice {
        self.color_choice(std::io::IsTerminal::is_terminal(&std::io::stdout()))
    }

    pub(crate) fn stderr_color(&self) -> ColorChoice {
        self.color_choice(std::io::IsTerminal::is_terminal(&std::io::stderr()))
    }

    fn color_choice(&self, is_terminal: bool) -> ColorChoice {
        match self.color {
            Color::Always => ColorChoice::Always,
            Color::Never => ColorChoice::Never,
            Color::Auto if is_terminal => ColorChoice::Auto,
            Color::Auto => ColorChoice::Never,
        }
    }
}
