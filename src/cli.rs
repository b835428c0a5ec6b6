//! Command line interface definition using clap.
//!
//! This module defines the [`Cli`] structure and its subcommands. Running
//! with no subcommand generates the build description; the `cp` subcommand
//! is the copy helper the generated `copy` rule invokes on platforms without
//! a usable system copy tool.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

/// A YAML-powered Ninja build-description generator for C and C++ projects.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the blueprint file to generate from.
    #[arg(short, long, value_name = "FILE", default_value = "kanna.yml")]
    pub file: Utf8PathBuf,

    /// Change to this directory before doing anything.
    #[arg(short = 'd', long, value_name = "DIR")]
    pub directory: Option<Utf8PathBuf>,

    /// Generate for this configuration instead of the first declared one.
    #[arg(short = 'c', long, value_name = "NAME")]
    pub configuration: Option<String>,

    /// Also emit a JSON compilation database next to the build file.
    #[arg(long = "compile-db")]
    pub compile_db: bool,

    /// Enable verbose logging output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Optional subcommand to execute; defaults to `generate` when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Parse command-line arguments, providing `generate` as the default
    /// command.
    #[must_use]
    pub fn parse_with_default() -> Self {
        Self::parse().with_default_command()
    }

    /// Parse the provided arguments, applying the default command when
    /// needed.
    ///
    /// # Panics
    ///
    /// Panics if argument parsing fails.
    #[must_use]
    pub fn parse_from_with_default<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(args)
            .unwrap_or_else(|e| panic!("CLI parsing failed: {e}"))
            .with_default_command()
    }

    /// Apply the default command if none was specified.
    #[must_use]
    pub fn with_default_command(mut self) -> Self {
        if self.command.is_none() {
            self.command = Some(Commands::Generate);
        }
        self
    }
}

/// Available top-level commands for kanna.
#[derive(Debug, Subcommand, PartialEq, Eq, Clone)]
pub enum Commands {
    /// Generate `build/build.ninja` from the blueprint `default`.
    Generate,

    /// Copy a file and refresh its modification time.
    ///
    /// Ninja decides whether a copy step is still needed from the
    /// destination's timestamp, which a plain byte copy would preserve.
    Cp {
        /// Source file.
        src: Utf8PathBuf,
        /// Destination file.
        dst: Utf8PathBuf,
    },
}
