//! Command-line argument parsing for the headless runner
//!
//! Supports:
//! - Running a scripted scenario file or the built-in demo
//! - Overriding the config and layout file locations
//! - Printing every frame or only the final state

use clap::Parser;
use std::path::PathBuf;

/// Headless runner for the wand panel layout engine
#[derive(Parser, Debug)]
#[command(
    name = "wand-layout",
    version,
    about = "Run a scripted panel layout scenario and print transforms as JSON"
)]
pub struct CliArgs {
    /// Scenario file (JSON); runs the built-in demo when omitted
    #[arg(value_name = "SCENARIO")]
    pub scenario: Option<PathBuf>,

    /// Config file (YAML) instead of the default location
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Layout record file instead of the default location
    #[arg(short, long, value_name = "PATH")]
    pub layout: Option<PathBuf>,

    /// Start with the basic panel set
    #[arg(long)]
    pub basic: bool,

    /// Do not read or write the layout file
    #[arg(long)]
    pub no_persist: bool,

    /// Print every frame as a JSON line instead of a final report
    #[arg(long)]
    pub trace_frames: bool,

    /// Pretty-print the final report
    #[arg(short, long)]
    pub pretty: bool,
}

/// How the layout file is handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persistence {
    Disabled,
    /// Use this file, or the default location when `None`
    File(Option<PathBuf>),
}

/// What to print
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Report { pretty: bool },
    Frames,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub scenario: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub persistence: Persistence,
    pub advanced: bool,
    pub output: OutputMode,
}

impl CliArgs {
    /// Convert parsed CLI args into a run configuration
    pub fn into_config(self) -> Result<RunConfig, String> {
        if self.no_persist && self.layout.is_some() {
            return Err("--layout cannot be combined with --no-persist".to_string());
        }
        if self.trace_frames && self.pretty {
            return Err("--pretty only applies to the final report".to_string());
        }

        let persistence = if self.no_persist {
            Persistence::Disabled
        } else {
            Persistence::File(self.layout)
        };
        let output = if self.trace_frames {
            OutputMode::Frames
        } else {
            OutputMode::Report {
                pretty: self.pretty,
            }
        };

        Ok(RunConfig {
            scenario: self.scenario,
            config: self.config,
            persistence,
            advanced: !self.basic,
            output,
        })
    }
}
