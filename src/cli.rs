use crate::command::SafeioCommand;
use clap::{ArgAction, Parser};

#[derive(Parser)]
#[command(name = "safeio", version, about = "Crash-safe, all-or-nothing file writes")]
pub struct SafeioCli {
    /// Increase log output (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: SafeioCommand,
}

impl SafeioCli {
    /// Default log filter for the requested verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
