pub mod write;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum SafeioCommand {
    /// Atomically replace a file with content from stdin or another file.
    Write(write::WriteArgs),
}
