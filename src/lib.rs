#![doc = include_str!("../README.md")]

pub mod cli;
pub mod command;
pub mod error;
pub mod fs;
pub mod ops;
pub mod validation;

pub use error::*;
pub use fs::{Options, SafeFile};
pub use ops::{write_file, write_to_file, write_to_file_with};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;
    use command::SafeioCommand;

    let cli = cli::SafeioCli::parse();
    init_logging(cli.log_filter());

    match cli.command {
        SafeioCommand::Write(args) => command::write::execute(args),
    }
}

fn init_logging(default_filter: &str) {
    let env = env_logger::Env::default().default_filter_or(default_filter);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}
