use crate::fs::Options;
use crate::ops::write_to_file_with;
use crate::validation::{parse_mode, validate_destination};
use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(verbatim_doc_comment)]
pub struct WriteArgs {
    /// File to replace atomically
    pub dest: PathBuf,

    /// Read content from FILE instead of standard input
    #[arg(long, short = 'i', value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Permission bits for the written file, in octal
    ///
    /// Examples:
    ///   --mode 644    rw-r--r--
    ///   --mode 0o600  rw-------
    #[arg(long, short = 'm', value_name = "MODE", default_value = "644", value_parser = parse_mode, verbatim_doc_comment)]
    pub mode: u32,

    /// Skip fsync of the file and its directory before returning
    #[arg(long)]
    pub no_sync: bool,

    /// Do not print a summary line
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

impl WriteArgs {
    /// Builds handle options from the command line flags.
    pub fn options(&self) -> Options {
        Options::new(self.mode)
            .sync_on_commit(!self.no_sync)
            .sync_parent_dir(!self.no_sync)
    }
}

pub fn execute(args: WriteArgs) -> anyhow::Result<()> {
    validate_destination(&args.dest)?;
    let options = args.options();

    let copied = match &args.input {
        Some(input) => {
            let source = File::open(input)
                .with_context(|| format!("Failed to open input {}", input.display()))?;
            log::debug!("Reading from {}", input.display());
            write_to_file_with(source, &args.dest, &options)?
        }
        None => {
            log::debug!("Reading from standard input");
            write_to_file_with(io::stdin().lock(), &args.dest, &options)?
        }
    };

    if !args.quiet {
        println!(
            "{} Wrote {} {} to {}",
            "✓".green().bold(),
            copied,
            if copied == 1 { "byte" } else { "bytes" },
            args.dest.display().to_string().dimmed()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parses_mode_flag() {
        let args = WriteArgs::try_parse_from(["write", "out.txt", "--mode", "0o600"]).unwrap();
        assert_eq!(args.mode, 0o600);
        assert!(args.options().syncs_on_commit());
    }

    #[test]
    fn test_default_mode() {
        let args = WriteArgs::try_parse_from(["write", "out.txt"]).unwrap();
        assert_eq!(args.mode, 0o644);
    }

    #[test]
    fn test_rejects_bad_mode() {
        assert!(WriteArgs::try_parse_from(["write", "out.txt", "--mode", "999"]).is_err());
    }

    #[test]
    fn test_no_sync_disables_both_syncs() {
        let args = WriteArgs::try_parse_from(["write", "out.txt", "--no-sync"]).unwrap();
        let opts = args.options();
        assert!(!opts.syncs_on_commit());
        assert!(!opts.syncs_parent_dir());
    }

    #[test]
    fn test_execute_copies_input_file() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("in.txt");
        let dest = temp.path().join("out.txt");
        fs::write(&input, "payload").unwrap();

        let args = WriteArgs {
            dest: dest.clone(),
            input: Some(input),
            mode: 0o644,
            no_sync: true,
            quiet: true,
        };
        execute(args).unwrap();

        assert_eq!(fs::read_to_string(&dest).unwrap(), "payload");
    }

    #[test]
    fn test_execute_missing_input_leaves_no_trace() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("out.txt");

        let args = WriteArgs {
            dest: dest.clone(),
            input: Some(temp.path().join("absent.txt")),
            mode: 0o644,
            no_sync: false,
            quiet: true,
        };
        let err = execute(args).unwrap_err();

        assert!(err.to_string().contains("Failed to open input"));
        assert!(!dest.exists());
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
    }
}
