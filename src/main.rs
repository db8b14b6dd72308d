//! Binary entry point for `safeio`.

use std::process;

fn main() {
    if let Err(e) = safeio::run() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
