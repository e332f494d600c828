//! predex_bucket - packs pre-dexed files into primary and secondary dexes.
//!
//! This binary reads a bucketing manifest, assigns every input to a dex and
//! reports the assignment. Ceiling violations fail the run with exit code 1.

use predex_bucket::cli;
use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    process::exit(exit_code);
}
