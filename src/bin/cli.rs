// src/bin/cli.rs
use ff_scrape::{cli, loge};

fn main() {
    // Pretty panic reports; a failed install just means plain panics.
    let _ = color_eyre::install();

    if let Err(e) = cli::run() {
        loge!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
