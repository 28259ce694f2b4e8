// Copyright (C) Brian G. Milnes 2025

//! Parse and display the syntax tree of a Go file
//!
//! Binary: gomodern-parse

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "gomodern-parse")]
#[command(about = "Parse and display the syntax tree of a Go file", long_about = None)]
struct Args {
    /// Path to the Go file to parse
    #[arg(short, long)]
    path: PathBuf,

    /// Debug logging to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let start = Instant::now();
    let args = Args::parse();
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    }

    let parent_dir = args.path.parent().unwrap_or_else(|| std::path::Path::new("."));
    println!("Entering directory '{}'", parent_dir.display());
    println!();

    println!("{}", gomodern::parse(&args.path)?);

    println!();
    println!("Completed in {}ms", start.elapsed().as_millis());
    Ok(())
}
