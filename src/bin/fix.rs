// Copyright (C) Brian G. Milnes 2025

//! Apply suggested modernization fixes to Go packages
//!
//! Binary: gomodern-fix

use anyhow::Result;
use clap::Parser;
use gomodern::tool_runner::tool_runner::{run_tool, ToolConfig};
use gomodern::{fix, format_number, select_analyzers, FixMode, StandardArgs};

#[derive(Parser)]
#[command(name = "gomodern-fix")]
#[command(about = "Rewrite Go code to use newer library functions and builtins", long_about = None)]
struct Args {
    #[command(flatten)]
    common: StandardArgs,

    /// Count the files that would change without writing them
    #[arg(short = 'n', long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = ToolConfig::from_args("gomodern-fix", &args.common);
    let analyzers = select_analyzers(&args.common.analyzers)?;
    let mode = if args.dry_run { FixMode::DryRun } else { FixMode::Write };
    let paths = args.common.search_paths();

    run_tool(config, |logger| {
        let report = fix(&paths, &analyzers, mode)?;
        for file in &report.changed_files {
            let verb = if mode == FixMode::DryRun { "would rewrite" } else { "rewrote" };
            logger.log(&format!("{verb} {file}"));
        }
        for failure in &report.failures {
            logger.log(&format!("error: {failure}"));
        }
        Ok(format!(
            "{} diagnostics, {} fixes applied, {} skipped, {} files {}",
            format_number(report.diagnostics),
            format_number(report.applied),
            format_number(report.skipped),
            format_number(report.changed_files.len()),
            if mode == FixMode::DryRun { "to rewrite" } else { "rewritten" }
        ))
    })
}
