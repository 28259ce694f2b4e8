// Copyright (C) Brian G. Milnes 2025

//! Report modernization opportunities in Go packages
//!
//! Usage:
//!   gomodern-review                       # every package under .
//!   gomodern-review ./pkg -a sortmigrate  # one analyzer
//!   gomodern-review --json ./...
//!
//! Exits with status 1 when anything was reported.
//!
//! Binary: gomodern-review

use anyhow::Result;
use clap::Parser;
use gomodern::tool_runner::tool_runner::{run_tool, ToolConfig};
use gomodern::{format_number, review, select_analyzers, OutputFormat, StandardArgs};

#[derive(Parser)]
#[command(name = "gomodern-review")]
#[command(about = "Report Go code that can use newer library functions and builtins", long_about = None)]
struct Args {
    #[command(flatten)]
    common: StandardArgs,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = ToolConfig::from_args("gomodern-review", &args.common);
    let analyzers = select_analyzers(&args.common.analyzers)?;
    let format = if args.common.json { OutputFormat::Json } else { OutputFormat::Text };
    let paths = args.common.search_paths();

    let mut reported = 0;
    run_tool(config, |logger| {
        let result = review(&paths, &analyzers, format)?;
        if format == OutputFormat::Json {
            logger.log(&result.output);
        } else {
            logger.log_diagnostics(&result.diagnostics);
        }
        for failure in &result.failures {
            logger.log(&format!("error: {failure}"));
        }
        reported = result.diagnostics.len();
        Ok(format!(
            "Checked {} packages ({} files): {} diagnostics, {} failures",
            format_number(result.packages),
            format_number(result.files),
            format_number(reported),
            result.failures.len()
        ))
    })?;

    if reported > 0 {
        std::process::exit(1);
    }
    Ok(())
}
