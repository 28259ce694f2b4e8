// Copyright (C) Brian G. Milnes 2025

//! Common wrapper for the gomodern binaries
//!
//! Prints the directory context Emacs compile-mode understands, times the
//! run and owns the optional run log.

pub mod tool_runner {
    use crate::args::args::StandardArgs;
    use crate::logging::logging::ToolLogger;
    use anyhow::Result;
    use std::path::PathBuf;
    use std::time::Instant;

    pub struct ToolConfig {
        /// Names the log directory.
        pub tool_name: String,
        /// Shown in "Entering directory".
        pub base_dir: PathBuf,
        pub enable_logging: bool,
    }

    impl ToolConfig {
        pub fn new(tool_name: &str, base_dir: PathBuf) -> Self {
            ToolConfig {
                tool_name: tool_name.to_string(),
                base_dir,
                enable_logging: false,
            }
        }

        /// Config from the shared arguments; also installs env_logger.
        pub fn from_args(tool_name: &str, args: &StandardArgs) -> Self {
            args.init_logging();
            ToolConfig {
                tool_name: tool_name.to_string(),
                base_dir: args.base_dir(),
                enable_logging: args.log,
            }
        }
    }

    /// Run `tool_fn`, then print its summary and the elapsed time.
    ///
    /// ```no_run
    /// # use gomodern::tool_runner::tool_runner::{run_tool, ToolConfig};
    /// # fn main() -> anyhow::Result<()> {
    /// let config = ToolConfig::new("gomodern-review", std::path::PathBuf::from("."));
    /// run_tool(config, |logger| {
    ///     logger.log("checking packages");
    ///     Ok("3 packages checked".to_string())
    /// })?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn run_tool<F>(config: ToolConfig, tool_fn: F) -> Result<()>
    where
        F: FnOnce(&mut ToolLogger) -> Result<String>,
    {
        let start = Instant::now();
        println!("Entering directory '{}'", config.base_dir.display());
        println!();

        let mut logger = if config.enable_logging {
            ToolLogger::new(&config.tool_name)
        } else {
            ToolLogger::new_disabled()
        };

        let summary = tool_fn(&mut logger)?;

        println!();
        println!("{summary}");
        println!("Completed in {}ms", start.elapsed().as_millis());
        if config.enable_logging {
            logger.finalize(&summary);
        }
        Ok(())
    }
}
