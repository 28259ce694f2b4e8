// Copyright (C) Brian G. Milnes 2025

//! Command-line arguments shared by the gomodern tools

pub mod args {
    use clap::Parser;
    use std::path::{Path, PathBuf};

    #[derive(Parser, Debug, Clone, Default)]
    pub struct StandardArgs {
        /// Go files or directories to analyze (default: current directory)
        pub paths: Vec<PathBuf>,

        /// Comma-separated analyzers to run (default: all)
        #[arg(short, long, value_delimiter = ',')]
        pub analyzers: Vec<String>,

        /// Print diagnostics as JSON
        #[arg(long)]
        pub json: bool,

        /// Write a run log under logs/<tool>/<date>/
        #[arg(short, long)]
        pub log: bool,

        /// Debug logging to stderr
        #[arg(short, long)]
        pub verbose: bool,
    }

    impl StandardArgs {
        /// Paths to search; the current directory when none were given.
        /// A Go-style `dir/...` pattern means `dir`, which is searched
        /// recursively anyway.
        pub fn search_paths(&self) -> Vec<PathBuf> {
            if self.paths.is_empty() {
                return vec![PathBuf::from(".")];
            }
            self.paths.iter().map(|path| strip_recursive_pattern(path)).collect()
        }

        /// Directory reported as "Entering directory".
        pub fn base_dir(&self) -> PathBuf {
            let first = self.search_paths().remove(0);
            let dir = if first.is_file() {
                first.parent().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."))
            } else {
                first
            };
            std::fs::canonicalize(&dir).unwrap_or(dir)
        }

        /// Install env_logger; `--verbose` lowers the default filter to debug.
        /// RUST_LOG still takes precedence.
        pub fn init_logging(&self) {
            let level = if self.verbose { "debug" } else { "warn" };
            let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).try_init();
        }
    }

    /// Format a count with thousands separators: 1234567 -> "1,234,567".
    pub fn format_number(n: usize) -> String {
        let digits = n.to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(c);
        }
        out
    }

    fn strip_recursive_pattern(path: &Path) -> PathBuf {
        match path.to_str() {
            Some("...") => PathBuf::from("."),
            Some(text) => match text.strip_suffix("/...") {
                Some("") => PathBuf::from("/"),
                Some(dir) => PathBuf::from(dir),
                None => path.to_path_buf(),
            },
            None => path.to_path_buf(),
        }
    }
}
