use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "review-sight",
    version,
    about = "Reviewer recommendation CLI driven by per-file git history"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Pretty-print JSON output (default: compact)
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<std::path::PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Suggest a minimal reviewer set for a set of changed files
    Suggest {
        /// Git repository directory
        #[arg(short, long, default_value = ".")]
        dir: String,

        /// Comma-separated file paths (skips git diff resolution)
        #[arg(long)]
        paths: Option<String>,

        /// File containing paths, one per line
        #[arg(long, conflicts_with = "paths")]
        paths_file: Option<String>,

        /// Base ref for git diff resolution (default: HEAD)
        #[arg(long, default_value = "HEAD", conflicts_with_all = ["paths", "paths_file"])]
        base: String,

        /// Use staged changes (git diff --cached)
        #[arg(long, conflicts_with_all = ["paths", "paths_file"])]
        staged: bool,

        /// Revisions to look back per file (default: from config)
        #[arg(long)]
        depth: Option<usize>,

        /// Max candidate authors per file (default: from config)
        #[arg(long)]
        limit: Option<usize>,

        /// Exclude an author identity: name, email, or "Name <email>" (repeatable)
        #[arg(long = "exclude", value_name = "AUTHOR")]
        exclude: Vec<String>,

        /// Keep your own git identity in the candidate pool
        #[arg(long)]
        include_self: bool,

        /// Include the per-file per-author score table
        #[arg(long)]
        detail: bool,

        /// Print reviewer names only, one per line
        #[arg(long, conflicts_with_all = ["detail", "table"])]
        names_only: bool,

        /// Render human-readable tables instead of JSON
        #[arg(long)]
        table: bool,

        /// Report history-fetch progress on stderr
        #[arg(long)]
        progress: bool,
    },

    /// Check git availability
    Doctor,

    /// NDJSON streaming session (stdin → stdout)
    Session,

    /// Generate default configuration file
    Init {
        /// Path to write the configuration file (default: ~/.config/review-sight/config.toml)
        #[arg(short, long)]
        path: Option<std::path::PathBuf>,
    },
}
