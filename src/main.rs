use anyhow::Result;
use clap::Parser;
use comfy_table::{Attribute, Cell, CellAlignment, Table, presets::UTF8_FULL_CONDENSED};

use review_sight::cli::{Cli, Commands};
use review_sight::config::{Config, ConfigService};
use review_sight::doctor;
use review_sight::engine::suggest::{ProgressSink, SilentProgress};
use review_sight::error::{ReviewError, classify};
use review_sight::models::request::{Command, SessionRequest};
use review_sight::models::suggestion::Recommendation;
use review_sight::service::{AppService, SuggestParams};
use review_sight::session;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        let (code, message) = classify(&e);
        let error = serde_json::json!({
            "error": { "code": code, "message": message }
        });
        println!("{}", serde_json::to_string(&error).unwrap());
        std::process::exit(1);
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn serialize_output(value: &impl serde::Serialize, pretty: bool) -> Result<String> {
    if pretty {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(serde_json::to_string(value)?)
    }
}

/// Explicit file list from --paths / --paths-file, or `None` for git diff
/// resolution.
fn resolve_paths(paths: Option<&str>, paths_file: Option<&str>) -> Result<Option<Vec<String>>> {
    if let Some(ps) = paths {
        let list: Vec<String> = ps
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        Ok(Some(list))
    } else if let Some(pf) = paths_file {
        let content = std::fs::read_to_string(pf)
            .map_err(|_| ReviewError::file_not_found(pf))?;
        let list: Vec<String> = content
            .lines()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        Ok(Some(list))
    } else {
        Ok(None)
    }
}

/// Progress sink that redraws a counter on stderr.
struct StderrProgress;

impl ProgressSink for StderrProgress {
    fn on_progress(&self, completed: usize, total: usize) {
        eprint!("\rfetching history {completed}/{total}");
        if completed >= total {
            eprintln!();
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

fn run(cli: Cli) -> Result<()> {
    let pretty = cli.pretty;

    // Load configuration
    let config = ConfigService::load(cli.config.as_deref())?;

    // Initialize logging if debug mode (CLI flag or config)
    if cli.debug || config.debug {
        review_sight::logger::init(&config)?;
    }

    // Handle early-exit commands before creating AppService
    if let Commands::Init { path } = &cli.command {
        let config_path = if let Some(p) = path {
            ConfigService::generate_at(p)?;
            p.clone()
        } else {
            ConfigService::generate_default()?;
            ConfigService::default_path()
        };
        eprintln!("Configuration file created at: {}", config_path.display());
        return Ok(());
    }

    let service = AppService::new();

    match cli.command {
        Commands::Suggest {
            dir,
            paths,
            paths_file,
            base,
            staged,
            depth,
            limit,
            exclude,
            include_self,
            detail,
            names_only,
            table,
            progress,
        } => {
            let opts = CmdSuggestOpts {
                dir: &dir,
                paths: resolve_paths(paths.as_deref(), paths_file.as_deref())?,
                base: &base,
                staged,
                depth,
                limit,
                exclude,
                include_self,
                detail,
                names_only,
                table,
                progress,
                pretty,
            };
            cmd_suggest(&service, &config, opts)
        }
        Commands::Doctor => cmd_doctor(pretty),
        Commands::Session => cmd_session(service, config),
        Commands::Init { .. } => unreachable!("handled above"),
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

struct CmdSuggestOpts<'a> {
    dir: &'a str,
    paths: Option<Vec<String>>,
    base: &'a str,
    staged: bool,
    depth: Option<usize>,
    limit: Option<usize>,
    exclude: Vec<String>,
    include_self: bool,
    detail: bool,
    names_only: bool,
    table: bool,
    progress: bool,
    pretty: bool,
}

fn cmd_suggest(service: &AppService, config: &Config, opts: CmdSuggestOpts<'_>) -> Result<()> {
    let mut exclude = config.exclude.clone();
    exclude.extend(opts.exclude);

    let params = SuggestParams {
        dir: opts.dir,
        paths: opts.paths,
        base: opts.base,
        staged: opts.staged,
        history_depth: opts.depth.unwrap_or(config.history_depth),
        candidate_limit: opts.limit.unwrap_or(config.candidate_limit),
        exclude,
        include_self: opts.include_self,
    };

    let mut recommendation = if opts.progress {
        service.suggest(&params, &StderrProgress)?
    } else {
        service.suggest(&params, &SilentProgress)?
    };

    if opts.names_only {
        for assignment in &recommendation.reviewers {
            println!("{}", assignment.reviewer);
        }
        return Ok(());
    }

    if opts.table {
        print!("{}", render_tables(&recommendation, opts.detail));
        return Ok(());
    }

    if !opts.detail {
        recommendation.detail.clear();
    }
    let output = serialize_output(&recommendation, opts.pretty)?;
    println!("{output}");
    Ok(())
}

fn cmd_doctor(pretty: bool) -> Result<()> {
    let report = doctor::run_doctor();
    let output = serialize_output(&report, pretty)?;
    println!("{output}");
    Ok(())
}

fn cmd_session(service: AppService, config: Config) -> Result<()> {
    session::run_session(|req| handle_request(&service, &config, req))
}

// ---------------------------------------------------------------------------
// Session handler
// ---------------------------------------------------------------------------

fn handle_request(
    service: &AppService,
    config: &Config,
    req: SessionRequest,
) -> Result<serde_json::Value> {
    match req.command {
        Command::Suggest => {
            let mut exclude = config.exclude.clone();
            exclude.extend(req.exclude.unwrap_or_default());

            let base = req.base.unwrap_or_else(|| "HEAD".to_string());
            let params = SuggestParams {
                dir: &req.dir,
                paths: req.paths,
                base: &base,
                staged: req.staged.unwrap_or(false),
                history_depth: req.depth.unwrap_or(config.history_depth),
                candidate_limit: req.limit.unwrap_or(config.candidate_limit),
                exclude,
                include_self: req.include_self.unwrap_or(false),
            };

            let mut recommendation = service.suggest(&params, &SilentProgress)?;
            if !req.detail.unwrap_or(false) {
                recommendation.detail.clear();
            }
            Ok(serde_json::to_value(recommendation)?)
        }
        Command::Doctor => Ok(serde_json::to_value(doctor::run_doctor())?),
    }
}

// ---------------------------------------------------------------------------
// Table rendering (human-readable mode)
// ---------------------------------------------------------------------------

fn render_tables(recommendation: &Recommendation, detail: bool) -> String {
    let mut out = String::new();

    let mut reviewers = Table::new();
    reviewers.load_preset(UTF8_FULL_CONDENSED);
    reviewers.set_header(vec![
        Cell::new("Reviewer").add_attribute(Attribute::Bold),
        Cell::new("Files").add_attribute(Attribute::Bold),
    ]);
    for assignment in &recommendation.reviewers {
        reviewers.add_row(vec![
            Cell::new(&assignment.reviewer),
            Cell::new(assignment.files.join("\n")),
        ]);
    }
    out.push_str(&reviewers.to_string());
    out.push('\n');

    if !recommendation.uncovered.is_empty() {
        out.push_str("No candidate reviewer for:\n");
        for file in &recommendation.uncovered {
            out.push_str("  ");
            out.push_str(file);
            out.push('\n');
        }
    }

    if detail && !recommendation.detail.is_empty() {
        let mut scores = Table::new();
        scores.load_preset(UTF8_FULL_CONDENSED);
        scores.set_header(vec![
            Cell::new("File").add_attribute(Attribute::Bold),
            Cell::new("Author").add_attribute(Attribute::Bold),
            Cell::new("Commits").add_attribute(Attribute::Bold),
            Cell::new("Score").add_attribute(Attribute::Bold),
        ]);
        for file in &recommendation.detail {
            for candidate in &file.candidates {
                scores.add_row(vec![
                    Cell::new(&file.file),
                    Cell::new(&candidate.author),
                    Cell::new(candidate.commits).set_alignment(CellAlignment::Right),
                    Cell::new(format!("{:.2}", candidate.score))
                        .set_alignment(CellAlignment::Right),
                ]);
            }
        }
        out.push_str(&scores.to_string());
        out.push('\n');
    }

    out
}
