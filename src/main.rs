//! cull - interactive line filter, entry point

use clap::Parser;
use cull::config::{self, CliOverrides};
use cull::terminal::CrosstermTerminal;
use cull::view::{ColorConfig, Styles};
use cull::{Coordinator, ExitStatus};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use tracing::{info, warn};

/// Filter lines interactively and print the ones you pick
#[derive(Parser, Debug)]
#[command(name = "cull")]
#[command(version)]
#[command(about = "Filter lines interactively and print the ones you pick")]
pub struct Args {
    /// File to read lines from (reads piped stdin if not provided)
    pub file: Option<PathBuf>,

    /// Initial query
    #[arg(long)]
    pub query: Option<String>,

    /// Path to configuration file
    #[arg(long)]
    pub rcfile: Option<PathBuf>,

    /// Keep at most this many lines, dropping the oldest (0 = unlimited)
    #[arg(short = 'b', long)]
    pub buffer_size: Option<usize>,

    /// Split each line on NUL into display text and printed output
    #[arg(long)]
    pub null: bool,

    /// Row the cursor starts on (0-based)
    #[arg(long)]
    pub initial_index: Option<u32>,

    /// Matcher to start with (IgnoreCase, CaseSensitive, SmartCase)
    #[arg(long)]
    pub initial_matcher: Option<String>,

    /// Prompt shown before the query
    #[arg(long)]
    pub prompt: Option<String>,

    /// Screen layout
    #[arg(long, value_parser = ["top-down", "bottom-up"])]
    pub layout: Option<String>,

    /// Disable colors
    #[arg(long)]
    pub no_color: bool,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            query: self.query.clone(),
            buffer_size: self.buffer_size,
            null_separator: self.null.then_some(true),
            initial_index: self.initial_index.map(|index| i64::from(index) + 1),
            initial_matcher: self.initial_matcher.clone(),
            prompt: self.prompt.clone(),
            layout: self.layout.clone(),
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(status) => ExitCode::from(u8::try_from(status.code()).unwrap_or(u8::MAX)),
        Err(err) => {
            eprintln!("cull: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitStatus, Box<dyn std::error::Error>> {
    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = config::load_config_with_precedence(args.rcfile.clone())?;
        let merged = config::merge_config(config_file);
        let with_env = config::apply_env_overrides(merged);
        config::apply_cli_overrides(with_env, args.overrides())
    };

    cull::logging::init(&config.log_file_path)?;
    info!(config = ?config, "Configuration loaded and resolved");

    // Open the input before touching the terminal so a bad path fails plainly.
    let input = cull::source::open(args.file.clone())?;

    cull::matcher::configure_parallelism();
    let coordinator = Coordinator::start(config)?;

    let feeder = coordinator.clone();
    thread::Builder::new()
        .name("cull-feed".to_string())
        .spawn(move || {
            if let Err(err) = cull::source::feed(&feeder, input) {
                warn!(%err, "Reading input failed");
            }
        })?;

    let styles = Styles::with_color_config(ColorConfig::from_env_and_args(args.no_color));
    let mut terminal = CrosstermTerminal::with_styles(styles);
    let status = coordinator.run(&mut terminal)?;
    drop(terminal);

    for fault in coordinator.faults() {
        eprintln!("cull: {fault}");
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for selected in coordinator.result() {
        writeln!(out, "{}", selected.output())?;
    }
    out.flush()?;

    Ok(status)
}
