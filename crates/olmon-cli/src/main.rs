//! olmon - terminal monitor for a local Ollama server and its GPUs

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use olmon_adapter_gpu::TelemetrySource;
use olmon_adapter_ollama::config::DEFAULT_ENDPOINT;
use olmon_adapter_ollama::OllamaClient;
use olmon_core::ModelService;
use std::ffi::OsString;
use std::io::{self, Write};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

mod config;
mod format;
mod render;
mod scheduler;

use config::{ClearMode, MonitorConfig, RunMode};
use render::Renderer;
use scheduler::{wait_sliced, RefreshLoop, ShutdownFlag};

/// Pause after a failed startup probe before the first frame
const STARTUP_GRACE: Duration = Duration::from_secs(2);

const WINDOW_TITLE: &str = "Ollama Monitor";

/// Monitor a local Ollama server and GPU telemetry
#[derive(Debug, Parser)]
#[command(name = "olmon")]
#[command(about = "Monitor a local Ollama server and GPU telemetry")]
#[command(version)]
pub struct Cli {
    /// Refresh interval in seconds
    #[arg(short, long, default_value_t = 1, allow_negative_numbers = true, value_name = "SECONDS")]
    pub refresh: i64,

    /// Ollama server URL
    #[arg(short, long, default_value = DEFAULT_ENDPOINT, value_parser = parse_endpoint)]
    pub url: Url,

    /// Draw a single frame and exit
    #[arg(short = '1', long)]
    pub once: bool,

    /// Draw N frames and exit
    #[arg(short = 'n', long, allow_negative_numbers = true, value_name = "N")]
    pub count: Option<i64>,

    /// Append frames instead of redrawing in place
    #[arg(long)]
    pub no_clear: bool,

    /// Disable colours
    #[arg(long)]
    pub no_color: bool,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_endpoint(s: &str) -> std::result::Result<Url, String> {
    let url = Url::parse(s).map_err(|e| format!("invalid URL '{}': {}", s, e))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}', expected http or https", url.scheme()));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(format!("URL '{}' has no host", s));
    }
    Ok(url)
}

const SWITCHES: &[&str] = &[
    "-h", "--help", "-V", "--version", "-1", "--once", "--no-clear", "--no-color", "-v", "--verbose",
];
const VALUE_FLAGS: &[&str] = &["-r", "--refresh", "-u", "--url", "-n", "--count"];
const INLINE_VALUE_PREFIXES: &[&str] = &["--refresh=", "--url=", "--count="];

/// Command line split into what clap sees and what was thrown away
#[derive(Debug, Default, PartialEq)]
struct FilteredArgs {
    kept: Vec<OsString>,
    dropped: Vec<String>,
}

/// Drop everything that is not a known flag or the value of one
///
/// The first item is the program name and is always kept. A value flag at the
/// end of the line with nothing after it is dropped. Runs before logging is
/// set up, so the dropped items are returned for the caller to report.
fn filter_args<I>(args: I) -> FilteredArgs
where
    I: IntoIterator<Item = OsString>,
{
    let mut args = args.into_iter();
    let mut filtered = FilteredArgs {
        kept: args.next().into_iter().collect(),
        dropped: Vec::new(),
    };

    while let Some(arg) = args.next() {
        let Some(text) = arg.to_str() else {
            filtered.dropped.push(format!("{:?}", arg));
            continue;
        };

        if SWITCHES.contains(&text) || INLINE_VALUE_PREFIXES.iter().any(|p| text.starts_with(p)) {
            filtered.kept.push(arg);
        } else if VALUE_FLAGS.contains(&text) {
            match args.next() {
                Some(value) => {
                    filtered.kept.push(arg);
                    filtered.kept.push(value);
                }
                None => filtered.dropped.push(text.to_string()),
            }
        } else {
            filtered.dropped.push(text.to_string());
        }
    }

    filtered
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("olmon={}", level))
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn setup_terminal(config: &MonitorConfig) {
    #[cfg(windows)]
    {
        if colored::control::set_virtual_terminal(true).is_err() {
            debug!("Virtual terminal processing unavailable");
        }
    }

    if !config.color {
        colored::control::set_override(false);
    }

    if config.clear_mode == ClearMode::InPlace {
        let mut out = io::stdout();
        if let Err(e) = write!(out, "\x1B]0;{}\x07", WINDOW_TITLE).and_then(|_| out.flush()) {
            debug!("Failed to set window title: {}", e);
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = filter_args(std::env::args_os());
    let cli = Cli::parse_from(args.kept);

    init_logging(cli.verbose);
    for arg in &args.dropped {
        debug!("Ignoring argument {}", arg);
    }
    debug!("Starting olmon with {:?}", cli);

    let config = MonitorConfig::from_cli(&cli)?;
    setup_terminal(&config);

    let shutdown = ShutdownFlag::new();
    shutdown.listen_for_signals();

    let telemetry = TelemetrySource::open(&config.telemetry);
    let client = OllamaClient::new(config.service.clone())?;

    if !client.probe().await {
        eprintln!(
            "{}",
            format!("Warning: Cannot connect to Ollama server at {}", config.display_url()).yellow()
        );
        eprintln!("{}", "Make sure Ollama is running. Will keep trying...".yellow());
        wait_sliced(STARTUP_GRACE, &shutdown).await;
    } else {
        info!("Connected to Ollama at {}", config.display_url());
    }

    let renderer = Renderer::new(config.refresh, config.clear_mode);
    let mut refresh = RefreshLoop::new(
        telemetry,
        client,
        renderer,
        io::stdout(),
        config.run_mode,
        config.refresh,
        shutdown,
    );
    let summary = refresh.run().await;
    debug!("Run finished in state {:?}: {:?}", refresh.state(), summary);

    if config.run_mode == RunMode::Forever {
        let mut out = io::stdout();
        let _ = writeln!(out, "\n\x1B[0mExiting...").and_then(|_| out.flush());
    }

    Ok(())
}
