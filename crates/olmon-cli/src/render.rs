//! Frame rendering
//!
//! [`Renderer::render_lines`] turns a frame into styled lines without touching
//! the terminal. [`Renderer::draw`] writes those lines with the cursor control
//! sequences for the configured [`ClearMode`].

use crate::config::ClearMode;
use crate::format::{
    clamp_percent, format_bytes, format_countdown_at, gauge, temp_color, truncate, util_color,
    vram_color,
};
use chrono::{DateTime, Utc};
use colored::Colorize;
use olmon_core::{Frame, InstalledModelRecord, LoadedModelRecord, ServiceSnapshot};
use std::io::{self, Write};
use std::time::Duration;

const CLEAR_SCREEN: &str = "\x1B[2J";
const CURSOR_HOME: &str = "\x1B[H";
const CLEAR_TO_EOL: &str = "\x1B[K";
const CLEAR_TO_EOS: &str = "\x1B[J";

const TITLE: &str = " OLLAMA MONITOR";
const TITLE_WIDTH: usize = 78;
const GPU_GAUGE_WIDTH: usize = 30;
const CATALOG_LIMIT: usize = 10;

/// Stateful terminal renderer
#[derive(Debug)]
pub struct Renderer {
    refresh: Duration,
    clear_mode: ClearMode,
    frames_drawn: u64,
}

impl Renderer {
    pub fn new(refresh: Duration, clear_mode: ClearMode) -> Self {
        Self {
            refresh,
            clear_mode,
            frames_drawn: 0,
        }
    }

    /// Write one frame to `out` and flush
    pub fn draw<W: Write>(&mut self, out: &mut W, frame: &Frame, now: DateTime<Utc>) -> io::Result<()> {
        let lines = self.render_lines(frame, now);

        match self.clear_mode {
            ClearMode::InPlace => {
                if self.frames_drawn == 0 {
                    write!(out, "{}{}", CLEAR_SCREEN, CURSOR_HOME)?;
                } else {
                    write!(out, "{}", CURSOR_HOME)?;
                }
                for line in &lines {
                    writeln!(out, "{}{}", line, CLEAR_TO_EOL)?;
                }
                write!(out, "{}", CLEAR_TO_EOS)?;
            }
            ClearMode::NoClear => {
                for line in &lines {
                    writeln!(out, "{}", line)?;
                }
            }
        }

        out.flush()?;
        self.frames_drawn += 1;
        Ok(())
    }

    /// Styled lines for one frame; `now` drives the expiry countdowns
    pub fn render_lines(&self, frame: &Frame, now: DateTime<Utc>) -> Vec<String> {
        let mut lines = Vec::new();

        let timestamp = frame.captured_at.format("%Y-%m-%d %H:%M:%S").to_string();
        let title = format!(
            "{}{:>width$} ",
            TITLE,
            timestamp,
            width = TITLE_WIDTH - TITLE.len() - 1
        );
        lines.push(title.bold().white().on_blue().to_string());
        lines.push(String::new());

        render_devices(&mut lines, frame);
        render_service(&mut lines, &frame.service, now);
        render_catalog(&mut lines, &frame.catalog);

        lines.push(String::new());
        lines.push(
            format!(
                "Press Ctrl+C to exit | Refreshing every {}s",
                self.refresh.as_secs()
            )
            .bright_black()
            .to_string(),
        );

        lines
    }
}

fn render_devices(lines: &mut Vec<String>, frame: &Frame) {
    lines.push("=== GPU Status ===".bold().cyan().to_string());

    if frame.available_devices().next().is_none() {
        lines.push(format!(
            "  {}",
            "GPU monitoring unavailable (no telemetry backend)".yellow()
        ));
        return;
    }

    let devices = &frame.devices;
    let numbered = devices.len() > 1;
    for device in devices {
        let label = if numbered {
            format!("GPU {}:", device.index)
        } else {
            "GPU:".to_string()
        };

        if !device.available {
            lines.push(format!("  {} {}", label.bold(), "unavailable".bright_black()));
            continue;
        }

        lines.push(format!("  {} {}", label.bold(), device.name));

        let vram = clamp_percent(device.vram_usage_percent());
        let vram_text = format!(
            "{} {:.1}% ({:.2}/{:.2} GB)",
            gauge(vram, GPU_GAUGE_WIDTH),
            vram,
            device.used_vram_gb,
            device.total_vram_gb
        );
        lines.push(format!("  {} {}", "VRAM:".bold(), vram_text.color(vram_color(vram))));

        let util = clamp_percent(device.utilization_percent);
        let util_text = format!("{} {:.0}%", gauge(util, GPU_GAUGE_WIDTH), util);
        lines.push(format!("  {} {}", "Util:".bold(), util_text.color(util_color(util))));

        let temp_text = format!("{} C", device.temperature_c);
        lines.push(format!(
            "  {} {}  {} {} W",
            "Temp:".bold(),
            temp_text.color(temp_color(device.temperature_c)),
            "Power:".bold(),
            device.power_watts
        ));
    }
}

fn render_service(lines: &mut Vec<String>, service: &ServiceSnapshot, now: DateTime<Utc>) {
    lines.push(String::new());

    match service {
        ServiceSnapshot::Unreachable => {
            lines.push("=== Ollama Status ===".bold().red().to_string());
            lines.push(format!("  {}", "Cannot connect to Ollama server".red()));
            lines.push(format!(
                "  {}",
                "Make sure Ollama is running (ollama serve)".bright_black()
            ));
        }
        ServiceSnapshot::Reachable { loaded } => {
            lines.push("=== Running Models ===".bold().magenta().to_string());
            render_loaded(lines, loaded, now);
        }
    }
}

fn render_loaded(lines: &mut Vec<String>, loaded: &[LoadedModelRecord], now: DateTime<Utc>) {
    if loaded.is_empty() {
        lines.push(format!("  {}", "No models currently loaded".yellow()));
        return;
    }

    let header = format!(
        "{:<30}{:<12}{:<12}{:<10}{:<12}",
        "MODEL", "SIZE", "PARAMS", "QUANT", "EXPIRES"
    );
    lines.push(format!("  {}", header.underline()));

    for model in loaded {
        let name = format!("{:<30}", truncate(&model.name, 29));
        lines.push(format!(
            "  {}{:<12}{:<12}{:<10}{:<12}",
            name.green(),
            format_bytes(model.size_bytes),
            model.parameter_size,
            model.quantization_level,
            format_countdown_at(&model.expires_at, now)
        ));
    }
}

fn render_catalog(lines: &mut Vec<String>, catalog: &[InstalledModelRecord]) {
    lines.push(String::new());
    lines.push(
        format!("=== Available Models ({}) ===", catalog.len())
            .bold()
            .blue()
            .to_string(),
    );

    if catalog.is_empty() {
        lines.push(format!("  {}", "No models installed".yellow()));
        return;
    }

    let header = format!("{:<35}{:<12}", "MODEL", "SIZE");
    lines.push(format!("  {}", header.underline()));

    for model in catalog.iter().take(CATALOG_LIMIT) {
        lines.push(format!(
            "  {:<35}{:<12}",
            truncate(&model.name, 34),
            format_bytes(model.size_bytes)
        ));
    }

    if catalog.len() > CATALOG_LIMIT {
        lines.push(format!(
            "  {}",
            format!("... and {} more", catalog.len() - CATALOG_LIMIT).bright_black()
        ));
    }
}
