//! Monitor configuration built from command-line flags

use crate::Cli;
use olmon_adapter_gpu::TelemetryConfig;
use olmon_adapter_ollama::ServiceConfig;
use std::time::Duration;

/// How many refresh cycles to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Until interrupted
    Forever,
    /// A single frame, same as `Count(1)`
    Once,
    /// Exactly N frames
    Count(u64),
}

impl RunMode {
    /// Iteration limit, `None` for an unbounded run
    pub fn limit(&self) -> Option<u64> {
        match self {
            RunMode::Forever => None,
            RunMode::Once => Some(1),
            RunMode::Count(n) => Some(*n),
        }
    }
}

/// How consecutive frames share the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClearMode {
    /// Redraw over the previous frame
    #[default]
    InPlace,
    /// Append frames, for piped or logged output
    NoClear,
}

/// Complete monitor configuration
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Time between frames
    pub refresh: Duration,

    pub service: ServiceConfig,

    pub telemetry: TelemetryConfig,

    pub run_mode: RunMode,

    pub clear_mode: ClearMode,

    /// Emit SGR colour sequences
    pub color: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            refresh: Duration::from_secs(1),
            service: ServiceConfig::default(),
            telemetry: TelemetryConfig::default(),
            run_mode: RunMode::Forever,
            clear_mode: ClearMode::InPlace,
            color: true,
        }
    }
}

impl MonitorConfig {
    /// Build the configuration from parsed flags, clamping numeric values to at least 1
    pub fn from_cli(cli: &Cli) -> olmon_core::Result<Self> {
        let refresh_secs = u64::try_from(cli.refresh.max(1)).unwrap_or(1);

        let run_mode = if cli.once {
            RunMode::Once
        } else if let Some(count) = cli.count {
            RunMode::Count(u64::try_from(count.max(1)).unwrap_or(1))
        } else {
            RunMode::Forever
        };

        let config = Self {
            refresh: Duration::from_secs(refresh_secs),
            service: ServiceConfig::new(cli.url.clone()),
            telemetry: TelemetryConfig::default(),
            run_mode,
            clear_mode: if cli.no_clear {
                ClearMode::NoClear
            } else {
                ClearMode::InPlace
            },
            color: !cli.no_color,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> olmon_core::Result<()> {
        if self.refresh.is_zero() {
            return Err(olmon_core::Error::config("refresh interval must be at least one second"));
        }
        if self.run_mode == RunMode::Count(0) {
            return Err(olmon_core::Error::config("run count must be at least one"));
        }
        self.service.validate()?;
        self.telemetry.validate()?;
        Ok(())
    }

    /// Server address as the user typed it, without the trailing slash `Url` adds
    pub fn display_url(&self) -> &str {
        self.service.endpoint.as_str().trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> MonitorConfig {
        let cli = Cli::try_parse_from(args).unwrap();
        MonitorConfig::from_cli(&cli).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["olmon"]);
        assert_eq!(config.refresh, Duration::from_secs(1));
        assert_eq!(config.run_mode, RunMode::Forever);
        assert_eq!(config.clear_mode, ClearMode::InPlace);
        assert!(config.color);
        assert_eq!(config.display_url(), "http://localhost:11434");
        assert_eq!(config.service.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_clamping() {
        let config = parse(&["olmon", "--refresh", "0", "--count", "-3"]);
        assert_eq!(config.refresh, Duration::from_secs(1));
        assert_eq!(config.run_mode, RunMode::Count(1));

        let config = parse(&["olmon", "-r", "-10"]);
        assert_eq!(config.refresh, Duration::from_secs(1));

        let config = parse(&["olmon", "-r", "5", "-n", "12"]);
        assert_eq!(config.refresh, Duration::from_secs(5));
        assert_eq!(config.run_mode, RunMode::Count(12));
    }

    #[test]
    fn test_run_modes() {
        assert_eq!(parse(&["olmon", "-1"]).run_mode, RunMode::Once);
        assert_eq!(parse(&["olmon", "--once"]).run_mode, RunMode::Once);
        assert_eq!(parse(&["olmon", "--once", "--count", "4"]).run_mode, RunMode::Once);

        assert_eq!(RunMode::Forever.limit(), None);
        assert_eq!(RunMode::Once.limit(), Some(1));
        assert_eq!(RunMode::Count(7).limit(), Some(7));
    }

    #[test]
    fn test_output_flags() {
        let config = parse(&["olmon", "--no-clear", "--no-color"]);
        assert_eq!(config.clear_mode, ClearMode::NoClear);
        assert!(!config.color);
    }

    #[test]
    fn test_custom_url() {
        let config = parse(&["olmon", "--url", "http://192.168.1.20:11434"]);
        assert_eq!(config.display_url(), "http://192.168.1.20:11434");
        assert_eq!(
            config.service.endpoint_url("/api/ps").unwrap().as_str(),
            "http://192.168.1.20:11434/api/ps"
        );
    }

    #[test]
    fn test_validate() {
        assert!(MonitorConfig::default().validate().is_ok());

        let config = MonitorConfig {
            refresh: Duration::ZERO,
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err().category(), "configuration");

        let config = MonitorConfig {
            run_mode: RunMode::Count(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
