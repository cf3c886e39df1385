//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};
use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "focus-lock")]
#[command(about = "Pomodoro focus sessions with distraction blocking for a browser front-end")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Preference file (defaults to the platform data directory)
    #[arg(short, long)]
    pub store: Option<PathBuf>,

    /// Keep preferences in memory only
    #[arg(long, conflicts_with = "store")]
    pub ephemeral: bool,

    /// Countdown frame period in milliseconds
    #[arg(long, default_value = "16", value_parser = clap::value_parser!(u64).range(1..))]
    pub frame_ms: u64,

    /// Fullscreen re-assert interval in milliseconds
    #[arg(long, default_value = "100", value_parser = clap::value_parser!(u64).range(10..))]
    pub monitor_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Where preferences persist; `None` means memory only
    pub fn store_path(&self) -> Option<PathBuf> {
        if self.ephemeral {
            return None;
        }
        self.store.clone().or_else(|| {
            dirs::data_dir().map(|dir| dir.join("focus-lock").join("preferences.json"))
        })
    }

    pub fn frame_period(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }

    pub fn monitor_interval(&self) -> Duration {
        Duration::from_millis(self.monitor_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("focus-lock").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]);
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.frame_period(), Duration::from_millis(16));
        assert_eq!(config.monitor_interval(), Duration::from_millis(100));
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn test_store_path_choices() {
        let config = parse(&["--store", "/tmp/prefs.json", "-v"]);
        assert_eq!(config.store_path(), Some(PathBuf::from("/tmp/prefs.json")));
        assert_eq!(config.log_level(), "debug");

        assert_eq!(parse(&["--ephemeral"]).store_path(), None);
        assert!(Config::try_parse_from(["focus-lock", "--ephemeral", "--store", "x"]).is_err());
    }

    #[test]
    fn test_intervals_must_be_positive() {
        assert!(Config::try_parse_from(["focus-lock", "--frame-ms", "0"]).is_err());
        assert!(Config::try_parse_from(["focus-lock", "--monitor-ms", "5"]).is_err());
    }
}
