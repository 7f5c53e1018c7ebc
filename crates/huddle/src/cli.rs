//! Command-line flags and how they override loaded settings.

use std::path::PathBuf;

use clap::Parser;
use huddle_settings::HuddleSettings;

/// Real-time WebSocket chat hub.
#[derive(Debug, Parser)]
#[command(name = "huddle", version, about)]
pub struct Args {
    /// Settings file (default: ~/.huddle/settings.json).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Address to bind.
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on.
    #[arg(long, short)]
    pub port: Option<u16>,

    /// Log level or filter directive (RUST_LOG takes precedence).
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub json_logs: bool,
}

impl Args {
    /// Apply flags on top of `settings`. Flags that were not given leave the
    /// loaded value alone.
    pub fn apply(&self, settings: &mut HuddleSettings) {
        if let Some(host) = &self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(level) = &self.log_level {
            settings.logging.level.clone_from(level);
        }
        if self.json_logs {
            settings.logging.json = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("huddle").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn no_flags_change_nothing() {
        let mut settings = HuddleSettings::default();
        parse(&[]).apply(&mut settings);
        assert_eq!(settings, HuddleSettings::default());
    }

    #[test]
    fn flags_override_settings() {
        let mut settings = HuddleSettings::default();
        parse(&[
            "--host",
            "127.0.0.1",
            "--port",
            "8080",
            "--log-level",
            "debug",
            "--json-logs",
        ])
        .apply(&mut settings);

        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.logging.level, "debug");
        assert!(settings.logging.json);
    }

    #[test]
    fn short_port_flag() {
        assert_eq!(parse(&["-p", "9000"]).port, Some(9000));
    }

    #[test]
    fn config_path_is_kept() {
        let args = parse(&["--config", "/tmp/huddle.json"]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/huddle.json")));
    }

    #[test]
    fn invalid_port_is_rejected() {
        assert!(Args::try_parse_from(["huddle", "--port", "70000"]).is_err());
    }

    #[test]
    fn flags_beat_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"server": {"port": 7000, "host": "10.0.0.1"}}"#).unwrap();

        let mut settings = huddle_settings::load_settings_from_path(&path).unwrap();
        parse(&["--port", "7001"]).apply(&mut settings);
        assert_eq!(settings.server.port, 7001);
        assert_eq!(settings.server.host, "10.0.0.1");
    }
}
