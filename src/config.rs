use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_HISTORY_DB: &str = "plate-pricer.db";
pub const DEFAULT_PROBE_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_TRAINING_DAYS: u32 = 365;

/// Settings shared by every command. Each can come from a flag or from the
/// environment.
#[derive(Args, Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the prediction service
    #[arg(long, env = "PRICER_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// SQLite file holding the prediction history
    #[arg(long, env = "PRICER_HISTORY_DB", default_value = DEFAULT_HISTORY_DB, global = true)]
    pub history_db: PathBuf,

    /// Seconds between API health probes
    #[arg(
        long,
        env = "PRICER_PROBE_INTERVAL",
        default_value_t = DEFAULT_PROBE_INTERVAL_SECS,
        value_parser = clap::value_parser!(u64).range(1..),
        global = true
    )]
    pub probe_interval: u64,
}

impl Config {
    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: DEFAULT_API_URL.to_string(),
            history_db: PathBuf::from(DEFAULT_HISTORY_DB),
            probe_interval: DEFAULT_PROBE_INTERVAL_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        config: Config,
    }

    #[test]
    fn overrides_from_flags() {
        let cli = TestCli::try_parse_from(&[
            "test",
            "--api-url",
            "http://pricer:9000",
            "--history-db",
            "/tmp/h.db",
            "--probe-interval",
            "5",
        ])
        .unwrap();
        assert_eq!(cli.config.api_url, "http://pricer:9000");
        assert_eq!(cli.config.history_db, PathBuf::from("/tmp/h.db"));
        assert_eq!(cli.config.probe_interval(), Duration::from_secs(5));
    }

    #[test]
    fn zero_probe_interval_is_rejected() {
        assert!(TestCli::try_parse_from(&["test", "--probe-interval", "0"]).is_err());
    }

    #[test]
    fn default_matches_documented_values() {
        let config = Config::default();
        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(config.probe_interval(), Duration::from_secs(30));
    }
}
