/*!
 * Configuration for the gripper server
 *
 * Values come from three layers: built-in defaults, an optional TOML file,
 * and the command line (flags and environment variables). Later layers win.
 */

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{GripperError, Result};

/// Galaxy Gripper - serves Galaxy histories and datasets as GRIPSource collections.
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Galaxy server URL (positional form; --galaxy-url takes precedence)
    #[arg(value_name = "GALAXY_URL")]
    pub url: Option<String>,

    /// Galaxy API key (positional form; --galaxy-key takes precedence)
    #[arg(value_name = "GALAXY_KEY")]
    pub key: Option<String>,

    /// TOML configuration file
    #[arg(short, long, env = "GRIPPER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Bind address
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Galaxy server URL
    #[arg(long, env = "GALAXY_URL")]
    pub galaxy_url: Option<String>,

    /// Galaxy API key
    #[arg(long, env = "GALAXY_API_KEY", hide_env_values = true)]
    pub galaxy_key: Option<String>,

    /// Maximum number of calls served at once
    #[arg(long)]
    pub max_workers: Option<usize>,

    /// Datasets requested from Galaxy per listing page
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Timeout for each Galaxy request, in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Log level
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable debug logging (same as --log-level debug)
    #[arg(short, long)]
    pub debug: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

/// Server configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct GripperConfig {
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bind address
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Galaxy server URL
    #[serde(default)]
    pub galaxy_url: String,

    /// Galaxy API key
    #[serde(default)]
    pub galaxy_key: String,

    /// Maximum number of calls served at once
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Datasets requested from Galaxy per listing page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Timeout for each Galaxy request, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Emit logs as JSON lines
    #[serde(default)]
    pub log_json: bool,
}

impl Default for GripperConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
            galaxy_url: String::new(),
            galaxy_key: String::new(),
            max_workers: default_max_workers(),
            page_size: default_page_size(),
            timeout_secs: default_timeout_secs(),
            log_level: LogLevel::default(),
            log_json: false,
        }
    }
}

impl fmt::Debug for GripperConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GripperConfig")
            .field("port", &self.port)
            .field("bind", &self.bind)
            .field("galaxy_url", &self.galaxy_url)
            .field("galaxy_key", &"<redacted>")
            .field("max_workers", &self.max_workers)
            .field("page_size", &self.page_size)
            .field("timeout_secs", &self.timeout_secs)
            .field("log_level", &self.log_level)
            .field("log_json", &self.log_json)
            .finish()
    }
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only errors
    Error,

    /// Warnings and errors
    Warn,

    /// Info, warnings, and errors
    #[default]
    Info,

    /// Debug and above
    Debug,

    /// All messages including traces
    Trace,
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

// Default value functions for serde
fn default_port() -> u16 {
    50051
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_max_workers() -> usize {
    100
}

fn default_page_size() -> usize {
    galaxy_connect::client::DEFAULT_PAGE_SIZE
}

fn default_timeout_secs() -> u64 {
    galaxy_connect::client::DEFAULT_TIMEOUT.as_secs()
}

impl GripperConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            GripperError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&contents).map_err(|e| {
            GripperError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Build the effective configuration from the command line.
    ///
    /// The file named by `--config` (if any) is loaded first and every value
    /// given on the command line or through the environment overrides it.
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(url) = cli.galaxy_url.or(cli.url) {
            config.galaxy_url = url;
        }
        if let Some(key) = cli.galaxy_key.or(cli.key) {
            config.galaxy_key = key;
        }
        if let Some(port) = cli.port {
            config.port = port;
        }
        if let Some(bind) = cli.bind {
            config.bind = bind;
        }
        if let Some(max_workers) = cli.max_workers {
            config.max_workers = max_workers;
        }
        if let Some(page_size) = cli.page_size {
            config.page_size = page_size;
        }
        if let Some(timeout_secs) = cli.timeout_secs {
            config.timeout_secs = timeout_secs;
        }
        if let Some(level) = cli.log_level {
            config.log_level = level;
        }
        if cli.debug {
            config.log_level = LogLevel::Debug;
        }
        if cli.log_json {
            config.log_json = true;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the server cannot start with.
    pub fn validate(&self) -> Result<()> {
        if self.galaxy_url.trim().is_empty() {
            return Err(GripperError::Config(
                "Galaxy URL is required (--galaxy-url or GALAXY_URL)".to_string(),
            ));
        }
        if self.galaxy_key.is_empty() {
            return Err(GripperError::Config(
                "Galaxy API key is required (--galaxy-key or GALAXY_API_KEY)".to_string(),
            ));
        }
        if self.max_workers == 0 {
            return Err(GripperError::Config(
                "max_workers must be at least 1".to_string(),
            ));
        }
        if self.page_size == 0 {
            return Err(GripperError::Config(
                "page_size must be at least 1".to_string(),
            ));
        }
        self.listen_addr()?;
        Ok(())
    }

    /// Socket address to listen on. `bind` is a bare IPv4 or IPv6 address.
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.bind.trim_matches(&['[', ']'][..]).parse().map_err(|e| {
            GripperError::Config(format!("Invalid bind address {:?}: {}", self.bind, e))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("galaxy-gripper").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = GripperConfig::default();
        assert_eq!(config.port, 50051);
        assert_eq!(config.bind, "0.0.0.0");
        assert_eq!(config.max_workers, 100);
        assert_eq!(config.page_size, 500);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.log_level, LogLevel::Info);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_positional_arguments() {
        let config = GripperConfig::from_cli(Cli {
            url: Some("https://usegalaxy.org".into()),
            key: Some("abc123".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(config.galaxy_url, "https://usegalaxy.org");
        assert_eq!(config.galaxy_key, "abc123");
        assert_eq!(config.listen_addr().unwrap().to_string(), "0.0.0.0:50051");
    }

    #[test]
    fn test_named_flags_win_over_positionals() {
        let config = GripperConfig::from_cli(Cli {
            url: Some("http://old".into()),
            key: Some("old".into()),
            galaxy_url: Some("http://new".into()),
            galaxy_key: Some("new".into()),
            port: Some(6000),
            debug: true,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(config.galaxy_url, "http://new");
        assert_eq!(config.galaxy_key, "new");
        assert_eq!(config.port, 6000);
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_parse_flags() {
        let parsed = cli(&[
            "--galaxy-url",
            "http://localhost:8080",
            "--galaxy-key",
            "k",
            "--max-workers",
            "8",
            "--page-size",
            "50",
            "--log-level",
            "trace",
            "--log-json",
        ]);
        let config = GripperConfig::from_cli(parsed).unwrap();
        assert_eq!(config.max_workers, 8);
        assert_eq!(config.page_size, 50);
        assert_eq!(config.log_level, LogLevel::Trace);
        assert!(config.log_json);
    }

    #[test]
    fn test_file_then_cli_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
galaxy_url = "https://galaxy.example.org"
galaxy_key = "from-file"
port = 7000
max_workers = 4
log_level = "warn"
"#
        )
        .unwrap();

        let config = GripperConfig::from_cli(Cli {
            config: Some(file.path().to_path_buf()),
            port: Some(7001),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(config.galaxy_url, "https://galaxy.example.org");
        assert_eq!(config.galaxy_key, "from-file");
        assert_eq!(config.port, 7001);
        assert_eq!(config.max_workers, 4);
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.page_size, 500);
    }

    #[test]
    fn test_bad_file_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"not a number\"").unwrap();
        assert!(matches!(
            GripperConfig::from_file(file.path()),
            Err(GripperError::Config(_))
        ));

        let missing = Path::new("/definitely/not/here/gripper.toml");
        assert!(matches!(
            GripperConfig::from_file(missing),
            Err(GripperError::Config(_))
        ));
    }

    #[test]
    fn test_validation() {
        let mut config = GripperConfig {
            galaxy_url: "http://localhost".into(),
            galaxy_key: "k".into(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        config.max_workers = 0;
        assert!(config.validate().is_err());

        config.max_workers = 1;
        config.galaxy_key.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_listen_addr_accepts_ipv6() {
        let mut config = GripperConfig {
            port: 8080,
            ..Default::default()
        };
        for bind in ["::", "[::]"] {
            config.bind = bind.to_string();
            assert_eq!(config.listen_addr().unwrap().to_string(), "[::]:8080");
        }

        config.bind = "127.0.0.1".to_string();
        assert_eq!(config.listen_addr().unwrap().to_string(), "127.0.0.1:8080");

        config.bind = "localhost".to_string();
        assert!(matches!(config.listen_addr(), Err(GripperError::Config(_))));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = GripperConfig {
            galaxy_key: "top-secret".into(),
            ..Default::default()
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("top-secret"));
    }
}
