//! Configuration management for lanshare
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `LANSHARE_*` environment variables, then command-line flags. Everything
//! is fixed at startup.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

use crate::storage::UploadPolicy;

/// Config file looked up in the working directory when none is given
const DEFAULT_CONFIG_FILE: &str = "lanshare";

/// Complete server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// IP address to bind the HTTP listener
    pub bind_address: String,

    /// HTTP port
    pub port: u16,

    /// Directory served to clients
    pub serve_dir: String,

    /// Per-request body ceiling in MiB, 0 disables it
    pub max_upload_mb: u64,

    /// Where uploaded files are placed
    pub upload_policy: UploadPolicy,

    /// Bucket directory for the timestamped policy, relative to the root
    pub asset_dir: String,
}

/// Values supplied on the command line. `None` keeps the lower layers.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub serve_dir: Option<String>,
    pub upload_policy: Option<UploadPolicy>,
}

impl ServerConfig {
    /// Load configuration from defaults, file, environment and overrides
    pub fn load(overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let file = match &overrides.config_file {
            Some(path) => File::from(path.as_path()).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = Config::builder()
            .set_default("bind_address", "0.0.0.0")?
            .set_default("port", 8080_i64)?
            .set_default("serve_dir", ".")?
            .set_default("max_upload_mb", 32_i64)?
            .set_default("upload_policy", UploadPolicy::default().as_str())?
            .set_default("asset_dir", "assert")?
            .add_source(file)
            .add_source(Environment::with_prefix("LANSHARE"))
            .set_override_option("bind_address", overrides.bind_address.clone())?
            .set_override_option("port", overrides.port.map(i64::from))?
            .set_override_option("serve_dir", overrides.serve_dir.clone())?
            .set_override_option(
                "upload_policy",
                overrides.upload_policy.map(|p| p.as_str()),
            )?
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Message("port cannot be 0".into()));
        }

        if self.serve_dir.trim().is_empty() {
            return Err(ConfigError::Message("serve_dir cannot be empty".into()));
        }

        let mut components = Path::new(&self.asset_dir).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => {}
            _ => {
                return Err(ConfigError::Message(
                    "asset_dir must be a single directory name".into(),
                ));
            }
        }

        Ok(())
    }

    /// Bind address and port as a socket address string
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Body ceiling in bytes, `None` when disabled
    pub fn max_upload_bytes(&self) -> Option<u64> {
        (self.max_upload_mb > 0).then(|| self.max_upload_mb.saturating_mul(1024 * 1024))
    }
}
