//! Application configuration management.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. Built-in defaults
//! 2. TOML file (`--config <PATH>`, else `config.toml` in the platform
//!    config directory)
//! 3. Environment variables prefixed with `DUPESWEEP_`
//! 4. Command-line flags

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::actions::DeleteConfig;
use crate::cli::Cli;
use crate::duplicates::{FinderConfig, HashErrorPolicy, DEFAULT_QUEUE_DEPTH};
use crate::scanner::{WalkerConfig, DEFAULT_BUFFER_SIZE};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "DUPESWEEP_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of fingerprint workers.
    pub workers: usize,
    /// Capacity of each hand-off queue.
    pub queue_depth: usize,
    /// Read buffer size for fingerprinting.
    pub buffer_size: usize,
    /// Failure policy for unreadable files.
    pub on_hash_error: HashErrorPolicy,
    /// Skip dot-prefixed entries.
    pub skip_hidden: bool,
    /// Minimum file size in bytes.
    pub min_size: Option<u64>,
    /// Byte-for-byte confirmation before deleting.
    pub paranoid: bool,
    /// Move to trash instead of deleting.
    pub trash: bool,
    /// Report only.
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: 1,
            queue_depth: DEFAULT_QUEUE_DEPTH,
            buffer_size: DEFAULT_BUFFER_SIZE,
            on_hash_error: HashErrorPolicy::Abort,
            skip_hidden: false,
            min_size: None,
            paranoid: false,
            trash: false,
            dry_run: false,
        }
    }
}

/// Values given explicitly on the command line.
///
/// Absent flags are skipped so they don't mask file or environment values.
#[derive(Debug, Default, Serialize)]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    workers: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    queue_depth: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    on_hash_error: Option<HashErrorPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    skip_hidden: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    paranoid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trash: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dry_run: Option<bool>,
}

impl From<&Cli> for CliOverrides {
    fn from(cli: &Cli) -> Self {
        Self {
            workers: cli.worker_count(),
            queue_depth: cli.queue_depth,
            on_hash_error: cli.keep_going.then_some(HashErrorPolicy::Report),
            skip_hidden: cli.skip_hidden.then_some(true),
            min_size: cli.min_size,
            paranoid: cli.paranoid.then_some(true),
            trash: cli.trash.then_some(true),
            dry_run: cli.dry_run.then_some(true),
        }
    }
}

impl Config {
    /// Load the full layered configuration for a CLI invocation.
    ///
    /// # Errors
    ///
    /// Fails if an explicit config file is missing, any layer is malformed,
    /// or the merged values don't validate.
    pub fn load(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => {
                if !path.is_file() {
                    bail!("Config file not found: {}", path.display());
                }
                Some(path.clone())
            }
            None => Self::default_path(),
        };

        let config: Self = Self::figment(file.as_deref())
            .merge(Serialized::defaults(CliOverrides::from(cli)))
            .extract()
            .context("Invalid configuration")?;

        config.validate()?;
        log::debug!("Effective configuration: {:?}", config);
        Ok(config)
    }

    /// Defaults, optional TOML file and environment, without CLI overrides.
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = file {
            log::debug!("Reading config file {}", path.display());
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Default platform-specific configuration path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dupesweep").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            bail!("workers must be at least 1");
        }
        if self.buffer_size == 0 {
            bail!("buffer_size must be at least 1");
        }
        Ok(())
    }

    /// Coordinator settings derived from this configuration.
    #[must_use]
    pub fn finder_config(&self) -> FinderConfig {
        let walker = WalkerConfig::default()
            .with_skip_hidden(self.skip_hidden)
            .with_min_size(self.min_size);

        FinderConfig::default()
            .with_workers(self.workers)
            .with_queue_depth(self.queue_depth)
            .with_buffer_size(self.buffer_size)
            .with_hash_error_policy(self.on_hash_error)
            .with_walker_config(walker)
    }

    /// Eliminator settings derived from this configuration.
    #[must_use]
    pub fn delete_config(&self) -> DeleteConfig {
        DeleteConfig::default()
            .with_trash(self.trash)
            .with_dry_run(self.dry_run)
            .with_paranoid(self.paranoid)
    }
}
