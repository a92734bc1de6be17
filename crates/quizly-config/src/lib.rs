//! Configuration management for quizly builds.
//!
//! Parses `quizly.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `build.basecourse`
//! - `database.path`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "quizly.toml";

/// Base course used when none is configured.
const DEFAULT_BASECOURSE: &str = "unknown";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build configuration (paths are relative strings from TOML).
    build: BuildConfigRaw,
    /// Bundled asset configuration.
    assets: AssetsConfigRaw,
    /// Question database configuration (optional section).
    database: Option<DatabaseConfigRaw>,

    /// Resolved build configuration (set after loading).
    #[serde(skip)]
    pub build_resolved: BuildConfig,
    /// Resolved asset configuration (set after loading).
    #[serde(skip)]
    pub assets_resolved: AssetsConfig,
    /// Resolved database configuration (set after loading).
    #[serde(skip)]
    pub database_resolved: DatabaseConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw build configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct BuildConfigRaw {
    source_dir: Option<String>,
    out_dir: Option<String>,
    static_dir: Option<String>,
    basecourse: Option<String>,
}

/// Resolved build configuration with absolute paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildConfig {
    /// Directory containing markdown sources.
    pub source_dir: PathBuf,
    /// Directory receiving rendered pages.
    pub out_dir: PathBuf,
    /// Static asset directory (inside `out_dir` unless configured absolute).
    pub static_dir: PathBuf,
    /// Course identifier recorded with every question.
    pub basecourse: String,
}

/// Raw asset configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct AssetsConfigRaw {
    source_dir: Option<String>,
}

/// Resolved asset configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetsConfig {
    /// Bundled quiz application resources (`*.js`, `*.html`, `*.css`, `media/`).
    pub source_dir: PathBuf,
}

/// Raw database configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
struct DatabaseConfigRaw {
    path: Option<String>,
}

/// Resolved question database configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// JSON file receiving question records. `None` disables recording.
    pub path: Option<PathBuf>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`build.basecourse`").
        field: String,
        /// Error message (e.g., "${`COURSE`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `quizly.toml` in current directory and parents,
    /// falling back to defaults rooted at the current directory.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)
        } else {
            Ok(Self::default_with_cwd())
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    #[must_use]
    pub fn default_with_base(base: &Path) -> Self {
        let out_dir = base.join("build");
        Self {
            build: BuildConfigRaw::default(),
            assets: AssetsConfigRaw::default(),
            database: None,
            build_resolved: BuildConfig {
                source_dir: base.join("docs"),
                static_dir: out_dir.join("_static"),
                out_dir,
                basecourse: DEFAULT_BASECOURSE.to_owned(),
            },
            assets_resolved: AssetsConfig {
                source_dir: base.join("quizly").join("js"),
            },
            database_resolved: DatabaseConfig::default(),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.build_resolved.basecourse, "build.basecourse")?;

        if self.build_resolved.source_dir == self.build_resolved.out_dir {
            return Err(ConfigError::Validation(
                "build.out_dir must differ from build.source_dir".to_owned(),
            ));
        }

        if let Some(raw) = &self.database
            && raw.path.as_deref().is_some_and(|p| p.trim().is_empty())
        {
            return Err(ConfigError::Validation(
                "database.path cannot be empty".to_owned(),
            ));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref basecourse) = self.build.basecourse {
            self.build.basecourse = Some(expand::expand_env(basecourse, "build.basecourse")?);
        }

        if let Some(ref mut database) = self.database
            && let Some(ref path) = database.path
        {
            database.path = Some(expand::expand_env(path, "database.path")?);
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        let out_dir = resolve(self.build.out_dir.as_deref(), "build");
        // Joining an absolute static_dir replaces out_dir entirely.
        let static_dir = out_dir.join(self.build.static_dir.as_deref().unwrap_or("_static"));

        self.build_resolved = BuildConfig {
            source_dir: resolve(self.build.source_dir.as_deref(), "docs"),
            out_dir,
            static_dir,
            basecourse: self
                .build
                .basecourse
                .clone()
                .unwrap_or_else(|| DEFAULT_BASECOURSE.to_owned()),
        };

        self.assets_resolved = AssetsConfig {
            source_dir: resolve(self.assets.source_dir.as_deref(), "quizly/js"),
        };

        self.database_resolved = DatabaseConfig {
            path: self
                .database
                .as_ref()
                .and_then(|db| db.path.as_deref())
                .map(|p| config_dir.join(p)),
        };
    }
}
