use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Config directory not found")]
    DirectoryNotFound,

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

/// Order in which the log query traverses commits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommitOrdering {
    Date,
    AuthorDate,
    Topo,
}

impl CommitOrdering {
    /// The `git log` flag selecting this ordering
    pub fn log_arg(&self) -> &'static str {
        match self {
            CommitOrdering::Date => "--date-order",
            CommitOrdering::AuthorDate => "--author-date-order",
            CommitOrdering::Topo => "--topo-order",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub graph: GraphConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GraphConfig {
    /// Maximum number of commits loaded into the graph window
    pub max_commits: usize,
    pub commit_ordering: CommitOrdering,
    /// Remotes whose refs are excluded from the graph
    pub hide_remotes: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            graph: GraphConfig {
                max_commits: 300,
                commit_ordering: CommitOrdering::AuthorDate,
                hide_remotes: Vec::new(),
            },
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        let home = std::env::var("HOME").map_err(|_| ConfigError::DirectoryNotFound)?;
        Ok(PathBuf::from(home).join(".config").join("gitgraph"))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, falling back to defaults when absent
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<(), ConfigError> {
        self.validate()?;

        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)?;

        let path = Self::config_path()?;
        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents)?;

        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.graph.max_commits == 0 {
            return Err(ConfigError::InvalidValue(
                "graph.max_commits must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
