use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    pub walk: WalkConfig,
    #[serde(default)]
    pub parse: ParseConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub download: DownloadConfig,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Sqlite,
    Mongodb,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_backend")]
    pub backend: Backend,
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
    /// Name of the environment variable holding the connection string.
    #[serde(default = "default_uri_env")]
    pub uri_env: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_collection")]
    pub collection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: default_db_path(),
            uri_env: default_uri_env(),
            database: default_database(),
            collection: default_collection(),
        }
    }
}

fn default_backend() -> Backend {
    Backend::Sqlite
}
fn default_db_path() -> PathBuf {
    PathBuf::from("./data/dsync.sqlite")
}
fn default_uri_env() -> String {
    "DSYNC_MONGODB_URI".to_string()
}
fn default_database() -> String {
    "sampleData".to_string()
}
fn default_collection() -> String {
    "dataFiles".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct WalkConfig {
    pub root: PathBuf,
    #[serde(default = "default_data_suffix")]
    pub data_suffix: String,
    #[serde(default)]
    pub base_only: bool,
    #[serde(default)]
    pub follow_symlinks: bool,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    /// Leading segment of the stored `filepath`. Defaults to the root's own name.
    #[serde(default)]
    pub path_prefix: Option<String>,
}

fn default_data_suffix() -> String {
    ".dat".to_string()
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MismatchPolicy {
    #[default]
    Reject,
    Skip,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ParseConfig {
    #[serde(default = "default_comment_prefix")]
    pub comment_prefix: String,
    #[serde(default = "default_true")]
    pub skip_indented: bool,
    #[serde(default)]
    pub on_mismatch: MismatchPolicy,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            comment_prefix: default_comment_prefix(),
            skip_indented: true,
            on_mismatch: MismatchPolicy::Reject,
        }
    }
}

fn default_comment_prefix() -> String {
    "#".to_string()
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetadataConfig {
    #[serde(default = "default_directory_file")]
    pub directory_file: String,
    #[serde(default = "default_file_suffix")]
    pub file_suffix: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            directory_file: default_directory_file(),
            file_suffix: default_file_suffix(),
        }
    }
}

fn default_directory_file() -> String {
    "meta-data.json".to_string()
}
fn default_file_suffix() -> String {
    "-meta-data.json".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct DownloadConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            extension: default_extension(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("downloadedDataFiles")
}
fn default_extension() -> String {
    "txt".to_string()
}

impl Config {
    /// All-defaults config rooted at `root`.
    pub fn minimal(root: impl Into<PathBuf>) -> Self {
        Self {
            store: StoreConfig::default(),
            walk: WalkConfig {
                root: root.into(),
                data_suffix: default_data_suffix(),
                base_only: false,
                follow_symlinks: false,
                exclude_globs: Vec::new(),
                path_prefix: None,
            },
            parse: ParseConfig::default(),
            metadata: MetadataConfig::default(),
            download: DownloadConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;

    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.store.collection.trim().is_empty() {
        anyhow::bail!("store.collection must not be empty");
    }

    if config.store.backend == Backend::Mongodb {
        if config.store.database.trim().is_empty() {
            anyhow::bail!("store.database must not be empty when backend is 'mongodb'");
        }
        if config.store.uri_env.trim().is_empty() {
            anyhow::bail!("store.uri_env must name an environment variable");
        }
    }

    if config.walk.data_suffix.is_empty() {
        anyhow::bail!("walk.data_suffix must not be empty");
    }

    if config.parse.comment_prefix.is_empty() {
        anyhow::bail!("parse.comment_prefix must not be empty");
    }

    if config.metadata.directory_file.is_empty() || config.metadata.file_suffix.is_empty() {
        anyhow::bail!("metadata.directory_file and metadata.file_suffix must not be empty");
    }

    if config.download.extension.starts_with('.') {
        anyhow::bail!(
            "download.extension must not start with '.': '{}'",
            config.download.extension
        );
    }

    Ok(())
}
