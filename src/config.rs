//! Configuration file handling for the ledger.
//!
//! The configuration file is stored at `$LEDGER_HOME/config.json`. The SQLite database lives next
//! to it as `$LEDGER_HOME/ledger.sqlite` unless `config.json` points somewhere else.

use crate::db::Db;
use crate::error::{ErrorType, IntoResult};
use crate::utils;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "ledger";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const LEDGER_SQLITE: &str = "ledger.sqlite";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$LEDGER_HOME` and from there it loads `$LEDGER_HOME/config.json`. It also holds the
/// opened database so that commands share one connection pool.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    db: Db,
    sqlite_path: PathBuf,
}

impl Config {
    /// Creates the data directory, writes an initial `config.json` and initializes the database.
    ///
    /// # Errors
    /// - Returns an error if `config.json` already exists in `dir`.
    /// - Returns an error if any file or database operation fails.
    pub async fn create(dir: impl Into<PathBuf>) -> crate::Result<Self> {
        Self::create_inner(dir.into())
            .await
            .pub_result(ErrorType::Config)
    }

    /// This will
    /// - validate that `ledger_home` and its config file exist
    /// - load the config file
    /// - open the database and bring its schema up to date
    pub async fn load(ledger_home: impl Into<PathBuf>) -> crate::Result<Self> {
        Self::load_inner(ledger_home.into())
            .await
            .pub_result(ErrorType::Config)
    }

    async fn create_inner(maybe_relative: PathBuf) -> Result<Self> {
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the ledger home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "A ledger already exists here, the config file is present at '{}'",
                config_path.display()
            )
        }

        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;

        let sqlite_path = resolve(&root, config_file.sqlite_path());
        let db = Db::load(&sqlite_path)
            .await
            .context("Unable to create SQLite DB")?;

        Ok(Self {
            root,
            config_path,
            config_file,
            db,
            sqlite_path,
        })
    }

    async fn load_inner(maybe_relative: PathBuf) -> Result<Self> {
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Ledger home is missing, run `ledger init` first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let sqlite_path = resolve(&root, config_file.sqlite_path());
        let db = Db::load(&sqlite_path)
            .await
            .context("Unable to load SQLite DB")?;

        Ok(Self {
            root,
            config_path,
            config_file,
            db,
            sqlite_path,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub(crate) fn db(&self) -> &Db {
        &self.db
    }

    pub fn sqlite_path(&self) -> &Path {
        &self.sqlite_path
    }

    pub fn config_version(&self) -> u8 {
        self.config_file.config_version
    }
}

/// Returns `p` unchanged if it is absolute, otherwise joins it onto `root`.
fn resolve(root: &Path, p: PathBuf) -> PathBuf {
    if p.is_absolute() {
        return p;
    }
    root.join(p)
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "ledger",
///   "config_version": 1,
///   "sqlite_path": "ledger.sqlite"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "ledger"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Path to the SQLite database (optional, relative to the ledger home or absolute)
    /// Defaults to $LEDGER_HOME/ledger.sqlite if not specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sqlite_path: Option<PathBuf>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            sqlite_path: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from `path` and checks that it belongs to this application.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path)
            .await
            .context("Unable to load the config file")?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    /// The database path as written in the file, or the default file name.
    fn sqlite_path(&self) -> PathBuf {
        self.sqlite_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(LEDGER_SQLITE))
    }
}
