//! Application environment and configuration.
use crate::{error::Error, extension::TomlTableExt};
use std::{
    fs,
    path::{Path, PathBuf},
};
use toml::Table;

mod env;

pub use self::env::Env;

/// Application state: the running environment and its configuration.
#[derive(Debug, Clone)]
pub struct State {
    /// Environment.
    env: Env,
    /// Configuration.
    config: Table,
}

impl State {
    /// Creates a new instance with the configuration.
    #[inline]
    pub fn new(env: Env, config: Table) -> Self {
        Self { env, config }
    }

    /// Loads the config file `config/config.{env}.toml` for the specific env.
    /// The parent directory is searched when the project has no `config` directory.
    pub fn load(env: Env) -> Result<Self, Error> {
        let project_dir = std::env::current_dir()?;
        let path = Self::config_path(&project_dir, env);
        let content = fs::read_to_string(&path).map_err(|err| {
            Error::with_source(format!("fail to read the config file `{}`", path.display()), err)
        })?;
        Self::from_toml_str(env, &content)
    }

    /// Parses the configuration from a TOML document.
    pub fn from_toml_str(env: Env, content: &str) -> Result<Self, Error> {
        let config = toml::from_str::<Table>(content)
            .map_err(|err| Error::with_source("fail to parse the toml config", err))?;
        Ok(Self::new(env, config))
    }

    /// Returns the env.
    #[inline]
    pub fn env(&self) -> Env {
        self.env
    }

    /// Returns a reference to the config.
    #[inline]
    pub fn config(&self) -> &Table {
        &self.config
    }

    /// Returns the config table for the key, or an empty table if absent.
    #[inline]
    pub fn get_config(&self, key: &str) -> Option<&Table> {
        self.config.get_table(key)
    }

    /// Returns the application name in `[main]`.
    #[inline]
    pub fn name(&self) -> &str {
        self.get_config("main")
            .and_then(|main| main.get_str("name"))
            .unwrap_or("picnest")
    }

    fn config_path(project_dir: &Path, env: Env) -> PathBuf {
        let file_name = format!("config.{}.toml", env.as_str());
        if project_dir.join("config").exists() {
            project_dir.join("config").join(file_name)
        } else {
            project_dir.join("../config").join(file_name)
        }
    }
}
