use super::schema::Config;
use crate::error::{ConfigError, Result};
use directories::UserDirs;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = ".sysops";
const CONFIG_FILE: &str = "config.toml";

/// `~/.sysops/config.toml`.
pub fn default_config_path() -> Result<PathBuf> {
    let home = UserDirs::new()
        .map(|u| u.home_dir().to_path_buf())
        .ok_or_else(|| ConfigError::Load("could not find home directory".into()))?;
    Ok(home.join(CONFIG_DIR).join(CONFIG_FILE))
}

impl Config {
    /// Load `~/.sysops/config.toml`, writing defaults there on first run.
    pub fn load_or_init() -> Result<Self> {
        Self::load_or_init_at(&default_config_path()?)
    }

    pub fn load_or_init_at(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            return Self::load_from(config_path);
        }

        if let Some(dir) = config_path.parent() {
            fs::create_dir_all(dir)
                .map_err(|e| ConfigError::Save(format!("{}: {e}", dir.display())))?;
        }
        let config = Self {
            config_path: config_path.to_path_buf(),
            ..Self::default()
        };
        config.save()?;
        tracing::info!(path = %config_path.display(), "wrote default config");
        Ok(config)
    }

    /// Load an existing file. Missing sections and fields take their defaults.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(config_path)
            .map_err(|e| ConfigError::Load(format!("{}: {e}", config_path.display())))?;
        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::Load(format!("{}: {e}", config_path.display())))?;
        config.config_path = config_path.to_path_buf();
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let toml_str =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Save(e.to_string()))?;
        fs::write(&self.config_path, toml_str)
            .map_err(|e| ConfigError::Save(format!("{}: {e}", self.config_path.display())))?;
        Ok(())
    }
}
