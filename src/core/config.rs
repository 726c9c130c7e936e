use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Optional user configuration for the exporter.
///
/// Lives as TOML in the platform config directory. A missing file is not an
/// error; every field has a working default.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    /// Root directory for exported cards; per-profile subdirectories are
    /// created beneath it.
    pub output_dir: Option<String>,
    /// Logo image composited onto native-profile exports. When unset, a
    /// built-in badge is used.
    pub logo_path: Option<String>,
}

impl Config {
    pub fn load() -> Result<Config, Box<dyn std::error::Error>> {
        let config_path = Self::get_config_path();
        Self::load_from_path(&config_path)
    }

    pub fn load_from_path(config_path: &PathBuf) -> Result<Config, Box<dyn std::error::Error>> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let config_path = Self::get_config_path();
        self.save_to_path(&config_path)
    }

    pub fn save_to_path(&self, config_path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// The export root: the configured directory, or `exports` under the
    /// platform config directory.
    pub fn output_root(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) => PathBuf::from(dir),
            None => Self::project_dirs().config_dir().join("exports"),
        }
    }

    fn get_config_path() -> PathBuf {
        Self::project_dirs().config_dir().join("config.toml")
    }

    fn project_dirs() -> ProjectDirs {
        ProjectDirs::from("org", "swelldreams", "swelld")
            .expect("Failed to determine config directory")
    }
}
