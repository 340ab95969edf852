use crate::{CompareConfig, TreeCmpError};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "treecmp.toml";

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: CompareConfig,
    pub path: PathBuf,
    pub exists: bool,
}

/// Load the configuration from `explicit` if given, otherwise from the
/// platform config directory. A missing file yields the defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig, TreeCmpError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => default_config_path()?,
    };
    let exists = path.exists();

    let config = if exists {
        let data = fs::read_to_string(&path).map_err(|e| TreeCmpError::io(&path, e))?;
        parse_config(&data)?
    } else {
        CompareConfig::default()
    };

    Ok(LoadedConfig {
        config,
        path,
        exists,
    })
}

pub fn parse_config(data: &str) -> Result<CompareConfig, TreeCmpError> {
    toml::from_str(data).map_err(|e| TreeCmpError::Config(e.to_string()))
}

pub fn default_config_path() -> Result<PathBuf, TreeCmpError> {
    let dirs = ProjectDirs::from("", "treecmp", "treecmp")
        .ok_or_else(|| TreeCmpError::Config("Unable to determine config directory".to_string()))?;
    Ok(dirs.config_dir().join(CONFIG_FILE_NAME))
}
