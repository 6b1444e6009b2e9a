use std::path::{Path, PathBuf};

use usage_app::Config;

const CONFIG_DIR_NAME: &str = "timescale-usage";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub file: Option<PathBuf>,
}

/// Defaults, then the config file, then `POSTGRES_*` environment variables.
///
/// An explicit `--config` path must exist; the default location is optional.
pub fn load(explicit: Option<&Path>) -> usage_app::Result<ConfigLoad> {
    let file = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_file().filter(|path| path.exists()),
    };
    let mut config = match &file {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.apply_env()?;
    config.validate()?;
    Ok(ConfigLoad { config, file })
}

fn default_config_file() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}
