//! Path utilities and file system helpers

use std::path::PathBuf;

/// Environment variable that relocates all studio data
pub const DATA_DIR_ENV: &str = "KOMAL_STUDIO_DATA_DIR";

/// Gets the application data directory
pub fn get_app_data_dir() -> Result<PathBuf, String> {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::data_dir()
        .map(|p| p.join("com.komal.studio"))
        .ok_or_else(|| "Could not find app data directory".to_string())
}

/// Gets the database file path holding the favorites and ledger collections
pub fn get_db_path() -> Result<PathBuf, String> {
    get_app_data_dir().map(|p| p.join("studio.db"))
}

/// Gets the studio configuration file path
pub fn get_config_path() -> Result<PathBuf, String> {
    get_app_data_dir().map(|p| p.join("studio_config.json"))
}

/// Gets the directory downloads land in when none is configured
pub fn get_default_download_dir() -> Result<PathBuf, String> {
    match dirs::download_dir() {
        Some(dir) => Ok(dir),
        None => get_app_data_dir().map(|p| p.join("Downloads")),
    }
}
