//! Configuration loading and root folder resolution

use crate::{Error, Result};
use std::path::PathBuf;

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "glossary.db";

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>, env_var_name: &str) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = find_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
                    return Ok(PathBuf::from(root_folder));
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    Ok(default_root_folder())
}

/// Ensure the root folder exists and return the database path within it
pub fn prepare_root_folder(root_folder: &PathBuf) -> Result<PathBuf> {
    std::fs::create_dir_all(root_folder)?;
    Ok(root_folder.join(DATABASE_FILE))
}

/// Locate the configuration file for the platform
fn find_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/glossary/config.toml first, then /etc/glossary/config.toml
        if let Some(path) = dirs::config_dir().map(|d| d.join("glossary").join("config.toml")) {
            if path.exists() {
                return Ok(path);
            }
        }
        let system_config = PathBuf::from("/etc/glossary/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
        return Err(Error::Config("No config file found".to_string()));
    }

    let config_path = dirs::config_dir()
        .map(|d| d.join("glossary").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

    if config_path.exists() {
        Ok(config_path)
    } else {
        Err(Error::Config(format!(
            "Config file not found: {:?}",
            config_path
        )))
    }
}

/// OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("glossary"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/glossary"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("glossary"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/glossary"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("glossary"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\glossary"))
    } else {
        PathBuf::from("./glossary_data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn cli_argument_wins_over_environment() {
        std::env::set_var("GLOSSARY_TEST_ROOT", "/tmp/from-env");
        let resolved = resolve_root_folder(Some("/tmp/from-cli"), "GLOSSARY_TEST_ROOT").unwrap();
        assert_eq!(resolved, PathBuf::from("/tmp/from-cli"));
        std::env::remove_var("GLOSSARY_TEST_ROOT");
    }

    #[test]
    #[serial]
    fn environment_used_when_no_cli_argument() {
        std::env::set_var("GLOSSARY_TEST_ROOT", "/tmp/from-env");
        let resolved = resolve_root_folder(None, "GLOSSARY_TEST_ROOT").unwrap();
        assert_eq!(resolved, PathBuf::from("/tmp/from-env"));
        std::env::remove_var("GLOSSARY_TEST_ROOT");
    }

    #[test]
    #[serial]
    fn falls_back_to_default_root() {
        std::env::remove_var("GLOSSARY_TEST_ROOT");
        let resolved = resolve_root_folder(None, "GLOSSARY_TEST_ROOT").unwrap();
        assert!(!resolved.as_os_str().is_empty());
    }

    #[test]
    fn prepare_creates_directory_and_returns_db_path() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("root");
        let db_path = prepare_root_folder(&root).unwrap();
        assert!(root.exists());
        assert_eq!(db_path, root.join(DATABASE_FILE));
    }
}
