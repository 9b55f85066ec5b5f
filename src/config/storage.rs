//! Registry configuration file
//!
//! Format (JSON):
//! ```json
//! {
//!   "defaults": { "host": "localhost", "controluser": "pma" },
//!   "servers": [
//!     { "host": "db1", "creds": { "user": "root", "password": "..." } }
//!   ]
//! }
//! ```
//! `defaults` is the process-wide server baseline, `servers` the ordered
//! raw server mappings.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::{RegistryError, Result};
use crate::record::RawConfig;

const CONFIG_DIR: &str = "server-registry";
const CONFIG_FILE: &str = "servers.json";

/// Environment variable overriding the configuration path
pub const CONFIG_ENV: &str = "SERVER_REGISTRY_CONFIG";

/// Contents of the configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub defaults: RawConfig,
    #[serde(default)]
    pub servers: Vec<RawConfig>,
}

/// Default configuration path in the user's config directory
pub fn default_config_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
        .ok_or_else(|| RegistryError::InvalidConfig("Cannot determine configuration directory".into()))
}

/// Load the configuration file. A missing file is an empty configuration.
pub fn load_config(path: &Path) -> Result<RegistryConfig> {
    if !path.exists() {
        return Ok(RegistryConfig::default());
    }

    // The file holds passwords
    let data = Zeroizing::new(fs::read(path)?);
    let config = serde_json::from_slice(&data)?;

    Ok(config)
}

/// Write the configuration file, readable by the owner only
pub fn save_config(path: &Path, config: &RegistryConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = Zeroizing::new(serde_json::to_vec_pretty(config)?);

    let mut file = File::create(path)?;
    file.write_all(&json)?;
    file.write_all(b"\n")?;
    file.sync_all()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_file_is_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.json")).unwrap();
        assert!(config.defaults.is_empty());
        assert!(config.servers.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("servers.json");

        let mut config = RegistryConfig::default();
        config.defaults.insert("controluser".into(), json!("pma"));
        if let serde_json::Value::Object(server) =
            json!({"host": "db1", "creds": {"user": "u", "password": "p"}})
        {
            config.servers.push(server);
        }

        save_config(&path, &config).unwrap();
        let loaded = load_config(&path).unwrap();

        assert_eq!(loaded.defaults["controluser"], json!("pma"));
        assert_eq!(loaded.servers.len(), 1);
        assert_eq!(loaded.servers[0]["host"], json!("db1"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_sections_are_optional() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("servers.json");
        fs::write(&path, r#"{"servers": []}"#).unwrap();

        let config = load_config(&path).unwrap();
        assert!(config.defaults.is_empty());
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("servers.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(load_config(&path), Err(RegistryError::Json(_))));
    }
}
