//! Server settings read from the environment and an optional `.env` file.

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use dotenvy::dotenv;

use crate::error::{EngineError, EngineResult};

/// Settings for the HTTP server binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// Address the server binds to.
    pub bind_addr: String,
    /// Jurisdiction configuration directory.
    pub config_dir: PathBuf,
    /// Optional roster file used to seed the in-memory store.
    pub roster_path: Option<PathBuf>,
}

impl ServerSettings {
    const DEFAULT_BIND_ADDR: &'static str = "0.0.0.0:3000";
    const DEFAULT_CONFIG_DIR: &'static str = "./config/gt";

    /// Reads settings from `NOMINA_BIND_ADDR`, `NOMINA_CONFIG_DIR` and
    /// `NOMINA_ROSTER`, falling back to defaults for the first two.
    ///
    /// A `.env` file in the working directory, if any, is loaded first;
    /// variables already set in the process win.
    pub fn from_env() -> Self {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings from the given env file without touching the process
    /// environment. Process variables still take precedence over the file.
    pub fn from_env_file<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();
        let entries = dotenvy::from_path_iter(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        let mut file_vars = HashMap::new();
        for entry in entries {
            let (key, value) = entry.map_err(|e| EngineError::ConfigParseError {
                path: path_str.clone(),
                message: e.to_string(),
            })?;
            file_vars.insert(key, value);
        }

        Ok(Self::from_lookup(|key| {
            env::var(key).ok().or_else(|| file_vars.get(key).cloned())
        }))
    }

    /// Builds settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            bind_addr: non_empty("NOMINA_BIND_ADDR")
                .unwrap_or_else(|| Self::DEFAULT_BIND_ADDR.to_string()),
            config_dir: non_empty("NOMINA_CONFIG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_CONFIG_DIR)),
            roster_path: non_empty("NOMINA_ROSTER").map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let settings = ServerSettings::from_lookup(|_| None);

        assert_eq!(settings.bind_addr, "0.0.0.0:3000");
        assert_eq!(settings.config_dir, PathBuf::from("./config/gt"));
        assert!(settings.roster_path.is_none());
    }

    #[test]
    fn test_values_are_read_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("NOMINA_BIND_ADDR", "127.0.0.1:8080"),
            ("NOMINA_CONFIG_DIR", "/etc/nomina/gt"),
            ("NOMINA_ROSTER", "/etc/nomina/roster.yaml"),
        ]
        .into_iter()
        .collect();

        let settings = ServerSettings::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(settings.bind_addr, "127.0.0.1:8080");
        assert_eq!(settings.config_dir, PathBuf::from("/etc/nomina/gt"));
        assert_eq!(
            settings.roster_path,
            Some(PathBuf::from("/etc/nomina/roster.yaml"))
        );
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let settings = ServerSettings::from_lookup(|_| Some("  ".to_string()));

        assert_eq!(settings.bind_addr, "0.0.0.0:3000");
        assert!(settings.roster_path.is_none());
    }

    #[test]
    fn test_env_file_values_are_read() {
        let path = env::temp_dir().join(format!("nomina-settings-{}.env", uuid::Uuid::new_v4()));
        fs::write(
            &path,
            "# server\nNOMINA_ROSTER=/srv/nomina/roster.yaml\n",
        )
        .unwrap();

        let result = ServerSettings::from_env_file(&path);
        fs::remove_file(&path).unwrap();

        let settings = result.unwrap();
        if env::var("NOMINA_ROSTER").is_err() {
            assert_eq!(
                settings.roster_path,
                Some(PathBuf::from("/srv/nomina/roster.yaml"))
            );
        }
    }

    #[test]
    fn test_missing_env_file_is_an_error() {
        let result = ServerSettings::from_env_file("/nonexistent/nomina.env");

        assert!(matches!(result, Err(EngineError::ConfigNotFound { .. })));
    }
}
