//! Source layering.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use tracing::{debug, warn};

use crate::error::ConfigResult;
use crate::schema::GatewayConfig;

/// Prefix of environment overrides, e.g. `SKILLGATE__POLICY__MAX_INPUT_CHARS`.
pub const ENV_PREFIX: &str = "SKILLGATE";
/// Environment variable naming the configuration file.
pub const CONFIG_PATH_VAR: &str = "SKILLGATE_CONFIG";

const LIST_KEYS: [&str; 1] = ["policy.allowed_domains"];

/// Builds a [`GatewayConfig`] from defaults, a file, and the environment.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    env: Option<HashMap<String, String>>,
}

impl ConfigLoader {
    /// Loader reading the file named by `SKILLGATE_CONFIG`, if any, and the
    /// process environment.
    #[must_use]
    pub fn new() -> Self {
        Self {
            file: std::env::var_os(CONFIG_PATH_VAR).map(PathBuf::from),
            env: None,
        }
    }

    /// Uses `path` as the configuration file.
    #[must_use]
    pub fn file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Reads overrides from `vars` instead of the process environment.
    #[must_use]
    pub fn env_overrides(mut self, vars: HashMap<String, String>) -> Self {
        self.env = Some(vars);
        self
    }

    /// Resolves and validates the configuration.
    ///
    /// A configured file that does not exist is skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::Load`] when a source is malformed and
    /// [`crate::ConfigError::Invalid`] when validation fails.
    pub fn load(self) -> ConfigResult<GatewayConfig> {
        let mut builder = Config::builder();

        if let Some(path) = &self.file {
            if path.exists() {
                debug!(path = %path.display(), "reading configuration file");
                builder = builder.add_source(File::from(path.as_path()));
            } else {
                warn!(path = %path.display(), "configuration file not found; using defaults");
            }
        }

        let mut env = Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
            .list_separator(",");
        for key in LIST_KEYS {
            env = env.with_list_parse_key(key);
        }
        if let Some(vars) = self.env {
            env = env.source(Some(vars));
        }

        let config: GatewayConfig = builder.add_source(env).build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    fn temp_toml(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("skillgate-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn file_then_environment() {
        let path = temp_toml(
            "[policy]\nmax_input_chars = 500\nallowed_domains = [\"a.test\"]\n\n[peers]\nmax_depth = 5\n",
        );
        let config = ConfigLoader::default()
            .file(&path)
            .env_overrides(vars(&[
                ("SKILLGATE__POLICY__MAX_INPUT_CHARS", "700"),
                ("SKILLGATE__HTTP__LIST_TIMEOUT_MS", "2500"),
            ]))
            .load()
            .unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.policy.max_input_chars, 700);
        assert_eq!(config.policy.allowed_domains, vec!["a.test".to_owned()]);
        assert_eq!(config.peers.max_depth, 5);
        assert_eq!(config.http.list_timeout_ms, 2500);
        assert_eq!(config.http.default_timeout_ms, 30_000);
    }

    #[test]
    fn environment_lists_are_comma_separated() {
        let config = ConfigLoader::default()
            .env_overrides(vars(&[
                ("SKILLGATE__POLICY__ALLOWED_DOMAINS", "a.com,b.com"),
                ("SKILLGATE__POLICY__BLOCK_PRIVATE_NETWORKS", "false"),
            ]))
            .load()
            .unwrap();
        assert_eq!(config.policy.allowed_domains, vec!["a.com", "b.com"]);
        assert!(!config.policy.block_private_networks);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = ConfigLoader::default()
            .file("/definitely/not/here.toml")
            .env_overrides(HashMap::new())
            .load()
            .unwrap();
        assert_eq!(config, GatewayConfig::default());
    }

    #[test]
    fn invalid_values_fail_validation() {
        let err = ConfigLoader::default()
            .env_overrides(vars(&[("SKILLGATE__PEERS__MAX_DEPTH", "0")]))
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }
}
