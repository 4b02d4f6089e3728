//! Game configuration loader.

use std::path::Path;

use delve_core::GameConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for game configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Fields the file leaves out keep their defaults.
    pub fn load(path: &Path) -> LoadResult<GameConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<GameConfig> {
        let config: GameConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_files_keep_defaults() {
        let config = ConfigLoader::parse("regen_interval = 4\nsight_radius = 5\n").expect("parses");
        assert_eq!(config.regen_interval, 4);
        assert_eq!(config.sight_radius, 5);
        assert_eq!(config.action_threshold, GameConfig::DEFAULT_ACTION_THRESHOLD);
        assert_eq!(config.max_idle_rounds, GameConfig::DEFAULT_MAX_IDLE_ROUNDS);
    }

    #[test]
    fn type_errors_are_reported() {
        let error = ConfigLoader::parse("regen_interval = \"often\"").expect_err("wrong type");
        assert!(error.to_string().contains("config TOML"));
    }
}
