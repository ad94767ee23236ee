use blockweave_engine::{PluginDescriptor, PluginOverrides};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Per-plugin overrides, applied with `PluginDescriptor::extend`.
///
/// ```toml
/// [plugins.Image]
/// title = "Picture"
/// shortcuts = ["img"]
///
/// [plugins.Image.options]
/// maxWidth = 900
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortcuts: Option<Vec<String>>,
    /// Custom plugin options, deep-merged over the plugin's own.
    #[serde(default, skip_serializing_if = "toml::Table::is_empty")]
    pub options: toml::Table,
}

impl PluginConfig {
    pub fn to_overrides(&self) -> PluginOverrides {
        let mut overrides = PluginOverrides::new();
        if let Some(title) = &self.title {
            overrides = overrides.title(title);
        }
        if let Some(description) = &self.description {
            overrides = overrides.description(description);
        }
        if let Some(search) = &self.search_string {
            overrides = overrides.search_string(search);
        }
        if let Some(shortcuts) = &self.shortcuts {
            overrides = overrides.shortcuts(shortcuts.as_slice());
        }
        match serde_json::to_value(&self.options) {
            Ok(serde_json::Value::Object(custom)) => overrides.custom_map(custom),
            Ok(_) => overrides,
            Err(e) => {
                log::warn!("Ignoring plugin options that do not convert to JSON: {e}");
                overrides
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory persisted documents are stored under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistence_key: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub plugins: BTreeMap<String, PluginConfig>,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the storage path
        config.storage_path = config
            .storage_path
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/blockweave");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Extend every plugin named under `[plugins]`. Names matching no plugin
    /// are logged and skipped.
    pub fn apply(&self, plugins: Vec<PluginDescriptor>) -> Vec<PluginDescriptor> {
        for name in self.plugins.keys() {
            if !plugins.iter().any(|p| p.plugin_type() == name) {
                log::warn!("Config overrides unknown plugin type {name}");
            }
        }
        plugins
            .into_iter()
            .map(|plugin| match self.plugins.get(plugin.plugin_type()) {
                Some(overrides) => {
                    log::debug!("Applying config overrides to {}", plugin.plugin_type());
                    plugin.extend(overrides.to_overrides())
                }
                None => plugin,
            })
            .collect()
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockweave_engine::{ElementSpec, RenderNode};
    use pretty_assertions::assert_eq;
    use std::env;
    use tempfile::TempDir;

    fn image_plugin() -> PluginDescriptor {
        PluginDescriptor::new("Image")
            .with_element(
                "image",
                ElementSpec::block(|props| RenderNode::element("img", props.children)),
            )
            .with_display("Image", "Upload or embed with a link.")
            .with_custom("maxWidth", 650)
            .with_custom("maxHeight", 550)
    }

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/blockweave/config.toml"));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");
        let mut test_config = Config {
            storage_path: Some(PathBuf::from("/tmp/blockweave-docs")),
            placeholder: Some("Type / to open menu".into()),
            persistence_key: Some("scratch".into()),
            ..Default::default()
        };
        test_config.plugins.insert(
            "HeadingTwo".into(),
            PluginConfig {
                shortcuts: Some(vec!["h2".into()]),
                ..Default::default()
            },
        );

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "placeholder = [").unwrap();

        let err = Config::load_from_path(&config_file).unwrap_err();

        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_storage_path_env_var_is_expanded() {
        unsafe {
            env::set_var("BLOCKWEAVE_TEST_ROOT", "/custom/docs");
        }
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "storage_path = \"$BLOCKWEAVE_TEST_ROOT/mine\"\n").unwrap();

        let config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(config.storage_path, Some(PathBuf::from("/custom/docs/mine")));
        unsafe {
            env::remove_var("BLOCKWEAVE_TEST_ROOT");
        }
    }

    #[test]
    fn test_apply_extends_matching_plugins() {
        let config: Config = toml::from_str(
            r#"
[plugins.Image]
title = "Picture"
shortcuts = ["img"]

[plugins.Image.options]
maxWidth = 900

[plugins.Missing]
title = "Nobody"
"#,
        )
        .unwrap();

        let plugins = config.apply(vec![image_plugin()]);

        assert_eq!(plugins.len(), 1);
        let image = &plugins[0];
        assert_eq!(image.display().title, "Picture");
        assert_eq!(image.display().description, "Upload or embed with a link.");
        assert_eq!(image.shortcuts(), ["img"]);
        assert_eq!(image.custom("maxWidth"), Some(&serde_json::json!(900)));
        assert_eq!(image.custom("maxHeight"), Some(&serde_json::json!(550)));
    }
}
