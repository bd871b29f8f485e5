//! Configuration for the hoverdoc build step and runtime defaults.
//!
//! Configuration is a single TOML file. Every section and key is optional;
//! anything left out takes the default shown below.
//!
//! ## Lookup order
//!
//! 1. An explicit path (`--config` on the command line)
//! 2. `./hoverdoc.toml` in the working directory
//! 3. The platform config directory (see [`Config::global_path`])
//! 4. Built-in defaults
//!
//! Environment variables are applied last: `HOVERDOC_KB` (knowledge base
//! path), `HOVERDOC_FENCE_MARKER` (opt-in flag) and `HOVERDOC_PINNED`
//! (`true`/`false`).
//!
//! ## Example
//!
//! ```toml
//! [knowledge_base]
//! path = "docs/types.toml"
//! include_builtin = true
//!
//! [fence]
//! marker = "hover"
//! container_class = "hoverdoc-block"
//! container_attribute = "data-hoverdoc"
//!
//! [tokenizer.aliases]
//! mts = "ts"
//!
//! [runtime]
//! offset_px = 8.0
//! viewport_margin_px = 8.0
//! pinned = false
//! hide_delay_ms = 0
//! ```
//!
//! ```rust
//! use hoverdoc_core::Config;
//!
//! let config: Config = toml::from_str("[fence]\nmarker = \"tips\"\n")?;
//! assert_eq!(config.fence.marker, "tips");
//! assert!(config.knowledge_base.include_builtin);
//! # Ok::<(), toml::de::Error>(())
//! ```

use crate::knowledge::KnowledgeBase;
use crate::tokenize::Tokenizer;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up in the working directory and the config directory.
pub const CONFIG_FILE_NAME: &str = "hoverdoc.toml";

/// Environment variable overriding `knowledge_base.path`.
pub const ENV_KNOWLEDGE_BASE: &str = "HOVERDOC_KB";
/// Environment variable overriding `fence.marker`.
pub const ENV_FENCE_MARKER: &str = "HOVERDOC_FENCE_MARKER";
/// Environment variable overriding `runtime.pinned`.
pub const ENV_PINNED: &str = "HOVERDOC_PINNED";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where type metadata comes from.
    pub knowledge_base: KnowledgeBaseConfig,
    /// Fence opt-in and block container markup.
    pub fence: FenceConfig,
    /// Language tag handling.
    pub tokenizer: TokenizerConfig,
    /// Defaults handed to the tooltip runtime.
    pub runtime: RuntimeConfig,
}

/// Knowledge base sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeBaseConfig {
    /// JSON or TOML file with project entries.
    ///
    /// Relative paths resolve against the directory of the config file that
    /// named them, or the working directory for environment overrides.
    pub path: Option<PathBuf>,
    /// Start from the built-in TypeScript/Rust entries.
    pub include_builtin: bool,
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            include_builtin: true,
        }
    }
}

/// Fence opt-in and container markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FenceConfig {
    /// Info-string flag that opts a block into annotation.
    pub marker: String,
    /// Class of the `<div>` wrapping an annotated block.
    pub container_class: String,
    /// Attribute on the container carrying the language tag.
    pub container_attribute: String,
}

impl Default for FenceConfig {
    fn default() -> Self {
        Self {
            marker: "hover".to_string(),
            container_class: "hoverdoc-block".to_string(),
            container_attribute: "data-hoverdoc".to_string(),
        }
    }
}

/// Tokenizer language handling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Extra language tags mapped onto registered ones (`mts = "ts"`).
    pub aliases: BTreeMap<String, String>,
}

/// Tooltip runtime defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Gap between the trigger's top edge and the tooltip, in pixels.
    pub offset_px: f64,
    /// Minimum distance between the tooltip anchor and the viewport edges.
    pub viewport_margin_px: f64,
    /// Start in pinned mode.
    pub pinned: bool,
    /// Delay before a hover tooltip closes after the pointer leaves; 0
    /// closes immediately.
    pub hide_delay_ms: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            offset_px: 8.0,
            viewport_margin_px: 8.0,
            pinned: false,
            hide_delay_ms: 0,
        }
    }
}

impl Config {
    /// Load configuration from `path`.
    ///
    /// Relative knowledge base paths in the file are resolved against the
    /// file's directory. Environment overrides are not applied.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {e}", path.display()))
        })?;
        let mut config: Self = toml::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse config {}: {e}", path.display()))
        })?;

        if let (Some(kb_path), Some(dir)) = (&config.knowledge_base.path, path.parent()) {
            if kb_path.is_relative() {
                config.knowledge_base.path = Some(dir.join(kb_path));
            }
        }

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Find and load configuration, then apply environment overrides.
    ///
    /// Falls back to defaults when no file exists anywhere in the lookup
    /// order. A file that exists but does not parse is an error.
    pub fn discover() -> Result<Self> {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        let found = if local.is_file() {
            Some(local)
        } else {
            Self::global_path().filter(|path| path.is_file())
        };

        let config = match found {
            Some(path) => Self::load(&path)?,
            None => {
                tracing::debug!("No {CONFIG_FILE_NAME} found, using defaults");
                Self::default()
            },
        };
        config.with_overrides(|key| std::env::var(key).ok())
    }

    /// Load `path` if given, otherwise [`discover`](Self::discover); the
    /// environment is applied in both cases.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path)?.with_overrides(|key| std::env::var(key).ok()),
            None => Self::discover(),
        }
    }

    /// Apply overrides from `lookup`, normally the process environment.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_KNOWLEDGE_BASE).filter(|v| !v.trim().is_empty()) {
            self.knowledge_base.path = Some(PathBuf::from(path));
        }
        if let Some(marker) = lookup(ENV_FENCE_MARKER).filter(|v| !v.trim().is_empty()) {
            self.fence.marker = marker.trim().to_string();
        }
        if let Some(pinned) = lookup(ENV_PINNED) {
            self.runtime.pinned = parse_flag(&pinned).ok_or_else(|| {
                Error::Config(format!("{ENV_PINNED} must be true or false, got '{pinned}'"))
            })?;
        }
        Ok(self)
    }

    /// Write the configuration as pretty TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {e}")))?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;
        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config: {e}")))?;
        Ok(())
    }

    /// Platform config file location.
    ///
    /// - Linux: `~/.config/hoverdoc/hoverdoc.toml`
    /// - macOS: `~/Library/Application Support/dev.outfitter.hoverdoc/hoverdoc.toml`
    /// - Windows: `%APPDATA%\outfitter\hoverdoc\config\hoverdoc.toml`
    pub fn global_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "outfitter", "hoverdoc")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Build the knowledge base this configuration describes.
    pub fn knowledge_base(&self) -> Result<KnowledgeBase> {
        let base = if self.knowledge_base.include_builtin {
            KnowledgeBase::builtin()
        } else {
            KnowledgeBase::new()
        };
        match &self.knowledge_base.path {
            Some(path) => Ok(base.merge(KnowledgeBase::load(path)?)),
            None => Ok(base),
        }
    }

    /// Build a tokenizer with the configured aliases registered.
    pub fn tokenizer(&self) -> Tokenizer {
        let mut tokenizer = Tokenizer::new();
        for (alias, target) in &self.tokenizer.aliases {
            if !tokenizer.alias(alias, target) {
                tracing::warn!("Ignoring alias '{alias}': no parser registered for '{target}'");
            }
        }
        tokenizer
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config_values() {
        let config = Config::default();

        assert_eq!(config.fence.marker, "hover");
        assert_eq!(config.fence.container_class, "hoverdoc-block");
        assert_eq!(config.fence.container_attribute, "data-hoverdoc");
        assert!(config.knowledge_base.include_builtin);
        assert!(config.knowledge_base.path.is_none());
        assert!((config.runtime.offset_px - 8.0).abs() < f64::EPSILON);
        assert!(!config.runtime.pinned);
        assert_eq!(config.runtime.hide_delay_ms, 0);
    }

    #[test]
    fn test_partial_file_keeps_defaults() -> Result<()> {
        // Given: A config file that only sets one key
        let dir = TempDir::new()?;
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[runtime]\npinned = true\n")?;

        // When: Loading it
        let config = Config::load(&path)?;

        // Then: The key is applied and everything else is default
        assert!(config.runtime.pinned);
        assert_eq!(config.fence, FenceConfig::default());
        Ok(())
    }

    #[test]
    fn test_relative_kb_path_resolves_against_config_dir() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[knowledge_base]\npath = \"types.json\"\n")?;

        let config = Config::load(&path)?;

        assert_eq!(
            config.knowledge_base.path,
            Some(dir.path().join("types.json"))
        );
        Ok(())
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[fence\nmarker = ").unwrap();

        let err = Config::load(&path).unwrap_err();

        assert!(matches!(err, Error::Config(_)));
        assert_eq!(err.category(), "config");
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = Config::load(Path::new("/nonexistent/hoverdoc.toml")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_env_overrides() -> Result<()> {
        let config = Config::default().with_overrides(env(&[
            (ENV_KNOWLEDGE_BASE, "kb.toml"),
            (ENV_FENCE_MARKER, " tips "),
            (ENV_PINNED, "yes"),
        ]))?;

        assert_eq!(config.knowledge_base.path, Some(PathBuf::from("kb.toml")));
        assert_eq!(config.fence.marker, "tips");
        assert!(config.runtime.pinned);
        Ok(())
    }

    #[test]
    fn test_empty_env_values_are_ignored() -> Result<()> {
        let config = Config::default()
            .with_overrides(env(&[(ENV_KNOWLEDGE_BASE, ""), (ENV_FENCE_MARKER, "  ")]))?;

        assert!(config.knowledge_base.path.is_none());
        assert_eq!(config.fence.marker, "hover");
        Ok(())
    }

    #[test]
    fn test_bad_pinned_value_is_rejected() {
        let err = Config::default()
            .with_overrides(env(&[(ENV_PINNED, "sometimes")]))
            .unwrap_err();

        assert!(err.to_string().contains(ENV_PINNED));
    }

    #[test]
    fn test_save_and_load_roundtrip() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);
        let mut config = Config::default();
        config.fence.marker = "tips".into();
        config.runtime.hide_delay_ms = 150;
        config
            .tokenizer
            .aliases
            .insert("mts".into(), "ts".into());

        config.save(&path)?;
        let loaded = Config::load(&path)?;

        assert_eq!(loaded, config);
        Ok(())
    }

    #[test]
    fn test_knowledge_base_merges_file_over_builtin() -> Result<()> {
        let dir = TempDir::new()?;
        let kb_path = dir.path().join("types.toml");
        fs::write(
            &kb_path,
            "[Promise]\ntype = \"class\"\ndescription = \"Project promise\"\n\n[Widget]\ntype = \"struct\"\ndescription = \"A widget\"\n",
        )?;
        let mut config = Config::default();
        config.knowledge_base.path = Some(kb_path);

        let kb = config.knowledge_base()?;

        assert_eq!(kb.get("Promise").unwrap().description, "Project promise");
        assert!(kb.get("Widget").is_some());
        assert!(kb.get("Vec").is_some());
        Ok(())
    }

    #[test]
    fn test_knowledge_base_without_builtin() -> Result<()> {
        let mut config = Config::default();
        config.knowledge_base.include_builtin = false;

        assert!(config.knowledge_base()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_tokenizer_aliases() {
        let mut config = Config::default();
        config.tokenizer.aliases.insert("mts".into(), "ts".into());
        config
            .tokenizer
            .aliases
            .insert("weird".into(), "no-such-language".into());

        let tokenizer = config.tokenizer();

        assert!(tokenizer.supports("mts"));
        assert!(!tokenizer.supports("weird"));
    }
}
