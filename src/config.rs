//! Configuration loading and management
//!
//! Handles parsing of prio's TOML config file.

use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};
use serde::Deserialize;

use crate::error::{Error, Result};

/// Task list titles longer than this are cut down silently.
pub const TITLE_MAX_CHARS: usize = 8;

/// Row height of the task lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListDensity {
    #[default]
    Compact,
    Spacious,
}

impl ListDensity {
    pub fn toggled(self) -> Self {
        match self {
            ListDensity::Compact => ListDensity::Spacious,
            ListDensity::Spacious => ListDensity::Compact,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database file location; a leading `~` expands to the home directory
    #[serde(default)]
    pub db_path: Option<PathBuf>,

    /// Editor command for editing task context
    #[serde(default)]
    pub editor: Option<String>,

    /// Maximum number of active tasks
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Row height of the task lists
    #[serde(default)]
    pub list_density: ListDensity,

    /// Start with the context pane visible
    #[serde(default = "default_show_context")]
    pub show_context: bool,

    /// Title shown over the active task list
    #[serde(default = "default_list_title")]
    pub list_title: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: None,
            editor: None,
            capacity: default_capacity(),
            list_density: ListDensity::default(),
            show_context: default_show_context(),
            list_title: default_list_title(),
        }
    }
}

fn default_capacity() -> usize {
    300
}

fn default_show_context() -> bool {
    true
}

fn default_list_title() -> String {
    "prio".to_string()
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.validate()?;
        config.normalize();
        Ok(config)
    }

    /// Load an explicit file, or the one at the default location if it
    /// exists, or defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::load(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Resolve the database location: explicit override, configured path, or
    /// the platform data directory.
    pub fn resolve_db_path(&self, override_path: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = override_path {
            return Ok(expand_tilde(path));
        }
        if let Some(path) = &self.db_path {
            return Ok(expand_tilde(path));
        }
        default_db_path().ok_or_else(|| {
            Error::InvalidConfig("could not determine a data directory; set db_path".to_string())
        })
    }

    fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::InvalidConfig("capacity must be > 0".to_string()));
        }
        if self.list_title.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "list_title cannot be empty".to_string(),
            ));
        }
        if let Some(editor) = &self.editor {
            if editor.trim().is_empty() {
                return Err(Error::InvalidConfig(
                    "editor cannot be empty when set".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn normalize(&mut self) {
        if self.list_title.chars().count() > TITLE_MAX_CHARS {
            self.list_title = self.list_title.chars().take(TITLE_MAX_CHARS).collect();
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "prio").map(|dirs| dirs.config_dir().join("prio.toml"))
}

pub fn default_db_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "prio").map(|dirs| dirs.data_dir().join("prio.db"))
}

/// Expand a leading `~` to the home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Some(text) = path.to_str() else {
        return path.to_path_buf();
    };
    if text == "~" {
        if let Some(dirs) = BaseDirs::new() {
            return dirs.home_dir().to_path_buf();
        }
    }
    if let Some(rest) = text.strip_prefix("~/") {
        if let Some(dirs) = BaseDirs::new() {
            return dirs.home_dir().join(rest);
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_are_expected() {
        let cfg = Config::default();
        assert_eq!(cfg.db_path, None);
        assert_eq!(cfg.editor, None);
        assert_eq!(cfg.capacity, 300);
        assert_eq!(cfg.list_density, ListDensity::Compact);
        assert!(cfg.show_context);
        assert_eq!(cfg.list_title, "prio");
    }

    #[test]
    fn load_parses_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("prio.toml");
        let content = r#"
db_path = "~/tasks/prio.db"
editor = "nvim"
capacity = 50
list_density = "spacious"
show_context = false
list_title = "work"
"#;
        fs::write(&path, content.trim()).expect("write config");

        let cfg = Config::load(&path).expect("load config");
        assert_eq!(cfg.db_path, Some(PathBuf::from("~/tasks/prio.db")));
        assert_eq!(cfg.editor.as_deref(), Some("nvim"));
        assert_eq!(cfg.capacity, 50);
        assert_eq!(cfg.list_density, ListDensity::Spacious);
        assert!(!cfg.show_context);
        assert_eq!(cfg.list_title, "work");
    }

    #[test]
    fn zero_capacity_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("prio.toml");
        fs::write(&path, "capacity = 0").expect("write config");

        let err = Config::load(&path).expect_err("invalid config");
        match err {
            Error::InvalidConfig(_) => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn long_title_is_cut() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("prio.toml");
        fs::write(&path, "list_title = \"all the things\"").expect("write config");

        let cfg = Config::load(&path).expect("load config");
        assert_eq!(cfg.list_title.chars().count(), TITLE_MAX_CHARS);
    }

    #[test]
    fn load_or_default_reads_explicit_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("prio.toml");
        fs::write(&path, "capacity = 10").expect("write config");

        let cfg = Config::load_or_default(Some(&path)).expect("load config");
        assert_eq!(cfg.capacity, 10);
    }

    #[test]
    fn db_path_override_wins() {
        let mut cfg = Config::default();
        cfg.db_path = Some(PathBuf::from("/configured/prio.db"));

        let resolved = cfg
            .resolve_db_path(Some(Path::new("/override/prio.db")))
            .expect("resolve");
        assert_eq!(resolved, PathBuf::from("/override/prio.db"));

        let resolved = cfg.resolve_db_path(None).expect("resolve");
        assert_eq!(resolved, PathBuf::from("/configured/prio.db"));
    }

    #[test]
    fn tilde_expands_to_home() {
        let expanded = expand_tilde(Path::new("~/tasks/prio.db"));
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.ends_with("tasks/prio.db"));

        let absolute = expand_tilde(Path::new("/var/lib/prio.db"));
        assert_eq!(absolute, PathBuf::from("/var/lib/prio.db"));
    }

    #[test]
    fn density_toggles_between_values() {
        assert_eq!(ListDensity::Compact.toggled(), ListDensity::Spacious);
        assert_eq!(ListDensity::Spacious.toggled(), ListDensity::Compact);
    }
}
