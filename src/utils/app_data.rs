use crate::index::filter::{AdmissionFilter, ExtensionAllowList};
use crate::index::types::{DEFAULT_INDEX_NAME, DEFAULT_MAX_FILE_SIZE};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "csindex";
const CONFIG_FILE: &str = "config.json";

/// Environment variable naming the index file
pub const INDEX_ENV: &str = "CSEARCHINDEX";

/// Optional settings file in the platform config directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Extension allow-list, pipe-separated
    #[serde(default)]
    pub file_types: Option<ExtensionAllowList>,

    /// Files larger than this are not indexed
    #[serde(default)]
    pub max_file_size: Option<u64>,
}

impl ConfigFile {
    /// Load the config file, or defaults if there is none
    pub fn load() -> Result<Self> {
        match get_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

/// Get the path to the config file
pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE))
}

/// Settings for one indexing run, fixed before the run starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexerConfig {
    pub file_types: ExtensionAllowList,
    pub max_file_size: u64,
    /// Discard the existing index instead of merging into it
    pub reset: bool,
    pub verbose: bool,
    pub show_progress: bool,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            file_types: ExtensionAllowList::default(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            reset: false,
            verbose: false,
            show_progress: false,
        }
    }
}

impl IndexerConfig {
    /// Layer command-line choices over the config file
    pub fn from_file(file: ConfigFile, file_types: Option<ExtensionAllowList>) -> Self {
        let defaults = Self::default();
        Self {
            file_types: file_types.or(file.file_types).unwrap_or(defaults.file_types),
            max_file_size: file.max_file_size.unwrap_or(defaults.max_file_size),
            ..defaults
        }
    }

    pub fn admission_filter(&self) -> AdmissionFilter {
        AdmissionFilter::new(self.file_types.clone())
    }
}

/// Finds the index file the way the search side does
#[derive(Debug, Clone)]
pub struct IndexLocator {
    pub cwd: PathBuf,
    pub env: Option<PathBuf>,
    pub home: Option<PathBuf>,
}

impl IndexLocator {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            cwd: std::env::current_dir().context("Failed to read current directory")?,
            env: std::env::var_os(INDEX_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            home: dirs::home_dir(),
        })
    }

    /// `-d` may name the file itself or a directory holding it
    fn explicit(&self, path: &Path) -> PathBuf {
        let path = self.cwd.join(path);
        if path.is_dir() {
            path.join(DEFAULT_INDEX_NAME)
        } else {
            path
        }
    }

    /// Index to read from (or wipe): the local file, the nearest one in a
    /// parent directory, `$CSEARCHINDEX`, then `~/.csearchindex`.
    pub fn existing(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(self.explicit(path));
        }

        if let Some(found) = self
            .cwd
            .ancestors()
            .map(|dir| dir.join(DEFAULT_INDEX_NAME))
            .find(|candidate| candidate.is_file())
        {
            return Ok(found);
        }

        if let Some(env) = &self.env {
            return Ok(env.clone());
        }

        self.home
            .as_ref()
            .map(|home| home.join(DEFAULT_INDEX_NAME))
            .context("Could not determine home directory for the index file")
    }

    /// Index to build: `-d`, else the current directory
    pub fn for_build(&self, explicit: Option<&Path>) -> PathBuf {
        match explicit {
            Some(path) => self.explicit(path),
            None => self.cwd.join(DEFAULT_INDEX_NAME),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn locator(cwd: &Path) -> IndexLocator {
        IndexLocator {
            cwd: cwd.to_path_buf(),
            env: None,
            home: Some(PathBuf::from("/home/someone")),
        }
    }

    #[test]
    fn test_explicit_file_and_directory() {
        let dir = tempdir().unwrap();
        let loc = locator(dir.path());

        assert_eq!(
            loc.existing(Some(Path::new("idx.db"))).unwrap(),
            dir.path().join("idx.db")
        );
        assert_eq!(
            loc.for_build(Some(dir.path())),
            dir.path().join(DEFAULT_INDEX_NAME)
        );
    }

    #[test]
    fn test_discovery_walks_upward() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("a").join(DEFAULT_INDEX_NAME), "").unwrap();

        let loc = locator(&nested);
        assert_eq!(
            loc.existing(None).unwrap(),
            dir.path().join("a").join(DEFAULT_INDEX_NAME)
        );
        // building never looks upward
        assert_eq!(loc.for_build(None), nested.join(DEFAULT_INDEX_NAME));
    }

    #[test]
    fn test_env_then_home_fallback() {
        let dir = tempdir().unwrap();
        let mut loc = locator(dir.path());
        assert_eq!(
            loc.existing(None).unwrap(),
            PathBuf::from("/home/someone").join(DEFAULT_INDEX_NAME)
        );

        loc.env = Some(PathBuf::from("/srv/index"));
        assert_eq!(loc.existing(None).unwrap(), PathBuf::from("/srv/index"));
    }

    #[test]
    fn test_config_file_partial_json() {
        let config: ConfigFile = serde_json::from_str(r#"{"file_types": "rs|go"}"#).unwrap();
        assert!(config.file_types.as_ref().unwrap().contains("go"));
        assert_eq!(config.max_file_size, None);

        let empty: ConfigFile = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, ConfigFile::default());
    }

    #[test]
    fn test_command_line_overrides_file() {
        let file = ConfigFile {
            file_types: Some("rs".parse().unwrap()),
            max_file_size: Some(10),
        };

        let config = IndexerConfig::from_file(file.clone(), Some("go".parse().unwrap()));
        assert_eq!(config.file_types.to_string(), "go");
        assert_eq!(config.max_file_size, 10);

        let config = IndexerConfig::from_file(file, None);
        assert_eq!(config.file_types.to_string(), "rs");
        assert!(!config.reset);
    }

    #[test]
    fn test_load_from_reports_bad_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "{ not json").unwrap();
        assert!(ConfigFile::load_from(&path).is_err());
    }
}
