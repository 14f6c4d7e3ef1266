//! Configuration loading and store factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use bandscore_core::engine::EngineConfig;
use bandscore_core::traits::ExamStore;

use crate::fs::FsExamStore;

/// Environment variable that overrides `data_dir`.
pub const DATA_DIR_ENV: &str = "BANDSCORE_DATA_DIR";

/// Top-level bandscore configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandscoreConfig {
    /// Root directory of the document store.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Exam documents, relative to `data_dir`.
    #[serde(default = "default_exams_dir")]
    pub exams_dir: String,
    /// Graded submission records, relative to `data_dir`.
    #[serde(default = "default_submissions_dir")]
    pub submissions_dir: String,
    /// Max submissions graded concurrently.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Whether reports carry the derived band score.
    #[serde(default = "default_true")]
    pub band_scoring: bool,
    /// Output directory for rendered reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./bandscore-data")
}
fn default_exams_dir() -> String {
    "exams".to_string()
}
fn default_submissions_dir() -> String {
    "submissions".to_string()
}
fn default_parallelism() -> usize {
    4
}
fn default_true() -> bool {
    true
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./bandscore-results")
}

impl Default for BandscoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            exams_dir: default_exams_dir(),
            submissions_dir: default_submissions_dir(),
            parallelism: default_parallelism(),
            band_scoring: true,
            output_dir: default_output_dir(),
        }
    }
}

impl BandscoreConfig {
    pub fn exams_path(&self) -> PathBuf {
        self.data_dir.join(&self.exams_dir)
    }

    pub fn submissions_path(&self) -> PathBuf {
        self.data_dir.join(&self.submissions_dir)
    }

    /// Engine settings derived from this configuration.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            parallelism: self.parallelism,
            band_scoring: self.band_scoring,
            persist: true,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        // Substituted values are never rescanned.
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Apply `${VAR}` resolution and the `BANDSCORE_DATA_DIR` override.
fn apply_environment(
    mut config: BandscoreConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> BandscoreConfig {
    config.data_dir = resolve_path(&config.data_dir);
    config.output_dir = resolve_path(&config.output_dir);
    config.exams_dir = resolve_env_vars(&config.exams_dir);
    config.submissions_dir = resolve_env_vars(&config.submissions_dir);

    if let Some(dir) = lookup(DATA_DIR_ENV).filter(|d| !d.is_empty()) {
        config.data_dir = PathBuf::from(dir);
    }
    config
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `bandscore.toml` in the current directory
/// 2. `~/.config/bandscore/config.toml`
///
/// Environment variable override: `BANDSCORE_DATA_DIR`.
pub fn load_config() -> Result<BandscoreConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<BandscoreConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("bandscore.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<BandscoreConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => BandscoreConfig::default(),
    };

    let config = apply_environment(config, |name| std::env::var(name).ok());
    anyhow::ensure!(config.parallelism >= 1, "parallelism must be at least 1");
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("bandscore"))
}

/// Create the filesystem store described by a configuration.
pub fn create_store(config: &BandscoreConfig) -> Arc<dyn ExamStore> {
    Arc::new(FsExamStore::new(
        config.exams_path(),
        config.submissions_path(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_BANDSCORE_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_BANDSCORE_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_BANDSCORE_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("no_vars"), "no_vars");
        std::env::remove_var("_BANDSCORE_TEST_VAR");
    }

    #[test]
    fn resolve_env_vars_does_not_expand_values() {
        std::env::set_var("_BANDSCORE_SELF_REF", "${_BANDSCORE_SELF_REF}");
        assert_eq!(
            resolve_env_vars("${_BANDSCORE_SELF_REF}/exams"),
            "${_BANDSCORE_SELF_REF}/exams"
        );
        std::env::remove_var("_BANDSCORE_SELF_REF");

        assert_eq!(resolve_env_vars("a${unterminated"), "a${unterminated");
        assert_eq!(resolve_env_vars("${_BANDSCORE_UNSET_VAR}x"), "x");
    }

    #[test]
    fn default_config() {
        let config = BandscoreConfig::default();
        assert_eq!(config.parallelism, 4);
        assert!(config.band_scoring);
        assert_eq!(config.exams_path(), PathBuf::from("./bandscore-data/exams"));
    }

    #[test]
    fn parse_partial_config() {
        let config: BandscoreConfig = toml::from_str(
            r#"
data_dir = "/srv/ielts"
band_scoring = false
"#,
        )
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/ielts"));
        assert!(!config.band_scoring);
        assert_eq!(config.submissions_dir, "submissions");
        assert!(!config.engine_config().band_scoring);
    }

    #[test]
    fn data_dir_env_override() {
        let config = apply_environment(BandscoreConfig::default(), |name| {
            (name == DATA_DIR_ENV).then(|| "/mnt/exams".to_string())
        });
        assert_eq!(config.data_dir, PathBuf::from("/mnt/exams"));

        let untouched = apply_environment(BandscoreConfig::default(), |_| None);
        assert_eq!(untouched.data_dir, PathBuf::from("./bandscore-data"));
    }

    #[test]
    fn explicit_config_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bandscore.toml");
        std::fs::write(&path, "parallelism = 2\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.parallelism, 2);

        assert!(load_config_from(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn zero_parallelism_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bandscore.toml");
        std::fs::write(&path, "parallelism = 0\n").unwrap();
        assert!(load_config_from(Some(&path)).is_err());
    }
}
