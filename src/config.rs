use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Deserialize;

use crate::utils::debug_log;

pub const DEFAULT_BASE_BRANCHES: &[&str] = &["origin/main", "origin/master", "origin/develop"];
pub const DEFAULT_FALLBACK_WINDOW: usize = 50;
pub const DEFAULT_SUBJECT_WIDTH: usize = 50;

/// Centralized configuration for the application
#[derive(Debug, Clone)]
pub struct Config {
    git_path: String,
    base_branches: Vec<String>,
    fallback_window: usize,
    subject_width: usize,
}

#[derive(Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    git_path: Option<String>,
    #[serde(default)]
    base_branches: Option<Vec<String>>,
    #[serde(default)]
    fallback_window: Option<usize>,
    #[serde(default)]
    subject_width: Option<usize>,
}

/// `GIT_SQUASH_*` overrides, read with envy.
#[derive(Deserialize, Default)]
struct EnvConfig {
    #[serde(default)]
    git_path: Option<String>,
    /// Comma-separated, e.g. `GIT_SQUASH_BASE_BRANCHES=upstream/main,origin/main`.
    #[serde(default)]
    base_branches: Option<Vec<String>>,
    #[serde(default)]
    fallback_window: Option<usize>,
    #[serde(default)]
    subject_width: Option<usize>,
}

static CONFIG: OnceLock<Config> = OnceLock::new();

impl Default for Config {
    fn default() -> Self {
        Config {
            git_path: "git".to_string(),
            base_branches: DEFAULT_BASE_BRANCHES.iter().map(|s| s.to_string()).collect(),
            fallback_window: DEFAULT_FALLBACK_WINDOW,
            subject_width: DEFAULT_SUBJECT_WIDTH,
        }
    }
}

impl Config {
    /// Access the global configuration. Lazily initializes if not already initialized.
    pub fn get() -> &'static Config {
        CONFIG.get_or_init(build_config)
    }

    /// Returns the command to invoke git.
    pub fn git_cmd(&self) -> &str {
        &self.git_path
    }

    /// Remote branches probed, in order, when the current branch has no upstream.
    pub fn base_branches(&self) -> &[String] {
        &self.base_branches
    }

    /// Number of recent commits fetched when no base ref can be found.
    pub fn fallback_window(&self) -> usize {
        self.fallback_window
    }

    pub fn subject_width(&self) -> usize {
        self.subject_width
    }

    pub fn with_fallback_window(mut self, window: usize) -> Self {
        self.fallback_window = window.max(1);
        self
    }
}

fn build_config() -> Config {
    let file_cfg = load_file_config().unwrap_or_default();
    let env_cfg = load_env_config();
    merge_config(file_cfg, env_cfg)
}

fn merge_config(file_cfg: FileConfig, env_cfg: EnvConfig) -> Config {
    let defaults = Config::default();

    let git_path = resolve_git_path(env_cfg.git_path.as_deref().or(file_cfg.git_path.as_deref()));

    let base_branches = env_cfg
        .base_branches
        .or(file_cfg.base_branches)
        .map(|branches| {
            branches
                .into_iter()
                .map(|b| b.trim().to_string())
                .filter(|b| !b.is_empty())
                .collect::<Vec<_>>()
        })
        .filter(|branches| !branches.is_empty())
        .unwrap_or(defaults.base_branches);

    let fallback_window = env_cfg
        .fallback_window
        .or(file_cfg.fallback_window)
        .unwrap_or(defaults.fallback_window)
        .max(1);

    let subject_width = env_cfg
        .subject_width
        .or(file_cfg.subject_width)
        .filter(|w| *w > 0)
        .unwrap_or(defaults.subject_width);

    Config {
        git_path,
        base_branches,
        fallback_window,
        subject_width,
    }
}

fn resolve_git_path(configured: Option<&str>) -> String {
    // 1) Explicit configuration
    if let Some(path) = configured {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            if is_executable(Path::new(trimmed)) {
                return trimmed.to_string();
            }
            tracing::warn!("configured git_path '{}' is not a file, ignoring", trimmed);
        }
    }

    // 2) Probe common locations across platforms
    let candidates: &[&str] = &[
        "/opt/homebrew/bin/git",
        "/usr/local/bin/git",
        "/usr/bin/git",
        "/bin/git",
        r"C:\Program Files\Git\bin\git.exe",
        r"C:\Program Files (x86)\Git\bin\git.exe",
    ];

    if let Some(found) = candidates.iter().map(Path::new).find(|p| is_executable(p)) {
        return found.to_string_lossy().to_string();
    }

    // 3) Let the OS search PATH
    "git".to_string()
}

fn load_file_config() -> Option<FileConfig> {
    let path = config_file_path()?;
    let data = fs::read(&path).ok()?;
    match serde_json::from_slice::<FileConfig>(&data) {
        Ok(cfg) => {
            debug_log(&format!("Loaded config from {}", path.display()));
            Some(cfg)
        }
        Err(e) => {
            tracing::warn!("ignoring invalid config file {}: {}", path.display(), e);
            None
        }
    }
}

fn load_env_config() -> EnvConfig {
    envy::prefixed("GIT_SQUASH_")
        .from_env::<EnvConfig>()
        .unwrap_or_else(|e| {
            tracing::warn!("ignoring invalid GIT_SQUASH_* environment: {}", e);
            EnvConfig::default()
        })
}

pub fn config_file_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".git-squash").join("config.json"))
}

fn is_executable(path: &Path) -> bool {
    // Existence is enough; the OS enforces exec permissions on spawn.
    path.exists() && path.is_file()
}
