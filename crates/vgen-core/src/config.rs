//! User configuration at `~/.config/vgen/config.toml`.
//!
//! Every key is optional. Command-line flags override config values, which
//! override the built-in defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides `openai_api_key`.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VgenConfig {
    pub openai_api_key: Option<String>,
    /// Directory for generated videos; `~/` is expanded.
    pub output_dir: Option<String>,
    pub model: Option<String>,
    /// Clip length in seconds: "4", "8" or "12".
    pub duration: Option<String>,
    pub size: Option<String>,
    /// Prompt of the last successful generation.
    pub last_prompt: Option<String>,
    /// API root; defaults to the public endpoint.
    pub api_base: Option<String>,
}

impl VgenConfig {
    /// API key from the environment, falling back to the config file.
    pub fn api_key(&self) -> Option<String> {
        resolve_api_key(env::var(API_KEY_ENV).ok(), self.openai_api_key.as_deref())
    }

    /// Configured output directory, else the desktop, else the working directory.
    pub fn output_dir(&self) -> PathBuf {
        match self.output_dir.as_deref().filter(|d| !d.trim().is_empty()) {
            Some(dir) => expand_home(dir),
            None => default_output_dir(),
        }
    }

    /// Write back to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml = toml::to_string_pretty(self)?;
        fs::write(path, toml).with_context(|| format!("write config {}", path.display()))?;
        restrict_permissions(path)?;
        Ok(())
    }
}

fn resolve_api_key(from_env: Option<String>, from_config: Option<&str>) -> Option<String> {
    from_env
        .filter(|k| !k.trim().is_empty())
        .or_else(|| from_config.map(str::to_string))
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}

/// The file holds an API key; keep it private to the user.
#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("vgen")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating an empty file if none exists.
pub fn load_or_init() -> Result<VgenConfig> {
    load_or_init_at(&config_path()?)
}

pub fn load_or_init_at(path: &Path) -> Result<VgenConfig> {
    if !path.exists() {
        let default_cfg = VgenConfig::default();
        default_cfg.save_to(path)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)?;
    let cfg: VgenConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}

pub fn default_output_dir() -> PathBuf {
    dirs::desktop_dir()
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Expand a leading `~/` (or a bare `~`) to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    let home = dirs::home_dir();
    match (path, home) {
        ("~", Some(home)) => home,
        (p, Some(home)) if p.starts_with("~/") => home.join(&p[2..]),
        (p, _) => PathBuf::from(p),
    }
}
