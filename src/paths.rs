//! Settings file resolution
//!
//! Follows the XDG Base Directory Specification with an env var override.
//!
//! ```text
//! ~/.config/progress-hud/      (XDG_CONFIG_HOME)
//! └── hud.toml
//! ```
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `PROGRESS_HUD_SETTINGS` | Settings file | `~/.config/progress-hud/hud.toml` |

use std::path::PathBuf;

use tracing::info;

/// Get the XDG config directory for progress-hud
///
/// Priority: `XDG_CONFIG_HOME` > `~/.config`
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("progress-hud");
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config/progress-hud");
    }

    // Last resort: current directory
    PathBuf::from(".")
}

/// Get the settings file path
///
/// Priority: `PROGRESS_HUD_SETTINGS` env var > `config_dir()/hud.toml`
pub fn settings_path() -> PathBuf {
    std::env::var("PROGRESS_HUD_SETTINGS")
        .map(PathBuf::from)
        .unwrap_or_else(|_| config_dir().join("hud.toml"))
}

/// Log resolved paths for discoverability
pub fn log_paths() {
    info!("config directory: {}", config_dir().display());
    info!("hud settings: {}", settings_path().display());
}
