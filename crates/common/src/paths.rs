use std::path::PathBuf;

/// Returns the Scriptony config directory.
///
/// Resolution order:
/// 1. `SCRIPTONY_CONFIG_DIR`
/// 2. `~/.config/scriptony`
/// 3. `.config/scriptony` relative to the working directory
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SCRIPTONY_CONFIG_DIR")
        && !dir.is_empty()
    {
        return PathBuf::from(dir);
    }
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".config").join("scriptony"))
        .unwrap_or_else(|| PathBuf::from(".config/scriptony"))
}
