use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

fn home() -> Result<PathBuf> {
    dirs::home_dir().context("cannot determine the user home directory")
}

/// Platform base directory: the roaming config dir on Windows, home elsewhere.
fn platform_base() -> Result<PathBuf> {
    if cfg!(windows) {
        dirs::config_dir().context("cannot determine the user config directory")
    } else {
        home()
    }
}

fn expand_tilde(raw: &str) -> Result<PathBuf> {
    if raw == "~" {
        return home();
    }
    if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        return Ok(home()?.join(rest));
    }
    Ok(PathBuf::from(raw))
}

/// Resolve the application home directory into an absolute path.
///
/// `None` (or a blank string) selects `<platform base>/<default_subdir>`.
/// A leading `~` expands to the user home directory, and relative paths are taken
/// from the current working directory. With `create` the directory is made.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let path = match configured.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => expand_tilde(raw)?,
        _ => platform_base()?.join(default_subdir),
    };

    let path = if path.is_absolute() {
        path
    } else {
        env::current_dir()
            .context("cannot read current directory")?
            .join(path)
    };

    if create {
        ensure_dir(&path)?;
    }
    Ok(path)
}

fn ensure_dir(path: &Path) -> Result<()> {
    if path.exists() && !path.is_dir() {
        bail!("home_dir {} exists and is not a directory", path.display());
    }
    fs::create_dir_all(path).with_context(|| format!("cannot create {}", path.display()))
}
