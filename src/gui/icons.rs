use crate::config::IconName;
use freedesktop_icons::lookup;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};

static THEME: RwLock<Option<String>> = RwLock::new(None);

/// Records the icon theme staged by the loader; later lookups prefer it.
pub fn set_theme(name: impl Into<String>) {
    let name = name.into();
    log::debug!("icon theme set to '{}'", name);
    *THEME.write() = Some(name);
}

pub fn theme() -> Option<String> {
    THEME.read().clone()
}

/// Resolves an icon name to a file. Absolute paths pass through untouched.
pub fn find_icon_path(icon: &IconName) -> Option<PathBuf> {
    if icon.is_empty() {
        return None;
    }

    let path = Path::new(icon.as_str());
    if path.is_absolute() && path.exists() {
        return Some(path.to_path_buf());
    }

    match theme() {
        Some(theme) => lookup(icon.as_str())
            .with_theme(&theme)
            .with_size(64)
            .with_scale(1)
            .find(),
        None => lookup(icon.as_str()).with_size(64).with_scale(1).find(),
    }
}
