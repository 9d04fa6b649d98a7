//! Theme preference storage
//!
//! A single persisted flag, independent of the route: whether the user
//! prefers the theme opposite to the system one.

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemePreference {
    pub prefer_alt_theme: bool,
}

impl ThemePreference {
    /// Whether the page ends up dark given the system preference
    pub fn is_dark(&self, system_dark: bool) -> bool {
        system_dark != self.prefer_alt_theme
    }

    /// Label for the toggle, naming the theme it would switch to
    pub fn toggle_label(&self, system_dark: bool) -> String {
        let other = if self.is_dark(system_dark) { "light" } else { "dark" };
        format!("Use {} theme", other)
    }
}

/// JSON file holding a [`ThemePreference`]
pub struct ThemeStore {
    path: PathBuf,
}

impl ThemeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored preference; missing or unreadable files give the default
    pub fn load(&self) -> ThemePreference {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return ThemePreference::default(),
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("ignoring malformed theme preference {:?}: {}", self.path, e);
            ThemePreference::default()
        })
    }

    pub fn save(&self, pref: ThemePreference) -> Result<()> {
        let json = serde_json::to_string(&pref).map_err(|e| Error::Theme(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| Error::Theme(format!("{:?}: {}", self.path, e)))
    }

    /// Flip and persist the preference
    pub fn toggle(&self) -> Result<ThemePreference> {
        let mut pref = self.load();
        pref.prefer_alt_theme = !pref.prefer_alt_theme;
        self.save(pref)?;
        Ok(pref)
    }
}
