//! Light/dark theme preference.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use daykart_core::storage::{KeyValueStore, keys};
use serde::{Deserialize, Serialize};

/// Colour scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light scheme, the default.
    #[default]
    Light,
    /// Dark scheme.
    Dark,
}

impl Theme {
    /// The stored value, `"light"` or `"dark"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// The other scheme.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Theme preference persisted as a bare string under `theme`.
pub struct ThemePreference {
    store: Arc<dyn KeyValueStore>,
    theme: Mutex<Theme>,
}

impl ThemePreference {
    /// Reads the stored theme. Anything other than `"dark"` means light.
    #[must_use]
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let theme = match store.get(keys::THEME) {
            Ok(Some(value)) if value == Theme::Dark.as_str() => Theme::Dark,
            Ok(_) => Theme::Light,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read theme, using light");
                Theme::Light
            }
        };
        Self {
            store,
            theme: Mutex::new(theme),
        }
    }

    /// The current theme.
    #[must_use]
    pub fn current(&self) -> Theme {
        *self.theme.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns `true` for the dark scheme.
    #[must_use]
    pub fn is_dark(&self) -> bool {
        self.current() == Theme::Dark
    }

    /// Sets and persists `theme`.
    pub fn set(&self, theme: Theme) {
        let mut current = self.theme.lock().unwrap_or_else(PoisonError::into_inner);
        *current = theme;
        if let Err(e) = self.store.set(keys::THEME, theme.as_str().to_owned()) {
            tracing::warn!(error = %e, %theme, "failed to persist theme");
        }
    }

    /// Switches scheme, persists it and returns the new theme.
    pub fn toggle(&self) -> Theme {
        let next = self.current().toggled();
        self.set(next);
        tracing::debug!(theme = %next, "theme toggled");
        next
    }
}

impl fmt::Debug for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemePreference")
            .field("theme", &self.current())
            .finish_non_exhaustive()
    }
}
