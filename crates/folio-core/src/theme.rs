#![forbid(unsafe_code)]

//! Theme switching with a persisted preference.
//!
//! The page has exactly two modes, light and dark. Dark mode is represented
//! as a single class on the body element; the toggle control carries an
//! indicator glyph showing which mode a click switches *to*. The chosen mode
//! is persisted under a well-known storage key and re-applied on load.
//!
//! # Example
//! ```
//! use folio_core::event::NodeId;
//! use folio_core::theme::{ThemeConfig, ThemeController, ThemeMode};
//!
//! let mut theme = ThemeController::new(ThemeConfig::default(), NodeId(0), Some(NodeId(1)));
//!
//! // No stored preference: the default (light) applies.
//! let _cmds = theme.load(None);
//! assert_eq!(theme.mode(), ThemeMode::Light);
//!
//! // Toggling flips the mode and persists it.
//! let _cmds = theme.toggle();
//! assert_eq!(theme.mode(), ThemeMode::Dark);
//! ```

use crate::command::DomCommand;
use crate::event::NodeId;
use crate::logging::debug;

/// The two page modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    /// Light mode (the default when no preference is stored).
    #[default]
    Light,
    /// Dark mode.
    Dark,
}

impl ThemeMode {
    /// The persisted string form of this mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Parse a persisted value.
    ///
    /// Returns `None` for anything other than the two recognized strings;
    /// callers treat that the same as an absent preference.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    /// The opposite mode.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Configuration for theme switching.
#[derive(Debug, Clone)]
pub struct ThemeConfig {
    /// Storage key the preference is persisted under.
    pub storage_key: String,

    /// Mode applied when no (or an unrecognized) preference is stored.
    pub default_mode: ThemeMode,

    /// Class present on the body element while dark mode is active.
    pub dark_class: String,

    /// Indicator glyph shown while light mode is active ("switch to dark").
    pub to_dark_glyph: String,

    /// Indicator glyph shown while dark mode is active ("switch to light").
    pub to_light_glyph: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            storage_key: "theme".to_owned(),
            default_mode: ThemeMode::Light,
            dark_class: "dark-mode".to_owned(),
            to_dark_glyph: "\u{1F319}".to_owned(),
            to_light_glyph: "\u{2600}\u{FE0F}".to_owned(),
        }
    }
}

/// Stateful theme controller.
///
/// Resolve the startup mode with [`load`](ThemeController::load), then feed
/// toggle clicks to [`toggle`](ThemeController::toggle). Both return the DOM
/// commands that make the document match the controller's mode.
#[derive(Debug, Clone)]
pub struct ThemeController {
    config: ThemeConfig,
    body: NodeId,
    indicator: Option<NodeId>,
    mode: ThemeMode,
}

impl ThemeController {
    /// Create a controller in the configured default mode.
    ///
    /// `indicator` is the optional element whose text shows the toggle glyph.
    #[must_use]
    pub fn new(config: ThemeConfig, body: NodeId, indicator: Option<NodeId>) -> Self {
        let mode = config.default_mode;
        Self {
            config,
            body,
            indicator,
            mode,
        }
    }

    /// The currently applied mode.
    #[must_use]
    pub const fn mode(&self) -> ThemeMode {
        self.mode
    }

    /// Resolve the startup mode from a stored preference and apply it.
    ///
    /// A stored value wins; an absent or unrecognized value falls back to
    /// the configured default.
    pub fn load(&mut self, stored: Option<&str>) -> Vec<DomCommand> {
        self.mode = stored
            .and_then(ThemeMode::parse)
            .unwrap_or(self.config.default_mode);
        debug!(mode = self.mode.as_str(), "theme loaded");
        self.apply()
    }

    /// Flip the mode, apply it, and persist the new preference.
    pub fn toggle(&mut self) -> Vec<DomCommand> {
        self.mode = self.mode.toggled();
        debug!(mode = self.mode.as_str(), "theme toggled");
        let mut cmds = self.apply();
        cmds.push(DomCommand::PersistPreference {
            key: self.config.storage_key.clone(),
            value: self.mode.as_str().to_owned(),
        });
        cmds
    }

    /// Commands that make the document reflect the current mode.
    fn apply(&self) -> Vec<DomCommand> {
        let mut cmds = Vec::with_capacity(2);
        match self.mode {
            ThemeMode::Dark => {
                cmds.push(DomCommand::add_class(self.body, self.config.dark_class.clone()));
            }
            ThemeMode::Light => {
                cmds.push(DomCommand::remove_class(
                    self.body,
                    self.config.dark_class.clone(),
                ));
            }
        }
        if let Some(indicator) = self.indicator {
            let glyph = match self.mode {
                ThemeMode::Light => &self.config.to_dark_glyph,
                ThemeMode::Dark => &self.config.to_light_glyph,
            };
            cmds.push(DomCommand::set_text(indicator, glyph.clone()));
        }
        cmds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BODY: NodeId = NodeId(0);
    const INDICATOR: NodeId = NodeId(1);

    fn controller() -> ThemeController {
        ThemeController::new(ThemeConfig::default(), BODY, Some(INDICATOR))
    }

    #[test]
    fn absent_preference_defaults_to_light() {
        let mut theme = controller();
        let cmds = theme.load(None);

        assert_eq!(theme.mode(), ThemeMode::Light);
        assert_eq!(
            cmds,
            vec![
                DomCommand::remove_class(BODY, "dark-mode"),
                DomCommand::set_text(INDICATOR, "\u{1F319}"),
            ]
        );
    }

    #[test]
    fn stored_dark_preference_is_reapplied() {
        let mut theme = controller();
        let cmds = theme.load(Some("dark"));

        assert_eq!(theme.mode(), ThemeMode::Dark);
        assert_eq!(
            cmds,
            vec![
                DomCommand::add_class(BODY, "dark-mode"),
                DomCommand::set_text(INDICATOR, "\u{2600}\u{FE0F}"),
            ]
        );
    }

    #[test]
    fn unrecognized_preference_is_treated_as_absent() {
        let mut theme = controller();
        theme.load(Some("solarized"));
        assert_eq!(theme.mode(), ThemeMode::Light);
    }

    #[test]
    fn toggle_persists_the_new_mode() {
        let mut theme = controller();
        theme.load(None);

        let cmds = theme.toggle();
        assert_eq!(theme.mode(), ThemeMode::Dark);
        assert!(cmds.contains(&DomCommand::PersistPreference {
            key: "theme".to_owned(),
            value: "dark".to_owned(),
        }));
    }

    #[test]
    fn toggling_twice_restores_mode_and_persisted_value() {
        let mut theme = controller();
        let initial = theme.load(None);

        theme.toggle();
        let back = theme.toggle();

        assert_eq!(theme.mode(), ThemeMode::Light);
        // Same visible state as the initial application, plus the persist.
        assert_eq!(back[..initial.len()], initial[..]);
        assert_eq!(
            back.last(),
            Some(&DomCommand::PersistPreference {
                key: "theme".to_owned(),
                value: "light".to_owned(),
            })
        );
    }

    #[test]
    fn missing_indicator_is_tolerated() {
        let mut theme = ThemeController::new(ThemeConfig::default(), BODY, None);
        let cmds = theme.load(Some("dark"));
        assert_eq!(cmds, vec![DomCommand::add_class(BODY, "dark-mode")]);
    }

    #[test]
    fn mode_round_trips_through_storage_form() {
        for mode in [ThemeMode::Light, ThemeMode::Dark] {
            assert_eq!(ThemeMode::parse(mode.as_str()), Some(mode));
        }
        assert_eq!(ThemeMode::parse(""), None);
    }
}
