#![forbid(unsafe_code)]

//! Active navigation-link tracking.
//!
//! On every scroll notification the tracker scans the page's sections in
//! document order and selects the last one whose top has been scrolled past
//! a fixed pixel threshold; the nav link for that section is marked active
//! and all others are cleared. Recomputation happens on every scroll event,
//! unthrottled; commands are only emitted when the active link actually
//! changes, since re-applying an identical class set is a no-op on the DOM.

use crate::command::DomCommand;
use crate::event::NodeId;
use crate::logging::trace;

/// Configuration for active-link tracking.
#[derive(Debug, Clone)]
pub struct NavConfig {
    /// Class carried by the active nav link.
    pub active_class: String,

    /// Pixel threshold below the viewport top at which a section counts as
    /// entered.
    pub threshold_px: i32,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            active_class: "active".to_owned(),
            threshold_px: 150,
        }
    }
}

/// A section paired with the nav link that points at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    /// The nav link to highlight when this section is active.
    pub link: NodeId,
    /// The section's top offset in document pixels.
    pub top: i32,
}

/// Tracks which nav link is active for the current scroll offset.
#[derive(Debug, Clone)]
pub struct ActiveNav {
    config: NavConfig,
    sections: Vec<Section>,
    active: Option<usize>,
}

impl ActiveNav {
    /// Create a tracker over `sections`, which must be in document order
    /// (ascending tops); the scan relies on it so the lowest qualifying
    /// section wins.
    #[must_use]
    pub fn new(config: NavConfig, sections: Vec<Section>) -> Self {
        Self {
            config,
            sections,
            active: None,
        }
    }

    /// The currently active nav link, if any.
    #[must_use]
    pub fn active(&self) -> Option<NodeId> {
        self.active.map(|idx| self.sections[idx].link)
    }

    /// Recompute the active link for scroll offset `y`.
    ///
    /// Returns an empty batch when the active link is unchanged. Otherwise
    /// every link is cleared first and the new active link (if any) is
    /// marked.
    pub fn on_scroll(&mut self, y: i32) -> Vec<DomCommand> {
        let mut next = None;
        for (idx, section) in self.sections.iter().enumerate() {
            if y.saturating_add(self.config.threshold_px) >= section.top {
                next = Some(idx);
            }
        }

        if next == self.active {
            return Vec::new();
        }
        self.active = next;
        trace!(scroll_y = y, "active section changed");

        let mut cmds: Vec<DomCommand> = self
            .sections
            .iter()
            .map(|section| DomCommand::remove_class(section.link, self.config.active_class.clone()))
            .collect();
        if let Some(idx) = next {
            cmds.push(DomCommand::add_class(
                self.sections[idx].link,
                self.config.active_class.clone(),
            ));
        }
        cmds
    }
}
