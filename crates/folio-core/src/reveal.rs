#![forbid(unsafe_code)]

//! Reveal-on-scroll latches.
//!
//! Every observed element starts hidden. The first time the host reports it
//! entering the viewport region, the element flips to visible and the host
//! is told to stop watching it. The flip is strictly one-way: later
//! notifications for a revealed element are ignored, and a leave
//! notification never hides anything.

use crate::command::DomCommand;
use crate::event::NodeId;
use crate::logging::trace;

/// Configuration for reveal-on-scroll.
#[derive(Debug, Clone)]
pub struct RevealConfig {
    /// Class applied to targets while hidden.
    pub hidden_class: String,

    /// Class applied to targets once revealed.
    pub visible_class: String,

    /// Bottom margin in pixels for the host's intersection watcher.
    ///
    /// The host shrinks its observation region by this much so the trigger
    /// fires slightly before the element is fully visible. The engine never
    /// uses the value itself; it is surfaced here so host and engine share
    /// one configuration source.
    pub margin_px: i32,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            hidden_class: "reveal-hidden".to_owned(),
            visible_class: "revealed".to_owned(),
            margin_px: 50,
        }
    }
}

/// Per-element one-way reveal latch registry.
#[derive(Debug, Clone)]
pub struct RevealObserver {
    config: RevealConfig,
    pending: Vec<NodeId>,
    revealed: Vec<NodeId>,
}

impl RevealObserver {
    /// Create an empty observer.
    #[must_use]
    pub fn new(config: RevealConfig) -> Self {
        Self {
            config,
            pending: Vec::new(),
            revealed: Vec::new(),
        }
    }

    /// Host intersection-margin configuration.
    #[must_use]
    pub const fn margin_px(&self) -> i32 {
        self.config.margin_px
    }

    /// Register an element for observation. Duplicates are ignored.
    pub fn observe(&mut self, target: NodeId) {
        if !self.pending.contains(&target) && !self.revealed.contains(&target) {
            self.pending.push(target);
        }
    }

    /// Commands that hide every pending target at startup.
    #[must_use]
    pub fn init(&self) -> Vec<DomCommand> {
        self.pending
            .iter()
            .map(|&target| DomCommand::add_class(target, self.config.hidden_class.clone()))
            .collect()
    }

    /// Handle an intersection notification.
    ///
    /// Entering a pending target reveals it and unobserves it; everything
    /// else is a no-op.
    pub fn intersection(&mut self, target: NodeId, entering: bool) -> Vec<DomCommand> {
        if !entering {
            return Vec::new();
        }
        let Some(idx) = self.pending.iter().position(|&t| t == target) else {
            return Vec::new();
        };
        self.pending.remove(idx);
        self.revealed.push(target);
        trace!(%target, "reveal latched");
        vec![
            DomCommand::remove_class(target, self.config.hidden_class.clone()),
            DomCommand::add_class(target, self.config.visible_class.clone()),
            DomCommand::Unobserve { target },
        ]
    }

    /// Whether a target has already revealed.
    #[must_use]
    pub fn is_revealed(&self, target: NodeId) -> bool {
        self.revealed.contains(&target)
    }

    /// Number of targets still waiting to reveal.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CARD: NodeId = NodeId(10);
    const TAG: NodeId = NodeId(11);

    fn observer() -> RevealObserver {
        let mut obs = RevealObserver::new(RevealConfig::default());
        obs.observe(CARD);
        obs.observe(TAG);
        obs
    }

    #[test]
    fn init_hides_all_targets() {
        let obs = observer();
        assert_eq!(
            obs.init(),
            vec![
                DomCommand::add_class(CARD, "reveal-hidden"),
                DomCommand::add_class(TAG, "reveal-hidden"),
            ]
        );
    }

    #[test]
    fn entering_reveals_and_unobserves() {
        let mut obs = observer();
        let cmds = obs.intersection(CARD, true);

        assert_eq!(
            cmds,
            vec![
                DomCommand::remove_class(CARD, "reveal-hidden"),
                DomCommand::add_class(CARD, "revealed"),
                DomCommand::Unobserve { target: CARD },
            ]
        );
        assert!(obs.is_revealed(CARD));
        assert_eq!(obs.pending_count(), 1);
    }

    #[test]
    fn reveal_is_one_way() {
        let mut obs = observer();
        obs.intersection(CARD, true);

        // Leaving and re-entering produce nothing further.
        assert_eq!(obs.intersection(CARD, false), Vec::new());
        assert_eq!(obs.intersection(CARD, true), Vec::new());
        assert!(obs.is_revealed(CARD));
    }

    #[test]
    fn leave_before_reveal_does_not_latch() {
        let mut obs = observer();
        assert_eq!(obs.intersection(CARD, false), Vec::new());
        assert!(!obs.is_revealed(CARD));
        assert_eq!(obs.pending_count(), 2);
    }

    #[test]
    fn unknown_target_is_ignored() {
        let mut obs = observer();
        assert_eq!(obs.intersection(NodeId(99), true), Vec::new());
    }

    #[test]
    fn duplicate_observe_is_ignored() {
        let mut obs = observer();
        obs.observe(CARD);
        assert_eq!(obs.pending_count(), 2);

        obs.intersection(CARD, true);
        obs.observe(CARD);
        assert_eq!(obs.pending_count(), 1);
    }
}
