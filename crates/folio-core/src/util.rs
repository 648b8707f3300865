#![forbid(unsafe_code)]

//! Free-standing utilities.
//!
//! Public helpers for hosts that want them. Neither is wired into the five
//! page components: scroll recomputation is deliberately unthrottled, and
//! visibility is driven by host intersection notifications rather than
//! polled rect checks.

use std::time::Duration;

use crate::geometry::{Rect, Viewport};

/// Trailing-edge debounce keyed off the host clock.
///
/// [`poke`](Debouncer::poke) restarts the quiet period;
/// [`fire`](Debouncer::fire) reports (once) when a full quiet period has
/// elapsed since the last poke.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use folio_core::util::Debouncer;
///
/// let mut debounce = Debouncer::new(Duration::from_millis(100));
/// debounce.poke(Duration::from_millis(0));
/// assert!(!debounce.fire(Duration::from_millis(50)));
/// assert!(debounce.fire(Duration::from_millis(100)));
/// assert!(!debounce.fire(Duration::from_millis(200)));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Duration>,
}

impl Debouncer {
    /// Create a debouncer with the given quiet period.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Record activity at monotonic time `now`, restarting the quiet period.
    pub fn poke(&mut self, now: Duration) {
        self.deadline = Some(now.saturating_add(self.delay));
    }

    /// Whether the quiet period has elapsed at monotonic time `now`.
    ///
    /// Returns `true` at most once per poke.
    pub fn fire(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Whether a poke is waiting to fire.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}

/// Whether `rect` (in viewport coordinates) lies fully inside the viewport.
#[must_use]
pub fn is_in_viewport(rect: Rect, viewport: Viewport) -> bool {
    rect.top >= 0 && rect.left >= 0 && rect.bottom() <= viewport.height && rect.right() <= viewport.width
}
