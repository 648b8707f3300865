#![forbid(unsafe_code)]

//! Smooth in-page scroll animation.
//!
//! A nav click starts a time-based interpolation from the current scroll
//! offset to the target section's top minus a fixed header offset. The
//! animation is driven by the host clock: each step produces one `ScrollTo`
//! command, and the final step lands exactly on the destination. Elapsed
//! time accumulates as [`Duration`] for precise progress (no floating-point
//! drift).

use std::time::Duration;

use crate::command::DomCommand;
use crate::logging::debug;

/// Easing function signature: maps `t` in [0, 1] to output in [0, 1].
pub type EasingFn = fn(f32) -> f32;

/// Identity easing (constant velocity).
#[inline]
#[must_use]
pub fn linear(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

/// Quadratic ease-in (slow start).
#[inline]
#[must_use]
pub fn ease_in(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t
}

/// Quadratic ease-out (slow end).
#[inline]
#[must_use]
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Quadratic ease-in-out (slow start and end).
#[inline]
#[must_use]
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Configuration for smooth navigation.
#[derive(Debug, Clone, Copy)]
pub struct ScrollConfig {
    /// Fixed-header allowance subtracted from the target's top offset.
    pub header_offset: i32,

    /// Animation duration.
    pub duration: Duration,

    /// Easing applied to animation progress.
    pub easing: EasingFn,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            header_offset: 80,
            duration: Duration::from_millis(480),
            easing: ease_in_out,
        }
    }
}

/// Interpolates a scroll offset between `from` and `to` over a duration.
#[derive(Debug, Clone, Copy)]
pub struct ScrollAnimation {
    from: i32,
    to: i32,
    elapsed: Duration,
    duration: Duration,
    easing: EasingFn,
}

impl ScrollAnimation {
    /// Create a new animation from `from` to `to` over `duration`.
    #[must_use]
    pub fn new(from: i32, to: i32, duration: Duration, easing: EasingFn) -> Self {
        Self {
            from,
            to,
            elapsed: Duration::ZERO,
            duration: if duration.is_zero() {
                Duration::from_nanos(1)
            } else {
                duration
            },
            easing,
        }
    }

    /// Advance the animation by `dt`.
    pub fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    /// Whether the animation has reached its end.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// The destination offset.
    #[must_use]
    pub const fn destination(&self) -> i32 {
        self.to
    }

    fn progress(&self) -> f32 {
        let t = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        (t as f32).clamp(0.0, 1.0)
    }

    /// Current interpolated offset.
    ///
    /// Returns exactly `to` once complete; easing clamps keep intermediate
    /// values inside `[from, to]`.
    #[must_use]
    pub fn position(&self) -> i32 {
        if self.is_complete() {
            return self.to;
        }
        let t = (self.easing)(self.progress());
        let range = self.to as f32 - self.from as f32;
        let pos = self.from as f32 + range * t;
        pos.round() as i32
    }
}

/// Smooth-navigation controller.
///
/// Tracks the current scroll offset from host notifications and runs at most
/// one animation at a time. A new navigation while animating retargets from
/// the current animated offset.
#[derive(Debug, Clone)]
pub struct SmoothScroll {
    config: ScrollConfig,
    current_y: i32,
    animation: Option<ScrollAnimation>,
}

impl SmoothScroll {
    /// Create a controller starting at offset 0.
    #[must_use]
    pub fn new(config: ScrollConfig) -> Self {
        Self {
            config,
            current_y: 0,
            animation: None,
        }
    }

    /// The last known scroll offset.
    #[must_use]
    pub const fn current_y(&self) -> i32 {
        self.current_y
    }

    /// Whether an animation is in flight.
    #[must_use]
    pub const fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Record a host scroll notification.
    ///
    /// While animating, scroll notifications are echoes of our own
    /// `ScrollTo` commands and the animation stays authoritative.
    pub fn set_scroll(&mut self, y: i32) {
        if self.animation.is_none() {
            self.current_y = y;
        }
    }

    /// Start animating toward a section top, if one was resolved.
    ///
    /// `target_top` of `None` means the clicked link has no matching section
    /// in the document: nothing happens.
    pub fn navigate(&mut self, target_top: Option<i32>) {
        let Some(top) = target_top else {
            return;
        };
        let dest = top.saturating_sub(self.config.header_offset).max(0);
        debug!(from = self.current_y, to = dest, "scroll animation started");
        self.animation = Some(ScrollAnimation::new(
            self.current_y,
            dest,
            self.config.duration,
            self.config.easing,
        ));
    }

    /// Advance the in-flight animation by `dt`.
    ///
    /// Returns the `ScrollTo` command for the new offset, or `None` when no
    /// animation is running.
    pub fn tick(&mut self, dt: Duration) -> Option<DomCommand> {
        let anim = self.animation.as_mut()?;
        anim.tick(dt);
        let y = anim.position();
        self.current_y = y;
        if anim.is_complete() {
            self.animation = None;
        }
        Some(DomCommand::ScrollTo { y })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn animation_lands_exactly_on_destination() {
        let mut anim =
            ScrollAnimation::new(0, 920, Duration::from_millis(480), ease_in_out);
        anim.tick(Duration::from_millis(480));
        assert!(anim.is_complete());
        assert_eq!(anim.position(), 920);
    }

    #[test]
    fn animation_survives_overshooting_ticks() {
        let mut anim = ScrollAnimation::new(100, 0, Duration::from_millis(100), linear);
        anim.tick(Duration::from_secs(5));
        assert!(anim.is_complete());
        assert_eq!(anim.position(), 0);
    }

    #[test]
    fn zero_duration_completes_on_first_tick() {
        let mut anim = ScrollAnimation::new(0, 50, Duration::ZERO, linear);
        anim.tick(Duration::from_millis(1));
        assert!(anim.is_complete());
        assert_eq!(anim.position(), 50);
    }

    #[test]
    fn navigate_subtracts_header_offset() {
        let mut scroll = SmoothScroll::new(ScrollConfig::default());
        scroll.navigate(Some(1000));

        // Drive to completion.
        let mut last = None;
        while scroll.is_animating() {
            last = scroll.tick(Duration::from_millis(16));
        }
        assert_eq!(last, Some(DomCommand::ScrollTo { y: 920 }));
        assert_eq!(scroll.current_y(), 920);
    }

    #[test]
    fn navigate_clamps_destination_at_zero() {
        let mut scroll = SmoothScroll::new(ScrollConfig::default());
        scroll.set_scroll(400);
        scroll.navigate(Some(30));

        while scroll.is_animating() {
            scroll.tick(Duration::from_millis(16));
        }
        assert_eq!(scroll.current_y(), 0);
    }

    #[test]
    fn missing_target_is_a_no_op() {
        let mut scroll = SmoothScroll::new(ScrollConfig::default());
        scroll.navigate(None);
        assert!(!scroll.is_animating());
        assert_eq!(scroll.tick(Duration::from_millis(16)), None);
    }

    #[test]
    fn retarget_starts_from_current_animated_offset() {
        let mut scroll = SmoothScroll::new(fast_config());
        scroll.navigate(Some(1000));
        scroll.tick(Duration::from_millis(50));
        let midway = scroll.current_y();
        assert!(midway > 0 && midway < 920);

        scroll.navigate(Some(80));
        let first = scroll.tick(Duration::ZERO);
        assert_eq!(first, Some(DomCommand::ScrollTo { y: midway }));
    }

    #[test]
    fn host_scroll_updates_offset_only_when_idle() {
        let mut scroll = SmoothScroll::new(ScrollConfig::default());
        scroll.set_scroll(300);
        assert_eq!(scroll.current_y(), 300);

        scroll.navigate(Some(1000));
        scroll.set_scroll(5);
        assert_eq!(scroll.current_y(), 300);
    }

    // Short linear animation so retargeting lands mid-flight predictably.
    fn fast_config() -> ScrollConfig {
        ScrollConfig {
            duration: Duration::from_millis(100),
            easing: linear,
            ..ScrollConfig::default()
        }
    }

    proptest! {
        #[test]
        fn easing_outputs_stay_normalized(t in -2.0f32..3.0) {
            for easing in [linear, ease_in, ease_out, ease_in_out] {
                let v = easing(t);
                prop_assert!((0.0..=1.0).contains(&v));
            }
        }

        #[test]
        fn position_stays_between_endpoints(
            from in -2000i32..2000,
            to in -2000i32..2000,
            steps in 1u32..20,
        ) {
            let mut anim =
                ScrollAnimation::new(from, to, Duration::from_millis(480), ease_in_out);
            let (lo, hi) = if from <= to { (from, to) } else { (to, from) };
            for _ in 0..steps {
                anim.tick(Duration::from_millis(40));
                let pos = anim.position();
                prop_assert!((lo..=hi).contains(&pos));
            }
        }
    }
}
