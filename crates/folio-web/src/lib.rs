#![forbid(unsafe_code)]

//! `folio-web` provides the host-driven shell around the `folio-core`
//! behavior components.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding environment (a JS shim in the
//!   browser, or a test harness) pushes page events and viewport changes.
//! - **Deterministic time**: the host advances a monotonic clock explicitly.
//! - **No blocking / no threads**: suitable for `wasm32-unknown-unknown`.
//!
//! This crate intentionally does not bind to `wasm-bindgen`. It provides the
//! backend building blocks a thin JS bridge wraps: an event queue, a clock,
//! and a command sink whose batches the bridge applies to the real DOM.

pub mod page_program;
pub mod session;
pub mod storage;

use core::time::Duration;
use std::collections::VecDeque;

use folio_core::command::DomCommand;
use folio_core::event::PageEvent;
use folio_core::geometry::Viewport;

const BATCH_HASH_ALGO: &str = "fnv1a64";
const FNV64_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV64_PRIME: u64 = 0x100000001b3;

/// Deterministic monotonic clock controlled by the host.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    /// Current monotonic time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Set current monotonic time.
    pub fn set(&mut self, now: Duration) {
        self.now = now;
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

/// Host-driven event source.
///
/// The host is responsible for pushing [`PageEvent`] values and updating the
/// viewport size.
#[derive(Debug, Clone)]
pub struct PageEventSource {
    viewport: Viewport,
    queue: VecDeque<PageEvent>,
}

impl PageEventSource {
    /// Create a new event source with an initial viewport size.
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            queue: VecDeque::new(),
        }
    }

    /// Current viewport size.
    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Update the viewport size.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Push a canonical event into the queue.
    pub fn push_event(&mut self, event: PageEvent) {
        self.queue.push_back(event);
    }

    /// Pop the oldest pending event.
    pub fn read_event(&mut self) -> Option<PageEvent> {
        self.queue.pop_front()
    }

    /// Whether events are waiting.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }
}

/// One presented batch of DOM commands with its deterministic checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBatch {
    /// Commands in emission order.
    pub commands: Vec<DomCommand>,
    /// FNV-1a 64 checksum of the batch payload.
    pub checksum: u64,
}

impl CommandBatch {
    /// Human-readable checksum label (`"fnv1a64:<16 hex>"`).
    #[must_use]
    pub fn checksum_label(&self) -> String {
        checksum_label(self.checksum)
    }
}

/// Aggregate batch accounting for host instrumentation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    /// Batches presented so far.
    pub batches: u32,
    /// Commands emitted across all batches.
    pub commands: u64,
}

/// Captured presentation outputs for host consumption.
#[derive(Debug, Default, Clone)]
pub struct PageOutputs {
    /// Presented batches in order.
    pub batches: Vec<CommandBatch>,
    /// Aggregate accounting across the captured batches.
    pub stats: BatchStats,
}

/// Command sink that captures batches for the host.
#[derive(Debug, Default, Clone)]
pub struct CommandSink {
    outputs: PageOutputs,
}

impl CommandSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get captured outputs.
    #[must_use]
    pub const fn outputs(&self) -> &PageOutputs {
        &self.outputs
    }

    /// Take captured outputs, leaving empty defaults.
    ///
    /// Aggregate stats are reset along with the batches.
    pub fn take_outputs(&mut self) -> PageOutputs {
        std::mem::take(&mut self.outputs)
    }

    /// Present a batch of commands, computing its checksum.
    ///
    /// Returns the checksum of the presented batch.
    pub fn present(&mut self, commands: Vec<DomCommand>) -> u64 {
        let checksum = command_batch_checksum(&commands);
        tracing::trace!(
            commands = commands.len(),
            checksum = %checksum_label(checksum),
            "batch presented"
        );
        self.outputs.stats.batches = self.outputs.stats.batches.saturating_add(1);
        self.outputs.stats.commands = self
            .outputs
            .stats
            .commands
            .saturating_add(commands.len() as u64);
        self.outputs.batches.push(CommandBatch { commands, checksum });
        checksum
    }
}

#[must_use]
fn fnv1a64_extend(mut hash: u64, bytes: &[u8]) -> u64 {
    for &byte in bytes {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV64_PRIME);
    }
    hash
}

#[must_use]
fn fnv1a64_str(hash: u64, s: &str) -> u64 {
    let hash = fnv1a64_extend(hash, &(s.len() as u64).to_le_bytes());
    fnv1a64_extend(hash, s.as_bytes())
}

/// Deterministic FNV-1a 64 checksum of a command batch.
///
/// Identical batches hash identically on every build; any change to command
/// order, targets, or payloads changes the checksum.
#[must_use]
pub fn command_batch_checksum(commands: &[DomCommand]) -> u64 {
    let mut hash = FNV64_OFFSET_BASIS;
    hash = fnv1a64_extend(hash, &(commands.len() as u64).to_le_bytes());

    for command in commands {
        hash = match command {
            DomCommand::AddClass { target, class } => {
                let h = fnv1a64_extend(hash, &[1]);
                let h = fnv1a64_extend(h, &target.0.to_le_bytes());
                fnv1a64_str(h, class)
            }
            DomCommand::RemoveClass { target, class } => {
                let h = fnv1a64_extend(hash, &[2]);
                let h = fnv1a64_extend(h, &target.0.to_le_bytes());
                fnv1a64_str(h, class)
            }
            DomCommand::SetText { target, text } => {
                let h = fnv1a64_extend(hash, &[3]);
                let h = fnv1a64_extend(h, &target.0.to_le_bytes());
                fnv1a64_str(h, text)
            }
            DomCommand::SetStyle {
                target,
                property,
                value,
            } => {
                let h = fnv1a64_extend(hash, &[4]);
                let h = fnv1a64_extend(h, &target.0.to_le_bytes());
                let h = fnv1a64_str(h, property);
                fnv1a64_str(h, value)
            }
            DomCommand::ScrollTo { y } => {
                let h = fnv1a64_extend(hash, &[5]);
                fnv1a64_extend(h, &y.to_le_bytes())
            }
            DomCommand::PersistPreference { key, value } => {
                let h = fnv1a64_extend(hash, &[6]);
                let h = fnv1a64_str(h, key);
                fnv1a64_str(h, value)
            }
            DomCommand::Unobserve { target } => {
                let h = fnv1a64_extend(hash, &[7]);
                fnv1a64_extend(h, &target.0.to_le_bytes())
            }
            DomCommand::Log { message } => {
                let h = fnv1a64_extend(hash, &[8]);
                fnv1a64_str(h, message)
            }
        };
    }

    hash
}

/// Format a checksum as its canonical label.
#[must_use]
pub fn checksum_label(checksum: u64) -> String {
    format!("{BATCH_HASH_ALGO}:{checksum:016x}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::event::NodeId;

    use pretty_assertions::assert_eq;

    #[test]
    fn deterministic_clock_advances_monotonically() {
        let mut c = DeterministicClock::new();
        assert_eq!(c.now(), Duration::ZERO);

        c.advance(Duration::from_millis(10));
        assert_eq!(c.now(), Duration::from_millis(10));

        c.advance(Duration::from_millis(5));
        assert_eq!(c.now(), Duration::from_millis(15));

        // Saturation: don't panic or wrap.
        c.set(Duration::MAX);
        c.advance(Duration::from_secs(1));
        assert_eq!(c.now(), Duration::MAX);
    }

    #[test]
    fn event_source_is_a_fifo_queue() {
        let mut ev = PageEventSource::new(Viewport::new(1280, 720));
        assert_eq!(ev.viewport(), Viewport::new(1280, 720));
        assert!(!ev.has_pending());

        ev.push_event(PageEvent::Scroll { y: 100 });
        ev.push_event(PageEvent::click(NodeId(3)));

        assert!(ev.has_pending());
        assert_eq!(ev.read_event(), Some(PageEvent::Scroll { y: 100 }));
        assert_eq!(ev.read_event(), Some(PageEvent::click(NodeId(3))));
        assert_eq!(ev.read_event(), None);
    }

    #[test]
    fn sink_captures_batches_and_stats() {
        let mut sink = CommandSink::new();
        sink.present(vec![DomCommand::ScrollTo { y: 10 }]);
        sink.present(vec![
            DomCommand::add_class(NodeId(1), "active"),
            DomCommand::remove_class(NodeId(2), "active"),
        ]);

        let outputs = sink.take_outputs();
        assert_eq!(outputs.batches.len(), 2);
        assert_eq!(outputs.stats.batches, 2);
        assert_eq!(outputs.stats.commands, 3);
        assert!(outputs.batches[0].checksum_label().starts_with("fnv1a64:"));

        // Taking resets.
        assert_eq!(sink.outputs().batches.len(), 0);
        assert_eq!(sink.outputs().stats, BatchStats::default());
    }

    #[test]
    fn batch_checksum_is_deterministic() {
        let batch = vec![
            DomCommand::add_class(NodeId(1), "revealed"),
            DomCommand::Unobserve { target: NodeId(1) },
        ];
        assert_eq!(command_batch_checksum(&batch), command_batch_checksum(&batch));
    }

    #[test]
    fn batch_checksum_changes_with_payload() {
        let baseline = vec![DomCommand::set_text(NodeId(4), "\u{1F319}")];
        let base = command_batch_checksum(&baseline);

        let retargeted = vec![DomCommand::set_text(NodeId(5), "\u{1F319}")];
        assert_ne!(base, command_batch_checksum(&retargeted));

        let reworded = vec![DomCommand::set_text(NodeId(4), "\u{2600}\u{FE0F}")];
        assert_ne!(base, command_batch_checksum(&reworded));

        // Variant tags keep same-payload commands distinct.
        let add = vec![DomCommand::add_class(NodeId(4), "x")];
        let remove = vec![DomCommand::remove_class(NodeId(4), "x")];
        assert_ne!(
            command_batch_checksum(&add),
            command_batch_checksum(&remove)
        );
    }

    #[test]
    fn checksum_label_is_fixed_width_hex() {
        let label = checksum_label(0xab);
        assert_eq!(label, "fnv1a64:00000000000000ab");
    }
}
