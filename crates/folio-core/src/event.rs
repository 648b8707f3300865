#![forbid(unsafe_code)]

//! Canonical page events.
//!
//! This module defines the standard event types the host pushes into the
//! engine. All events derive `Clone`, `Copy`, `PartialEq`, and `Eq` for use
//! in tests and pattern matching.
//!
//! # Design Notes
//!
//! - The engine never walks a DOM tree. The host assigns every element it
//!   registers an opaque [`NodeId`] and reports events against those handles.
//! - Scroll offsets and viewport sizes are integer CSS pixels.
//! - `Modifiers` use bitflags for easy combination.

use bitflags::bitflags;

use crate::geometry::Viewport;

/// Opaque handle to a registered DOM element.
///
/// Assigned by the host when it binds the page; the engine only ever compares
/// handles and echoes them back inside commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl core::fmt::Display for NodeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Canonical page event.
///
/// This enum represents all notifications the engine can receive from the
/// host environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    /// An element was clicked.
    Click {
        /// The clicked element.
        target: NodeId,
        /// Modifier keys held during the click.
        modifiers: Modifiers,
    },

    /// The pointer entered an element.
    PointerEnter {
        /// The element under the pointer.
        target: NodeId,
    },

    /// The pointer left an element.
    PointerLeave {
        /// The element the pointer left.
        target: NodeId,
    },

    /// The document scrolled.
    ///
    /// Forwarded unthrottled; `y` is the current vertical scroll offset in
    /// pixels.
    Scroll {
        /// Vertical scroll offset.
        y: i32,
    },

    /// A watched element crossed the host's intersection margin.
    ///
    /// `entering` is `true` when the element entered the viewport region and
    /// `false` when it left it.
    Intersection {
        /// The watched element.
        target: NodeId,
        /// Whether the element entered (vs. left) the viewport region.
        entering: bool,
    },

    /// The viewport was resized.
    Resize {
        /// New viewport size.
        viewport: Viewport,
    },
}

impl PageEvent {
    /// Convenience constructor for an unmodified click.
    #[must_use]
    pub const fn click(target: NodeId) -> Self {
        Self::Click {
            target,
            modifiers: Modifiers::NONE,
        }
    }
}

bitflags! {
    /// Modifier keys that can be held during a click.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}
