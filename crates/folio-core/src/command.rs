#![forbid(unsafe_code)]

//! DOM command vocabulary.
//!
//! Every behavior component produces [`DomCommand`] values instead of
//! touching a document directly. The host applies each command to the real
//! DOM (or to a test double). Commands are plain data: applying the same
//! batch twice must yield the same DOM state.

use crate::event::NodeId;

/// A single host-applied DOM mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomCommand {
    /// Add a class to an element's class list.
    AddClass {
        /// Target element.
        target: NodeId,
        /// Class name to add.
        class: String,
    },

    /// Remove a class from an element's class list.
    RemoveClass {
        /// Target element.
        target: NodeId,
        /// Class name to remove.
        class: String,
    },

    /// Replace an element's text content.
    SetText {
        /// Target element.
        target: NodeId,
        /// New text content.
        text: String,
    },

    /// Set an inline style property on an element.
    ///
    /// An empty `value` clears the inline property.
    SetStyle {
        /// Target element.
        target: NodeId,
        /// CSS property name.
        property: String,
        /// CSS property value.
        value: String,
    },

    /// Set the document's vertical scroll offset.
    ScrollTo {
        /// Vertical offset in pixels.
        y: i32,
    },

    /// Write a value to the host's key-value storage.
    PersistPreference {
        /// Storage key.
        key: String,
        /// Stored value.
        value: String,
    },

    /// Stop watching an element for intersection notifications.
    Unobserve {
        /// The element to stop watching.
        target: NodeId,
    },

    /// Emit a diagnostic message on the host console.
    Log {
        /// Message text.
        message: String,
    },
}

impl DomCommand {
    /// Add a class to `target`.
    #[must_use]
    pub fn add_class(target: NodeId, class: impl Into<String>) -> Self {
        Self::AddClass {
            target,
            class: class.into(),
        }
    }

    /// Remove a class from `target`.
    #[must_use]
    pub fn remove_class(target: NodeId, class: impl Into<String>) -> Self {
        Self::RemoveClass {
            target,
            class: class.into(),
        }
    }

    /// Replace the text content of `target`.
    #[must_use]
    pub fn set_text(target: NodeId, text: impl Into<String>) -> Self {
        Self::SetText {
            target,
            text: text.into(),
        }
    }

    /// Set an inline style property on `target`.
    #[must_use]
    pub fn set_style(
        target: NodeId,
        property: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::SetStyle {
            target,
            property: property.into(),
            value: value.into(),
        }
    }
}
