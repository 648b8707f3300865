#![forbid(unsafe_code)]

//! Project-card pointer interaction.
//!
//! Purely cosmetic: entering a card raises it (hover class plus an inline
//! z-order bump so it floats over its neighbors), leaving restores it, and a
//! click emits one diagnostic console message. No state survives beyond the
//! currently hovered card.

use crate::command::DomCommand;
use crate::event::NodeId;

/// Configuration for card interaction.
#[derive(Debug, Clone)]
pub struct CardConfig {
    /// Class applied to a hovered card.
    pub hover_class: String,

    /// Inline z-index applied while hovered.
    pub raised_z_index: String,

    /// Whether clicks emit a diagnostic console message.
    pub log_clicks: bool,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            hover_class: "card-hover".to_owned(),
            raised_z_index: "10".to_owned(),
            log_clicks: true,
        }
    }
}

/// A registered project card.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Card {
    node: NodeId,
    title: Option<String>,
}

/// Pointer-interaction handler for project cards.
#[derive(Debug, Clone)]
pub struct CardInteraction {
    config: CardConfig,
    cards: Vec<Card>,
    hovered: Option<NodeId>,
}

impl CardInteraction {
    /// Create a handler with no cards registered.
    #[must_use]
    pub fn new(config: CardConfig) -> Self {
        Self {
            config,
            cards: Vec::new(),
            hovered: None,
        }
    }

    /// Register a card; `title` is the card's heading text, when it has one.
    pub fn register(&mut self, node: NodeId, title: Option<String>) {
        if self.cards.iter().all(|c| c.node != node) {
            self.cards.push(Card { node, title });
        }
    }

    /// The card currently under the pointer, if any.
    #[must_use]
    pub const fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    /// Handle the pointer entering an element.
    pub fn pointer_enter(&mut self, target: NodeId) -> Vec<DomCommand> {
        if !self.is_card(target) {
            return Vec::new();
        }
        self.hovered = Some(target);
        vec![
            DomCommand::add_class(target, self.config.hover_class.clone()),
            DomCommand::set_style(target, "z-index", self.config.raised_z_index.clone()),
        ]
    }

    /// Handle the pointer leaving an element.
    pub fn pointer_leave(&mut self, target: NodeId) -> Vec<DomCommand> {
        if !self.is_card(target) {
            return Vec::new();
        }
        if self.hovered == Some(target) {
            self.hovered = None;
        }
        vec![
            DomCommand::remove_class(target, self.config.hover_class.clone()),
            // Empty value clears the inline property.
            DomCommand::set_style(target, "z-index", ""),
        ]
    }

    /// Handle a click on an element.
    pub fn click(&self, target: NodeId) -> Vec<DomCommand> {
        if !self.config.log_clicks {
            return Vec::new();
        }
        let Some(card) = self.cards.iter().find(|c| c.node == target) else {
            return Vec::new();
        };
        let message = match &card.title {
            Some(title) => format!("card clicked: {title}"),
            None => format!("card clicked: {}", card.node),
        };
        vec![DomCommand::Log { message }]
    }

    fn is_card(&self, target: NodeId) -> bool {
        self.cards.iter().any(|c| c.node == target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CARD: NodeId = NodeId(20);

    fn cards() -> CardInteraction {
        let mut cards = CardInteraction::new(CardConfig::default());
        cards.register(CARD, Some("Crate Registry".to_owned()));
        cards.register(NodeId(21), None);
        cards
    }

    #[test]
    fn enter_raises_the_card() {
        let mut cards = cards();
        assert_eq!(
            cards.pointer_enter(CARD),
            vec![
                DomCommand::add_class(CARD, "card-hover"),
                DomCommand::set_style(CARD, "z-index", "10"),
            ]
        );
        assert_eq!(cards.hovered(), Some(CARD));
    }

    #[test]
    fn leave_restores_the_card() {
        let mut cards = cards();
        cards.pointer_enter(CARD);
        assert_eq!(
            cards.pointer_leave(CARD),
            vec![
                DomCommand::remove_class(CARD, "card-hover"),
                DomCommand::set_style(CARD, "z-index", ""),
            ]
        );
        assert_eq!(cards.hovered(), None);
    }

    #[test]
    fn click_logs_the_title() {
        let cards = cards();
        assert_eq!(
            cards.click(CARD),
            vec![DomCommand::Log {
                message: "card clicked: Crate Registry".to_owned(),
            }]
        );
    }

    #[test]
    fn click_falls_back_to_the_handle() {
        let cards = cards();
        assert_eq!(
            cards.click(NodeId(21)),
            vec![DomCommand::Log {
                message: "card clicked: #21".to_owned(),
            }]
        );
    }

    #[test]
    fn click_logging_can_be_disabled() {
        let mut cards = CardInteraction::new(CardConfig {
            log_clicks: false,
            ..CardConfig::default()
        });
        cards.register(CARD, None);
        assert_eq!(cards.click(CARD), Vec::new());
    }

    #[test]
    fn non_card_elements_are_ignored() {
        let mut cards = cards();
        assert_eq!(cards.pointer_enter(NodeId(99)), Vec::new());
        assert_eq!(cards.pointer_leave(NodeId(99)), Vec::new());
        assert_eq!(cards.click(NodeId(99)), Vec::new());
    }
}
