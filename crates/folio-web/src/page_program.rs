#![forbid(unsafe_code)]

//! Host-driven page program.
//!
//! [`PageProgram`] wires the five behavior components over one event queue,
//! one clock, and one command sink. The host controls the loop:
//!
//! 1. Push events via [`PageProgram::push_event`].
//! 2. Advance time via [`PageProgram::advance_time`].
//! 3. Call [`PageProgram::step`] to process the pending batch.
//! 4. Apply the commands from [`PageProgram::take_outputs`] to the DOM.
//!
//! # Example
//!
//! ```
//! use folio_core::event::{NodeId, PageEvent};
//! use folio_core::geometry::Viewport;
//! use folio_web::page_program::{NavLink, PageConfig, PageDom, PageProgram};
//!
//! let dom = PageDom {
//!     body: NodeId(0),
//!     theme_toggle: Some(NodeId(1)),
//!     theme_indicator: None,
//!     nav_links: vec![NavLink { link: NodeId(2), target: None }],
//!     sections: Vec::new(),
//!     reveal_targets: Vec::new(),
//!     cards: Vec::new(),
//! };
//! let mut prog =
//!     PageProgram::new(&dom, PageConfig::default(), Viewport::new(1280, 720)).unwrap();
//! prog.init(None);
//!
//! prog.push_event(PageEvent::click(NodeId(1)));
//! let result = prog.step();
//! assert!(result.presented);
//! ```

use core::time::Duration;
use std::collections::HashMap;

use folio_core::card::CardInteraction;
use folio_core::command::DomCommand;
use folio_core::event::{NodeId, PageEvent};
use folio_core::geometry::Viewport;
use folio_core::nav::{ActiveNav, Section};
use folio_core::reveal::RevealObserver;
use folio_core::scroll::SmoothScroll;
use folio_core::theme::{ThemeController, ThemeMode};
use tracing::debug;

use crate::{CommandSink, DeterministicClock, PageEventSource, PageOutputs};

/// Page initialization error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    /// A required element is missing from the DOM contract.
    MissingElement(&'static str),
}

impl core::fmt::Display for PageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingElement(what) => write!(f, "missing required element: {what}"),
        }
    }
}

impl std::error::Error for PageError {}

/// A navigation link and the section element it points at.
///
/// `target` is `None` when the link's fragment matches no section in the
/// document; clicking such a link does nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavLink {
    /// The link element.
    pub link: NodeId,
    /// The section element the link points at, when it resolves.
    pub target: Option<NodeId>,
}

/// A section element with its top offset in document pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionBinding {
    /// The section element.
    pub node: NodeId,
    /// Top offset in document pixels.
    pub top: i32,
}

/// A project card and its optional heading text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardBinding {
    /// The card element.
    pub node: NodeId,
    /// Heading text, when the card has a title element.
    pub title: Option<String>,
}

/// The DOM contract the host binds at startup.
///
/// Required: the theme toggle and at least one nav link. Everything else is
/// optional and its absence silently disables the matching behavior.
#[derive(Debug, Clone)]
pub struct PageDom {
    /// The body element (carries the dark-mode class).
    pub body: NodeId,
    /// The theme toggle control. Required.
    pub theme_toggle: Option<NodeId>,
    /// The element showing the toggle's indicator glyph.
    pub theme_indicator: Option<NodeId>,
    /// Navigation links in document order. At least one required.
    pub nav_links: Vec<NavLink>,
    /// Sections in document order (ascending tops).
    pub sections: Vec<SectionBinding>,
    /// Elements that reveal on first viewport entry.
    pub reveal_targets: Vec<NodeId>,
    /// Project cards.
    pub cards: Vec<CardBinding>,
}

/// Configuration for the whole page, one sub-config per component.
#[derive(Debug, Clone, Default)]
pub struct PageConfig {
    /// Theme switching.
    pub theme: folio_core::theme::ThemeConfig,
    /// Active-link tracking.
    pub nav: folio_core::nav::NavConfig,
    /// Reveal-on-scroll.
    pub reveal: folio_core::reveal::RevealConfig,
    /// Smooth navigation.
    pub scroll: folio_core::scroll::ScrollConfig,
    /// Card interaction.
    pub card: folio_core::card::CardConfig,
}

/// Result of a single [`PageProgram::step`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    /// Number of events processed during this step.
    pub events_processed: u32,
    /// Number of commands emitted during this step.
    pub commands_emitted: u32,
    /// Whether a batch was presented (empty batches are not).
    pub presented: bool,
    /// Whether a scroll animation is still in flight after this step.
    pub animating: bool,
}

/// Host-driven, non-blocking page runner.
///
/// Owns the five behavior components plus the backend pieces. No threads,
/// no blocking, and no `std::time::Instant`: events and time both come from
/// the host.
///
/// # Lifecycle
///
/// 1. [`PageProgram::new`] — validate the DOM contract and wire components.
/// 2. [`PageProgram::init`] — call once with the stored theme preference.
/// 3. [`PageProgram::step`] — call repeatedly from the host event loop
///    (e.g. `requestAnimationFrame`).
/// 4. Read commands after each step via [`PageProgram::take_outputs`].
#[derive(Debug)]
pub struct PageProgram {
    theme: ThemeController,
    nav: ActiveNav,
    reveal: RevealObserver,
    scroll: SmoothScroll,
    cards: CardInteraction,
    clock: DeterministicClock,
    events: PageEventSource,
    sink: CommandSink,
    toggle: NodeId,
    /// Nav link → resolved section top (None: link has no matching section).
    nav_targets: HashMap<NodeId, Option<i32>>,
    initialized: bool,
    last_step: Duration,
}

impl PageProgram {
    /// Validate the DOM contract and wire the components.
    ///
    /// # Errors
    ///
    /// [`PageError::MissingElement`] when the theme toggle is absent or
    /// there are no nav links.
    pub fn new(dom: &PageDom, config: PageConfig, viewport: Viewport) -> Result<Self, PageError> {
        let toggle = dom
            .theme_toggle
            .ok_or(PageError::MissingElement("theme toggle"))?;
        if dom.nav_links.is_empty() {
            return Err(PageError::MissingElement("nav links"));
        }

        let tops: HashMap<NodeId, i32> =
            dom.sections.iter().map(|s| (s.node, s.top)).collect();
        let nav_targets: HashMap<NodeId, Option<i32>> = dom
            .nav_links
            .iter()
            .map(|l| (l.link, l.target.and_then(|sec| tops.get(&sec).copied())))
            .collect();

        // Join sections (document order) with the first link pointing at each.
        let mut link_for: HashMap<NodeId, NodeId> = HashMap::new();
        for l in &dom.nav_links {
            if let Some(sec) = l.target {
                link_for.entry(sec).or_insert(l.link);
            }
        }
        let sections: Vec<Section> = dom
            .sections
            .iter()
            .filter_map(|s| {
                link_for
                    .get(&s.node)
                    .map(|&link| Section { link, top: s.top })
            })
            .collect();

        let theme = ThemeController::new(config.theme, dom.body, dom.theme_indicator);
        let mut reveal = RevealObserver::new(config.reveal);
        for &target in &dom.reveal_targets {
            reveal.observe(target);
        }
        let mut cards = CardInteraction::new(config.card);
        for card in &dom.cards {
            cards.register(card.node, card.title.clone());
        }

        Ok(Self {
            theme,
            nav: ActiveNav::new(config.nav, sections),
            reveal,
            scroll: SmoothScroll::new(config.scroll),
            cards,
            clock: DeterministicClock::new(),
            events: PageEventSource::new(viewport),
            sink: CommandSink::new(),
            toggle,
            nav_targets,
            initialized: false,
            last_step: Duration::ZERO,
        })
    }

    /// Initialize the page and present the first batch.
    ///
    /// Applies the stored theme preference (or the default), hides every
    /// reveal target, and computes the initial active link. Must be called
    /// exactly once before [`step`](Self::step).
    pub fn init(&mut self, stored_preference: Option<&str>) {
        assert!(!self.initialized, "PageProgram::init() called twice");
        self.initialized = true;

        let mut batch = self.theme.load(stored_preference);
        batch.extend(self.reveal.init());
        batch.extend(self.nav.on_scroll(self.scroll.current_y()));
        debug!(commands = batch.len(), "page initialized");
        self.sink.present(batch);
    }

    /// Push a page event into the event queue.
    ///
    /// Events are processed on the next [`step`](Self::step) call. Resize
    /// events update the tracked viewport immediately.
    pub fn push_event(&mut self, event: PageEvent) {
        if let PageEvent::Resize { viewport } = &event {
            self.events.set_viewport(*viewport);
        }
        self.events.push_event(event);
    }

    /// Advance the deterministic clock by `dt`.
    pub fn advance_time(&mut self, dt: Duration) {
        self.clock.advance(dt);
    }

    /// Set the deterministic clock to an absolute time.
    pub fn set_time(&mut self, now: Duration) {
        self.clock.set(now);
    }

    /// Process pending events, tick the scroll animation, and present.
    ///
    /// All handlers run to completion synchronously; one batch is presented
    /// when any of them produced commands.
    pub fn step(&mut self) -> StepResult {
        assert!(self.initialized, "PageProgram::step() called before init()");

        let mut batch = Vec::new();
        let mut events_processed: u32 = 0;
        while let Some(event) = self.events.read_event() {
            events_processed += 1;
            self.handle_event(event, &mut batch);
        }

        // Advance the in-flight scroll animation by elapsed host time.
        let now = self.clock.now();
        let dt = now.saturating_sub(self.last_step);
        self.last_step = now;
        if self.scroll.is_animating()
            && let Some(cmd) = self.scroll.tick(dt)
        {
            batch.push(cmd);
        }

        let commands_emitted = batch.len() as u32;
        let presented = !batch.is_empty();
        if presented {
            self.sink.present(batch);
        }

        StepResult {
            events_processed,
            commands_emitted,
            presented,
            animating: self.scroll.is_animating(),
        }
    }

    /// Take the captured command batches, leaving empty defaults.
    pub fn take_outputs(&mut self) -> PageOutputs {
        self.sink.take_outputs()
    }

    /// Read the captured outputs without consuming them.
    #[must_use]
    pub fn outputs(&self) -> &PageOutputs {
        self.sink.outputs()
    }

    /// Current monotonic time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Current viewport size.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.events.viewport()
    }

    /// The currently applied theme mode.
    #[must_use]
    pub fn theme_mode(&self) -> ThemeMode {
        self.theme.mode()
    }

    /// The currently active nav link, if any.
    #[must_use]
    pub fn active_link(&self) -> Option<NodeId> {
        self.nav.active()
    }

    /// The last known scroll offset.
    #[must_use]
    pub fn scroll_y(&self) -> i32 {
        self.scroll.current_y()
    }

    /// Whether a scroll animation is in flight.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.scroll.is_animating()
    }

    /// Whether the program has been initialized.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    // --- Private helpers ---

    fn handle_event(&mut self, event: PageEvent, batch: &mut Vec<DomCommand>) {
        match event {
            PageEvent::Click { target, .. } => {
                if target == self.toggle {
                    batch.extend(self.theme.toggle());
                } else if let Some(&top) = self.nav_targets.get(&target) {
                    self.scroll.navigate(top);
                } else {
                    batch.extend(self.cards.click(target));
                }
            }
            PageEvent::PointerEnter { target } => {
                batch.extend(self.cards.pointer_enter(target));
            }
            PageEvent::PointerLeave { target } => {
                batch.extend(self.cards.pointer_leave(target));
            }
            PageEvent::Scroll { y } => {
                self.scroll.set_scroll(y);
                batch.extend(self.nav.on_scroll(y));
            }
            PageEvent::Intersection { target, entering } => {
                batch.extend(self.reveal.intersection(target, entering));
            }
            PageEvent::Resize { viewport } => {
                self.events.set_viewport(viewport);
            }
        }
    }
}
