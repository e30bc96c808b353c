//! Scrollable content hosted inside the sheet
//!
//! The viewport is the full `true_sheet_height`; only the part above the
//! bottom of the screen is visible, so the content gets a bottom inset equal
//! to the hidden height. Scroll physics follow the framework's scroll widget:
//! rubber-band resistance past either edge, momentum deceleration, and a
//! spring bounce back to bounds.
//!
//! Content offsets are positive when scrolled down. A negative offset means
//! the content is pulled past its top; the container is told about that
//! through [`RubberBandEvent`]s so the whole sheet can follow it.

use smallvec::SmallVec;
use tide_animation::{DeferredQueue, DeferredSlot, Spring, SpringConfig};
use tide_core::event_types::{SCROLL, SCROLL_END};
use tide_core::{EventType, StateTransitions};

use crate::config::ContentScrollConfig;

/// Longest physics step for the bounce spring
const MAX_STEP: f32 = 1.0 / 120.0;

/// Caller-supplied sheet content
pub trait SheetContent: Send {
    /// Total height of the content laid out at `width`
    fn content_height(&self, width: f32) -> f32;
}

/// Content with a fixed height
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedContent(pub f32);

impl SheetContent for FixedContent {
    fn content_height(&self, _width: f32) -> f32 {
        self.0
    }
}

/// Content scroll events, continuing after `tide_core`'s SCROLL / SCROLL_END
pub mod content_events {
    use tide_core::EventType;

    /// Momentum carried the content past an edge
    pub const HIT_EDGE: EventType = 32;
    /// Motion (momentum or bounce) came to rest
    pub const SETTLED: EventType = 33;
}

use content_events::*;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ContentScrollState {
    #[default]
    Idle,
    /// Following finger deltas
    Dragging,
    /// Momentum after release
    Decelerating,
    /// Spring returning to bounds
    Bouncing,
}

impl StateTransitions for ContentScrollState {
    fn on_event(&self, event: EventType) -> Option<Self> {
        use ContentScrollState::*;

        match (self, event) {
            (Idle | Decelerating | Bouncing, SCROLL) => Some(Dragging),
            (Dragging, SCROLL_END) => Some(Decelerating),
            (Dragging | Decelerating, HIT_EDGE) => Some(Bouncing),
            (Dragging | Decelerating | Bouncing, SETTLED) => Some(Idle),
            _ => None,
        }
    }
}

/// Top overscroll lifecycle reported to the owner
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RubberBandEvent {
    /// Content went past its top
    Started,
    /// Current overscroll past the top (positive, in points)
    Offset(f32),
    /// Motion past the top ended
    Finished,
}

pub type RubberBandEvents = SmallVec<[RubberBandEvent; 2]>;

enum ContentTask {
    ScrollToTop,
}

/// Headless scroll viewport for [`SheetContent`]
pub struct SheetContentContainer {
    content: Box<dyn SheetContent>,
    config: ContentScrollConfig,
    width: f32,
    true_sheet_height: f32,
    content_height: f32,
    available_height: f32,
    bottom_inset: f32,
    top_tolerance: f32,

    offset_y: f32,
    velocity_y: f32,
    state: ContentScrollState,
    bounce: Option<Spring>,
    scroll_enabled: bool,
    rubber_banding: bool,

    tasks: DeferredQueue<ContentTask>,
    scroll_to_top: DeferredSlot,
    did_initial_scroll: bool,
}

impl SheetContentContainer {
    pub fn new(
        content: Box<dyn SheetContent>,
        width: f32,
        true_sheet_height: f32,
        config: ContentScrollConfig,
        top_tolerance: f32,
    ) -> Self {
        let content_height = content.content_height(width);
        Self {
            content,
            config,
            width,
            true_sheet_height,
            content_height,
            available_height: 0.0,
            bottom_inset: 0.0,
            top_tolerance,
            offset_y: 0.0,
            velocity_y: 0.0,
            state: ContentScrollState::Idle,
            bounce: None,
            scroll_enabled: true,
            rubber_banding: false,
            tasks: DeferredQueue::new(),
            scroll_to_top: DeferredSlot::new(),
            did_initial_scroll: false,
        }
    }

    /// Re-query the content height (after the caller's content changed)
    pub fn reload_content(&mut self) {
        self.content_height = self.content.content_height(self.width);
        if self.state == ContentScrollState::Idle {
            self.offset_y = self.offset_y.clamp(0.0, self.max_offset_y());
        }
    }

    /// Resize the visible region to `height`, updating the bottom inset
    pub fn set_available_height(&mut self, height: f32) {
        self.available_height = height.max(0.0);
        self.bottom_inset = (self.true_sheet_height - height).max(0.0);

        if self.bottom_inset > 0.0 && !self.did_initial_scroll {
            self.scroll_to_top
                .schedule(&mut self.tasks, ContentTask::ScrollToTop);
        }
    }

    /// Run work deferred to the end of the current turn
    pub fn run_deferred(&mut self) {
        for task in self.tasks.drain() {
            match task {
                ContentTask::ScrollToTop => {
                    tracing::trace!("content corrective scroll to top");
                    self.did_initial_scroll = true;
                    self.offset_y = 0.0;
                    self.velocity_y = 0.0;
                    self.bounce = None;
                    self.state = ContentScrollState::Idle;
                }
            }
        }
    }

    pub fn has_pending_work(&self) -> bool {
        !self.tasks.is_empty()
    }

    pub fn bottom_inset(&self) -> f32 {
        self.bottom_inset
    }

    pub fn available_height(&self) -> f32 {
        self.available_height
    }

    pub fn content_height(&self) -> f32 {
        self.content_height
    }

    pub fn offset_y(&self) -> f32 {
        self.offset_y
    }

    pub fn state(&self) -> ContentScrollState {
        self.state
    }

    pub fn is_scrolled_to_top(&self) -> bool {
        self.offset_y <= self.top_tolerance
    }

    pub fn is_rubber_banding(&self) -> bool {
        self.rubber_banding
    }

    /// Largest scroll offset with the inset applied
    pub fn max_offset_y(&self) -> f32 {
        (self.content_height + self.bottom_inset - self.true_sheet_height).max(0.0)
    }

    /// Vertical translation that keeps overscrolled content flush with the top
    pub fn content_translation_y(&self) -> f32 {
        if self.rubber_banding {
            self.offset_y.min(0.0)
        } else {
            0.0
        }
    }

    pub fn is_scroll_enabled(&self) -> bool {
        self.scroll_enabled
    }

    pub fn set_scroll_enabled(&mut self, enabled: bool) {
        self.scroll_enabled = enabled;
    }

    fn overscroll(&self) -> f32 {
        if self.offset_y < 0.0 {
            self.offset_y
        } else if self.offset_y > self.max_offset_y() {
            self.offset_y - self.max_offset_y()
        } else {
            0.0
        }
    }

    fn max_overscroll(&self) -> f32 {
        self.available_height * self.config.max_overscroll
    }

    /// A finger touched the content
    pub fn begin_drag(&mut self) {
        if !self.scroll_enabled {
            return;
        }
        self.state.transition(SCROLL);
        self.bounce = None;
        self.velocity_y = 0.0;
    }

    /// Scroll by a finger delta (positive scrolls the content down)
    pub fn scroll_by(&mut self, dy: f32) -> RubberBandEvents {
        if !self.scroll_enabled {
            return RubberBandEvents::new();
        }
        if self.state != ContentScrollState::Dragging {
            self.begin_drag();
        }

        let overscroll = self.overscroll();
        let pushing_further = (overscroll > 0.0 && dy > 0.0) || (overscroll < 0.0 && dy < 0.0);
        let max_over = self.max_overscroll();

        if pushing_further && max_over > 0.0 {
            let stretch_ratio = (overscroll.abs() / max_over).min(1.0);
            let resistance = self.config.resistance_start
                - stretch_ratio * (self.config.resistance_start - self.config.resistance_end);
            self.offset_y += dy * resistance;
        } else {
            self.offset_y += dy;
        }
        self.offset_y = self
            .offset_y
            .clamp(-max_over, self.max_offset_y() + max_over);

        tracing::trace!(
            "content scroll dy={:.1} offset={:.1} max={:.1}",
            dy,
            self.offset_y,
            self.max_offset_y()
        );
        self.rubber_band_events()
    }

    /// The finger lifted with `velocity` (points/second, positive scrolls down)
    pub fn end_drag(&mut self, velocity: f32) -> RubberBandEvents {
        if self.state != ContentScrollState::Dragging {
            return RubberBandEvents::new();
        }

        self.velocity_y = if velocity.is_finite() { velocity } else { 0.0 };
        if self.overscroll() != 0.0 {
            self.start_bounce();
        } else if self.velocity_y.abs() > self.config.velocity_threshold {
            self.state.transition(SCROLL_END);
        } else {
            self.velocity_y = 0.0;
            self.state.transition(SETTLED);
        }
        self.rubber_band_events()
    }

    fn start_bounce(&mut self) {
        let edge = self.offset_y.clamp(0.0, self.max_offset_y());
        let config = SpringConfig::new(
            self.config.bounce_stiffness,
            self.config.bounce_damping,
            1.0,
        );
        let mut spring = Spring::new(config, self.offset_y).with_velocity(self.velocity_y);
        spring.set_target(edge);
        self.bounce = Some(spring);
        self.velocity_y = 0.0;
        self.state.transition(HIT_EDGE);
    }

    /// Advance momentum and bounce by `dt` seconds
    pub fn tick(&mut self, dt: f32) -> RubberBandEvents {
        match self.state {
            ContentScrollState::Idle | ContentScrollState::Dragging => {}

            ContentScrollState::Decelerating => {
                let next = self.offset_y + self.velocity_y * dt;
                let decel = self.config.deceleration * dt;
                if self.velocity_y > 0.0 {
                    self.velocity_y = (self.velocity_y - decel).max(0.0);
                } else {
                    self.velocity_y = (self.velocity_y + decel).min(0.0);
                }
                self.offset_y = next;

                if next < 0.0 || next > self.max_offset_y() {
                    self.start_bounce();
                } else if self.velocity_y.abs() < self.config.velocity_threshold {
                    self.velocity_y = 0.0;
                    self.state.transition(SETTLED);
                }
            }

            ContentScrollState::Bouncing => match self.bounce.as_mut() {
                Some(spring) => {
                    spring.step_substepped(dt, MAX_STEP);
                    if spring.is_settled() {
                        self.offset_y = spring.target();
                        self.bounce = None;
                        self.state.transition(SETTLED);
                    } else {
                        self.offset_y = spring.value();
                    }
                }
                None => {
                    self.offset_y = self.offset_y.clamp(0.0, self.max_offset_y());
                    self.state.transition(SETTLED);
                }
            },
        }

        self.rubber_band_events()
    }

    pub fn is_animating(&self) -> bool {
        matches!(
            self.state,
            ContentScrollState::Decelerating | ContentScrollState::Bouncing
        )
    }

    fn rubber_band_events(&mut self) -> RubberBandEvents {
        let mut events = RubberBandEvents::new();
        if self.offset_y < 0.0 {
            if !self.rubber_banding {
                self.rubber_banding = true;
                events.push(RubberBandEvent::Started);
            }
            events.push(RubberBandEvent::Offset(-self.offset_y));
        } else if self.rubber_banding {
            if self.state == ContentScrollState::Idle {
                self.rubber_banding = false;
                events.push(RubberBandEvent::Offset(0.0));
                events.push(RubberBandEvent::Finished);
            } else {
                events.push(RubberBandEvent::Offset(0.0));
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRUE_HEIGHT: f32 = 1300.0;

    fn container(content_height: f32) -> SheetContentContainer {
        let mut content = SheetContentContainer::new(
            Box::new(FixedContent(content_height)),
            390.0,
            TRUE_HEIGHT,
            ContentScrollConfig::default(),
            3.0,
        );
        content.set_available_height(540.0);
        content.run_deferred();
        content
    }

    #[test]
    fn test_inset_tracks_available_height() {
        let mut content = container(2000.0);
        assert_eq!(content.bottom_inset(), 760.0);
        assert_eq!(content.max_offset_y(), 1460.0);

        content.set_available_height(TRUE_HEIGHT + 50.0);
        assert_eq!(content.bottom_inset(), 0.0);
    }

    #[test]
    fn test_corrective_scroll_coalesces() {
        let mut content = SheetContentContainer::new(
            Box::new(FixedContent(2000.0)),
            390.0,
            TRUE_HEIGHT,
            ContentScrollConfig::default(),
            3.0,
        );
        // Zero inset schedules nothing
        content.set_available_height(TRUE_HEIGHT);
        assert!(!content.has_pending_work());

        content.set_available_height(400.0);
        content.set_available_height(500.0);
        content.set_available_height(540.0);
        assert_eq!(content.tasks.len(), 1);
        content.run_deferred();
        assert!(!content.has_pending_work());

        // Only the first non-zero inset triggers the correction
        content.set_available_height(600.0);
        assert!(!content.has_pending_work());
    }

    #[test]
    fn test_scrolled_to_top_tolerance() {
        let mut content = container(2000.0);
        content.scroll_by(2.5);
        assert!(content.is_scrolled_to_top());
        content.scroll_by(1.0);
        assert!(!content.is_scrolled_to_top());
    }

    #[test]
    fn test_disabled_scroll_ignores_input() {
        let mut content = container(2000.0);
        content.set_scroll_enabled(false);
        assert!(content.scroll_by(50.0).is_empty());
        assert_eq!(content.offset_y(), 0.0);
    }

    #[test]
    fn test_overscroll_is_resisted() {
        let mut content = container(2000.0);
        content.scroll_by(-10.0);
        assert_eq!(content.offset_y(), -10.0);

        // Further deltas past the top move at most 55% of their size
        let before = content.offset_y();
        content.scroll_by(-10.0);
        let moved = before - content.offset_y();
        assert!(moved > 1.0 && moved < 5.5 + 1e-4);

        for _ in 0..100 {
            content.scroll_by(-50.0);
        }
        let max_over = 540.0 * 0.3;
        assert!(content.offset_y() >= -max_over - 1e-3);
    }

    #[test]
    fn test_rubber_band_lifecycle() {
        let mut content = container(2000.0);
        let events = content.scroll_by(-20.0);
        assert_eq!(events[0], RubberBandEvent::Started);
        assert!(matches!(events[1], RubberBandEvent::Offset(amount) if amount > 0.0));
        assert!(content.content_translation_y() < 0.0);

        content.end_drag(0.0);
        assert_eq!(content.state(), ContentScrollState::Bouncing);

        let mut finished = false;
        for _ in 0..600 {
            let events = content.tick(1.0 / 60.0);
            if events.contains(&RubberBandEvent::Finished) {
                finished = true;
                break;
            }
        }
        assert!(finished);
        assert_eq!(content.state(), ContentScrollState::Idle);
        assert_eq!(content.offset_y(), 0.0);
        assert_eq!(content.content_translation_y(), 0.0);
    }

    #[test]
    fn test_momentum_decelerates_to_rest() {
        let mut content = container(5000.0);
        content.scroll_by(100.0);
        content.end_drag(600.0);
        assert_eq!(content.state(), ContentScrollState::Decelerating);

        for _ in 0..600 {
            content.tick(1.0 / 60.0);
            if content.state() == ContentScrollState::Idle {
                break;
            }
        }
        assert_eq!(content.state(), ContentScrollState::Idle);
        assert!(content.offset_y() > 100.0);
    }
}
