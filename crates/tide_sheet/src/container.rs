//! Sheet container: gesture arbitration, detent resolution, and snap animations
//!
//! The container owns the sheet offset and is the only thing that moves it.
//! While a finger is down the offset follows the pan translation; after
//! release a single [`PropertyAnimator`] drives it to the resolved detent.
//! Every offset change flows through one update step so the content inset,
//! dimming, status bar, and host progress all read the same sample.
//!
//! # Example
//!
//! ```rust
//! use tide_core::{EdgeInsets, PanSample, Size, Vec2};
//! use tide_sheet::prelude::*;
//!
//! let config = SheetConfig::default();
//! let layout = SheetLayout::new(
//!     Size::new(390.0, 844.0),
//!     EdgeInsets::vertical(47.0, 34.0),
//!     SheetMetrics::default(),
//!     config.detents.clone(),
//!     config.dimming.clone(),
//! );
//! let mut sheet = SheetContainer::new(
//!     layout,
//!     config,
//!     AllowedDetents::all(),
//!     false,
//!     Box::new(FixedContent(1200.0)),
//! );
//!
//! sheet.present(SheetDetent::Middle);
//! while sheet.tick(1.0 / 60.0) == SheetTick::Animating {}
//! assert_eq!(sheet.detent(), SheetDetent::Middle);
//!
//! sheet.handle_pan(PanSample::began());
//! sheet.handle_pan(PanSample::changed(Vec2::new(0.0, -40.0), Vec2::ZERO));
//! sheet.handle_pan(PanSample::ended(Vec2::new(0.0, -40.0), Vec2::new(0.0, -2500.0)));
//! assert!(sheet.is_animating());
//! ```

use std::sync::{Arc, Mutex, PoisonError, Weak};

use tide_animation::{
    relative_velocity, AnimatorStatus, PropertyAnimator, SpringTimingParameters, Transition,
};
use tide_core::event_types::{PAN_BEGAN, PAN_ENDED};
use tide_core::{GesturePhase, PanSample, Rect, RoundedRect, StateTransitions, Vec2};

use crate::config::SheetConfig;
use crate::content::{RubberBandEvent, RubberBandEvents, SheetContent, SheetContentContainer};
use crate::detent::{AllowedDetents, DetentList, SheetDetent};
use crate::gesture::sheet_events::{DISMISS, SETTLED, SNAP};
use crate::gesture::SheetGestureState;
use crate::layout::SheetLayout;

/// Finger travel (points) damped at a time when dragging above maximum
const RESISTANCE_STEP: f32 = 10.0;

/// Receives presentation updates from a [`SheetContainer`]
///
/// The container only holds a weak reference; the host keeps the delegate
/// alive for as long as it wants callbacks.
pub trait SheetContainerDelegate {
    /// Maximum-detent progress changed (0 at or below middle, 1 at maximum)
    fn sheet_did_update_progress(&mut self, progress: f32);

    fn sheet_will_snap(&mut self, _detent: SheetDetent) {}

    fn sheet_did_snap(&mut self, _detent: SheetDetent) {}

    fn sheet_will_dismiss(&mut self) {}
}

/// Shared handle a host passes to [`SheetContainer::set_delegate`]
pub type SharedDelegate = Arc<Mutex<dyn SheetContainerDelegate + Send>>;

type WeakDelegate = Weak<Mutex<dyn SheetContainerDelegate + Send>>;

/// Status bar appearance requested by the sheet
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusBarStyle {
    Default,
    LightContent,
}

/// Outcome of one [`SheetContainer::tick`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SheetTick {
    /// Nothing is moving
    Idle,
    /// Something is still animating; keep ticking
    Animating,
    /// A snap animation reached its detent on this tick
    Snapped(SheetDetent),
    /// The dismissal animation finished on this tick (reported once)
    Dismissed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AnimationKind {
    Snap(SheetDetent),
    Dismiss,
}

struct ActiveAnimation {
    kind: AnimationKind,
    animator: PropertyAnimator,
    offset: Transition<f32>,
    dimming: Transition<f32>,
}

#[derive(Clone, Copy, Debug, Default)]
struct DragTracking {
    last_translation: Vec2,
    /// The last delta of this drag went to the content
    content_owned: bool,
}

/// Replace infinite and NaN components with a signed fallback magnitude
pub fn sanitize_velocity(velocity: Vec2, fallback: f32) -> Vec2 {
    let clamp = |component: f32| {
        if component.is_finite() {
            component
        } else {
            fallback.copysign(component)
        }
    };
    Vec2::new(clamp(velocity.x), clamp(velocity.y))
}

/// Interactive bottom sheet state for one presentation
pub struct SheetContainer {
    layout: SheetLayout,
    config: SheetConfig,
    allowed: AllowedDetents,
    dismiss_when_flung_down: bool,

    offset: f32,
    rubber_band_offset: f32,
    detent: SheetDetent,
    state: SheetGestureState,
    content: SheetContentContainer,
    animation: Option<ActiveAnimation>,

    /// Set once a downward fling starts dismissal; nothing interacts afterwards
    snapping_cancelled: bool,
    fling_velocity: Option<Vec2>,

    dimming_alpha: f32,
    status_bar: Option<StatusBarStyle>,
    progress: f32,
    drag: DragTracking,
    delegate: Option<WeakDelegate>,
}

impl SheetContainer {
    pub fn new(
        layout: SheetLayout,
        config: SheetConfig,
        allowed: AllowedDetents,
        dismiss_when_flung_down: bool,
        content: Box<dyn SheetContent>,
    ) -> Self {
        let content = SheetContentContainer::new(
            content,
            layout.screen().width,
            layout.true_sheet_height(),
            config.scroll.clone(),
            config.scrolled_to_top_tolerance,
        );
        let offset = layout.off_screen_offset();

        let mut container = Self {
            layout,
            config,
            allowed,
            dismiss_when_flung_down,
            offset,
            rubber_band_offset: 0.0,
            detent: SheetDetent::default(),
            state: SheetGestureState::Idle,
            content,
            animation: None,
            snapping_cancelled: false,
            fling_velocity: None,
            dimming_alpha: 0.0,
            status_bar: None,
            progress: 0.0,
            drag: DragTracking::default(),
            delegate: None,
        };
        container
            .content
            .set_available_height(container.layout.visible_height(offset));
        container
    }

    pub fn set_delegate(&mut self, delegate: &SharedDelegate) {
        self.delegate = Some(Arc::downgrade(delegate));
    }

    pub fn clear_delegate(&mut self) {
        self.delegate = None;
    }

    fn notify(&self, f: impl FnOnce(&mut dyn SheetContainerDelegate)) {
        let Some(delegate) = self.delegate.as_ref().and_then(Weak::upgrade) else {
            return;
        };
        let mut guard = delegate.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *guard);
    }

    // ========================================================================
    // Read-back state
    // ========================================================================

    pub fn layout(&self) -> &SheetLayout {
        &self.layout
    }

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    pub fn allowed_detents(&self) -> &AllowedDetents {
        &self.allowed
    }

    pub fn dismiss_when_flung_down(&self) -> bool {
        self.dismiss_when_flung_down
    }

    /// Offset of the sheet's bottom edge below the screen bottom
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Offset including the dip that follows content rubber-banding at the top
    pub fn presented_offset(&self) -> f32 {
        self.layout.clamp_offset(self.offset + self.rubber_band_offset)
    }

    pub fn rubber_band_offset(&self) -> f32 {
        self.rubber_band_offset
    }

    /// Current detent, or the detent being snapped to
    pub fn detent(&self) -> SheetDetent {
        self.detent
    }

    pub fn state(&self) -> SheetGestureState {
        self.state
    }

    pub fn dimming_alpha(&self) -> f32 {
        self.dimming_alpha
    }

    /// Status bar override, `None` when the host's own style applies
    pub fn status_bar_override(&self) -> Option<StatusBarStyle> {
        self.status_bar
    }

    pub fn maximum_progress(&self) -> f32 {
        self.progress
    }

    pub fn is_snapping_cancelled(&self) -> bool {
        self.snapping_cancelled
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some() || self.content.is_animating()
    }

    pub fn is_dismissed(&self) -> bool {
        self.state == SheetGestureState::Dismissed
    }

    pub fn content(&self) -> &SheetContentContainer {
        &self.content
    }

    /// Re-query the hosted content's height
    pub fn reload_content(&mut self) {
        self.content.reload_content();
    }

    pub fn sheet_frame(&self) -> Rect {
        self.layout.sheet_frame(self.presented_offset())
    }

    pub fn visible_sheet_shape(&self) -> Option<RoundedRect> {
        self.layout.visible_sheet_shape(self.presented_offset())
    }

    // ========================================================================
    // Presentation
    // ========================================================================

    /// Animate in from off screen to `initial`, or the nearest allowed detent
    pub fn present(&mut self, initial: SheetDetent) -> SheetDetent {
        let detent = if self.allowed.contains(initial) {
            initial
        } else {
            let target = self.layout.target_offset(initial);
            self.nearest_detent(&self.allowed.to_list(), target)
        };
        if detent != initial {
            tracing::debug!("initial detent {:?} not allowed, presenting at {:?}", initial, detent);
        }

        self.offset = self.layout.off_screen_offset();
        self.snap_to(detent, Vec2::ZERO);
        self.content.run_deferred();
        detent
    }

    /// Start the dismissal animation
    ///
    /// Returns false when dismissal is already under way or finished.
    pub fn dismiss(&mut self) -> bool {
        if matches!(
            self.state,
            SheetGestureState::Dismissing | SheetGestureState::Dismissed
        ) {
            return false;
        }

        self.stop_animation();
        let target = self.layout.off_screen_offset();
        let velocity = self.fling_velocity.unwrap_or(Vec2::ZERO);
        let timing = self.timing_curve(velocity, target, self.config.springs.dismiss_response);

        tracing::debug!(
            "sheet dismissing from offset {:.1} with velocity {:.1}",
            self.offset,
            velocity.y
        );
        self.notify(|delegate| delegate.sheet_will_dismiss());

        self.status_bar = None;
        self.content.set_scroll_enabled(false);
        self.animation = Some(ActiveAnimation {
            kind: AnimationKind::Dismiss,
            animator: PropertyAnimator::started(timing),
            offset: Transition::new(self.offset, target),
            dimming: Transition::new(self.dimming_alpha, 0.0),
        });
        self.state.transition(DISMISS);
        true
    }

    // ========================================================================
    // Gesture handling
    // ========================================================================

    /// Feed one pan sample
    pub fn handle_pan(&mut self, sample: PanSample) {
        if self.snapping_cancelled || !self.state.accepts_input() {
            tracing::trace!("pan {:?} ignored in state {:?}", sample.phase, self.state);
            return;
        }

        match sample.phase {
            GesturePhase::Began => self.begin_drag(),
            GesturePhase::Changed => {
                if self.state != SheetGestureState::Dragging {
                    self.begin_drag();
                }
                self.drag_changed(sample.translation);
            }
            GesturePhase::Ended | GesturePhase::Cancelled | GesturePhase::Failed => {
                if self.state == SheetGestureState::Dragging {
                    self.release(sample.velocity);
                }
            }
        }

        self.content.run_deferred();
    }

    fn begin_drag(&mut self) {
        if matches!(
            self.animation.as_ref().map(|a| a.kind),
            Some(AnimationKind::Snap(_))
        ) {
            tracing::debug!("drag interrupted snap at offset {:.1}", self.offset);
            self.stop_animation();
        }
        if self.state.transition(PAN_BEGAN) {
            tracing::debug!("sheet drag began at offset {:.1}", self.offset);
        }
        self.drag = DragTracking::default();
    }

    fn drag_changed(&mut self, translation: Vec2) {
        let delta = translation.y - self.drag.last_translation.y;
        self.drag.last_translation = translation;

        let max_target = self.layout.target_offset(SheetDetent::Maximum);
        let content_scrollable = self.content.max_offset_y() > 0.0;
        let sheet_claims = self.content.is_scrolled_to_top()
            && (self.offset > max_target || delta > 0.0 || !content_scrollable);

        if sheet_claims {
            if self.drag.content_owned {
                let events = self.content.end_drag(0.0);
                self.apply_rubber_band(events);
            }
            self.drag.content_owned = false;
            self.content.set_scroll_enabled(false);
            self.drag_sheet(delta, max_target);
        } else {
            self.drag.content_owned = true;
            self.content.set_scroll_enabled(true);
            let events = self.content.scroll_by(-delta);
            self.apply_rubber_band(events);
        }

        tracing::trace!(
            "sheet drag dy={:.1} offset={:.1} owner={}",
            delta,
            self.offset,
            if sheet_claims { "sheet" } else { "content" }
        );
        self.update_presentation(true);
    }

    /// Move the sheet by a finger delta, damping travel above the maximum detent
    ///
    /// Travel down to the maximum target is applied as is; only the part of
    /// the delta past it is damped, in steps so one large sample stretches
    /// the same as many small ones.
    fn drag_sheet(&mut self, delta: f32, max_target: f32) {
        if delta >= 0.0 {
            self.offset = self.layout.clamp_offset(self.offset + delta);
            return;
        }

        let free = (self.offset - max_target).max(0.0).min(-delta);
        let mut offset = self.offset - free;
        let mut excess = -delta - free;

        let scroll = &self.config.scroll;
        let min_offset = self.layout.min_offset();
        let max_over = (max_target - min_offset).max(1.0);
        while excess > 0.0 && offset > min_offset {
            let step = excess.min(RESISTANCE_STEP);
            let stretch_ratio = ((max_target - offset) / max_over).clamp(0.0, 1.0);
            let resistance = scroll.resistance_start
                - stretch_ratio * (scroll.resistance_start - scroll.resistance_end);
            offset -= step * resistance;
            excess -= step;
        }
        self.offset = self.layout.clamp_offset(offset);
    }

    fn release(&mut self, velocity: Vec2) {
        let velocity = sanitize_velocity(velocity, self.config.velocity.non_finite_fallback);
        self.state.transition(PAN_ENDED);

        let at_detent = (self.offset - self.layout.target_offset(self.detent)).abs()
            < self.config.springs.min_velocity_distance;
        if self.drag.content_owned && at_detent {
            let events = self.content.end_drag(-velocity.y);
            self.apply_rubber_band(events);
            self.state.transition(SETTLED);
            tracing::debug!("drag released to content at {:?}", self.detent);
            return;
        }

        let detent = self.closest_snapping_detent(self.offset, velocity);
        if self.state == SheetGestureState::Dismissing {
            return;
        }
        self.snap_to(detent, velocity);
    }

    // ========================================================================
    // Detent resolution
    // ========================================================================

    /// Detents a release at `offset` with `velocity` may snap to
    ///
    /// Fast releases skip the middle detent (upward fast releases go
    /// straight to maximum); a moderately fast upward release from below the
    /// middle detent lifts the sheet to middle. Restrictions that exclude
    /// every allowed detent fall back to all allowed detents.
    pub fn snapping_candidates(&self, offset: f32, velocity: Vec2) -> DetentList {
        let thresholds = &self.config.velocity;
        let velocity = sanitize_velocity(velocity, thresholds.non_finite_fallback);
        let speed = velocity.length();
        let moving_up = velocity.y < 0.0;

        if speed > thresholds.skip_middle {
            if moving_up {
                self.allowed.restrict(&[SheetDetent::Maximum])
            } else {
                self.allowed.without(SheetDetent::Middle)
            }
        } else if moving_up
            && speed > thresholds.minimum_to_middle
            && offset > self.layout.target_offset(SheetDetent::Middle)
        {
            self.allowed.restrict(&[SheetDetent::Middle])
        } else {
            self.allowed.to_list()
        }
    }

    /// Resolve the detent a release should settle at
    ///
    /// A hard downward fling on a sheet that dismisses when flung starts the
    /// dismissal, cancels all further snapping, and returns
    /// [`SheetDetent::Minimum`]. After that every call returns `Minimum`
    /// without side effects.
    pub fn closest_snapping_detent(&mut self, offset: f32, velocity: Vec2) -> SheetDetent {
        if self.snapping_cancelled {
            return SheetDetent::Minimum;
        }

        let velocity = sanitize_velocity(velocity, self.config.velocity.non_finite_fallback);
        if self.dismiss_when_flung_down
            && velocity.y > 0.0
            && velocity.length() > self.config.velocity.fling_dismiss
        {
            tracing::debug!("fling dismiss at velocity {:.1}", velocity.y);
            self.snapping_cancelled = true;
            self.fling_velocity = Some(velocity);
            self.dismiss();
            return SheetDetent::Minimum;
        }

        let candidates = self.snapping_candidates(offset, velocity);
        let detent = self.nearest_detent(&candidates, offset);
        tracing::debug!(
            "resolved {:?} from {:?} at offset {:.1}, velocity {:.1}",
            detent,
            candidates.as_slice(),
            offset,
            velocity.y
        );
        detent
    }

    /// Candidate with the target closest to `offset`; earlier candidates win ties
    fn nearest_detent(&self, candidates: &[SheetDetent], offset: f32) -> SheetDetent {
        let mut best: Option<(SheetDetent, f32)> = None;
        for &detent in candidates {
            let distance = (self.layout.target_offset(detent) - offset).abs();
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((detent, distance)),
            }
        }
        best.map(|(detent, _)| detent).unwrap_or(self.detent)
    }

    // ========================================================================
    // Animation
    // ========================================================================

    fn timing_curve(&self, velocity: Vec2, target: f32, response: f32) -> SpringTimingParameters {
        let springs = &self.config.springs;
        let relative = relative_velocity(
            velocity.y,
            self.offset,
            target,
            springs.min_velocity_distance,
        );
        let damping_ratio = if velocity.is_zero() {
            springs.resting_damping_ratio
        } else {
            springs.moving_damping_ratio
        };
        SpringTimingParameters::new(damping_ratio, response, Vec2::new(0.0, relative))
    }

    /// Animate to `detent`, continuing the motion of `velocity`
    ///
    /// Returns false without side effects while a finger is dragging the
    /// sheet or once dismissal has started.
    pub fn snap_to(&mut self, detent: SheetDetent, velocity: Vec2) -> bool {
        if self.state.on_event(SNAP).is_none() {
            tracing::debug!("snap to {:?} rejected in state {:?}", detent, self.state);
            return false;
        }

        self.stop_animation();
        let velocity = sanitize_velocity(velocity, self.config.velocity.non_finite_fallback);
        let target = self.layout.target_offset(detent);
        let timing = self.timing_curve(velocity, target, self.config.springs.snap_response);

        tracing::debug!(
            "snapping to {:?}: offset {:.1} -> {:.1}, relative velocity {:.3}",
            detent,
            self.offset,
            target,
            timing.initial_velocity.y
        );
        self.notify(|delegate| delegate.sheet_will_snap(detent));

        self.detent = detent;
        self.status_bar = (detent == SheetDetent::Maximum).then_some(StatusBarStyle::LightContent);
        self.animation = Some(ActiveAnimation {
            kind: AnimationKind::Snap(detent),
            animator: PropertyAnimator::started(timing),
            offset: Transition::new(self.offset, target),
            dimming: Transition::new(self.dimming_alpha, self.layout.detent_dimming_alpha(detent)),
        });
        self.content.set_scroll_enabled(true);
        self.state.transition(SNAP);
        true
    }

    /// Stop the in-flight animation where it is
    fn stop_animation(&mut self) {
        if let Some(mut animation) = self.animation.take() {
            animation.animator.stop();
        }
    }

    /// Advance animations by `dt` seconds
    pub fn tick(&mut self, dt: f32) -> SheetTick {
        let events = self.content.tick(dt);
        let rubber_band_changed = self.apply_rubber_band(events);

        let Some(animation) = self.animation.as_mut() else {
            if rubber_band_changed {
                self.update_presentation(false);
            }
            self.content.run_deferred();
            return if self.content.is_animating() {
                SheetTick::Animating
            } else {
                SheetTick::Idle
            };
        };

        let status = animation.animator.tick(dt);
        let fraction = animation.animator.fraction_complete();
        let offset = animation.offset.at(fraction);
        let dimming = animation.dimming.at(fraction);
        let kind = animation.kind;

        let result = match status {
            AnimatorStatus::Running => {
                self.offset = self.layout.clamp_offset(offset);
                self.dimming_alpha = dimming.clamp(0.0, 1.0);
                self.update_presentation(false);
                SheetTick::Animating
            }
            AnimatorStatus::Finished => {
                self.animation = None;
                self.finish_animation(kind)
            }
            AnimatorStatus::Inactive => {
                self.animation = None;
                SheetTick::Idle
            }
        };

        self.content.run_deferred();
        result
    }

    fn finish_animation(&mut self, kind: AnimationKind) -> SheetTick {
        match kind {
            AnimationKind::Snap(detent) => {
                self.offset = self.layout.target_offset(detent);
                self.dimming_alpha = self.layout.detent_dimming_alpha(detent);
                self.state.transition(SETTLED);
                self.update_presentation(false);
                tracing::debug!("snapped to {:?}", detent);
                self.notify(|delegate| delegate.sheet_did_snap(detent));
                SheetTick::Snapped(detent)
            }
            AnimationKind::Dismiss => {
                self.offset = self.layout.off_screen_offset();
                self.dimming_alpha = 0.0;
                self.state.transition(SETTLED);
                self.update_presentation(false);
                tracing::debug!("sheet dismissed");
                SheetTick::Dismissed
            }
        }
    }

    // ========================================================================
    // Derived presentation state
    // ========================================================================

    fn apply_rubber_band(&mut self, events: RubberBandEvents) -> bool {
        let mut changed = false;
        for event in events {
            match event {
                RubberBandEvent::Started => {
                    tracing::trace!("content rubber band started");
                }
                RubberBandEvent::Offset(amount) => {
                    if amount != self.rubber_band_offset {
                        self.rubber_band_offset = amount;
                        changed = true;
                    }
                }
                RubberBandEvent::Finished => {
                    tracing::trace!("content rubber band finished");
                    changed |= self.rubber_band_offset != 0.0;
                    self.rubber_band_offset = 0.0;
                }
            }
        }
        changed
    }

    /// Push the current offset to everything derived from it
    ///
    /// During a drag dimming and the status bar follow the finger; during
    /// animations they are driven by the animation itself.
    fn update_presentation(&mut self, from_drag: bool) {
        let presented = self.presented_offset();
        self.content
            .set_available_height(self.layout.visible_height(self.offset));

        let progress = self.layout.maximum_progress(presented);
        if from_drag {
            self.dimming_alpha = self.layout.dimming_alpha(presented);
            self.status_bar = (progress >= self.config.light_status_bar_progress)
                .then_some(StatusBarStyle::LightContent);
        }

        self.progress = progress;
        self.notify(|delegate| delegate.sheet_did_update_progress(progress));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::FixedContent;
    use crate::metrics::SheetMetrics;
    use tide_core::{EdgeInsets, Size};

    const DT: f32 = 1.0 / 60.0;

    // Screen 1000 tall, buffer 300: targets 380 / 760 / 1106, off screen 1300
    fn container_with(allowed: AllowedDetents, fling: bool, content_height: f32) -> SheetContainer {
        let config = SheetConfig::default();
        let layout = SheetLayout::new(
            Size::new(400.0, 1000.0),
            EdgeInsets::vertical(47.0, 34.0),
            SheetMetrics::default(),
            config.detents.clone(),
            config.dimming.clone(),
        );
        SheetContainer::new(
            layout,
            config,
            allowed,
            fling,
            Box::new(FixedContent(content_height)),
        )
    }

    fn container() -> SheetContainer {
        container_with(AllowedDetents::all(), false, 400.0)
    }

    fn settle(sheet: &mut SheetContainer) -> SheetTick {
        for _ in 0..1200 {
            match sheet.tick(DT) {
                SheetTick::Animating => continue,
                other => return other,
            }
        }
        panic!("sheet never settled");
    }

    fn presented_at(detent: SheetDetent) -> SheetContainer {
        let mut sheet = container();
        sheet.present(detent);
        assert_eq!(settle(&mut sheet), SheetTick::Snapped(detent));
        sheet
    }

    #[derive(Default)]
    struct Recorder {
        progress: Vec<f32>,
        snapped: Vec<SheetDetent>,
        dismissing: usize,
    }

    impl SheetContainerDelegate for Recorder {
        fn sheet_did_update_progress(&mut self, progress: f32) {
            self.progress.push(progress);
        }

        fn sheet_did_snap(&mut self, detent: SheetDetent) {
            self.snapped.push(detent);
        }

        fn sheet_will_dismiss(&mut self) {
            self.dismissing += 1;
        }
    }

    #[test]
    fn test_present_settles_at_initial_detent() {
        let sheet = presented_at(SheetDetent::Middle);
        assert_eq!(sheet.state(), SheetGestureState::Idle);
        assert!((sheet.offset() - 760.0).abs() < 1e-3);
        assert!((sheet.dimming_alpha() - 0.25).abs() < 1e-5);
        assert_eq!(sheet.status_bar_override(), None);
    }

    #[test]
    fn test_present_disallowed_initial_uses_nearest() {
        let mut sheet = container_with(
            AllowedDetents::new([SheetDetent::Maximum, SheetDetent::Minimum]),
            false,
            400.0,
        );
        // Middle (760) is closer to Minimum (1106) than Maximum (380)
        assert_eq!(sheet.present(SheetDetent::Middle), SheetDetent::Minimum);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut sheet = container();
        for (offset, velocity) in [
            (700.0, Vec2::ZERO),
            (900.0, Vec2::new(0.0, -1200.0)),
            (760.0, Vec2::new(0.0, 3500.0)),
            (500.0, Vec2::new(300.0, -2500.0)),
        ] {
            let first = sheet.closest_snapping_detent(offset, velocity);
            let second = sheet.closest_snapping_detent(offset, velocity);
            assert_eq!(first, second);
        }
        assert!(!sheet.is_snapping_cancelled());
    }

    #[test]
    fn test_slow_release_keeps_all_candidates() {
        let sheet = container();
        for speed in [0.0, 500.0, 1999.0] {
            let candidates = sheet.snapping_candidates(500.0, Vec2::new(0.0, speed));
            assert_eq!(candidates.len(), 3);
        }
    }

    #[test]
    fn test_fast_release_skips_middle() {
        let sheet = container();
        assert_eq!(
            sheet
                .snapping_candidates(760.0, Vec2::new(0.0, 2500.0))
                .as_slice(),
            &[SheetDetent::Maximum, SheetDetent::Minimum]
        );
        assert_eq!(
            sheet
                .snapping_candidates(760.0, Vec2::new(0.0, -2500.0))
                .as_slice(),
            &[SheetDetent::Maximum]
        );
    }

    #[test]
    fn test_restriction_outside_allowed_falls_back() {
        let sheet = container_with(
            AllowedDetents::new([SheetDetent::Middle, SheetDetent::Minimum]),
            false,
            400.0,
        );
        let candidates = sheet.snapping_candidates(760.0, Vec2::new(0.0, -2500.0));
        assert_eq!(
            candidates.as_slice(),
            &[SheetDetent::Middle, SheetDetent::Minimum]
        );
    }

    #[test]
    fn test_ties_go_to_first_declared() {
        let mut sheet = container_with(
            AllowedDetents::new([SheetDetent::Minimum, SheetDetent::Middle]),
            false,
            400.0,
        );
        let halfway = (760.0 + 1106.0) / 2.0;
        assert_eq!(
            sheet.closest_snapping_detent(halfway, Vec2::ZERO),
            SheetDetent::Minimum
        );
    }

    #[test]
    fn test_fling_trap() {
        let mut sheet = container_with(AllowedDetents::all(), true, 400.0);
        sheet.present(SheetDetent::Middle);
        settle(&mut sheet);

        let detent = sheet.closest_snapping_detent(760.0, Vec2::new(0.0, 4500.0));
        assert_eq!(detent, SheetDetent::Minimum);
        assert!(sheet.is_snapping_cancelled());
        assert_eq!(sheet.state(), SheetGestureState::Dismissing);

        // Trap engaged: same answer, no further side effects
        assert_eq!(
            sheet.closest_snapping_detent(380.0, Vec2::new(0.0, -3000.0)),
            SheetDetent::Minimum
        );
        assert_eq!(sheet.state(), SheetGestureState::Dismissing);

        // Pan input is ignored from now on
        sheet.handle_pan(PanSample::began());
        assert_eq!(sheet.state(), SheetGestureState::Dismissing);

        assert_eq!(settle(&mut sheet), SheetTick::Dismissed);
        assert_eq!(sheet.offset(), sheet.layout().off_screen_offset());
    }

    #[test]
    fn test_fling_without_dismiss_snaps_instead() {
        let mut sheet = container();
        let detent = sheet.closest_snapping_detent(760.0, Vec2::new(0.0, 4500.0));
        assert_eq!(detent, SheetDetent::Minimum);
        assert!(!sheet.is_snapping_cancelled());
    }

    #[test]
    fn test_non_finite_velocity_is_clamped() {
        let velocity = sanitize_velocity(Vec2::new(f32::NEG_INFINITY, f32::INFINITY), 10_000.0);
        assert_eq!(velocity, Vec2::new(-10_000.0, 10_000.0));

        let mut sheet = presented_at(SheetDetent::Middle);
        sheet.handle_pan(PanSample::began());
        sheet.handle_pan(PanSample::changed(Vec2::new(0.0, 10.0), Vec2::ZERO));
        sheet.handle_pan(PanSample::ended(
            Vec2::new(0.0, 10.0),
            Vec2::new(0.0, f32::INFINITY),
        ));
        assert_eq!(sheet.detent(), SheetDetent::Minimum);
        for _ in 0..120 {
            sheet.tick(DT);
            assert!(sheet.offset().is_finite());
        }
    }

    #[test]
    fn test_drag_moves_sheet_and_updates_dimming() {
        let mut sheet = presented_at(SheetDetent::Middle);
        sheet.handle_pan(PanSample::began());
        assert_eq!(sheet.state(), SheetGestureState::Dragging);

        sheet.handle_pan(PanSample::changed(Vec2::new(0.0, -200.0), Vec2::ZERO));
        assert!((sheet.offset() - 560.0).abs() < 1e-3);
        assert!(sheet.dimming_alpha() > 0.25 && sheet.dimming_alpha() < 0.45);
        assert!((sheet.maximum_progress() - 10.0 / 19.0).abs() < 1e-3);
        assert_eq!(
            sheet.status_bar_override(),
            Some(StatusBarStyle::LightContent)
        );

        sheet.handle_pan(PanSample::changed(Vec2::new(0.0, 100.0), Vec2::ZERO));
        assert!((sheet.offset() - 860.0).abs() < 1e-3);
        assert_eq!(sheet.maximum_progress(), 0.0);
        assert_eq!(sheet.status_bar_override(), None);
    }

    #[test]
    fn test_drag_above_maximum_is_resisted() {
        let mut sheet = presented_at(SheetDetent::Maximum);
        sheet.handle_pan(PanSample::began());
        sheet.handle_pan(PanSample::changed(Vec2::new(0.0, -20.0), Vec2::ZERO));
        let travelled = 380.0 - sheet.offset();
        assert!(travelled > 0.0 && travelled < 20.0 * 0.55 + 1e-3);
        assert_eq!(sheet.maximum_progress(), 1.0);
    }

    #[test]
    fn test_scrollable_content_owns_upward_drag_at_maximum() {
        let mut sheet = container_with(AllowedDetents::all(), false, 3000.0);
        sheet.present(SheetDetent::Maximum);
        settle(&mut sheet);

        sheet.handle_pan(PanSample::began());
        sheet.handle_pan(PanSample::changed(Vec2::new(0.0, -50.0), Vec2::ZERO));
        assert!((sheet.offset() - 380.0).abs() < 1e-3);
        assert!((sheet.content().offset_y() - 50.0).abs() < 1e-3);
        assert!(!sheet.content().is_scrolled_to_top());

        // Content is no longer at top, so a downward drag scrolls it back
        sheet.handle_pan(PanSample::changed(Vec2::new(0.0, -20.0), Vec2::ZERO));
        assert!((sheet.content().offset_y() - 20.0).abs() < 1e-3);
        assert!((sheet.offset() - 380.0).abs() < 1e-3);

        sheet.handle_pan(PanSample::ended(Vec2::new(0.0, -20.0), Vec2::ZERO));
        assert_eq!(sheet.state(), SheetGestureState::Idle);
        assert_eq!(sheet.detent(), SheetDetent::Maximum);
    }

    #[test]
    fn test_drag_interrupts_snap() {
        let mut sheet = container();
        sheet.present(SheetDetent::Middle);
        for _ in 0..5 {
            sheet.tick(DT);
        }
        let interrupted_at = sheet.offset();
        sheet.handle_pan(PanSample::began());
        assert_eq!(sheet.state(), SheetGestureState::Dragging);
        assert!(!sheet.is_animating());
        assert_eq!(sheet.offset(), interrupted_at);
    }

    #[test]
    fn test_zero_velocity_release_at_target() {
        let mut sheet = presented_at(SheetDetent::Maximum);
        sheet.handle_pan(PanSample::began());
        sheet.handle_pan(PanSample::changed(Vec2::new(0.0, 10.0), Vec2::ZERO));
        sheet.handle_pan(PanSample::changed(Vec2::new(0.0, 0.0), Vec2::ZERO));
        sheet.handle_pan(PanSample::ended(Vec2::ZERO, Vec2::ZERO));

        assert_eq!(sheet.state(), SheetGestureState::Snapping);
        assert_eq!(sheet.detent(), SheetDetent::Maximum);
        let timing = sheet.animation.as_ref().map(|a| *a.animator.timing());
        let timing = timing.unwrap();
        assert_eq!(timing.initial_velocity, Vec2::ZERO);
        let critical = 2.0 * (timing.stiffness * timing.mass).sqrt();
        assert!((timing.damping - critical).abs() < 1e-2);

        while sheet.tick(DT) == SheetTick::Animating {
            assert!((sheet.offset() - 380.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_dismiss_reports_once() {
        let recorder = Arc::new(Mutex::new(Recorder::default()));
        let shared: SharedDelegate = recorder.clone();

        let mut sheet = container();
        sheet.set_delegate(&shared);
        sheet.present(SheetDetent::Maximum);
        settle(&mut sheet);
        assert_eq!(sheet.status_bar_override(), Some(StatusBarStyle::LightContent));

        assert!(sheet.dismiss());
        assert!(!sheet.dismiss());
        assert_eq!(sheet.status_bar_override(), None);

        assert_eq!(settle(&mut sheet), SheetTick::Dismissed);
        assert_eq!(sheet.tick(DT), SheetTick::Idle);
        assert!(sheet.is_dismissed());
        assert_eq!(sheet.dimming_alpha(), 0.0);

        let recorder = recorder.lock().unwrap();
        assert_eq!(recorder.dismissing, 1);
        assert_eq!(recorder.snapped, vec![SheetDetent::Maximum]);
        assert_eq!(recorder.progress.last().copied(), Some(0.0));
    }

    #[test]
    fn test_dropped_delegate_is_skipped() {
        let mut sheet = container();
        {
            let recorder: SharedDelegate = Arc::new(Mutex::new(Recorder::default()));
            sheet.set_delegate(&recorder);
        }
        sheet.present(SheetDetent::Middle);
        assert_eq!(settle(&mut sheet), SheetTick::Snapped(SheetDetent::Middle));
    }

    fn active_timing(sheet: &SheetContainer) -> SpringTimingParameters {
        match sheet.animation.as_ref() {
            Some(animation) => *animation.animator.timing(),
            None => panic!("no animation running"),
        }
    }

    fn scrollable_at_maximum() -> SheetContainer {
        let mut sheet = container_with(AllowedDetents::all(), false, 3000.0);
        sheet.present(SheetDetent::Maximum);
        assert_eq!(settle(&mut sheet), SheetTick::Snapped(SheetDetent::Maximum));
        sheet
    }

    #[test]
    fn test_content_pulled_past_top_dips_sheet() {
        let mut sheet = scrollable_at_maximum();
        sheet.handle_pan(PanSample::began());
        sheet.handle_pan(PanSample::changed(Vec2::new(0.0, -50.0), Vec2::ZERO));
        // Content is scrolled, so one large downward delta carries it past the top
        sheet.handle_pan(PanSample::changed(Vec2::new(0.0, 50.0), Vec2::ZERO));

        assert!((sheet.content().offset_y() + 50.0).abs() < 1e-3);
        assert!((sheet.rubber_band_offset() - 50.0).abs() < 1e-3);
        assert!((sheet.offset() - 380.0).abs() < 1e-3);
        assert!(sheet.presented_offset() > sheet.offset());
        assert!(sheet.maximum_progress() < 1.0);
        assert!(sheet.content().content_translation_y() < 0.0);

        sheet.handle_pan(PanSample::ended(Vec2::new(0.0, 50.0), Vec2::ZERO));
        assert!(sheet.is_animating());
        assert_eq!(settle(&mut sheet), SheetTick::Idle);

        assert_eq!(sheet.rubber_band_offset(), 0.0);
        assert_eq!(sheet.presented_offset(), sheet.offset());
        assert!((sheet.maximum_progress() - 1.0).abs() < 1e-4);
        assert_eq!(sheet.content().content_translation_y(), 0.0);
        assert_eq!(sheet.content().offset_y(), 0.0);
        assert_eq!(sheet.state(), SheetGestureState::Idle);
    }

    #[test]
    fn test_momentum_onto_top_edge_dips_sheet() {
        let mut sheet = scrollable_at_maximum();
        sheet.handle_pan(PanSample::began());
        sheet.handle_pan(PanSample::changed(Vec2::new(0.0, -100.0), Vec2::ZERO));
        sheet.handle_pan(PanSample::changed(Vec2::new(0.0, -60.0), Vec2::ZERO));
        assert!((sheet.content().offset_y() - 60.0).abs() < 1e-3);

        // Finger flicks down: content keeps scrolling up through its top
        sheet.handle_pan(PanSample::ended(
            Vec2::new(0.0, -60.0),
            Vec2::new(0.0, 1500.0),
        ));

        let mut max_band: f32 = 0.0;
        let mut min_progress: f32 = 1.0;
        let mut frames = 0;
        while sheet.tick(DT) == SheetTick::Animating {
            max_band = max_band.max(sheet.rubber_band_offset());
            min_progress = min_progress.min(sheet.maximum_progress());
            frames += 1;
            assert!(frames < 1200, "content never settled");
        }

        assert!(max_band > 0.0);
        assert!(min_progress < 1.0);
        assert_eq!(sheet.rubber_band_offset(), 0.0);
        assert_eq!(sheet.content().offset_y(), 0.0);
        assert!((sheet.maximum_progress() - 1.0).abs() < 1e-4);
        assert!((sheet.offset() - 380.0).abs() < 1e-3);
    }

    #[test]
    fn test_cancelled_and_failed_releases_snap() {
        let mut sheet = presented_at(SheetDetent::Middle);
        sheet.handle_pan(PanSample::began());
        sheet.handle_pan(PanSample::changed(Vec2::new(0.0, -100.0), Vec2::ZERO));
        sheet.handle_pan(PanSample::new(
            GesturePhase::Cancelled,
            Vec2::new(0.0, -100.0),
            Vec2::ZERO,
        ));
        assert_eq!(sheet.state(), SheetGestureState::Snapping);
        assert_eq!(settle(&mut sheet), SheetTick::Snapped(SheetDetent::Middle));

        sheet.handle_pan(PanSample::began());
        sheet.handle_pan(PanSample::changed(Vec2::new(0.0, 250.0), Vec2::ZERO));
        sheet.handle_pan(PanSample::new(
            GesturePhase::Failed,
            Vec2::new(0.0, 250.0),
            Vec2::ZERO,
        ));
        assert_eq!(sheet.state(), SheetGestureState::Snapping);
        assert_eq!(settle(&mut sheet), SheetTick::Snapped(SheetDetent::Minimum));
        assert_eq!(sheet.state(), SheetGestureState::Idle);
    }

    #[test]
    fn test_moving_release_uses_relative_velocity() {
        let mut sheet = presented_at(SheetDetent::Middle);
        sheet.handle_pan(PanSample::began());
        sheet.handle_pan(PanSample::changed(Vec2::new(0.0, -100.0), Vec2::ZERO));
        let released_at = sheet.offset();
        sheet.handle_pan(PanSample::ended(
            Vec2::new(0.0, -100.0),
            Vec2::new(0.0, 500.0),
        ));

        assert_eq!(sheet.detent(), SheetDetent::Middle);
        let timing = active_timing(&sheet);
        let target = sheet.layout().target_offset(SheetDetent::Middle);
        let expected = 500.0 / (target - released_at);
        assert!((timing.initial_velocity.y - expected).abs() < 1e-4);
        assert!((timing.initial_velocity.y - 5.0).abs() < 1e-3);
        assert!((timing.spring_config().damping_ratio() - 0.82).abs() < 1e-4);
    }

    #[test]
    fn test_fling_dismiss_continues_fling_velocity() {
        let mut sheet = container_with(AllowedDetents::all(), true, 400.0);
        sheet.present(SheetDetent::Middle);
        settle(&mut sheet);

        sheet.handle_pan(PanSample::began());
        sheet.handle_pan(PanSample::changed(Vec2::new(0.0, 30.0), Vec2::ZERO));
        let released_at = sheet.offset();
        sheet.handle_pan(PanSample::ended(
            Vec2::new(0.0, 30.0),
            Vec2::new(0.0, 4500.0),
        ));
        assert_eq!(sheet.state(), SheetGestureState::Dismissing);

        let timing = active_timing(&sheet);
        let expected = 4500.0 / (sheet.layout().off_screen_offset() - released_at);
        assert!(timing.initial_velocity.y > 0.0);
        assert!((timing.initial_velocity.y - expected).abs() < 1e-4);
        assert!((timing.spring_config().damping_ratio() - 0.82).abs() < 1e-4);
    }

    #[test]
    fn test_programmatic_dismiss_starts_at_rest() {
        let mut sheet = presented_at(SheetDetent::Middle);
        assert!(sheet.dismiss());
        let timing = active_timing(&sheet);
        assert_eq!(timing.initial_velocity, Vec2::ZERO);
        assert!((timing.spring_config().damping_ratio() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_one_large_drag_matches_many_small_ones() {
        let mut single = presented_at(SheetDetent::Middle);
        single.handle_pan(PanSample::began());
        single.handle_pan(PanSample::changed(Vec2::new(0.0, -500.0), Vec2::ZERO));

        let mut stepped = presented_at(SheetDetent::Middle);
        stepped.handle_pan(PanSample::began());
        for step in 1..=50 {
            let translation = Vec2::new(0.0, -10.0 * step as f32);
            stepped.handle_pan(PanSample::changed(translation, Vec2::ZERO));
        }

        // 380 points of free travel, then 120 points of damped stretch
        assert!(single.offset() > single.layout().min_offset() + 20.0);
        assert!(single.offset() < 380.0 - 120.0 * 0.10);
        assert!((single.offset() - stepped.offset()).abs() < 1e-2);
    }

    #[test]
    fn test_snap_to_rejected_while_dragging() {
        let mut sheet = presented_at(SheetDetent::Middle);
        sheet.handle_pan(PanSample::began());
        sheet.handle_pan(PanSample::changed(Vec2::new(0.0, -40.0), Vec2::ZERO));

        assert!(!sheet.snap_to(SheetDetent::Maximum, Vec2::ZERO));
        assert_eq!(sheet.state(), SheetGestureState::Dragging);
        assert!(!sheet.is_animating());
        assert_eq!(sheet.detent(), SheetDetent::Middle);

        sheet.handle_pan(PanSample::ended(Vec2::new(0.0, -40.0), Vec2::ZERO));
        assert_eq!(settle(&mut sheet), SheetTick::Snapped(SheetDetent::Middle));
        assert_eq!(sheet.state(), SheetGestureState::Idle);

        assert!(sheet.snap_to(SheetDetent::Maximum, Vec2::ZERO));
        assert_eq!(settle(&mut sheet), SheetTick::Snapped(SheetDetent::Maximum));
        assert_eq!(sheet.state(), SheetGestureState::Idle);
    }
}
