//! Sheet presenter: the entry point hosts use to show and dismiss a sheet
//!
//! The presenter owns the overlay window and the sheet container for one
//! presentation and tears both down only once the dismissal animation has
//! finished. While the sheet approaches its maximum detent the presenting
//! surface underneath is scaled, pushed down, and rounded in step with the
//! sheet's progress.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tide_core::{Affine2D, EdgeInsets, PanSample, PanTracker, Point, Size};

use crate::config::{PresentingTransformConfig, SheetConfig};
use crate::container::{SharedDelegate, SheetContainer, SheetContainerDelegate, SheetTick};
use crate::content::SheetContent;
use crate::detent::{AllowedDetents, SheetDetent};
use crate::error::{PresentError, Result};
use crate::layout::SheetLayout;
use crate::metrics::SheetMetrics;
use crate::window::{HitTarget, PresentationWindow};

/// The screen a sheet is presented over
pub trait PresentingSurface {
    /// Whether the surface is currently on screen
    fn is_visible(&self) -> bool;

    fn set_presenting_transform(&mut self, transform: PresentingTransform);
}

pub type SharedSurface = Arc<Mutex<dyn PresentingSurface + Send>>;

/// Transform of the presenting surface while a sheet is on top of it
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PresentingTransform {
    pub scale: f32,
    pub translation_y: f32,
    pub corner_radius: f32,
}

impl Default for PresentingTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl PresentingTransform {
    pub const IDENTITY: PresentingTransform = PresentingTransform {
        scale: 1.0,
        translation_y: 0.0,
        corner_radius: 0.0,
    };

    /// Transform at maximum-detent progress `progress`
    pub fn at_progress(
        progress: f32,
        config: &PresentingTransformConfig,
        safe_area_top: f32,
        corner_radius: f32,
    ) -> Self {
        let p = progress.clamp(0.0, 1.0);
        let top = if config.translate_by_safe_area {
            safe_area_top
        } else {
            0.0
        };
        Self {
            scale: 1.0 - p * (1.0 - config.scale_at_maximum),
            translation_y: p * (top + config.extra_translation),
            corner_radius: p * corner_radius,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Affine form for a surface of `size`, scaling about its center
    pub fn to_affine(&self, size: Size) -> Affine2D {
        let cx = size.width / 2.0;
        let cy = size.height / 2.0;
        Affine2D::translation(cx, cy + self.translation_y)
            .then(&Affine2D::scale(self.scale, self.scale))
            .then(&Affine2D::translation(-cx, -cy))
    }
}

/// Overlay scene a presenter draws into
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct SceneGeometry {
    pub screen: Size,
    pub safe_area: EdgeInsets,
}

impl SceneGeometry {
    pub fn new(screen: Size, safe_area: EdgeInsets) -> Self {
        Self { screen, safe_area }
    }
}

/// Options for [`SheetPresenter::present_sheet`]
///
/// # Example
///
/// ```rust
/// use tide_sheet::prelude::*;
///
/// let options = SheetPresentation::new()
///     .initial_detent(SheetDetent::Minimum)
///     .allowed_detents([SheetDetent::Minimum, SheetDetent::Maximum])
///     .dismiss_when_flung_down(true);
/// assert!(!options.allowed().contains(SheetDetent::Middle));
/// ```
#[derive(Clone, Debug, Default)]
pub struct SheetPresentation {
    initial_detent: SheetDetent,
    allowed_detents: AllowedDetents,
    dismiss_when_flung_down: bool,
    metrics: SheetMetrics,
}

impl SheetPresentation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initial_detent(mut self, detent: SheetDetent) -> Self {
        self.initial_detent = detent;
        self
    }

    /// Detents the sheet may rest at; an empty list allows all
    pub fn allowed_detents(mut self, detents: impl IntoIterator<Item = SheetDetent>) -> Self {
        self.allowed_detents = AllowedDetents::new(detents);
        self
    }

    pub fn dismiss_when_flung_down(mut self, enabled: bool) -> Self {
        self.dismiss_when_flung_down = enabled;
        self
    }

    pub fn metrics(mut self, metrics: SheetMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn allowed(&self) -> &AllowedDetents {
        &self.allowed_detents
    }
}

/// Mirrors sheet progress onto the presenting surface
pub struct PresentingCompanion {
    host: SharedSurface,
    config: PresentingTransformConfig,
    safe_area_top: f32,
    corner_radius: f32,
    current: PresentingTransform,
}

impl PresentingCompanion {
    pub fn new(
        host: SharedSurface,
        config: PresentingTransformConfig,
        safe_area_top: f32,
        corner_radius: f32,
    ) -> Self {
        Self {
            host,
            config,
            safe_area_top,
            corner_radius,
            current: PresentingTransform::IDENTITY,
        }
    }

    pub fn current(&self) -> PresentingTransform {
        self.current
    }

    fn apply(&mut self, transform: PresentingTransform) {
        if transform == self.current {
            return;
        }
        self.current = transform;
        self.host
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .set_presenting_transform(transform);
    }

    /// Put the presenting surface back to identity
    pub fn reset(&mut self) {
        self.apply(PresentingTransform::IDENTITY);
    }
}

impl SheetContainerDelegate for PresentingCompanion {
    fn sheet_did_update_progress(&mut self, progress: f32) {
        let transform = PresentingTransform::at_progress(
            progress,
            &self.config,
            self.safe_area_top,
            self.corner_radius,
        );
        self.apply(transform);
    }

    fn sheet_did_snap(&mut self, detent: SheetDetent) {
        if detent != SheetDetent::Maximum {
            self.reset();
        }
    }
}

/// Runs once the sheet is gone
pub type DismissCompletion = Box<dyn FnOnce() + Send>;

struct ActivePresentation {
    window: PresentationWindow,
    container: SheetContainer,
    companion: Arc<Mutex<PresentingCompanion>>,
    completions: Vec<DismissCompletion>,
}

/// Presents at most one sheet at a time over a host surface
pub struct SheetPresenter {
    config: SheetConfig,
    scene: Option<SceneGeometry>,
    active: Option<ActivePresentation>,
    tracker: PanTracker,
}

impl Default for SheetPresenter {
    fn default() -> Self {
        Self::new(SheetConfig::default())
    }
}

impl SheetPresenter {
    pub fn new(config: SheetConfig) -> Self {
        Self {
            config,
            scene: None,
            active: None,
            tracker: PanTracker::default(),
        }
    }

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    /// Provide the overlay scene; presentation is a no-op until this is set
    pub fn attach_scene(&mut self, scene: SceneGeometry) {
        tracing::debug!(
            "overlay scene attached: {}x{}",
            scene.screen.width,
            scene.screen.height
        );
        self.scene = Some(scene);
    }

    pub fn scene(&self) -> Option<SceneGeometry> {
        self.scene
    }

    /// Present `content` over `host`
    ///
    /// [`PresentError::AlreadyPresenting`] and [`PresentError::NoOverlaySurface`]
    /// leave everything untouched and can be ignored.
    /// [`PresentError::HostNotVisible`] means the caller presented from a
    /// surface that is not on screen.
    pub fn present_sheet(
        &mut self,
        host: SharedSurface,
        content: Box<dyn SheetContent>,
        options: SheetPresentation,
    ) -> Result<()> {
        if self.active.is_some() {
            tracing::debug!("present_sheet ignored: a sheet is already presented");
            return Err(PresentError::AlreadyPresenting);
        }
        let Some(scene) = self.scene else {
            tracing::debug!("present_sheet ignored: no overlay scene attached");
            return Err(PresentError::NoOverlaySurface);
        };
        let host_visible = host
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_visible();
        if !host_visible {
            tracing::error!("present_sheet called from a surface that is not visible");
            debug_assert!(host_visible, "present_sheet called from a surface that is not visible");
            return Err(PresentError::HostNotVisible);
        }

        let layout = SheetLayout::new(
            scene.screen,
            scene.safe_area,
            options.metrics,
            self.config.detents.clone(),
            self.config.dimming.clone(),
        );
        let mut container = SheetContainer::new(
            layout,
            self.config.clone(),
            options.allowed_detents,
            options.dismiss_when_flung_down,
            content,
        );

        let companion = Arc::new(Mutex::new(PresentingCompanion::new(
            host,
            self.config.presenting.clone(),
            scene.safe_area.top,
            options.metrics.corner_radius,
        )));
        let delegate: SharedDelegate = companion.clone();
        container.set_delegate(&delegate);

        let detent = container.present(options.initial_detent);
        let mut window = PresentationWindow::new(scene.screen.to_rect());
        window.update_sheet_region(container.visible_sheet_shape());

        tracing::debug!("presenting sheet at {:?}", detent);
        self.tracker = PanTracker::default();
        self.active = Some(ActivePresentation {
            window,
            container,
            companion,
            completions: Vec::new(),
        });
        Ok(())
    }

    /// Animate the sheet away and run `completion` once it is gone
    ///
    /// With no sheet presented the completion runs immediately.
    pub fn dismiss(&mut self, completion: Option<DismissCompletion>) {
        let Some(active) = self.active.as_mut() else {
            if let Some(completion) = completion {
                completion();
            }
            return;
        };

        if let Some(completion) = completion {
            active.completions.push(completion);
        }
        active.container.dismiss();
    }

    pub fn is_presenting(&self) -> bool {
        self.active.is_some()
    }

    pub fn container(&self) -> Option<&SheetContainer> {
        self.active.as_ref().map(|active| &active.container)
    }

    pub fn window(&self) -> Option<&PresentationWindow> {
        self.active.as_ref().map(|active| &active.window)
    }

    /// Transform currently applied to the presenting surface
    pub fn presenting_transform(&self) -> PresentingTransform {
        self.active
            .as_ref()
            .map(|active| {
                active
                    .companion
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .current()
            })
            .unwrap_or(PresentingTransform::IDENTITY)
    }

    /// Re-query the presented content's height
    pub fn reload_content(&mut self) {
        if let Some(active) = self.active.as_mut() {
            active.container.reload_content();
        }
    }

    /// Advance animations; tears the presentation down once dismissal ends
    pub fn tick(&mut self, dt: f32) -> SheetTick {
        let Some(active) = self.active.as_mut() else {
            return SheetTick::Idle;
        };

        let result = active.container.tick(dt);
        active
            .window
            .update_sheet_region(active.container.visible_sheet_shape());

        if result == SheetTick::Dismissed {
            self.teardown();
        }
        result
    }

    fn teardown(&mut self) {
        let Some(mut active) = self.active.take() else {
            return;
        };
        active.container.clear_delegate();
        active
            .companion
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .reset();
        self.tracker = PanTracker::default();

        let completions = std::mem::take(&mut active.completions);
        drop(active);
        tracing::debug!(
            "sheet presentation torn down, {} completion(s)",
            completions.len()
        );
        for completion in completions {
            completion();
        }
    }

    // ========================================================================
    // Input
    // ========================================================================

    pub fn hit_test(&self, point: Point) -> Option<HitTarget> {
        self.active
            .as_ref()
            .and_then(|active| active.window.hit_test(point))
    }

    /// Feed a recognized pan sample directly
    pub fn handle_pan(&mut self, sample: PanSample) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        active.container.handle_pan(sample);
        active
            .window
            .update_sheet_region(active.container.visible_sheet_shape());
    }

    /// Pointer pressed; returns false when the point falls through the overlay
    pub fn pointer_down(&mut self, point: Point, time_ms: f64) -> bool {
        if self.hit_test(point).is_none() {
            return false;
        }
        self.tracker.pointer_down(point, time_ms);
        true
    }

    pub fn pointer_move(&mut self, point: Point, time_ms: f64) {
        if let Some(sample) = self.tracker.pointer_move(point, time_ms) {
            self.handle_pan(sample);
        }
    }

    pub fn pointer_up(&mut self, point: Point) {
        if let Some(sample) = self.tracker.pointer_up(point) {
            self.handle_pan(sample);
        }
    }

    pub fn pointer_cancel(&mut self) {
        if let Some(sample) = self.tracker.pointer_cancel() {
            self.handle_pan(sample);
        }
    }
}
