//! Sheet geometry as pure functions of the sheet offset
//!
//! The sheet surface is `true_sheet_height` tall (screen plus buffer) and is
//! positioned by its *offset*: how far its bottom edge hangs below the
//! bottom of the screen. An offset of `true_sheet_height` puts the sheet
//! entirely off screen; smaller offsets reveal more of it.
//!
//! ```text
//!   screen top ─┬──────────────┐
//!               │ presenting   │
//!   sheet top  ─┤╭────────────╮│ ┐
//!               ││   sheet    ││ │ visible height
//!   screen bot ─┴┼────────────┼┘ ┘
//!                │  (buffer)  │   ┐ offset
//!   sheet bot  ──╰────────────╯   ┘
//! ```

use tide_animation::inverse_lerp;
use tide_core::{CornerRadius, EdgeInsets, Rect, RoundedRect, Size};

use crate::config::{DetentConfig, DimmingConfig};
use crate::detent::SheetDetent;
use crate::metrics::SheetMetrics;

/// Screen geometry and the derived detent targets for one presentation
#[derive(Clone, Debug, PartialEq)]
pub struct SheetLayout {
    screen: Size,
    safe_area: EdgeInsets,
    metrics: SheetMetrics,
    detents: DetentConfig,
    dimming: DimmingConfig,
}

impl SheetLayout {
    pub fn new(
        screen: Size,
        safe_area: EdgeInsets,
        metrics: SheetMetrics,
        detents: DetentConfig,
        dimming: DimmingConfig,
    ) -> Self {
        Self {
            screen,
            safe_area,
            metrics,
            detents,
            dimming,
        }
    }

    pub fn screen(&self) -> Size {
        self.screen
    }

    pub fn safe_area(&self) -> EdgeInsets {
        self.safe_area
    }

    pub fn metrics(&self) -> &SheetMetrics {
        &self.metrics
    }

    pub fn true_sheet_height(&self) -> f32 {
        self.metrics.true_sheet_height(self.screen.height)
    }

    /// Offset that leaves `fraction` of the screen height visible
    pub fn height_to_bottom(&self, fraction: f32) -> f32 {
        self.true_sheet_height() - self.screen.height * fraction
    }

    /// Resting offset of a detent
    pub fn target_offset(&self, detent: SheetDetent) -> f32 {
        let offset = self.height_to_bottom(self.detents.fraction(detent));
        match detent {
            SheetDetent::Minimum if self.detents.minimum_respects_safe_area => {
                offset - self.safe_area.bottom
            }
            _ => offset,
        }
    }

    /// Offset with the sheet entirely below the screen
    pub fn off_screen_offset(&self) -> f32 {
        self.true_sheet_height()
    }

    /// Smallest offset the sheet may reach (its top at the top of the screen)
    pub fn min_offset(&self) -> f32 {
        self.true_sheet_height() - self.screen.height
    }

    /// Clamp an offset to the travel range of the sheet
    pub fn clamp_offset(&self, offset: f32) -> f32 {
        offset.clamp(self.min_offset(), self.off_screen_offset())
    }

    /// Height of the sheet visible above the bottom of the screen
    pub fn visible_height(&self, offset: f32) -> f32 {
        (self.true_sheet_height() - offset).clamp(0.0, self.screen.height)
    }

    /// Visible height as a fraction of the screen height
    pub fn available_ratio(&self, offset: f32) -> f32 {
        if self.screen.height <= 0.0 {
            return 0.0;
        }
        self.visible_height(offset) / self.screen.height
    }

    /// Progress toward the maximum detent
    ///
    /// 0 at or below the middle detent, 1 at or above the maximum detent,
    /// linear in visible height between.
    pub fn maximum_progress(&self, offset: f32) -> f32 {
        let middle = self.available_ratio(self.target_offset(SheetDetent::Middle));
        let maximum = self.available_ratio(self.target_offset(SheetDetent::Maximum));
        inverse_lerp(middle, maximum, self.available_ratio(offset)).clamp(0.0, 1.0)
    }

    /// Dimming overlay alpha for a sheet resting or dragged to `offset`
    ///
    /// Piecewise linear through (minimum, 0), (middle, middle alpha) and
    /// (maximum, maximum alpha), clamped outside that range.
    pub fn dimming_alpha(&self, offset: f32) -> f32 {
        let ratio = self.available_ratio(offset);
        let minimum = self.available_ratio(self.target_offset(SheetDetent::Minimum));
        let middle = self.available_ratio(self.target_offset(SheetDetent::Middle));
        let maximum = self.available_ratio(self.target_offset(SheetDetent::Maximum));

        if ratio <= minimum {
            0.0
        } else if ratio <= middle {
            self.dimming.middle_alpha * inverse_lerp(minimum, middle, ratio)
        } else if ratio <= maximum {
            let t = inverse_lerp(middle, maximum, ratio);
            self.dimming.middle_alpha + (self.dimming.maximum_alpha - self.dimming.middle_alpha) * t
        } else {
            self.dimming.maximum_alpha
        }
    }

    /// Dimming alpha at a detent's resting offset
    pub fn detent_dimming_alpha(&self, detent: SheetDetent) -> f32 {
        match detent {
            SheetDetent::Minimum => 0.0,
            SheetDetent::Middle => self.dimming.middle_alpha,
            SheetDetent::Maximum => self.dimming.maximum_alpha,
        }
    }

    /// Full frame of the sheet surface in screen coordinates
    pub fn sheet_frame(&self, offset: f32) -> Rect {
        let top = self.screen.height - (self.true_sheet_height() - offset);
        Rect::new(0.0, top, self.screen.width, self.true_sheet_height())
    }

    /// On-screen part of the sheet with its rounded top corners, if any is visible
    pub fn visible_sheet_shape(&self, offset: f32) -> Option<RoundedRect> {
        let frame = self.sheet_frame(offset);
        let visible = frame.intersection(&self.screen.to_rect())?;
        Some(RoundedRect::new(
            visible,
            CornerRadius::top(self.metrics.corner_radius),
        ))
    }
}
