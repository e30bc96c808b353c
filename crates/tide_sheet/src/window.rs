//! Full-screen overlay that only accepts touches on the sheet

use tide_core::{Point, Rect, RoundedRect};

/// What a point in the overlay landed on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitTarget {
    Sheet,
}

/// Transparent overlay window hosting the sheet
///
/// Hit testing is limited to the sheet's visible shape. Everything else
/// returns `None` so the host delivers the event to whatever is underneath.
#[derive(Clone, Debug)]
pub struct PresentationWindow {
    bounds: Rect,
    sheet: Option<RoundedRect>,
}

impl PresentationWindow {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            sheet: None,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Region the sheet currently draws, `None` while fully off screen
    pub fn sheet_region(&self) -> Option<RoundedRect> {
        self.sheet
    }

    pub fn update_sheet_region(&mut self, sheet: Option<RoundedRect>) {
        self.sheet = sheet;
    }

    pub fn hit_test(&self, point: Point) -> Option<HitTarget> {
        if !self.bounds.contains(point) {
            return None;
        }
        let hit = self.sheet.is_some_and(|sheet| sheet.contains(point));
        tracing::trace!("overlay hit test at ({:.1}, {:.1}): {}", point.x, point.y, hit);
        hit.then_some(HitTarget::Sheet)
    }
}
