//! Sheet chrome metrics

use serde::{Deserialize, Serialize};

/// Immutable description of the sheet's chrome for one presentation
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SheetMetrics {
    /// Extra height below the screen so dragging up never reveals the sheet's bottom edge
    pub buffer_height: f32,
    pub corner_radius: f32,
    pub shadow_radius: f32,
    pub shadow_opacity: f32,
}

impl Default for SheetMetrics {
    fn default() -> Self {
        Self {
            buffer_height: 300.0,
            corner_radius: 16.0,
            shadow_radius: 10.0,
            shadow_opacity: 0.2,
        }
    }
}

impl SheetMetrics {
    pub fn with_buffer_height(mut self, buffer_height: f32) -> Self {
        self.buffer_height = buffer_height;
        self
    }

    pub fn with_corner_radius(mut self, corner_radius: f32) -> Self {
        self.corner_radius = corner_radius;
        self
    }

    pub fn with_shadow(mut self, radius: f32, opacity: f32) -> Self {
        self.shadow_radius = radius;
        self.shadow_opacity = opacity;
        self
    }

    /// Full height of the sheet surface: the screen plus the buffer
    pub fn true_sheet_height(&self, screen_height: f32) -> f32 {
        screen_height + self.buffer_height
    }
}
