//! Tide Sheet
//!
//! A modal bottom sheet with three detents, drag gestures with
//! rubber-banding, velocity-aware spring snapping, and a companion transform
//! on the presenting screen.
//!
//! The engine is headless. Hosts feed it pan samples (or raw pointer events),
//! frame ticks, and scene geometry, then read back what to draw: the sheet
//! frame, dimming alpha, status-bar override, content offset, and the
//! presenting surface's transform.
//!
//! # Example
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use tide_core::{EdgeInsets, Size};
//! use tide_sheet::prelude::*;
//!
//! struct Host;
//!
//! impl PresentingSurface for Host {
//!     fn is_visible(&self) -> bool {
//!         true
//!     }
//!
//!     fn set_presenting_transform(&mut self, _transform: PresentingTransform) {}
//! }
//!
//! let mut presenter = SheetPresenter::default();
//! presenter.attach_scene(SceneGeometry::new(
//!     Size::new(390.0, 844.0),
//!     EdgeInsets::vertical(47.0, 34.0),
//! ));
//!
//! presenter
//!     .present_sheet(
//!         Arc::new(Mutex::new(Host)),
//!         Box::new(FixedContent(600.0)),
//!         SheetPresentation::new().initial_detent(SheetDetent::Maximum),
//!     )
//!     .unwrap();
//!
//! while presenter.tick(1.0 / 60.0) == SheetTick::Animating {}
//! assert!(presenter.presenting_transform().scale < 1.0);
//! ```

pub mod config;
pub mod container;
pub mod content;
pub mod detent;
pub mod error;
pub mod gesture;
pub mod layout;
pub mod metrics;
pub mod presenter;
pub mod window;

pub use config::{
    ContentScrollConfig, DetentConfig, DimmingConfig, PresentingTransformConfig, SheetConfig,
    SpringTuning, VelocityConfig,
};
pub use container::{
    sanitize_velocity, SharedDelegate, SheetContainer, SheetContainerDelegate, SheetTick,
    StatusBarStyle,
};
pub use content::{
    ContentScrollState, FixedContent, RubberBandEvent, SheetContent, SheetContentContainer,
};
pub use detent::{AllowedDetents, DetentList, SheetDetent};
pub use error::{ConfigError, PresentError, Result};
pub use gesture::SheetGestureState;
pub use layout::SheetLayout;
pub use metrics::SheetMetrics;
pub use presenter::{
    DismissCompletion, PresentingCompanion, PresentingSurface, PresentingTransform,
    SceneGeometry, SharedSurface, SheetPresentation, SheetPresenter,
};
pub use window::{HitTarget, PresentationWindow};

/// Common imports for sheet hosts
pub mod prelude {
    pub use crate::config::SheetConfig;
    pub use crate::container::{
        SharedDelegate, SheetContainer, SheetContainerDelegate, SheetTick, StatusBarStyle,
    };
    pub use crate::content::{FixedContent, SheetContent};
    pub use crate::detent::{AllowedDetents, SheetDetent};
    pub use crate::error::PresentError;
    pub use crate::layout::SheetLayout;
    pub use crate::metrics::SheetMetrics;
    pub use crate::presenter::{
        PresentingSurface, PresentingTransform, SceneGeometry, SharedSurface, SheetPresentation,
        SheetPresenter,
    };
    pub use crate::window::HitTarget;
}
