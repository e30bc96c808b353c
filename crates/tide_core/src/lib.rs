//! Tide Core
//!
//! Foundational primitives shared by the Tide crates:
//!
//! - **Geometry**: points, rects, insets, affine transforms, rounded shapes
//! - **Gesture Events**: pan phases, samples, and a pointer-to-pan tracker
//! - **State Machines**: enum states with event-driven transitions

pub mod events;
pub mod geometry;
pub mod state;

pub use events::{event_types, EventType, GesturePhase, PanSample, PanTracker};
pub use geometry::{Affine2D, CornerRadius, EdgeInsets, Point, Rect, RoundedRect, Size, Vec2};
pub use state::StateTransitions;
