//! Sheet interaction lifecycle
//!
//! ```text
//! Idle ──PAN_BEGAN──► Dragging ──PAN_ENDED──► Releasing ──SNAP──► Snapping ──SETTLED──► Idle
//!   ▲                                              │                  │
//!   └──────────────────SETTLED─────────────────────┘               DISMISS
//!                                                                      ▼
//!                                          Dismissing ──SETTLED──► Dismissed
//! ```

use tide_core::event_types::*;
use tide_core::{EventType, StateTransitions};

/// Sheet-specific event types, above the range used by `tide_core`
pub mod sheet_events {
    use tide_core::EventType;

    /// A snap animation was started toward a detent
    pub const SNAP: EventType = 100;
    /// The sheet began animating off screen
    pub const DISMISS: EventType = 101;
    /// The running animation (or the released gesture) came to rest
    pub const SETTLED: EventType = 102;
}

use sheet_events::*;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SheetGestureState {
    /// Resting at a detent
    #[default]
    Idle,
    /// Following the user's finger
    Dragging,
    /// Finger lifted; the next resting place is being resolved
    Releasing,
    /// Animating toward a detent
    Snapping,
    /// Animating off screen
    Dismissing,
    /// Off screen; the presentation is over
    Dismissed,
}

impl SheetGestureState {
    pub fn is_animating(&self) -> bool {
        matches!(self, SheetGestureState::Snapping | SheetGestureState::Dismissing)
    }

    /// Whether pan input is still accepted
    pub fn accepts_input(&self) -> bool {
        !matches!(
            self,
            SheetGestureState::Dismissing | SheetGestureState::Dismissed
        )
    }
}

impl StateTransitions for SheetGestureState {
    fn on_event(&self, event: EventType) -> Option<Self> {
        use SheetGestureState::*;

        match (self, event) {
            // A new drag interrupts a snap in flight
            (Idle | Snapping, PAN_BEGAN) => Some(Dragging),
            (Dragging, PAN_ENDED | PAN_CANCELLED | PAN_FAILED) => Some(Releasing),

            (Idle | Releasing | Snapping, SNAP) => Some(Snapping),
            (Idle | Dragging | Releasing | Snapping, DISMISS) => Some(Dismissing),

            (Snapping | Releasing, SETTLED) => Some(Idle),
            (Dismissing, SETTLED) => Some(Dismissed),

            _ => None,
        }
    }
}
