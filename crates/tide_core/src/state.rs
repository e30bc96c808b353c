//! Enum-based state machines
//!
//! Interaction states are plain `Copy` enums. Each state decides, given an
//! event type, which state comes next. Owners store the current state and
//! apply transitions with [`StateTransitions::on_event`].

use std::hash::Hash;

/// Trait for enum state machines driven by [`EventType`](crate::events::EventType)s
pub trait StateTransitions:
    Clone + Copy + PartialEq + Eq + Hash + Send + Sync + std::fmt::Debug + 'static
{
    /// Handle an event and return the new state, or None if no transition
    fn on_event(&self, event: u32) -> Option<Self>;

    /// Apply an event in place, returning whether a transition happened
    fn transition(&mut self, event: u32) -> bool {
        match self.on_event(event) {
            Some(next) => {
                *self = next;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::event_types::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Press {
        Idle,
        Pressed,
    }

    impl StateTransitions for Press {
        fn on_event(&self, event: u32) -> Option<Self> {
            match (self, event) {
                (Press::Idle, POINTER_DOWN) => Some(Press::Pressed),
                (Press::Pressed, POINTER_UP) => Some(Press::Idle),
                _ => None,
            }
        }
    }

    #[test]
    fn test_transition_in_place() {
        let mut state = Press::Idle;
        assert!(!state.transition(POINTER_UP));
        assert_eq!(state, Press::Idle);

        assert!(state.transition(POINTER_DOWN));
        assert_eq!(state, Press::Pressed);

        assert!(state.transition(POINTER_UP));
        assert_eq!(state, Press::Idle);
    }
}
