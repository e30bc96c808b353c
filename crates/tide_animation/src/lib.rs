//! Tide Animation System
//!
//! Spring physics, timing curves, and interruptible animators.
//!
//! # Features
//!
//! - **Spring Physics**: RK4-integrated springs with stiffness, damping, mass
//! - **Timing Curves**: damping ratio + response converted to physical springs
//! - **Property Animators**: one spring drives many interpolated properties
//! - **Interruptible**: stopping an animator leaves values where they are
//! - **Deferred Work**: single-slot, cancel-and-reschedule end-of-turn tasks

pub mod animator;
pub mod deferred;
pub mod spring;
pub mod timing;
pub mod values;

pub use animator::{AnimatorStatus, PropertyAnimator};
pub use deferred::{DeferredQueue, DeferredSlot, TaskId};
pub use spring::{Spring, SpringConfig};
pub use timing::{relative_velocity, SpringTimingParameters};
pub use values::{inverse_lerp, Interpolate, Transition};
