//! Tally Animation System
//!
//! Eased value transitions for numbers that change over time on a live
//! dashboard (counts, token totals, costs).
//!
//! # Features
//!
//! - **Transition Engine**: per-value state machine with retargeting,
//!   start delay and exact convergence on the final value
//! - **Easing**: exponential and cubic ease-out curves
//! - **Frame Scheduler**: one-shot frame callbacks and timers, ticked
//!   manually or from a background thread
//! - **AnimatedNumber**: scheduler-bound transition that cleans up on drop
//!
//! # Example
//!
//! ```rust
//! use tally_animation::{AnimatedNumber, FrameScheduler, TransitionConfig};
//!
//! let scheduler = FrameScheduler::manual();
//! let mut tokens = AnimatedNumber::new(scheduler.handle(), 0.0, TransitionConfig::default()).unwrap();
//!
//! tokens.set_target(100.0).unwrap();
//! scheduler.tick_at(0.0);
//! scheduler.tick_at(400.0);
//! assert!(tokens.get() > 90.0 && tokens.get() < 100.0);
//!
//! scheduler.tick_at(800.0);
//! assert_eq!(tokens.get(), 100.0);
//! assert!(!tokens.is_animating());
//! ```

pub mod animated;
pub mod config;
pub mod easing;
pub mod error;
pub mod host;
pub mod scheduler;
pub mod transition;

pub use animated::AnimatedNumber;
pub use config::{TransitionConfig, DEFAULT_DURATION_MS, DEFAULT_GUARD_DIGITS, MAX_DECIMALS};
pub use easing::Easing;
pub use error::AnimationError;
pub use host::MotionHost;
pub use scheduler::{
    FrameCallback, FrameRequestId, FrameScheduler, SchedulerHandle, TimerCallback, TimerId,
    WakeCallback,
};
pub use transition::{MotionPhase, Transition};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a mutex, recovering the data if a callback panicked while holding it
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
