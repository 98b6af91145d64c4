//! Transition engine
//!
//! A [`Transition`] owns one displayed number and moves it toward its target
//! along an easing curve, one frame at a time. It is a plain mutable state
//! object: every callback the host delivers is checked against the frame or
//! timer id the transition currently owns, so work that was cancelled by a
//! retarget can never touch the new motion.
//!
//! # State machine
//!
//! ```text
//!            set_target (delay > 0)            delay elapsed
//!   Idle ──────────────────────────► PendingDelay ─────────────► Running
//!    │                                                              │
//!    └──────────── set_target (delay = 0) ─────────────────────────►│
//!    ◄───────────────────────── progress reaches 1 ─────────────────┘
//! ```
//!
//! A `set_target` from `PendingDelay` or `Running` cancels the current path and
//! starts over from the value currently displayed.
//!
//! # Invariants
//!
//! 1. At most one frame request and one delay timer are outstanding.
//! 2. `current_value` is always finite.
//! 3. When not animating, `current_value == target_value`.
//! 4. A motion that runs to completion ends bit-exactly on its target.

use tracing::{debug, trace, warn};

use crate::config::TransitionConfig;
use crate::error::AnimationError;
use crate::host::MotionHost;
use crate::scheduler::{FrameRequestId, TimerId};

/// Coarse state of a transition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionPhase {
    /// Not animating; the value equals its target
    Idle,
    /// Waiting for the start delay to elapse
    PendingDelay,
    /// Ticking toward the target
    Running,
}

/// Eased motion of a single numeric value
#[derive(Clone, Debug)]
pub struct Transition {
    current: f64,
    target: f64,
    start: f64,
    start_timestamp: Option<f64>,
    animating: bool,
    /// Start delay not yet elapsed, whether or not the host armed a timer
    delaying: bool,
    /// Config of the active (or most recent) motion
    config: TransitionConfig,
    pending_frame: Option<FrameRequestId>,
    pending_delay: Option<TimerId>,
}

impl Transition {
    /// Create an idle transition resting at `initial`
    pub fn new(initial: f64, config: TransitionConfig) -> Result<Self, AnimationError> {
        if !initial.is_finite() {
            return Err(AnimationError::InvalidTarget(initial));
        }
        config.validate()?;

        Ok(Self {
            current: initial,
            target: initial,
            start: initial,
            start_timestamp: None,
            animating: false,
            delaying: false,
            config,
            pending_frame: None,
            pending_delay: None,
        })
    }

    /// Value to display right now
    pub fn current_value(&self) -> f64 {
        self.current
    }

    /// Most recently requested final value
    pub fn target_value(&self) -> f64 {
        self.target
    }

    /// Interpolation origin of the active motion
    pub fn start_value(&self) -> f64 {
        self.start
    }

    /// Timestamp of the first tick of the active motion
    pub fn start_timestamp(&self) -> Option<f64> {
        self.start_timestamp
    }

    /// True while a motion is in progress, including a pending start delay
    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn config(&self) -> &TransitionConfig {
        &self.config
    }

    pub fn pending_frame(&self) -> Option<FrameRequestId> {
        self.pending_frame
    }

    pub fn pending_delay(&self) -> Option<TimerId> {
        self.pending_delay
    }

    pub fn phase(&self) -> MotionPhase {
        if !self.animating {
            MotionPhase::Idle
        } else if self.delaying {
            MotionPhase::PendingDelay
        } else {
            MotionPhase::Running
        }
    }

    /// Linear progress of the active motion at `timestamp`
    ///
    /// 0 before the first frame (or while delayed), 1 once settled.
    pub fn progress_at(&self, timestamp: f64) -> f64 {
        if !self.animating {
            return 1.0;
        }
        match self.start_timestamp {
            Some(started_at) => motion_progress(timestamp - started_at, self.config.duration_ms),
            None => 0.0,
        }
    }

    /// Start moving toward `target`
    ///
    /// Returns `Ok(false)` without touching anything when `target` equals the
    /// stored target. Otherwise cancels outstanding work, captures the value
    /// currently displayed as the new origin, and either requests the first
    /// frame or arms the start delay.
    pub fn set_target(
        &mut self,
        target: f64,
        config: &TransitionConfig,
        host: &mut impl MotionHost,
    ) -> Result<bool, AnimationError> {
        if !target.is_finite() {
            return Err(AnimationError::InvalidTarget(target));
        }
        config.validate()?;

        if target == self.target {
            return Ok(false);
        }

        self.cancel_pending(host);

        self.start = self.current;
        self.target = target;
        self.start_timestamp = None;
        self.config = *config;
        self.animating = true;
        self.delaying = config.delay_ms > 0.0;

        debug!(
            from = self.start,
            to = target,
            duration_ms = config.duration_ms,
            delay_ms = config.delay_ms,
            easing = %config.easing,
            "Transition retargeted"
        );

        if self.delaying {
            self.pending_delay = host.request_delay(config.delay_ms);
        } else {
            self.pending_frame = host.request_frame();
        }

        Ok(true)
    }

    /// Delay timer callback
    ///
    /// Returns `false` if `timer` is not the timer this transition owns.
    pub fn on_delay_elapsed(&mut self, timer: TimerId, host: &mut impl MotionHost) -> bool {
        if self.pending_delay != Some(timer) {
            trace!("Ignoring stale delay callback");
            return false;
        }

        self.pending_delay = None;
        self.delaying = false;
        self.animating = true;
        self.pending_frame = host.request_frame();

        debug!(
            from = self.start,
            to = self.target,
            "Transition delay elapsed"
        );
        true
    }

    /// Per-frame callback
    ///
    /// Returns `false` if `frame` is not the frame request this transition owns.
    pub fn on_frame(
        &mut self,
        frame: FrameRequestId,
        timestamp: f64,
        host: &mut impl MotionHost,
    ) -> bool {
        if self.pending_frame != Some(frame) {
            trace!("Ignoring stale frame callback");
            return false;
        }
        self.pending_frame = None;

        if !timestamp.is_finite() {
            warn!(timestamp, "Ignoring non-finite frame timestamp");
            self.pending_frame = host.request_frame();
            return true;
        }

        let started_at = *self.start_timestamp.get_or_insert(timestamp);
        let progress = motion_progress(timestamp - started_at, self.config.duration_ms);

        if progress < 1.0 {
            let eased = self.config.easing.apply(progress);
            let value = interpolate(self.start, self.target, eased);
            self.current = round_to(value, self.config.rounding_digits());
            trace!(timestamp, progress, value = self.current, "Transition frame");
            self.pending_frame = host.request_frame();
        } else {
            self.current = self.target;
            self.animating = false;
            self.start_timestamp = None;
            debug!(value = self.target, "Transition settled");
        }

        true
    }

    /// Jump to the target, cancelling any outstanding work
    pub fn snap_to_target(&mut self, host: &mut impl MotionHost) {
        self.cancel_pending(host);
        self.current = self.target;
        self.animating = false;
        self.delaying = false;
        self.start_timestamp = None;
    }

    /// Cancel all outstanding work. Safe to call more than once.
    ///
    /// An interrupted motion stays where it is: the displayed value becomes
    /// the target.
    pub fn dispose(&mut self, host: &mut impl MotionHost) {
        self.cancel_pending(host);

        if self.animating {
            debug!(value = self.current, target = self.target, "Transition disposed mid-motion");
            self.target = self.current;
            self.animating = false;
            self.delaying = false;
            self.start_timestamp = None;
        }
    }

    fn cancel_pending(&mut self, host: &mut impl MotionHost) {
        if let Some(timer) = self.pending_delay.take() {
            host.cancel_delay(timer);
        }
        if let Some(frame) = self.pending_frame.take() {
            host.cancel_frame(frame);
        }
    }
}

/// Elapsed fraction of a motion, clamped to `[0, 1]`
///
/// A zero-length motion is complete on its first tick.
pub fn motion_progress(elapsed_ms: f64, duration_ms: f64) -> f64 {
    if duration_ms <= 0.0 {
        return 1.0;
    }
    let progress = elapsed_ms / duration_ms;
    if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    }
}

fn interpolate(start: f64, target: f64, eased: f64) -> f64 {
    let value = start + (target - start) * eased;
    if value.is_finite() {
        value
    } else {
        // target - start overflowed
        start * (1.0 - eased) + target * eased
    }
}

/// Round half away from zero to `digits` fractional digits
///
/// Values too large to scale are returned unchanged.
fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    let rounded = scaled.round() / factor;
    if rounded.is_finite() {
        rounded
    } else {
        value
    }
}
