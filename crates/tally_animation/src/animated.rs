//! Scheduler-bound animated number
//!
//! [`AnimatedNumber`] ties a [`Transition`] to a [`SchedulerHandle`]. Every
//! frame or timer it schedules captures only a weak reference to the
//! transition and reads its state when the callback fires, so a retarget or
//! a drop between scheduling and firing is always observed.
//!
//! Lock order is transition first, scheduler second. The scheduler never
//! holds its own lock while running callbacks.

use std::sync::{Arc, Mutex, Weak};

use crate::config::TransitionConfig;
use crate::error::AnimationError;
use crate::host::MotionHost;
use crate::lock;
use crate::scheduler::{FrameRequestId, SchedulerHandle, TimerId};
use crate::transition::{MotionPhase, Transition};

/// [`MotionHost`] that routes requests to a frame scheduler
struct SchedulerBinding {
    handle: SchedulerHandle,
    transition: Weak<Mutex<Transition>>,
}

impl MotionHost for SchedulerBinding {
    fn request_frame(&mut self) -> Option<FrameRequestId> {
        let handle = self.handle.clone();
        let weak = self.transition.clone();
        self.handle.request_frame(move |id, timestamp| {
            let Some(transition) = weak.upgrade() else {
                return;
            };
            let mut binding = SchedulerBinding {
                handle,
                transition: weak,
            };
            lock(&transition).on_frame(id, timestamp, &mut binding);
        })
    }

    fn cancel_frame(&mut self, id: FrameRequestId) {
        self.handle.cancel_frame(id);
    }

    fn request_delay(&mut self, delay_ms: f64) -> Option<TimerId> {
        let handle = self.handle.clone();
        let weak = self.transition.clone();
        self.handle.set_timeout(delay_ms, move |id, _| {
            let Some(transition) = weak.upgrade() else {
                return;
            };
            let mut binding = SchedulerBinding {
                handle,
                transition: weak,
            };
            lock(&transition).on_delay_elapsed(id, &mut binding);
        })
    }

    fn cancel_delay(&mut self, id: TimerId) {
        self.handle.cancel_timeout(id);
    }
}

/// A number that animates toward new targets on a frame scheduler
///
/// # Example
///
/// ```ignore
/// let cost = AnimatedNumber::new(scheduler.handle(), 0.0, TransitionConfig::default().with_decimals(2))?;
///
/// // Upstream usage changed
/// cost.set_target(12.5)?;
///
/// // Each redraw
/// let shown = tally_format::fixed_decimal(cost.get(), 2);
/// ```
pub struct AnimatedNumber {
    handle: SchedulerHandle,
    transition: Arc<Mutex<Transition>>,
    config: TransitionConfig,
}

impl AnimatedNumber {
    /// Create a number resting at `initial`
    ///
    /// `config` is used by [`set_target`](Self::set_target).
    pub fn new(
        handle: SchedulerHandle,
        initial: f64,
        config: TransitionConfig,
    ) -> Result<Self, AnimationError> {
        let transition = Transition::new(initial, config)?;
        Ok(Self {
            handle,
            transition: Arc::new(Mutex::new(transition)),
            config,
        })
    }

    fn binding(&self) -> SchedulerBinding {
        SchedulerBinding {
            handle: self.handle.clone(),
            transition: Arc::downgrade(&self.transition),
        }
    }

    /// Animate toward `target` with this number's default config
    ///
    /// Returns `Ok(false)` if `target` is already the current target.
    pub fn set_target(&mut self, target: f64) -> Result<bool, AnimationError> {
        let config = self.config;
        self.set_target_with(target, config)
    }

    /// Animate toward `target` with a per-call config
    pub fn set_target_with(
        &mut self,
        target: f64,
        config: TransitionConfig,
    ) -> Result<bool, AnimationError> {
        let mut binding = self.binding();
        lock(&self.transition).set_target(target, &config, &mut binding)
    }

    /// Get the value to display right now
    pub fn get(&self) -> f64 {
        lock(&self.transition).current_value()
    }

    pub fn target(&self) -> f64 {
        lock(&self.transition).target_value()
    }

    /// True while moving or waiting out a start delay
    pub fn is_animating(&self) -> bool {
        lock(&self.transition).is_animating()
    }

    pub fn phase(&self) -> MotionPhase {
        lock(&self.transition).phase()
    }

    /// Linear progress of the active motion at scheduler time `now_ms`
    pub fn progress_at(&self, now_ms: f64) -> f64 {
        lock(&self.transition).progress_at(now_ms)
    }

    /// Default config used by [`set_target`](Self::set_target)
    pub fn config(&self) -> &TransitionConfig {
        &self.config
    }

    /// Snap immediately to the target value, stopping any active animation
    pub fn snap_to_target(&mut self) {
        let mut binding = self.binding();
        lock(&self.transition).snap_to_target(&mut binding);
    }

    /// Cancel all scheduled work. Idempotent; also runs on drop.
    pub fn dispose(&mut self) {
        let mut binding = self.binding();
        lock(&self.transition).dispose(&mut binding);
    }
}

impl Drop for AnimatedNumber {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for AnimatedNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let transition = lock(&self.transition);
        f.debug_struct("AnimatedNumber")
            .field("value", &transition.current_value())
            .field("target", &transition.target_value())
            .field("phase", &transition.phase())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;
    use crate::scheduler::FrameScheduler;

    fn run_frames(scheduler: &FrameScheduler, from: f64, to: f64, step: f64) {
        let mut now = from;
        while now <= to {
            scheduler.tick_at(now);
            now += step;
        }
    }

    #[test]
    fn test_animates_to_target_on_scheduler() {
        let scheduler = FrameScheduler::manual();
        let mut value =
            AnimatedNumber::new(scheduler.handle(), 0.0, TransitionConfig::new(800.0)).unwrap();

        assert!(value.set_target(100.0).unwrap());
        assert_eq!(scheduler.pending_frames(), 1);

        scheduler.tick_at(0.0);
        assert_eq!(value.get(), 0.0);
        scheduler.tick_at(400.0);
        assert!((value.get() - 96.88).abs() < 1e-9);
        assert_eq!(value.progress_at(400.0), 0.5);
        scheduler.tick_at(800.0);

        assert_eq!(value.get(), 100.0);
        assert!(!value.is_animating());
        assert!(!scheduler.has_pending_work());
    }

    #[test]
    fn test_retarget_keeps_single_frame_chain() {
        let scheduler = FrameScheduler::manual();
        let mut value =
            AnimatedNumber::new(scheduler.handle(), 0.0, TransitionConfig::new(500.0)).unwrap();

        value.set_target(10.0).unwrap();
        scheduler.tick_at(0.0);
        scheduler.tick_at(100.0);
        let displayed = value.get();

        value.set_target(-10.0).unwrap();
        value.set_target(20.0).unwrap();
        assert_eq!(scheduler.pending_frames(), 1);

        scheduler.tick_at(116.0);
        assert_eq!(value.get(), displayed);

        run_frames(&scheduler, 132.0, 700.0, 16.0);
        assert_eq!(value.get(), 20.0);
        assert!(!scheduler.has_pending_work());
    }

    #[test]
    fn test_delay_honored_on_scheduler() {
        let scheduler = FrameScheduler::manual();
        let config = TransitionConfig::new(800.0).with_delay(500.0);
        let mut value = AnimatedNumber::new(scheduler.handle(), 0.0, config).unwrap();

        value.set_target(100.0).unwrap();
        assert_eq!(value.phase(), MotionPhase::PendingDelay);

        run_frames(&scheduler, 0.0, 496.0, 16.0);
        assert_eq!(value.get(), 0.0);
        assert_eq!(scheduler.pending_frames(), 0);

        // Delay fires at 512; its first frame runs in the same tick at progress 0
        scheduler.tick_at(512.0);
        assert_eq!(value.phase(), MotionPhase::Running);
        assert_eq!(value.get(), 0.0);

        scheduler.tick_at(528.0);
        assert!(value.get() > 0.0);
    }

    #[test]
    fn test_retarget_during_delay_restarts_it() {
        let scheduler = FrameScheduler::manual();
        let config = TransitionConfig::new(800.0).with_delay(500.0);
        let mut value = AnimatedNumber::new(scheduler.handle(), 0.0, config).unwrap();

        value.set_target(100.0).unwrap();
        scheduler.tick_at(400.0);
        value.set_target(50.0).unwrap();
        assert_eq!(scheduler.pending_timers(), 1);

        // First deadline passes without starting anything
        scheduler.tick_at(600.0);
        assert_eq!(value.phase(), MotionPhase::PendingDelay);
        assert_eq!(value.get(), 0.0);

        scheduler.tick_at(900.0);
        assert_eq!(value.phase(), MotionPhase::Running);
        scheduler.tick_at(1700.0);
        assert_eq!(value.get(), 50.0);
    }

    #[test]
    fn test_per_call_config() {
        let scheduler = FrameScheduler::manual();
        let mut value =
            AnimatedNumber::new(scheduler.handle(), 0.0, TransitionConfig::default()).unwrap();

        let cubic = TransitionConfig::new(100.0).with_easing(Easing::Cubic);
        value.set_target_with(8.0, cubic).unwrap();
        scheduler.tick_at(0.0);
        scheduler.tick_at(50.0);
        assert_eq!(value.get(), 7.0);
        assert_eq!(value.config().duration_ms, 800.0);
    }

    #[test]
    fn test_drop_cancels_scheduled_work() {
        let scheduler = FrameScheduler::manual();
        {
            let mut value =
                AnimatedNumber::new(scheduler.handle(), 0.0, TransitionConfig::default()).unwrap();
            value.set_target(1.0).unwrap();
            assert!(scheduler.has_pending_work());
        }
        assert!(!scheduler.has_pending_work());
        scheduler.tick_at(16.0);
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let scheduler = FrameScheduler::manual();
        let config = TransitionConfig::default().with_delay(100.0);
        let mut value = AnimatedNumber::new(scheduler.handle(), 0.0, config).unwrap();

        value.set_target(5.0).unwrap();
        value.dispose();
        value.dispose();

        assert!(!scheduler.has_pending_work());
        assert!(!value.is_animating());
        assert_eq!(value.get(), value.target());
    }

    #[test]
    fn test_snap_to_target() {
        let scheduler = FrameScheduler::manual();
        let mut value =
            AnimatedNumber::new(scheduler.handle(), 0.0, TransitionConfig::default()).unwrap();

        value.set_target(42.0).unwrap();
        scheduler.tick_at(0.0);
        value.snap_to_target();
        assert_eq!(value.get(), 42.0);
        assert!(!scheduler.has_pending_work());
    }

    #[test]
    fn test_dropped_scheduler_stalls_motion() {
        let scheduler = FrameScheduler::manual();
        let handle = scheduler.handle();
        drop(scheduler);

        let mut value = AnimatedNumber::new(handle, 0.0, TransitionConfig::default()).unwrap();
        assert!(value.set_target(10.0).unwrap());
        assert!(value.is_animating());
        assert_eq!(value.get(), 0.0);
    }

    #[test]
    fn test_invalid_target_rejected() {
        let scheduler = FrameScheduler::manual();
        let mut value =
            AnimatedNumber::new(scheduler.handle(), 1.0, TransitionConfig::default()).unwrap();

        assert!(matches!(
            value.set_target(f64::NEG_INFINITY),
            Err(AnimationError::InvalidTarget(_))
        ));
        assert!(!scheduler.has_pending_work());
        assert_eq!(value.get(), 1.0);
    }
}
