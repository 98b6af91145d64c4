//! Frame scheduler
//!
//! Host-side scheduling for transitions: one-shot "next frame" callbacks and
//! one-shot timers. The scheduler can be ticked manually (tests, traces,
//! hosts with their own frame clock) or from a background thread at a fixed
//! frame rate.
//!
//! Each tick runs in two phases:
//! 1. every timer whose deadline has passed fires
//! 2. every frame request pending at that point fires, with the tick timestamp
//!
//! Frame requests made from inside a frame callback wait for the next tick.
//! Callbacks always run with the scheduler lock released, so they may
//! schedule or cancel work freely.

use slotmap::{new_key_type, SlotMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::lock;

new_key_type! {
    /// Handle to a pending frame request
    pub struct FrameRequestId;
    /// Handle to a pending one-shot timer
    pub struct TimerId;
}

/// Callback run on the next frame with its own id and the frame timestamp (ms)
pub type FrameCallback = Box<dyn FnOnce(FrameRequestId, f64) + Send>;

/// Callback run when a timer fires with its own id and the tick timestamp (ms)
pub type TimerCallback = Box<dyn FnOnce(TimerId, f64) + Send>;

/// Callback type for waking up the main thread from the scheduler thread
///
/// Called when a background tick ran callbacks, so the host can redraw.
pub type WakeCallback = Arc<dyn Fn() + Send + Sync>;

/// Default background frame rate
const DEFAULT_FPS: u32 = 60;

enum Clock {
    /// Milliseconds since the scheduler was created
    Monotonic(Instant),
    /// Time only moves when `tick_at` is called
    Manual,
}

struct PendingTimer {
    deadline_ms: f64,
    callback: TimerCallback,
}

/// Internal state of the frame scheduler
struct SchedulerInner {
    frames: SlotMap<FrameRequestId, FrameCallback>,
    timers: SlotMap<TimerId, PendingTimer>,
    clock: Clock,
    /// Timestamp of the latest tick
    last_tick_ms: f64,
}

impl SchedulerInner {
    fn now_ms(&self) -> f64 {
        match self.clock {
            Clock::Monotonic(epoch) => epoch.elapsed().as_secs_f64() * 1000.0,
            Clock::Manual => self.last_tick_ms,
        }
    }

    fn has_pending(&self) -> bool {
        !self.frames.is_empty() || !self.timers.is_empty()
    }
}

/// Run one tick against shared scheduler state
///
/// Returns the number of callbacks invoked and whether work is still pending.
fn run_tick(inner: &Mutex<SchedulerInner>, now_ms: Option<f64>) -> (usize, bool) {
    let (now, due_timers) = {
        let mut guard = lock(inner);
        let now = now_ms.unwrap_or_else(|| guard.now_ms());
        guard.last_tick_ms = guard.last_tick_ms.max(now);

        let mut due: Vec<(TimerId, f64)> = guard
            .timers
            .iter()
            .filter(|(_, timer)| timer.deadline_ms <= now)
            .map(|(id, timer)| (id, timer.deadline_ms))
            .collect();
        due.sort_by(|a, b| a.1.total_cmp(&b.1));

        let due: Vec<(TimerId, TimerCallback)> = due
            .into_iter()
            .filter_map(|(id, _)| guard.timers.remove(id).map(|t| (id, t.callback)))
            .collect();
        (now, due)
    };

    let mut invoked = due_timers.len();
    for (id, callback) in due_timers {
        callback(id, now);
    }

    let frames: Vec<(FrameRequestId, FrameCallback)> = lock(inner).frames.drain().collect();
    invoked += frames.len();
    for (id, callback) in frames {
        callback(id, now);
    }

    if invoked > 0 {
        tracing::trace!(now, invoked, "Frame scheduler tick");
    }

    (invoked, lock(inner).has_pending())
}

/// Per-frame callback source and one-shot timer service
///
/// Hand out [`SchedulerHandle`]s to the values that need scheduling; the
/// handles don't keep the scheduler alive.
///
/// # Background Thread Mode
///
/// ```ignore
/// let mut scheduler = FrameScheduler::new();
/// scheduler.set_wake_callback(|| request_redraw());
/// scheduler.start_background(60);
/// ```
pub struct FrameScheduler {
    inner: Arc<Mutex<SchedulerInner>>,
    /// Stop signal for background thread
    stop_flag: Arc<AtomicBool>,
    /// Set by the background thread when a tick ran callbacks
    needs_redraw: Arc<AtomicBool>,
    /// Background thread handle (if running)
    thread_handle: Option<JoinHandle<()>>,
    /// Optional callback to wake up the main thread
    wake_callback: Option<WakeCallback>,
}

impl FrameScheduler {
    /// Scheduler driven by a monotonic clock starting at 0ms
    pub fn new() -> Self {
        Self::with_clock(Clock::Monotonic(Instant::now()))
    }

    /// Scheduler whose time only advances through [`tick_at`](Self::tick_at)
    pub fn manual() -> Self {
        Self::with_clock(Clock::Manual)
    }

    fn with_clock(clock: Clock) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SchedulerInner {
                frames: SlotMap::with_key(),
                timers: SlotMap::with_key(),
                clock,
                last_tick_ms: 0.0,
            })),
            stop_flag: Arc::new(AtomicBool::new(false)),
            needs_redraw: Arc::new(AtomicBool::new(false)),
            thread_handle: None,
            wake_callback: None,
        }
    }

    /// Set a wake callback invoked from the background thread after a tick
    /// that ran callbacks
    pub fn set_wake_callback<F>(&mut self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.wake_callback = Some(Arc::new(callback));
    }

    /// Start ticking on a background thread at `fps` frames per second
    ///
    /// Does nothing if the thread is already running. Manual schedulers are
    /// ticked with their last timestamp, so use [`new`](Self::new) here.
    pub fn start_background(&mut self, fps: u32) {
        if self.thread_handle.is_some() {
            return;
        }

        let fps = if fps == 0 { DEFAULT_FPS } else { fps };
        let frame_duration = Duration::from_micros(1_000_000 / u64::from(fps));
        let inner = Arc::clone(&self.inner);
        let stop_flag = Arc::clone(&self.stop_flag);
        let needs_redraw = Arc::clone(&self.needs_redraw);
        let wake_callback = self.wake_callback.clone();

        tracing::debug!(fps, "Starting frame scheduler thread");

        self.thread_handle = Some(thread::spawn(move || {
            while !stop_flag.load(Ordering::Relaxed) {
                let start = Instant::now();

                let (invoked, _) = run_tick(&inner, None);
                if invoked > 0 {
                    needs_redraw.store(true, Ordering::Release);
                    if let Some(ref callback) = wake_callback {
                        callback();
                    }
                }

                // Sleep for remaining frame time
                let elapsed = start.elapsed();
                if elapsed < frame_duration {
                    thread::sleep(frame_duration - elapsed);
                }
            }
        }));
    }

    /// Stop the background thread
    pub fn stop_background(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
            tracing::debug!("Frame scheduler thread stopped");
        }
        self.stop_flag.store(false, Ordering::Relaxed);
    }

    pub fn is_background_running(&self) -> bool {
        self.thread_handle.is_some()
    }

    /// Check and clear the needs_redraw flag
    pub fn take_needs_redraw(&self) -> bool {
        self.needs_redraw.swap(false, Ordering::Acquire)
    }

    /// Get a handle to this scheduler for passing to animated values
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Tick at the scheduler's own clock
    ///
    /// Returns true if work is still pending.
    pub fn tick(&self) -> bool {
        run_tick(&self.inner, None).1
    }

    /// Tick at an explicit timestamp in milliseconds
    ///
    /// Returns true if work is still pending.
    pub fn tick_at(&self, now_ms: f64) -> bool {
        run_tick(&self.inner, Some(now_ms)).1
    }

    /// Current scheduler time in milliseconds
    pub fn now_ms(&self) -> f64 {
        lock(&self.inner).now_ms()
    }

    pub fn request_frame<F>(&self, callback: F) -> FrameRequestId
    where
        F: FnOnce(FrameRequestId, f64) + Send + 'static,
    {
        lock(&self.inner).frames.insert(Box::new(callback))
    }

    pub fn cancel_frame(&self, id: FrameRequestId) -> bool {
        lock(&self.inner).frames.remove(id).is_some()
    }

    pub fn set_timeout<F>(&self, delay_ms: f64, callback: F) -> TimerId
    where
        F: FnOnce(TimerId, f64) + Send + 'static,
    {
        insert_timer(&self.inner, delay_ms, Box::new(callback))
    }

    pub fn cancel_timeout(&self, id: TimerId) -> bool {
        lock(&self.inner).timers.remove(id).is_some()
    }

    /// Number of frame requests waiting for the next tick
    pub fn pending_frames(&self) -> usize {
        lock(&self.inner).frames.len()
    }

    /// Number of timers that have not fired yet
    pub fn pending_timers(&self) -> usize {
        lock(&self.inner).timers.len()
    }

    pub fn has_pending_work(&self) -> bool {
        lock(&self.inner).has_pending()
    }
}

fn insert_timer(inner: &Mutex<SchedulerInner>, delay_ms: f64, callback: TimerCallback) -> TimerId {
    let mut guard = lock(inner);
    let deadline_ms = guard.now_ms() + delay_ms.max(0.0);
    guard.timers.insert(PendingTimer {
        deadline_ms,
        callback,
    })
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for FrameScheduler {
    fn drop(&mut self) {
        self.stop_background();
    }
}

/// A weak handle to the frame scheduler
///
/// Every operation is a no-op (returning `None`/`false`) once the scheduler
/// has been dropped.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<Mutex<SchedulerInner>>,
}

impl SchedulerHandle {
    pub fn request_frame<F>(&self, callback: F) -> Option<FrameRequestId>
    where
        F: FnOnce(FrameRequestId, f64) + Send + 'static,
    {
        self.inner
            .upgrade()
            .map(|inner| lock(&inner).frames.insert(Box::new(callback)))
    }

    pub fn cancel_frame(&self, id: FrameRequestId) -> bool {
        self.inner
            .upgrade()
            .map(|inner| lock(&inner).frames.remove(id).is_some())
            .unwrap_or(false)
    }

    pub fn set_timeout<F>(&self, delay_ms: f64, callback: F) -> Option<TimerId>
    where
        F: FnOnce(TimerId, f64) + Send + 'static,
    {
        self.inner
            .upgrade()
            .map(|inner| insert_timer(&inner, delay_ms, Box::new(callback)))
    }

    pub fn cancel_timeout(&self, id: TimerId) -> bool {
        self.inner
            .upgrade()
            .map(|inner| lock(&inner).timers.remove(id).is_some())
            .unwrap_or(false)
    }

    pub fn now_ms(&self) -> Option<f64> {
        self.inner.upgrade().map(|inner| lock(&inner).now_ms())
    }

    /// Check if the scheduler is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl std::fmt::Debug for SchedulerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulerHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}
