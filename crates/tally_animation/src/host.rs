//! Host scheduling contract
//!
//! A [`Transition`](crate::Transition) never schedules work on its own. It asks
//! a host for one frame callback or one delay timer at a time, and hands
//! back the ids it owns when it needs them cancelled. The host is
//! responsible for calling `Transition::on_frame` / `Transition::on_delay_elapsed`
//! with those ids when the work fires.

use crate::scheduler::{FrameRequestId, TimerId};

/// Scheduling services a transition depends on
pub trait MotionHost {
    /// Request a callback on the next display refresh
    ///
    /// Returns `None` when the host can no longer schedule work.
    fn request_frame(&mut self) -> Option<FrameRequestId>;

    /// Cancel a frame request. Unknown ids are ignored.
    fn cancel_frame(&mut self, id: FrameRequestId);

    /// Request a one-shot callback after `delay_ms` milliseconds
    ///
    /// Returns `None` when the host can no longer schedule work.
    fn request_delay(&mut self, delay_ms: f64) -> Option<TimerId>;

    /// Cancel a delay timer. Unknown ids are ignored.
    fn cancel_delay(&mut self, id: TimerId);
}
