use std::time::Duration;

use crate::animation::clock::Clock;
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{FlightError, FlightResult};
use crate::foundation::math::clamp01;

const PROGRESS_EPSILON: f64 = 1e-9;

/// Timing inputs for one animation pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timeline {
    /// Capture rate.
    pub fps: Fps,
    /// Seconds from progress 0 to progress 1.
    pub duration_secs: f64,
    /// Extra time the final image is held after progress reaches 1.
    pub trailing_delay: Duration,
    /// `true` when there is nothing to travel (zero total length): progress is 1 from the start.
    pub instant: bool,
}

impl Timeline {
    /// Validate the timing inputs.
    pub fn validate(&self) -> FlightResult<()> {
        if !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            return Err(FlightError::validation(
                "animation duration must be finite and > 0",
            ));
        }
        Ok(())
    }

    /// Frames emitted with a fixed clock, hold frames included.
    pub fn offline_frame_count(&self) -> u64 {
        let animated = if self.instant {
            1
        } else {
            self.fps.secs_to_frames_ceil(self.duration_secs) + 1
        };
        animated + self.hold_frames()
    }

    fn hold_frames(&self) -> u64 {
        self.fps.secs_to_frames_floor(self.trailing_delay.as_secs_f64())
    }
}

/// Driver lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    /// Producing frames with increasing progress.
    Running,
    /// Final image produced; repeating it for the trailing delay.
    Holding,
    /// Terminal.
    Stopped,
}

/// What the caller should do next.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Tick {
    /// Render and emit the frame for `progress`.
    Frame {
        /// Output frame index.
        index: FrameIndex,
        /// Progress in `0..=1`.
        progress: f64,
    },
    /// Emit the final image again.
    Hold {
        /// Output frame index.
        index: FrameIndex,
    },
    /// Animation finished; no more frames.
    Stopped,
}

/// Requests frames at the capture rate and maps elapsed time to progress.
///
/// Frame `i` is due at `i / fps`. Progress only increases, the frame at progress 1 is always
/// emitted, and the driver stops after the trailing hold.
pub struct AnimationDriver<C: Clock> {
    clock: C,
    timeline: Timeline,
    state: DriverState,
    next: u64,
    holds_left: u64,
}

impl<C: Clock> AnimationDriver<C> {
    /// Driver over `clock`.
    pub fn new(clock: C, timeline: Timeline) -> FlightResult<Self> {
        timeline.validate()?;
        Ok(Self {
            clock,
            timeline,
            state: DriverState::Running,
            next: 0,
            holds_left: timeline.hold_frames(),
        })
    }

    /// Current state.
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Frames handed out so far.
    pub fn frames_emitted(&self) -> u64 {
        self.next
    }

    /// Stop early; later ticks return [`Tick::Stopped`].
    pub fn stop(&mut self) {
        self.state = DriverState::Stopped;
    }

    /// Wait for the next frame deadline and report what to draw.
    pub fn tick(&mut self) -> Tick {
        match self.state {
            DriverState::Stopped => Tick::Stopped,
            DriverState::Running => {
                let index = self.wait_for_next();
                let progress = if self.timeline.instant {
                    1.0
                } else {
                    let elapsed = self.clock.now().as_secs_f64();
                    let raw = clamp01(elapsed / self.timeline.duration_secs);
                    // Nanosecond rounding of the deadline must not cost an extra frame.
                    if raw >= 1.0 - PROGRESS_EPSILON { 1.0 } else { raw }
                };
                if progress >= 1.0 {
                    self.state = if self.holds_left > 0 {
                        DriverState::Holding
                    } else {
                        DriverState::Stopped
                    };
                    tracing::debug!(frames = self.next, "animation reached the destination");
                }
                Tick::Frame { index, progress }
            }
            DriverState::Holding => {
                let index = self.wait_for_next();
                self.holds_left = self.holds_left.saturating_sub(1);
                if self.holds_left == 0 {
                    self.state = DriverState::Stopped;
                }
                Tick::Hold { index }
            }
        }
    }

    fn wait_for_next(&mut self) -> FrameIndex {
        let index = self.next;
        let deadline = Duration::from_secs_f64(self.timeline.fps.frames_to_secs(index));
        self.clock.wait_until(deadline);
        self.next += 1;
        FrameIndex(index)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/driver.rs"]
mod tests;
