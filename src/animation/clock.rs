use std::time::{Duration, Instant};

/// Time source for the animation driver.
pub trait Clock: Send {
    /// Time elapsed since the clock started.
    fn now(&mut self) -> Duration;
    /// Block until at least `deadline` has elapsed since the clock started.
    fn wait_until(&mut self, deadline: Duration);
}

/// Deterministic clock for offline capture: waiting jumps straight to the deadline.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameClock {
    now: Duration,
}

impl FrameClock {
    /// Clock starting at zero.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for FrameClock {
    fn now(&mut self) -> Duration {
        self.now
    }

    fn wait_until(&mut self, deadline: Duration) {
        self.now = self.now.max(deadline);
    }
}

/// Wall clock that sleeps until each deadline.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    /// Clock starting now.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&mut self) -> Duration {
        self.start.elapsed()
    }

    fn wait_until(&mut self, deadline: Duration) {
        let elapsed = self.start.elapsed();
        if deadline > elapsed {
            std::thread::sleep(deadline - elapsed);
        }
    }
}

/// How frames are paced during capture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Pacing {
    /// Render as fast as possible with exact frame timestamps.
    #[default]
    Offline,
    /// Render in step with the wall clock.
    Realtime,
}

impl Pacing {
    /// Fresh clock for one pass.
    pub fn clock(self) -> Box<dyn Clock> {
        match self {
            Self::Offline => Box::new(FrameClock::new()),
            Self::Realtime => Box::new(MonotonicClock::new()),
        }
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&mut self) -> Duration {
        (**self).now()
    }

    fn wait_until(&mut self, deadline: Duration) {
        (**self).wait_until(deadline)
    }
}
