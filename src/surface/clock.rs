use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Time source for a render surface.
pub trait Clock {
    /// Time elapsed since the surface was mounted.
    fn elapsed(&self) -> Duration;
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(at: Duration) -> Self {
        let clock = Self::new();
        clock.set(at);
        clock
    }

    pub fn set(&self, at: Duration) {
        self.now.set(at);
    }

    #[cfg(test)]
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn elapsed(&self) -> Duration {
        self.now.get()
    }
}

/// Wall clock that stops while paused and resumes where it left off.
pub struct PausableClock {
    start: Instant,
    paused_at: Option<Instant>,
    paused_total: Duration,
}

impl PausableClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            paused_at: None,
            paused_total: Duration::ZERO,
        }
    }

    pub fn set_paused(&mut self, paused: bool) {
        match (paused, self.paused_at) {
            (true, None) => self.paused_at = Some(Instant::now()),
            (false, Some(at)) => {
                self.paused_total += at.elapsed();
                self.paused_at = None;
            }
            _ => {}
        }
    }
}

impl Clock for PausableClock {
    fn elapsed(&self) -> Duration {
        let end = self.paused_at.unwrap_or_else(Instant::now);
        end.saturating_duration_since(self.start)
            .saturating_sub(self.paused_total)
    }
}
