use std::time::{Duration, Instant};

pub const DEFAULT_FPS: u32 = 60;

/// Fixed-rate frame deadline, standing in for a display refresh callback.
///
/// The simulation does not read elapsed time from here; each frame is exactly
/// one tick no matter how late it fires.
#[derive(Debug)]
pub struct FrameClock {
    period: Duration,
    next: Instant,
}

impl FrameClock {
    pub fn new(fps: u32) -> Self {
        let period = Duration::from_secs(1) / fps.max(1);
        Self {
            period,
            next: Instant::now() + period,
        }
    }

    #[cfg(test)]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Time left before the next frame is due.
    pub fn remaining(&self) -> Duration {
        self.next.saturating_duration_since(Instant::now())
    }

    /// Moves the deadline one period ahead. A clock that fell behind skips
    /// the missed frames instead of bursting to catch up.
    pub fn advance(&mut self) {
        let now = Instant::now();
        self.next += self.period;
        if self.next <= now {
            self.next = now + self.period;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn period_follows_frame_rate() {
        assert_eq!(FrameClock::new(50).period(), Duration::from_millis(20));
        assert_eq!(FrameClock::new(0).period(), Duration::from_secs(1));
    }

    #[test]
    fn remaining_never_exceeds_a_period() {
        let mut clock = FrameClock::new(100);
        assert!(clock.remaining() <= clock.period());
        clock.advance();
        assert!(clock.remaining() <= clock.period() * 2);
    }

    #[test]
    fn late_clock_skips_missed_frames() {
        let mut clock = FrameClock::new(1000);
        sleep(Duration::from_millis(10));
        clock.advance();
        assert!(clock.remaining() <= clock.period());
    }
}
