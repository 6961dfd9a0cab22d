use log::{info, trace};

/// Fixed timestep accumulator for playing a dataset back at its sample rate
/// from a loop that runs at some other rate.
///
/// Each `tick` adds the elapsed wall clock time. Once a whole step has built
/// up, one step is taken off and the tick reports that a frame is due. The
/// remainder carries over so a slow tick is caught up on following ticks
/// instead of being dropped, but no single tick ever reports more than one
/// frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameClock {
    pub step: f32,
    pub accumulator: f32,
    /// Frames reported due so far
    pub frames_taken: usize,
}

impl FrameClock {
    /// Clock stepping at `sample_rate` frames per second
    #[must_use]
    pub fn new(sample_rate: f32) -> Self {
        let step = if sample_rate > 0.0 {
            1.0 / sample_rate
        } else {
            0.0
        };
        info!("Frame step set to {} s", step);
        Self {
            step,
            accumulator: 0.0,
            frames_taken: 0,
        }
    }

    /// Adds `elapsed` seconds and returns `true` if a frame should be
    /// advanced now
    pub fn tick(&mut self, elapsed: f32) -> bool {
        if self.step <= 0.0 {
            return false;
        }
        self.accumulator += elapsed.max(0.0);
        let due = self.accumulator >= self.step;
        if due {
            self.accumulator -= self.step;
            self.frames_taken += 1;
        }
        trace!(
            "tick elapsed={} accumulator={} due={} frames_taken={}",
            elapsed,
            self.accumulator,
            due,
            self.frames_taken
        );
        due
    }

    /// Drops any accumulated time
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::FrameClock;

    #[test]
    fn one_frame_per_step() {
        let mut clock = FrameClock::new(20.0);
        assert!(!clock.tick(0.03));
        assert!(clock.tick(0.03));
        assert!((clock.accumulator - 0.01).abs() < 1e-5);
    }

    #[test]
    fn slow_tick_carries_over() {
        let mut clock = FrameClock::new(10.0);
        // A 0.35 s hitch still only advances one frame now
        assert!(clock.tick(0.35));
        // and the rest is caught up on the next ticks
        assert!(clock.tick(0.0));
        assert!(clock.tick(0.0));
        assert!(!clock.tick(0.0));
        assert_eq!(clock.frames_taken, 3);
        assert!((clock.accumulator - 0.05).abs() < 1e-5);
    }

    #[test]
    fn no_rate_never_due() {
        let mut clock = FrameClock::new(0.0);
        assert!(!clock.tick(100.0));
        clock.reset();
        assert!(clock.accumulator.abs() < f32::EPSILON);
    }
}
