/// Fixed timestep accumulator for sequences created with a fixed time step.
/// Frame time is banked until it covers whole steps; only whole steps are
/// released to the sequence, so playback speed does not depend on frame rate.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    /// The fixed delta time per step.
    dt: f32,
    /// Banked frame time not yet released.
    accumulator: f32,
    /// Upper bound on steps released by one frame.
    max_steps: u32,
}

impl FixedTimestep {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
            max_steps: 10,
        }
    }

    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        if self.dt <= 0.0 {
            return 0;
        }
        self.accumulator += frame_dt;
        // Cap so a long stall does not release an unbounded burst.
        self.accumulator = self.accumulator.min(self.dt * self.max_steps as f32);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }

    /// Time released for this frame: whole steps only.
    pub fn release(&mut self, frame_dt: f32) -> f32 {
        self.accumulate(frame_dt) as f32 * self.dt
    }

    /// The fixed delta time.
    pub fn dt(&self) -> f32 {
        self.dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_step_exact() {
        let mut ts = FixedTimestep::new(0.25);
        assert_eq!(ts.accumulate(0.25), 1);
    }

    #[test]
    fn accumulates_partial() {
        let mut ts = FixedTimestep::new(0.25);
        assert_eq!(ts.accumulate(0.125), 0);
        assert_eq!(ts.accumulate(0.25), 1);
    }

    #[test]
    fn caps_burst() {
        let mut ts = FixedTimestep::new(0.25).with_max_steps(4);
        assert_eq!(ts.accumulate(100.0), 4);
    }

    #[test]
    fn release_is_whole_steps() {
        let mut ts = FixedTimestep::new(0.5);
        assert_eq!(ts.release(1.25), 1.0);
        assert_eq!(ts.release(0.25), 0.5);
    }

    #[test]
    fn zero_step_never_releases() {
        let mut ts = FixedTimestep::new(0.0);
        assert_eq!(ts.accumulate(1.0), 0);
    }
}
