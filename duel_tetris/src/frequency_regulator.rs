/// Spreads `events` evenly over every `steps` ticks
///
/// Events land at the end of their share of the period: with
/// `FrequencyRegulator::new(1, 32)` the first event comes on the 32nd call to
/// `step()`, then every 32 calls after that.
#[derive(Debug, Clone)]
pub struct FrequencyRegulator {
    events: usize,
    steps: usize,
    current_step: usize,
    events_generated: usize,
}

impl FrequencyRegulator {
    /// `steps` below 1 is treated as 1
    pub fn new(events: usize, steps: usize) -> Self {
        FrequencyRegulator {
            events,
            steps: steps.max(1),
            current_step: 0,
            events_generated: 0,
        }
    }

    /// Number of events due on this tick
    pub fn step(&mut self) -> usize {
        let due = self.events * (self.current_step + 1) / self.steps - self.events_generated;

        self.events_generated += due;
        self.current_step = (self.current_step + 1) % self.steps;
        if self.current_step == 0 {
            self.events_generated = 0;
        }

        due
    }
}
