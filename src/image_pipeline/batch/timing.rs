use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct StepTiming {
    pub name: &'static str,
    pub duration: Duration,
}

/// Per-stage durations recorded while a single job runs.
#[derive(Debug, Clone, Default)]
pub struct PipelineTimings {
    steps: Vec<StepTiming>,
}

impl PipelineTimings {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn add_step(&mut self, name: &'static str, duration: Duration) {
        self.steps.push(StepTiming { name, duration });
    }

    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(|s| s.duration).sum()
    }

    pub fn get_step(&self, name: &str) -> Option<Duration> {
        self.steps
            .iter()
            .filter(|s| s.name == name)
            .map(|s| s.duration)
            .reduce(|a, b| a + b)
    }

    pub fn steps(&self) -> &[StepTiming] {
        &self.steps
    }

    /// One-line `name=1.234ms` listing for log output.
    pub fn summary(&self) -> String {
        self.steps
            .iter()
            .map(|s| format!("{}={:.3}ms", s.name, s.duration.as_secs_f64() * 1000.0))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub struct Timer {
    start: Instant,
    name: &'static str,
}

impl Timer {
    pub fn start(name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            name,
        }
    }

    pub fn stop(self) -> (&'static str, Duration) {
        (self.name, self.start.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_accumulate() {
        let mut timings = PipelineTimings::new();
        timings.add_step("decode", Duration::from_millis(3));
        timings.add_step("encode", Duration::from_millis(5));
        timings.add_step("decode", Duration::from_millis(1));

        assert_eq!(timings.steps().len(), 3);
        assert_eq!(timings.get_step("decode"), Some(Duration::from_millis(4)));
        assert_eq!(timings.get_step("write_output"), None);
        assert_eq!(timings.total_duration(), Duration::from_millis(9));
        assert!(timings.summary().starts_with("decode=3.000ms"));
    }

    #[test]
    fn test_timer_reports_name() {
        let (name, _) = Timer::start("read_source").stop();
        assert_eq!(name, "read_source");
    }
}
