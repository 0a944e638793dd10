//! Run performance statistics.
//!
//! Wall-clock accounting for the whole run plus an optional per-step timing
//! sample fed by the flight-dynamics agent. Logged once at shutdown.

use std::time::{Duration, Instant};

/// Accumulated timing of a repeatedly sampled operation.
#[derive(Debug, Clone, Default)]
pub struct StepTiming {
    samples: u64,
    total: Duration,
    max: Duration,
}

impl StepTiming {
    pub fn record(&mut self, elapsed: Duration) {
        self.samples += 1;
        self.total += elapsed;
        if elapsed > self.max {
            self.max = elapsed;
        }
    }

    #[must_use]
    pub fn samples(&self) -> u64 {
        self.samples
    }

    #[must_use]
    pub fn average(&self) -> Duration {
        if self.samples == 0 {
            Duration::ZERO
        } else {
            self.total / self.samples as u32
        }
    }

    #[must_use]
    pub fn max(&self) -> Duration {
        self.max
    }
}

/// Wall-clock accounting for one simulation run.
#[derive(Debug, Default)]
pub struct SimPerformance {
    started: Option<Instant>,
    finished: Option<Instant>,
}

impl SimPerformance {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.started = Some(Instant::now());
    }

    pub fn finish(&mut self) {
        self.finished = Some(Instant::now());
    }

    /// Elapsed wall time between start and finish (or now, if still
    /// running).
    #[must_use]
    pub fn wall_time(&self) -> Duration {
        match self.started {
            Some(started) => self.finished.unwrap_or_else(Instant::now) - started,
            None => Duration::ZERO,
        }
    }

    /// A formatted end-of-run summary.
    #[must_use]
    pub fn report(&self, sim_time: f64, time_step: f64, steps: u64) -> String {
        use std::fmt::Write;

        let wall = self.wall_time().as_secs_f64();
        let realtime_factor = if wall > 0.0 { sim_time / wall } else { 0.0 };
        let avg_step_us = if steps > 0 {
            wall * 1e6 / steps as f64
        } else {
            0.0
        };

        let mut out = String::new();
        let _ = writeln!(out, "simulation performance");
        let _ = writeln!(out, "  simulated time:  {sim_time:.3}s ({steps} steps of {time_step}s)");
        let _ = writeln!(out, "  wall time:       {wall:.3}s");
        let _ = writeln!(out, "  realtime factor: {realtime_factor:.2}x");
        let _ = writeln!(out, "  avg step wall:   {avg_step_us:.1}us");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_timing_accumulates() {
        let mut timing = StepTiming::default();
        timing.record(Duration::from_micros(10));
        timing.record(Duration::from_micros(30));
        assert_eq!(timing.samples(), 2);
        assert_eq!(timing.average(), Duration::from_micros(20));
        assert_eq!(timing.max(), Duration::from_micros(30));
    }

    #[test]
    fn test_empty_timing_is_zero() {
        let timing = StepTiming::default();
        assert_eq!(timing.average(), Duration::ZERO);
        assert_eq!(timing.max(), Duration::ZERO);
    }

    #[test]
    fn test_performance_report_contents() {
        let mut perf = SimPerformance::new();
        perf.start();
        perf.finish();
        let report = perf.report(20.0, 0.01, 2000);
        assert!(report.contains("2000 steps"));
        assert!(report.contains("realtime factor"));
    }
}
