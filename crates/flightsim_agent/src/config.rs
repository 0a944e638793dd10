//! Agent configuration.

use std::time::Duration;

use flightsim_data::WorkerKind;

/// The default sleep between polls of the step-sync signal.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_micros(150);

/// Configuration for one worker thread.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Unique worker id; also the key of the agent's event queue.
    pub thread_id: String,
    /// Human-readable worker name.
    pub name: String,
    /// Worker kind recorded in the thread registry.
    pub kind: WorkerKind,
    /// Worker ids that must have completed the current step before this
    /// worker starts it. Used to order the event pipeline (monitor →
    /// dispatcher → agents) within a step.
    pub wait_for: Vec<String>,
    /// Sleep between polls of the sync signal.
    pub poll_interval: Duration,
}

impl AgentConfig {
    /// Create a config with the default poll interval and no predecessors.
    #[must_use]
    pub fn new(thread_id: impl Into<String>, name: impl Into<String>, kind: WorkerKind) -> Self {
        Self {
            thread_id: thread_id.into(),
            name: name.into(),
            kind,
            wait_for: Vec::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Require the given workers to complete each step before this one runs
    /// it.
    #[must_use]
    pub fn with_wait_for<I, S>(mut self, predecessors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.wait_for = predecessors.into_iter().map(Into::into).collect();
        self
    }

    /// Override the poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = AgentConfig::new("Pilot_001", "pilot", WorkerKind::Pilot);
        assert_eq!(config.thread_id, "Pilot_001");
        assert_eq!(config.poll_interval, DEFAULT_POLL_INTERVAL);
        assert!(config.wait_for.is_empty());
    }

    #[test]
    fn test_with_wait_for() {
        let config = AgentConfig::new("Pilot_001", "pilot", WorkerKind::Pilot)
            .with_wait_for(["dispatcher"]);
        assert_eq!(config.wait_for, vec!["dispatcher".to_string()]);
    }
}
