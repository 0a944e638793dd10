//! Per-step execution context handed to agent behaviors.

use std::sync::Arc;

use flightsim_data::SharedDataSpace;

/// Context for one behavior invocation: which step is being processed, the
/// simulation time, and the shared data space.
#[derive(Clone)]
pub struct AgentContext {
    sds: Arc<SharedDataSpace>,
    /// The agent's worker id (and event-queue key).
    pub agent_id: String,
    /// The step being processed (0 for the initial pass).
    pub step: u64,
    /// Simulation time of this step, `step * time_step`.
    pub t: f64,
    /// Step size handed to `update` (0.0 for the initial pass).
    pub dt: f64,
    /// Whether this is the step-0 initial pass.
    pub initial: bool,
}

impl AgentContext {
    /// Build the context for the step-0 initial pass.
    #[must_use]
    pub fn initial(sds: Arc<SharedDataSpace>, agent_id: impl Into<String>) -> Self {
        Self {
            sds,
            agent_id: agent_id.into(),
            step: 0,
            t: 0.0,
            dt: 0.0,
            initial: true,
        }
    }

    /// Build the context for a work step.
    #[must_use]
    pub fn for_step(sds: Arc<SharedDataSpace>, agent_id: impl Into<String>, step: u64) -> Self {
        let dt = sds.time_step();
        Self {
            sds,
            agent_id: agent_id.into(),
            step,
            t: step as f64 * dt,
            dt,
            initial: false,
        }
    }

    /// The shared data space.
    #[must_use]
    pub fn sds(&self) -> &SharedDataSpace {
        &self.sds
    }

    /// The `data_source` tag for publishes from this invocation: the base
    /// name, suffixed `_initial` during the step-0 pass.
    #[must_use]
    pub fn source_tag(&self, base: &str) -> String {
        if self.initial {
            format!("{base}_initial")
        } else {
            base.to_string()
        }
    }
}

impl std::fmt::Debug for AgentContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentContext")
            .field("agent_id", &self.agent_id)
            .field("step", &self.step)
            .field("t", &self.t)
            .field("dt", &self.dt)
            .field("initial", &self.initial)
            .finish()
    }
}
