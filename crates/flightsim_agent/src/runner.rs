//! Agent runner — the worker-loop harness.
//!
//! The runner owns the whole worker lifecycle:
//!
//! 1. Register with the shared data space (an id conflict is fatal for this
//!    worker only — it logs and exits, the simulation continues).
//! 2. Run the step-0 initial pass and publish derived initial state.
//! 3. Per step: edge-triggered wait, drain the agent's event queue, update,
//!    smoothing tick, mark completed, wait for the edge to fall.
//! 4. Unregister on the way out.
//!
//! Every wait polls with a short sleep and checks the shutdown cue each
//! iteration, so workers exit within a couple of poll intervals of
//! `over = true`.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, error, info};
use uuid::Uuid;

use flightsim_data::SharedDataSpace;
use flightsim_data::queues::AgentEventItem;

use crate::config::AgentConfig;
use crate::context::AgentContext;

/// Per-step behavior plugged into the worker loop.
///
/// The runner calls the hooks in a fixed order each step: queued events
/// first, then `update`, then the smoothing tick. Publishing cells is the
/// behavior's job, with `data_source` derived via
/// [`AgentContext::source_tag`].
pub trait AgentBehavior: Send {
    /// Step-0 pass, run once right after registration. The default derives
    /// initial outputs by running a zero-dt update.
    fn initial_update(&mut self, ctx: &AgentContext) {
        self.update(ctx);
    }

    /// One fixed step of work.
    fn update(&mut self, ctx: &AgentContext);

    /// React to one event routed to this agent. The default ignores it.
    fn handle_event(&mut self, ctx: &AgentContext, item: &AgentEventItem) {
        debug!(
            agent = ctx.agent_id,
            event = item.event.name,
            "event ignored by agent"
        );
    }

    /// Slow-smoothing hook (e.g. throttle ramps), run after `update`.
    fn tick_smoothing(&mut self, _ctx: &AgentContext) {}
}

/// Spawns an [`AgentBehavior`] as a barrier-synchronized worker thread.
#[derive(Debug)]
pub struct AgentRunner {
    config: AgentConfig,
    sds: Arc<SharedDataSpace>,
    instance_id: String,
}

impl AgentRunner {
    #[must_use]
    pub fn new(config: AgentConfig, sds: Arc<SharedDataSpace>) -> Self {
        Self {
            config,
            sds,
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// The unique instance id of this runner (distinct from the worker id).
    #[must_use]
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Spawn the worker thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS refuses to spawn the thread.
    pub fn spawn<B>(self, behavior: B) -> std::io::Result<JoinHandle<()>>
    where
        B: AgentBehavior + 'static,
    {
        let thread_name = self.config.thread_id.clone();
        thread::Builder::new()
            .name(thread_name)
            .spawn(move || worker_loop(self.config, self.sds, self.instance_id, behavior))
    }
}

fn worker_loop<B: AgentBehavior>(
    config: AgentConfig,
    sds: Arc<SharedDataSpace>,
    instance_id: String,
    mut behavior: B,
) {
    let id = config.thread_id.as_str();

    if !sds.register_thread(id, &config.name, config.kind.clone()) {
        error!(
            worker = id,
            instance = instance_id,
            "worker id already registered; this worker exits"
        );
        return;
    }
    sds.create_agent_queue(id);
    info!(worker = id, kind = %config.kind, instance = instance_id, "worker registered");

    // Step-0 initial pass: derive and publish initial state before the
    // first edge. The registry shows the full WAITING→RUNNING→COMPLETED
    // cycle for step 0 so startup can observe readiness.
    sds.registry().begin_step(id, 0);
    behavior.initial_update(&AgentContext::initial(sds.clone(), id));
    sds.registry().complete_step(id);

    let mut last_step: u64 = 0;

    'run: loop {
        sds.registry().set_waiting(id);

        // Edge-triggered wait for a new step whose predecessors are done.
        let step = loop {
            if sds.is_simulation_over() {
                break 'run;
            }
            let signal = sds.sync_signal();
            if signal.step_ready
                && signal.current_step != last_step
                && config
                    .wait_for
                    .iter()
                    .all(|pred| sds.registry().completed_for(pred, signal.current_step))
            {
                break signal.current_step;
            }
            thread::sleep(config.poll_interval);
        };

        last_step = step;
        sds.registry().begin_step(id, step);
        let ctx = AgentContext::for_step(sds.clone(), id, step);

        while let Some(item) = sds.dequeue_agent_event(id) {
            behavior.handle_event(&ctx, &item);
        }
        behavior.update(&ctx);
        behavior.tick_smoothing(&ctx);

        sds.registry().complete_step(id);

        // Wait for the edge to fall (or for the next step's edge, if the
        // clock is faster than our poll).
        loop {
            if sds.is_simulation_over() {
                break 'run;
            }
            let signal = sds.sync_signal();
            if !signal.step_ready || signal.current_step != step {
                break;
            }
            thread::sleep(config.poll_interval);
        }
    }

    sds.unregister_thread(id);
    debug!(worker = id, last_step, "worker exited");
}

/// Block until the worker has finished its step-0 pass and is waiting for
/// the clock, or until the timeout expires. Returns whether it became ready.
#[must_use]
pub fn wait_for_ready(sds: &SharedDataSpace, thread_id: &str, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if let Some(entry) = sds.registry().get(thread_id)
            && entry.last_step == Some(0)
            && entry.state == flightsim_data::WorkerState::WaitingForClock
        {
            return true;
        }
        thread::sleep(Duration::from_micros(200));
    }
    false
}
