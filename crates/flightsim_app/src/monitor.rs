//! Event monitor.
//!
//! Once per step the monitor evaluates every planned event's trigger
//! expression against the current state snapshot. Firing is monotone: an
//! event fires at most once per run. On fire the event is recorded in the
//! step-indexed triggered library, enqueued on the global event queue, and
//! counted in the trigger statistics.
//!
//! The monitor is an ordinary worker thread; it runs first in the per-step
//! pipeline (the dispatcher waits for it).

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

use tracing::info;

use flightsim_agent::{AgentBehavior, AgentContext};
use flightsim_data::StandardEvent;

use crate::trigger::{self, EvalContext};

/// Aggregate trigger statistics, kept for the end-of-run report.
#[derive(Debug, Clone, Default)]
pub struct TriggerStatistics {
    /// Number of planned events, captured on the first poll.
    pub total_events: usize,
    /// Number of events that have fired.
    pub triggered_events: usize,
    /// Simulation time of the first firing.
    pub first_trigger_time: Option<f64>,
    /// Simulation time of the most recent firing.
    pub last_trigger_time: Option<f64>,
    /// Firing counts keyed by condition type.
    pub by_condition_type: BTreeMap<String, usize>,
}

impl TriggerStatistics {
    fn record(&mut self, event: &StandardEvent, t: f64) {
        self.triggered_events += 1;
        self.first_trigger_time.get_or_insert(t);
        self.last_trigger_time = Some(t);
        let kind = trigger::condition_type(&event.trigger_condition.expression);
        *self.by_condition_type.entry(kind.to_string()).or_default() += 1;
    }

    /// A formatted end-of-run report.
    #[must_use]
    pub fn report(&self) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        let _ = writeln!(out, "event monitor report");
        let _ = writeln!(out, "  planned events:   {}", self.total_events);
        let _ = writeln!(out, "  triggered events: {}", self.triggered_events);
        if let (Some(first), Some(last)) = (self.first_trigger_time, self.last_trigger_time) {
            let _ = writeln!(out, "  first trigger:    {first:.3}s");
            let _ = writeln!(out, "  last trigger:     {last:.3}s");
        }
        for (kind, count) in &self.by_condition_type {
            let _ = writeln!(out, "  {kind}: {count}");
        }
        out
    }
}

/// The event monitor worker behavior.
pub struct EventMonitor {
    fired: HashSet<u64>,
    stats: Arc<Mutex<TriggerStatistics>>,
}

impl EventMonitor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            fired: HashSet::new(),
            stats: Arc::new(Mutex::new(TriggerStatistics::default())),
        }
    }

    /// Shared handle to the statistics, readable after the monitor thread
    /// has exited.
    #[must_use]
    pub fn stats_handle(&self) -> Arc<Mutex<TriggerStatistics>> {
        self.stats.clone()
    }

    fn poll(&mut self, ctx: &AgentContext) {
        let sds = ctx.sds();
        let planned = sds.planned_events();

        {
            let mut stats = self.stats.lock().expect("monitor stats poisoned");
            if stats.total_events == 0 {
                stats.total_events = planned.len();
            }
        }

        let flight = sds.flight_state().value;
        let atc = sds.atc_command().value;
        let eval = EvalContext::from_cells(ctx.t, &flight, &atc);

        for event in planned {
            if self.fired.contains(&event.id) {
                continue;
            }
            if trigger::evaluate(&event.trigger_condition.expression, &eval) {
                self.fire(ctx, event);
            }
        }
    }

    fn fire(&mut self, ctx: &AgentContext, event: StandardEvent) {
        self.fired.insert(event.id);
        info!(
            step = ctx.step,
            t = ctx.t,
            id = event.id,
            event = event.name,
            condition = event.trigger_condition.expression,
            "event triggered"
        );

        ctx.sds().add_event_to_step(ctx.step, event.clone());
        self.stats
            .lock()
            .expect("monitor stats poisoned")
            .record(&event, ctx.t);
        ctx.sds().enqueue_event(event, ctx.t, "event_monitor");
    }
}

impl Default for EventMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBehavior for EventMonitor {
    /// No event may fire before the first work step.
    fn initial_update(&mut self, _ctx: &AgentContext) {}

    fn update(&mut self, ctx: &AgentContext) {
        self.poll(ctx);
    }
}
