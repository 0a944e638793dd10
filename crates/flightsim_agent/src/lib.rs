//! # flightsim_agent
//!
//! The harness that turns a per-step behavior into a barrier-synchronized
//! worker thread. Each agent:
//!
//! 1. Registers with the shared data space under a unique worker id.
//! 2. Runs one initial update pass (step 0) to publish derived state.
//! 3. Loops: edge-triggered wait for a new step, drain its event queue,
//!    update, publish, mark completed, wait for the edge to fall.
//! 4. Unregisters on exit; every wait observes the shutdown cue.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use flightsim_agent::{AgentBehavior, AgentConfig, AgentContext, AgentRunner};
//! use flightsim_data::{SharedDataSpace, WorkerKind};
//!
//! struct Environment;
//!
//! impl AgentBehavior for Environment {
//!     fn update(&mut self, ctx: &AgentContext) {
//!         let state = ctx.sds().environment_state().value;
//!         ctx.sds().set_environment_state(state, &ctx.source_tag("environment_agent"));
//!     }
//! }
//!
//! let sds = Arc::new(SharedDataSpace::new(0.01));
//! let config = AgentConfig::new("Environment_001", "environment", WorkerKind::Environment);
//! let handle = AgentRunner::new(config, sds).spawn(Environment).unwrap();
//! # drop(handle);
//! ```

pub mod config;
pub mod context;
pub mod controller;
pub mod dynamics;
pub mod runner;

pub use config::AgentConfig;
pub use context::AgentContext;
pub use controller::{Controller, ControllerRegistry};
pub use dynamics::DynamicsModel;
pub use runner::{AgentBehavior, AgentRunner, wait_for_ready};
