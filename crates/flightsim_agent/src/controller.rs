//! Controller plugin interface.
//!
//! Agent behavior is selected by scenario data: events carry a controller
//! name, and the owning agent resolves it through a string-keyed registry.
//! Unknown names return `false` and are logged; the caller decides the
//! fallback.

use std::collections::HashMap;

use tracing::warn;

use crate::context::AgentContext;

/// A named piece of agent behavior invoked via a string key.
pub trait Controller: Send {
    /// Execute the controller. Returns `false` if the controller declined or
    /// failed; the caller decides what to do next.
    fn execute(
        &self,
        ctx: &AgentContext,
        controller_name: &str,
        params: &HashMap<String, String>,
    ) -> bool;
}

impl<F> Controller for F
where
    F: Fn(&AgentContext, &str, &HashMap<String, String>) -> bool + Send,
{
    fn execute(
        &self,
        ctx: &AgentContext,
        controller_name: &str,
        params: &HashMap<String, String>,
    ) -> bool {
        self(ctx, controller_name, params)
    }
}

/// String-keyed registry of controllers.
#[derive(Default)]
pub struct ControllerRegistry {
    controllers: HashMap<String, Box<dyn Controller>>,
}

impl ControllerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a controller under its name, replacing any previous one.
    pub fn register(&mut self, name: impl Into<String>, controller: Box<dyn Controller>) {
        self.controllers.insert(name.into(), controller);
    }

    /// Execute the named controller. Unknown names log a warning and return
    /// `false`.
    pub fn execute(
        &self,
        ctx: &AgentContext,
        controller_name: &str,
        params: &HashMap<String, String>,
    ) -> bool {
        match self.controllers.get(controller_name) {
            Some(controller) => controller.execute(ctx, controller_name, params),
            None => {
                warn!(
                    agent = ctx.agent_id,
                    controller = controller_name,
                    "unknown controller name"
                );
                false
            }
        }
    }

    /// Whether a controller is registered under the name.
    #[must_use]
    pub fn contains(&self, controller_name: &str) -> bool {
        self.controllers.contains_key(controller_name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}

impl std::fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.controllers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ControllerRegistry")
            .field("controllers", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use flightsim_data::SharedDataSpace;

    use super::*;

    fn make_ctx() -> AgentContext {
        AgentContext::for_step(Arc::new(SharedDataSpace::new(0.01)), "ATC_001", 1)
    }

    #[test]
    fn test_registered_controller_executes() {
        let mut registry = ControllerRegistry::new();
        registry.register(
            "clearance_controller",
            Box::new(|_: &AgentContext, _: &str, _: &HashMap<String, String>| true),
        );
        let ctx = make_ctx();
        assert!(registry.execute(&ctx, "clearance_controller", &HashMap::new()));
    }

    #[test]
    fn test_unknown_controller_returns_false() {
        let registry = ControllerRegistry::new();
        let ctx = make_ctx();
        assert!(!registry.execute(&ctx, "no_such_controller", &HashMap::new()));
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = ControllerRegistry::new();
        registry.register(
            "c",
            Box::new(|_: &AgentContext, _: &str, _: &HashMap<String, String>| false),
        );
        registry.register(
            "c",
            Box::new(|_: &AgentContext, _: &str, _: &HashMap<String, String>| true),
        );
        assert_eq!(registry.len(), 1);
        assert!(registry.execute(&make_ctx(), "c", &HashMap::new()));
    }
}
