//! ATC and pilot strategy selection.
//!
//! Strategies are chosen by the id strings in the scenario document. An
//! unknown id falls back to the standard strategy with a warning — scenario
//! data must never be able to break startup.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use flightsim_agent::{AgentContext, Controller, ControllerRegistry};
use flightsim_data::state::{AtcCommand, FinalControlCommand};

/// Pluggable ATC decision logic.
pub trait AtcStrategy: Send {
    /// The id this strategy was selected by.
    fn strategy_id(&self) -> &str;

    /// Execute a named ATC controller. Returns `false` when the strategy
    /// does not implement the controller.
    fn execute(
        &self,
        ctx: &AgentContext,
        controller_name: &str,
        params: &HashMap<String, String>,
    ) -> bool;
}

const ATC_SOURCE: &str = "atc_agent";

/// The standard tower strategy: taxi clearance and emergency brake.
#[derive(Debug, Default)]
pub struct StandardAtcStrategy;

impl StandardAtcStrategy {
    fn issue_clearance(ctx: &AgentContext) {
        let mut command = ctx.sds().atc_command().value;
        command.clearance_granted = true;
        command.emergency_brake = false;
        ctx.sds().set_atc_command(command, &ctx.source_tag(ATC_SOURCE));
        info!(t = ctx.t, "ATC issued taxi clearance");
    }

    fn issue_emergency_brake(ctx: &AgentContext) {
        let mut command = ctx.sds().atc_command().value;
        command.clearance_granted = false;
        command.emergency_brake = true;
        ctx.sds().set_atc_command(command, &ctx.source_tag(ATC_SOURCE));
        info!(t = ctx.t, "ATC issued emergency brake command");
    }
}

impl AtcStrategy for StandardAtcStrategy {
    fn strategy_id(&self) -> &str {
        "ATC_001"
    }

    fn execute(
        &self,
        ctx: &AgentContext,
        controller_name: &str,
        _params: &HashMap<String, String>,
    ) -> bool {
        match controller_name {
            "clearance_controller" => {
                Self::issue_clearance(ctx);
                true
            }
            "Emergency_Brake_Command" => {
                Self::issue_emergency_brake(ctx);
                true
            }
            _ => false,
        }
    }
}

/// The extended tower strategy: adds takeoff and landing clearances.
#[derive(Debug, Default)]
pub struct ExtendedAtcStrategy {
    standard: StandardAtcStrategy,
}

impl AtcStrategy for ExtendedAtcStrategy {
    fn strategy_id(&self) -> &str {
        "ATC_002"
    }

    fn execute(
        &self,
        ctx: &AgentContext,
        controller_name: &str,
        params: &HashMap<String, String>,
    ) -> bool {
        match controller_name {
            "issue_takeoff_clearance" => {
                let mut command = ctx.sds().atc_command().value;
                command.takeoff_cleared = true;
                ctx.sds().set_atc_command(command, &ctx.source_tag(ATC_SOURCE));
                info!(t = ctx.t, "ATC issued takeoff clearance");
                true
            }
            "issue_landing_clearance" => {
                let mut command = ctx.sds().atc_command().value;
                command.landing_cleared = true;
                ctx.sds().set_atc_command(command, &ctx.source_tag(ATC_SOURCE));
                info!(t = ctx.t, "ATC issued landing clearance");
                true
            }
            _ => self.standard.execute(ctx, controller_name, params),
        }
    }
}

/// Select the ATC strategy for a scenario id. Unknown ids warn and fall
/// back to the standard strategy.
#[must_use]
pub fn atc_strategy_for(atc_id: &str) -> Box<dyn AtcStrategy> {
    match atc_id {
        "ATC_001" => Box::new(StandardAtcStrategy),
        "ATC_002" => Box::new(ExtendedAtcStrategy::default()),
        other => {
            warn!(atc_id = other, "unknown ATC id; using standard strategy");
            Box::new(StandardAtcStrategy)
        }
    }
}

struct ThrottlePushController;

impl Controller for ThrottlePushController {
    fn execute(
        &self,
        ctx: &AgentContext,
        controller_name: &str,
        _params: &HashMap<String, String>,
    ) -> bool {
        ctx.sds().set_final_control_command(
            FinalControlCommand {
                active: true,
                controller_name: controller_name.to_string(),
                throttle: 1.0,
                ..FinalControlCommand::default()
            },
            &ctx.source_tag("pilot_agent"),
        );
        info!(t = ctx.t, "pilot pushed throttle to maximum");
        true
    }
}

struct BrakeApplyController;

impl Controller for BrakeApplyController {
    fn execute(
        &self,
        ctx: &AgentContext,
        controller_name: &str,
        _params: &HashMap<String, String>,
    ) -> bool {
        ctx.sds().set_final_control_command(
            FinalControlCommand {
                active: true,
                controller_name: controller_name.to_string(),
                throttle: 0.0,
                brake: 100.0,
                ..FinalControlCommand::default()
            },
            &ctx.source_tag("pilot_agent"),
        );
        info!(t = ctx.t, "pilot applied maximum brakes");
        true
    }
}

struct AcknowledgeClearanceController;

impl Controller for AcknowledgeClearanceController {
    fn execute(
        &self,
        ctx: &AgentContext,
        _controller_name: &str,
        _params: &HashMap<String, String>,
    ) -> bool {
        let command: AtcCommand = ctx.sds().atc_command().value;
        debug!(
            t = ctx.t,
            clearance = command.clearance_granted,
            "pilot acknowledged ATC command"
        );
        true
    }
}

/// The standard pilot controller set. Pilot ids currently all map to the
/// same controllers; the id is kept in the signature so scenarios can grow
/// pilot variants the way ATC already has.
#[must_use]
pub fn pilot_controllers_for(pilot_id: &str) -> ControllerRegistry {
    debug!(pilot_id, "building pilot controller registry");
    let mut registry = ControllerRegistry::new();
    registry.register("throttle_push2max", Box::new(ThrottlePushController));
    registry.register("brake_apply_max", Box::new(BrakeApplyController));
    registry.register(
        "acknowledge_clearance",
        Box::new(AcknowledgeClearanceController),
    );
    registry
}
