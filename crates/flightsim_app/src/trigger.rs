//! Trigger-expression evaluation.
//!
//! The grammar is deliberately small and stable: an expression is a
//! disjunction of atomic predicates joined by `||`. There is no conjunction
//! and no grouping. Atoms:
//!
//! | atom | true when |
//! |---|---|
//! | `time > X` | `t > X` (strict) |
//! | `distance > X` | `groundspeed * t > X` |
//! | `speed > X` | `groundspeed >= X` |
//! | `atc_brake_command_received` | `atc_command.emergency_brake` |
//! | `taxi_clearance_received` | `atc_command.clearance_granted` |
//! | `clearance_granted [== true\|false]` | flag equals the RHS (default `true`) |
//!
//! Unknown atoms and unparseable numbers evaluate to `false` with a
//! diagnostic; a predicate failure never aborts a step.

use tracing::{debug, warn};

use flightsim_data::state::{AircraftFlightState, AtcCommand};

/// The state snapshot a trigger expression is evaluated against.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvalContext {
    /// Current simulation time in seconds.
    pub t: f64,
    /// Current groundspeed in m/s.
    pub groundspeed: f64,
    pub clearance_granted: bool,
    pub emergency_brake: bool,
}

impl EvalContext {
    /// Build the context from the cells the grammar reads.
    #[must_use]
    pub fn from_cells(t: f64, flight: &AircraftFlightState, atc: &AtcCommand) -> Self {
        Self {
            t,
            groundspeed: flight.groundspeed,
            clearance_granted: atc.clearance_granted,
            emergency_brake: atc.emergency_brake,
        }
    }
}

/// Evaluate a full expression: any atom of the disjunction being true fires
/// the event.
#[must_use]
pub fn evaluate(expression: &str, ctx: &EvalContext) -> bool {
    expression
        .split("||")
        .any(|atom| evaluate_atom(atom.trim(), ctx))
}

fn evaluate_atom(atom: &str, ctx: &EvalContext) -> bool {
    if atom.is_empty() {
        return false;
    }

    if let Some(threshold) = numeric_rhs(atom, "time >") {
        return ctx.t > threshold;
    }
    if let Some(threshold) = numeric_rhs(atom, "distance >") {
        return ctx.groundspeed * ctx.t > threshold;
    }
    if let Some(threshold) = numeric_rhs(atom, "speed >") {
        return ctx.groundspeed >= threshold;
    }
    if atom.contains("atc_brake_command_received") {
        return ctx.emergency_brake;
    }
    if atom.contains("taxi_clearance_received") {
        return ctx.clearance_granted;
    }
    if atom.contains("clearance_granted") {
        return ctx.clearance_granted == clearance_rhs(atom);
    }

    debug!(atom, "unknown trigger atom; evaluates false");
    false
}

/// Parse the numeric right-hand side of a comparison atom. Returns `None`
/// (with a diagnostic) when the operator is absent or the number malformed.
fn numeric_rhs(atom: &str, operator: &str) -> Option<f64> {
    let position = atom.find(operator)?;
    let rhs = atom[position + operator.len()..].trim();
    match rhs.parse::<f64>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(atom, operator, "unparseable trigger threshold; evaluates false");
            None
        }
    }
}

/// The expected value of a `clearance_granted` comparison; a bare mention
/// means `true`.
fn clearance_rhs(atom: &str) -> bool {
    let Some(position) = atom.find('=') else {
        return true;
    };
    let rhs = atom[position..].trim_start_matches('=').trim().to_lowercase();
    !(rhs.contains("false") || rhs == "0")
}

/// Classify an expression for the monitor's per-type statistics.
#[must_use]
pub fn condition_type(expression: &str) -> &'static str {
    if expression.contains("||") {
        "compound_condition"
    } else if expression.contains("time >") {
        "time_based"
    } else if expression.contains("distance >") {
        "distance_based"
    } else if expression.contains("speed >") {
        "speed_based"
    } else if expression.contains("atc_brake_command_received")
        || expression.contains("taxi_clearance_received")
        || expression.contains("clearance_granted")
    {
        "atc_command_based"
    } else {
        "unknown"
    }
}
