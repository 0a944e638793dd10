//! End-to-end scenario tests.
//!
//! Each test builds an in-memory flight-plan document, assembles the full
//! worker set, runs the clock unpaced, and checks the step-exact event
//! causality and the recorded outputs.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};

use flightsim_agent::{AgentBehavior, AgentConfig, AgentContext};
use flightsim_app::recorder::{CountingSink, MemorySink};
use flightsim_app::sim::Simulation;
use flightsim_data::WorkerKind;
use flightsim_data::recorder::SnapshotFrame;
use flightsim_scenario::{FlightPlanLoader, SimulationParams};

fn fast_params(max_simulation_time: f64) -> SimulationParams {
    SimulationParams {
        time_scale: 0.0,
        time_step: 0.01,
        max_simulation_time,
        sync_tolerance: 5.0,
    }
}

/// A flight-plan document with the given initial groundspeed and ATC/pilot
/// logic sequences.
fn plan(groundspeed: f64, atc_sequence: Value, pilot_sequence: Value) -> Value {
    json!({
        "flight_plan": {
            "scenario_config": {
                "ScenarioName": "test_scenario",
                "Pilot_ID": "Pilot_001",
                "Aircraft_ID": "Aircraft_001",
                "ATC_ID": "ATC_001"
            },
            "global_initial_state": {
                "flight_dynamics_initial_state": {
                    "position": { "x": 0.0, "y": 0.0, "z": 0.0 },
                    "attitude": { "yaw": 90.0 },
                    "velocity": { "vx": 0.0, "vy": groundspeed, "vz": 0.0 }
                },
                "pilot_initial_state": { "attention_level": "100%" },
                "aircraft_initial_state": {
                    "throttle_position": 0.3,
                    "brake_status": "released",
                    "fuel_quantity": 10000.0
                },
                "environment_initial_state": {
                    "runway": { "length": 3800.0, "width": 60.0, "friction_coefficient": 0.7 }
                },
                "atc_control_initial_state": { "clearance_granted": false }
            },
            "logic_lines": {
                "pilot_logic_line": { "logic_sequence": pilot_sequence },
                "aircraft_system_logic_line": { "logic_sequence": [] },
                "environment_logic_line": { "logic_sequence": [] },
                "ATC_logic_line": { "logic_sequence": atc_sequence }
            }
        }
    })
}

fn assemble(params: &SimulationParams, document: Value) -> Simulation {
    let mut sim = Simulation::new(params);
    let loader = FlightPlanLoader::from_value(document).expect("scenario document invalid");
    sim.load(&loader);
    sim.spawn_standard_agents().expect("workers failed to start");
    sim
}

fn frame_at(frames: &[SnapshotFrame], step: u64) -> &SnapshotFrame {
    frames
        .iter()
        .find(|frame| frame.step == step)
        .unwrap_or_else(|| panic!("no frame for step {step}"))
}

#[test]
fn test_s1_taxi_clearance_then_throttle_ramp() {
    let document = plan(
        0.0,
        json!([{
            "event_id": 1,
            "event_name": "taxi_clearance",
            "trigger_condition": { "condition_expression": "time > 2.0" },
            "driven_process": {
                "controller_type": "ATC_command",
                "controller_name": "clearance_controller"
            }
        }]),
        json!([{
            "event_id": 2,
            "event_name": "push_throttle",
            "trigger_condition": { "condition_expression": "clearance_granted" },
            "driven_process": {
                "controller_type": "Pilot_Manual_Control",
                "controller_name": "throttle_push2max"
            }
        }]),
    );

    let mut sim = assemble(&fast_params(6.0), document);
    let sink = Arc::new(MemorySink::new());
    sim.sds().attach_recorder(sink.clone());

    let outcome = sim.run();
    assert!(!outcome.deadlock());
    assert_eq!(outcome.steps, 600);

    // The clearance event fires at step 201 (t = 2.01), the pilot event one
    // step later once the flag is visible.
    let sds = sim.sds();
    let at_201: Vec<String> = sds.events_at_step(201).iter().map(|e| e.name.clone()).collect();
    assert_eq!(at_201, vec!["taxi_clearance".to_string()]);
    let at_202: Vec<String> = sds.events_at_step(202).iter().map(|e| e.name.clone()).collect();
    assert_eq!(at_202, vec!["push_throttle".to_string()]);
    assert!(sds.atc_command().value.clearance_granted);

    // The clearance is granted within step 201, so the snapshot closing
    // that step already carries it.
    let frames = sink.frames();
    assert!(frame_at(&frames, 201).atc_command.value.clearance_granted);
    assert!(!frame_at(&frames, 200).atc_command.value.clearance_granted);

    // Throttle ramps monotonically to full once the command lands.
    let mut previous = 0.0_f64;
    for frame in frames.iter().filter(|frame| frame.step >= 203) {
        let throttle = frame.system_state.value.throttle_position;
        assert!(
            throttle >= previous - 1e-12,
            "throttle not monotone at step {}",
            frame.step
        );
        previous = throttle;
    }
    assert!((previous - 1.0).abs() < 1e-9, "throttle must reach 1.0, got {previous}");

    // Once rolling, the flight state is stamped by the dynamics agent.
    assert_eq!(
        frame_at(&frames, 600).flight_state.data_source,
        "flight_dynamics_agent"
    );
}

#[test]
fn test_s2_emergency_brake_short_circuit() {
    let document = plan(
        10.0,
        json!([{
            "event_id": 1,
            "event_name": "brake_hard",
            "trigger_condition": { "condition_expression": "time > 1.0" },
            "driven_process": {
                "controller_type": "ATC_command",
                "controller_name": "Emergency_Brake_Command"
            }
        }]),
        json!([]),
    );

    let mut sim = assemble(&fast_params(1.5), document);
    let sink = Arc::new(MemorySink::new());
    sim.sds().attach_recorder(sink.clone());

    let outcome = sim.run();
    assert!(!outcome.deadlock());

    let sds = sim.sds();
    assert_eq!(sds.events_at_step(101).len(), 1, "brake event fires at step 101");

    let frames = sink.frames();
    assert!(frame_at(&frames, 101).atc_command.value.emergency_brake);

    // Within five steps of the command: brakes at maximum and speed bleeding.
    let speed_at_command = frame_at(&frames, 101).flight_state.value.groundspeed;
    let after = frame_at(&frames, 106);
    assert_eq!(after.system_state.value.brake_pressure, 100.0);
    assert!(
        after.flight_state.value.groundspeed < speed_at_command,
        "groundspeed must decrease under emergency braking"
    );
}

#[test]
fn test_s3_compound_trigger_fires_on_first_step() {
    let document = plan(
        6.0,
        json!([{
            "event_id": 1,
            "event_name": "fast_already",
            "trigger_condition": { "condition_expression": "time > 9999 || speed > 5" },
            "driven_process": {
                "controller_type": "ATC_command",
                "controller_name": "clearance_controller"
            }
        }]),
        json!([]),
    );

    let mut sim = assemble(&fast_params(0.1), document);
    let outcome = sim.run();
    assert!(!outcome.deadlock());

    let triggered = sim.sds().events_at_step(1);
    assert_eq!(triggered.len(), 1);
    assert_eq!(triggered[0].name, "fast_already");
    // Single-fire: nowhere else.
    assert_eq!(sim.sds().triggered_events().total(), 1);
}

#[test]
fn test_s4_unknown_controller_type_is_recorded_but_not_routed() {
    let document = plan(
        0.0,
        json!([{
            "event_id": 1,
            "event_name": "mystery_event",
            "trigger_condition": { "condition_expression": "time > 0.5" },
            "driven_process": {
                "controller_type": "Mystery",
                "controller_name": "whatever"
            }
        }]),
        json!([]),
    );

    let mut sim = assemble(&fast_params(1.0), document);
    let outcome = sim.run();
    assert!(!outcome.deadlock());

    let sds = sim.sds();
    assert_eq!(sds.events_at_step(51).len(), 1, "event recorded at step 51");
    // Nothing reached any agent: no controller ran, no command changed.
    assert!(!sds.atc_command().value.clearance_granted);
    assert!(!sds.atc_command().value.emergency_brake);
    assert!(!sds.final_control_command().value.active);
}

struct StallingWorker;

impl AgentBehavior for StallingWorker {
    fn initial_update(&mut self, _ctx: &AgentContext) {}

    fn update(&mut self, _ctx: &AgentContext) {
        // Reaches RUNNING, then never completes.
        loop {
            std::thread::sleep(Duration::from_millis(50));
        }
    }
}

#[test]
fn test_s5_deadlock_detection() {
    let document = plan(0.0, json!([]), json!([]));
    let params = SimulationParams {
        sync_tolerance: 0.3,
        ..fast_params(10.0)
    };

    let mut sim = assemble(&params, document);
    sim.spawn_worker(
        AgentConfig::new("staller", "staller", WorkerKind::Custom("staller".into())),
        StallingWorker,
    )
    .expect("staller failed to start");

    let outcome = sim.run();
    assert!(outcome.deadlock(), "clock must suspect a deadlock");
    assert!(sim.sds().is_simulation_over());

    // Every healthy worker drained and unregistered; only the stalled one
    // is left behind.
    let remaining = sim.sds().registry().ids();
    assert_eq!(remaining, vec!["staller".to_string()]);
}

#[test]
fn test_s6_recorder_receives_step_count_plus_one() {
    let document = plan(0.0, json!([]), json!([]));

    let mut sim = assemble(&fast_params(10.0), document);
    let counting = Arc::new(CountingSink::new());
    sim.sds().attach_recorder(counting.clone());

    let outcome = sim.run();
    assert!(!outcome.deadlock());
    assert_eq!(outcome.steps, 1000);
    assert_eq!(counting.frames(), 1001, "one frame per step plus the step-0 frame");
}

#[test]
fn test_recorder_times_match_steps_exactly() {
    let document = plan(0.0, json!([]), json!([]));

    let mut sim = assemble(&fast_params(0.5), document);
    let sink = Arc::new(MemorySink::new());
    sim.sds().attach_recorder(sink.clone());

    sim.run();

    let frames = sink.frames();
    assert_eq!(frames.len(), 51);
    for (index, frame) in frames.iter().enumerate() {
        assert_eq!(frame.step, index as u64);
        // Bit-exact: both sides compute step * time_step.
        assert_eq!(frame.t, index as f64 * 0.01);
    }
}
