//! Data-recorder sinks.
//!
//! [`CsvDataRecorder`] is the file-backed sink: frames travel over a
//! channel to a writer thread which appends one row per step to a CSV
//! stream per cell, flushing every `buffer_size` rows. Publishing never
//! blocks the simulation.
//!
//! [`CountingSink`] and [`MemorySink`] are in-memory sinks for tests.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use anyhow::Context;
use tracing::{debug, warn};

use flightsim_data::recorder::{RecorderSink, SnapshotFrame};
use flightsim_scenario::DataRecorderConfig;

enum RecorderMessage {
    Frame(Box<SnapshotFrame>),
    Flush,
    Shutdown,
}

/// File-backed recorder: a writer thread fed through a channel.
pub struct CsvDataRecorder {
    sender: Sender<RecorderMessage>,
    worker: Option<JoinHandle<()>>,
}

impl CsvDataRecorder {
    /// Create the output directory, open the streams, and start the writer
    /// thread.
    ///
    /// # Errors
    ///
    /// Fails if the output directory or any stream file cannot be created.
    pub fn create(config: &DataRecorderConfig) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&config.output_directory).with_context(|| {
            format!(
                "creating recorder output directory {}",
                config.output_directory.display()
            )
        })?;

        let mut streams = Streams::open(&config.output_directory)?;
        let buffer_size = config.buffer_size.max(1);
        let (sender, receiver) = mpsc::channel::<RecorderMessage>();

        let worker = std::thread::Builder::new()
            .name("data_recorder".to_string())
            .spawn(move || {
                let mut frames = 0usize;
                while let Ok(message) = receiver.recv() {
                    match message {
                        RecorderMessage::Frame(frame) => {
                            streams.write_frame(&frame, buffer_size);
                            frames += 1;
                        }
                        RecorderMessage::Flush => streams.flush(),
                        RecorderMessage::Shutdown => break,
                    }
                }
                streams.flush();
                debug!(frames, "data recorder drained and closed");
            })
            .context("spawning data recorder thread")?;

        Ok(Self {
            sender,
            worker: Some(worker),
        })
    }

    /// A sink handle to attach to the shared data space.
    #[must_use]
    pub fn sink(&self) -> Arc<dyn RecorderSink> {
        Arc::new(ChannelSink {
            sender: Mutex::new(self.sender.clone()),
        })
    }

    /// Stop the writer thread after draining everything queued so far.
    pub fn shutdown(mut self) {
        self.shutdown_inner();
    }

    fn shutdown_inner(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = self.sender.send(RecorderMessage::Shutdown);
            if worker.join().is_err() {
                warn!("data recorder thread panicked");
            }
        }
    }
}

impl Drop for CsvDataRecorder {
    fn drop(&mut self) {
        self.shutdown_inner();
    }
}

struct ChannelSink {
    sender: Mutex<Sender<RecorderMessage>>,
}

impl RecorderSink for ChannelSink {
    fn publish(&self, frame: SnapshotFrame) {
        let sender = self.sender.lock().expect("recorder sender poisoned");
        if sender.send(RecorderMessage::Frame(Box::new(frame))).is_err() {
            warn!("data recorder is gone; snapshot dropped");
        }
    }

    fn flush(&self) {
        let sender = self.sender.lock().expect("recorder sender poisoned");
        let _ = sender.send(RecorderMessage::Flush);
    }
}

struct Stream {
    writer: BufWriter<File>,
    pending: usize,
}

impl Stream {
    fn open(directory: &Path, file_name: &str, header: &str) -> anyhow::Result<Self> {
        let path = directory.join(file_name);
        let file = File::create(&path)
            .with_context(|| format!("creating recorder stream {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{header}")
            .with_context(|| format!("writing header of {file_name}"))?;
        Ok(Self { writer, pending: 0 })
    }

    fn row(&mut self, line: &str, buffer_size: usize) {
        if writeln!(self.writer, "{line}").is_err() {
            warn!("recorder stream write failed; row dropped");
            return;
        }
        self.pending += 1;
        if self.pending >= buffer_size {
            self.flush();
        }
    }

    fn flush(&mut self) {
        if self.writer.flush().is_err() {
            warn!("recorder stream flush failed");
        }
        self.pending = 0;
    }
}

struct Streams {
    flight: Stream,
    system: Stream,
    environment: Stream,
    pilot: Stream,
    atc: Stream,
    force: Stream,
    controller: Stream,
    events: Stream,
}

impl Streams {
    fn open(directory: &Path) -> anyhow::Result<Self> {
        Ok(Self {
            flight: Stream::open(
                directory,
                "flight_state.csv",
                "t,latitude,longitude,altitude,roll,pitch,heading,airspeed,groundspeed,vertical_speed,ground_distance,brake_pressure,data_source",
            )?,
            system: Stream::open(
                directory,
                "aircraft_system.csv",
                "t,mass,fuel,brake_pressure,landing_gear,flaps,spoilers,aileron,elevator,rudder,throttle,data_source",
            )?,
            environment: Stream::open(
                directory,
                "environment_state.csv",
                "t,runway_length,runway_width,friction_coefficient,air_density,wind_speed,wind_direction,data_source",
            )?,
            pilot: Stream::open(
                directory,
                "pilot_state.csv",
                "t,attention_level,skill_level,fatigue_level,data_source",
            )?,
            atc: Stream::open(
                directory,
                "atc_command.csv",
                "t,clearance_granted,emergency_brake,takeoff_cleared,landing_cleared,data_source",
            )?,
            force: Stream::open(
                directory,
                "net_force.csv",
                "t,fx,fy,fz,mx,my,mz,data_source",
            )?,
            controller: Stream::open(
                directory,
                "controller_execution.csv",
                "t,controller_name,running",
            )?,
            events: Stream::open(
                directory,
                "triggered_events.csv",
                "step,t,id,event_name,condition,controller_type,controller_name",
            )?,
        })
    }

    fn write_frame(&mut self, frame: &SnapshotFrame, buffer_size: usize) {
        let t = frame.t;

        let flight = &frame.flight_state;
        self.flight.row(
            &format!(
                "{t:.6},{:.8},{:.8},{:.3},{:.4},{:.4},{:.3},{:.4},{:.4},{:.4},{:.3},{:.2},{}",
                flight.value.latitude,
                flight.value.longitude,
                flight.value.altitude,
                flight.value.roll,
                flight.value.pitch,
                flight.value.heading,
                flight.value.airspeed,
                flight.value.groundspeed,
                flight.value.vertical_speed,
                flight.value.ground_distance,
                flight.value.brake_pressure,
                flight.data_source
            ),
            buffer_size,
        );

        let system = &frame.system_state;
        self.system.row(
            &format!(
                "{t:.6},{:.1},{:.2},{:.2},{:.2},{:.2},{:.2},{:.3},{:.3},{:.3},{:.4},{}",
                system.value.mass,
                system.value.fuel,
                system.value.brake_pressure,
                system.value.landing_gear_deployed,
                system.value.flaps_deployed,
                system.value.spoilers_deployed,
                system.value.aileron_deflection,
                system.value.elevator_deflection,
                system.value.rudder_deflection,
                system.value.throttle_position,
                system.data_source
            ),
            buffer_size,
        );

        let environment = &frame.environment;
        self.environment.row(
            &format!(
                "{t:.6},{:.1},{:.1},{:.3},{:.4},{:.2},{:.1},{}",
                environment.value.runway_length,
                environment.value.runway_width,
                environment.value.friction_coefficient,
                environment.value.air_density,
                environment.value.wind_speed,
                environment.value.wind_direction,
                environment.data_source
            ),
            buffer_size,
        );

        let pilot = &frame.pilot;
        self.pilot.row(
            &format!(
                "{t:.6},{:.3},{:.3},{:.3},{}",
                pilot.value.attention_level,
                pilot.value.skill_level,
                pilot.value.fatigue_level,
                pilot.data_source
            ),
            buffer_size,
        );

        let atc = &frame.atc_command;
        self.atc.row(
            &format!(
                "{t:.6},{},{},{},{},{}",
                atc.value.clearance_granted,
                atc.value.emergency_brake,
                atc.value.takeoff_cleared,
                atc.value.landing_cleared,
                atc.data_source
            ),
            buffer_size,
        );

        let force = &frame.net_force;
        self.force.row(
            &format!(
                "{t:.6},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{}",
                force.value.force.x,
                force.value.force.y,
                force.value.force.z,
                force.value.moment.x,
                force.value.moment.y,
                force.value.moment.z,
                force.data_source
            ),
            buffer_size,
        );

        for (name, running) in frame.controller_status.value.iter() {
            self.controller
                .row(&format!("{t:.6},{name},{running}"), buffer_size);
        }

        for event in &frame.triggered_events {
            self.events.row(
                &format!(
                    "{},{t:.6},{},{},{},{},{}",
                    frame.step,
                    event.id,
                    event.name,
                    event.trigger_condition.expression,
                    event.driven_process.controller_type,
                    event.driven_process.controller_name
                ),
                buffer_size,
            );
        }
    }

    fn flush(&mut self) {
        self.flight.flush();
        self.system.flush();
        self.environment.flush();
        self.pilot.flush();
        self.atc.flush();
        self.force.flush();
        self.controller.flush();
        self.events.flush();
    }
}

/// Test sink that only counts frames.
#[derive(Debug, Default)]
pub struct CountingSink {
    frames: AtomicUsize,
}

impl CountingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn frames(&self) -> usize {
        self.frames.load(Ordering::SeqCst)
    }
}

impl RecorderSink for CountingSink {
    fn publish(&self, _frame: SnapshotFrame) {
        self.frames.fetch_add(1, Ordering::SeqCst);
    }
}

/// Test sink that keeps every frame.
#[derive(Debug, Default)]
pub struct MemorySink {
    frames: Mutex<Vec<SnapshotFrame>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn frames(&self) -> Vec<SnapshotFrame> {
        self.frames.lock().expect("memory sink poisoned").clone()
    }
}

impl RecorderSink for MemorySink {
    fn publish(&self, frame: SnapshotFrame) {
        self.frames.lock().expect("memory sink poisoned").push(frame);
    }
}
