//! Simulation configuration.
//!
//! Parsed from `config/SimulationConfig.json` (or whatever path the entry
//! point is given). Unknown keys are ignored; every recognised option has a
//! default, but a missing or malformed file is fatal at startup.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ScenarioError;

/// Log sink configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Brief log file (INFO and above).
    pub brief_log_file: PathBuf,
    /// Detail log file (DEBUG and above).
    pub detail_log_file: PathBuf,
    /// Whether log lines also go to standard output.
    pub console_output: bool,
    /// Master switch for the whole logging stack.
    pub enable_logging: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            brief_log_file: PathBuf::from("output/simulation_brief.log"),
            detail_log_file: PathBuf::from("output/simulation_detail.log"),
            console_output: true,
            enable_logging: false,
        }
    }
}

/// Data-recorder sink configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataRecorderConfig {
    /// Directory the per-cell snapshot streams are written to.
    pub output_directory: PathBuf,
    /// Rows buffered per stream before a flush.
    pub buffer_size: usize,
}

impl Default for DataRecorderConfig {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::from("output/simulation"),
            buffer_size: 1000,
        }
    }
}

/// Core timing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    /// Wall-clock pacing factor; 0 means "as fast as possible".
    pub time_scale: f64,
    /// Fixed step size in seconds.
    pub time_step: f64,
    /// Termination bound in seconds.
    pub max_simulation_time: f64,
    /// Deadlock-detection window in wall-clock seconds.
    pub sync_tolerance: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            time_step: 0.01,
            max_simulation_time: 300.0,
            sync_tolerance: 10.0,
        }
    }
}

/// The full simulation configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Path to the scenario document.
    pub flight_plan_file: PathBuf,
    pub log_config: LogConfig,
    pub data_recorder_config: DataRecorderConfig,
    pub simulation_params: SimulationParams,
}

impl SimulationConfig {
    /// Load the configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Io`] if the file cannot be read and
    /// [`ScenarioError::Json`] if it is not valid JSON.
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let text = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config: Self = serde_json::from_str(&text)?;
        if config.flight_plan_file.as_os_str().is_empty() {
            config.flight_plan_file = PathBuf::from("input/FlightPlan.json");
        }
        Ok(config)
    }
}
