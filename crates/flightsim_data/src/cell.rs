//! Versioned state cells.
//!
//! A [`StateCell`] is one independently locked slot in the shared data
//! space. Readers of different cells never contend; readers and writers of
//! the same cell share its mutex only for the duration of a clone or an
//! overwrite. Last writer wins within a step; the writer stamps the value
//! with its `data_source` and the current simulation time.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// The `data_source` sentinel carried by a cell that has never been written.
pub const UNINITIALIZED_SOURCE: &str = "uninitialized";

/// A cell value together with its provenance stamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stamped<T> {
    /// The payload.
    pub value: T,
    /// Who wrote this value (agent or component name).
    pub data_source: String,
    /// Simulation time of the write, in seconds.
    pub timestamp: f64,
}

impl<T: Default> Default for Stamped<T> {
    fn default() -> Self {
        Self {
            value: T::default(),
            data_source: UNINITIALIZED_SOURCE.to_string(),
            timestamp: 0.0,
        }
    }
}

/// A typed, independently locked state cell.
#[derive(Debug, Default)]
pub struct StateCell<T> {
    inner: Mutex<Stamped<T>>,
}

impl<T: Clone + Default> StateCell<T> {
    /// Create a cell holding the zeroed default, stamped
    /// [`UNINITIALIZED_SOURCE`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Stamped::default()),
        }
    }

    /// Read the cell value together with its stamp.
    #[must_use]
    pub fn get(&self) -> Stamped<T> {
        self.inner.lock().expect("cell mutex poisoned").clone()
    }

    /// Read only the cell value.
    #[must_use]
    pub fn value(&self) -> T {
        self.inner.lock().expect("cell mutex poisoned").value.clone()
    }

    /// Overwrite the cell. The caller supplies the `data_source` and the
    /// simulation time of the write.
    pub fn set(&self, value: T, data_source: &str, timestamp: f64) {
        let mut guard = self.inner.lock().expect("cell mutex poisoned");
        guard.value = value;
        guard.data_source = data_source.to_string();
        guard.timestamp = timestamp;
    }

    /// Apply an in-place mutation under the cell lock and restamp.
    pub fn update<F: FnOnce(&mut T)>(&self, f: F, data_source: &str, timestamp: f64) {
        let mut guard = self.inner.lock().expect("cell mutex poisoned");
        f(&mut guard.value);
        guard.data_source = data_source.to_string();
        guard.timestamp = timestamp;
    }
}
