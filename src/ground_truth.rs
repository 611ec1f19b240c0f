// src/ground_truth.rs
//
// Latest-value cell for the externally delivered ground steering
// request. The transport layer is the sole writer, the pipeline thread
// the sole reader; both sides go through the lock on every access. This
// is the only cross-thread synchronization point in the design.

use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
pub struct GroundSteering {
    latest: Arc<Mutex<f64>>,
}

impl GroundSteering {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called from the transport context whenever a new value arrives.
    pub fn update(&self, value: f64) {
        let mut guard = self.latest.lock().expect("ground steering lock poisoned");
        *guard = value;
    }

    /// Most recently delivered value; 0.0 until the first delivery.
    pub fn latest(&self) -> f64 {
        *self.latest.lock().expect("ground steering lock poisoned")
    }
}
