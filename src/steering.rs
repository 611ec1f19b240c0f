// src/steering.rs
//
// Discrete steering policy. The decision is a selection from a fixed
// table of magnitudes, not a proportional controller: when only one
// cone color is visible it marks the near boundary, so steer hard away
// from it; when both or neither are visible, hold straight. The table's
// default signs assume blue cones on the left; if side resolution lands
// on yellow-left, every magnitude is sign-flipped exactly once.

use crate::side_resolver::SideAssignment;
use crate::types::{Detection, SteeringConfig};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringPolicy {
    pub straight: f64,
    pub left: f64,
    pub hard_left: f64,
    pub right: f64,
    pub hard_right: f64,
    oriented: bool,
}

impl SteeringPolicy {
    pub fn from_config(config: &SteeringConfig) -> Self {
        Self {
            straight: config.straight,
            left: config.left,
            hard_left: config.hard_left,
            right: config.right,
            hard_right: config.hard_right,
            oriented: false,
        }
    }

    /// Lock the policy to the resolved side assignment. Flips every
    /// magnitude iff the assignment contradicts the blue-on-left
    /// convention. Latched: a second call can never double-flip.
    pub fn orient(&mut self, assignment: SideAssignment) {
        if self.oriented {
            return;
        }
        self.oriented = true;

        if assignment == SideAssignment::LeftIsYellow {
            self.straight = -self.straight;
            self.left = -self.left;
            self.hard_left = -self.hard_left;
            self.right = -self.right;
            self.hard_right = -self.hard_right;
            info!("steering policy signs inverted for yellow-on-left track");
        }
    }

    pub fn is_oriented(&self) -> bool {
        self.oriented
    }
}

/// Compute the steering magnitude for one frame. Total over all four
/// detection-presence combinations; first applicable rule wins.
pub fn decide(blue: &Detection, yellow: &Detection, policy: &SteeringPolicy) -> f64 {
    match (blue.is_detected(), yellow.is_detected()) {
        // Only blue visible: it marks the near boundary, turn away
        (true, false) => policy.hard_right,
        // Only yellow visible: mirror case
        (false, true) => policy.hard_left,
        // Both or neither: hold course
        (true, true) | (false, false) => policy.straight,
    }
}
