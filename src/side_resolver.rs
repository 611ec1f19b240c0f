// src/side_resolver.rs
//
// Online side disambiguation: the vehicle does not know a priori which
// cone color is on which side of the track. Over the first
// total_sync_frames usable frames (both colors visible), each frame
// votes on the placement by comparing centroid x coordinates; the first
// usable frame seeds a provisional verdict and later frames that
// disagree are counted. When the window closes, a majority of
// disagreeing votes overturns the provisional verdict.

use crate::types::Detection;
use tracing::{debug, info, warn};

/// Resolved mapping of cone color to the physical left side of the
/// track. Blue-on-left is the built-in convention the steering policy
/// defaults assume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideAssignment {
    Undetermined,
    LeftIsBlue,
    LeftIsYellow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Provisional {
    None,
    Blue,
    Yellow,
}

impl Provisional {
    fn inverted(self) -> Self {
        match self {
            Provisional::Blue => Provisional::Yellow,
            Provisional::Yellow => Provisional::Blue,
            Provisional::None => Provisional::None,
        }
    }
}

pub struct SideResolver {
    total_sync_frames: u32,
    remaining_sync_frames: u32,
    disagreeing_votes: u32,
    provisional: Provisional,
    assignment: SideAssignment,
}

impl SideResolver {
    pub fn new(total_sync_frames: u32) -> Self {
        Self {
            total_sync_frames,
            remaining_sync_frames: total_sync_frames,
            disagreeing_votes: 0,
            provisional: Provisional::None,
            assignment: SideAssignment::Undetermined,
        }
    }

    pub fn assignment(&self) -> SideAssignment {
        self.assignment
    }

    pub fn is_resolved(&self) -> bool {
        self.assignment != SideAssignment::Undetermined
    }

    /// Feed one frame's detection pair. Frames where either color is
    /// missing do not consume a sync-frame slot. Returns the final
    /// assignment on the single call that closes the window; once
    /// resolved, further calls change nothing.
    pub fn observe(&mut self, blue: &Detection, yellow: &Detection) -> Option<SideAssignment> {
        if self.is_resolved() {
            return None;
        }

        if let (Some(blue_c), Some(yellow_c)) = (blue.centroid, yellow.centroid) {
            let temp = if blue_c.x < yellow_c.x {
                Provisional::Blue
            } else {
                Provisional::Yellow
            };

            if self.provisional == Provisional::None {
                self.provisional = temp;
            } else if temp != self.provisional {
                self.disagreeing_votes += 1;
            }

            self.remaining_sync_frames -= 1;
            debug!(
                remaining = self.remaining_sync_frames,
                disagreeing = self.disagreeing_votes,
                "sync frame consumed"
            );

            if self.remaining_sync_frames == 0 {
                return Some(self.finalize());
            }
        }

        None
    }

    fn finalize(&mut self) -> SideAssignment {
        let mut verdict = self.provisional;

        // Majority of the later sync frames overrides the initial one
        if self.disagreeing_votes >= self.total_sync_frames / 2 {
            verdict = verdict.inverted();
        }

        self.assignment = match verdict {
            Provisional::Blue => {
                info!("cone placement resolved: blue on the left");
                SideAssignment::LeftIsBlue
            }
            Provisional::Yellow => {
                info!("cone placement resolved: yellow on the left");
                SideAssignment::LeftIsYellow
            }
            Provisional::None => {
                warn!(
                    "side resolution window exhausted without seeing both colors; \
                     falling back to blue-on-left convention"
                );
                SideAssignment::LeftIsBlue
            }
        };
        self.assignment
    }

    /// Force finalization with whatever evidence accumulated. Used when
    /// the frame stream ends before the window filled; the no-evidence
    /// fallback path also runs through here.
    pub fn finalize_degraded(&mut self) -> SideAssignment {
        if self.is_resolved() {
            return self.assignment;
        }
        self.finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Centroid, Detection};

    fn detected(x: f64) -> Detection {
        Detection {
            pixel_count: 200,
            centroid: Some(Centroid { x, y: 50.0 }),
        }
    }

    fn missing() -> Detection {
        Detection::none()
    }

    #[test]
    fn test_unanimous_blue_left() {
        let mut resolver = SideResolver::new(5);
        for _ in 0..4 {
            assert_eq!(resolver.observe(&detected(100.0), &detected(300.0)), None);
        }
        let result = resolver.observe(&detected(100.0), &detected(300.0));
        assert_eq!(result, Some(SideAssignment::LeftIsBlue));
        assert_eq!(resolver.assignment(), SideAssignment::LeftIsBlue);
    }

    #[test]
    fn test_majority_overrides_initial_vote() {
        // Temp verdicts [blue, blue, yellow, yellow, yellow]:
        // 3 disagreements >= 5/2 so the initial blue verdict inverts.
        let mut resolver = SideResolver::new(5);
        resolver.observe(&detected(100.0), &detected(300.0));
        resolver.observe(&detected(100.0), &detected(300.0));
        resolver.observe(&detected(300.0), &detected(100.0));
        resolver.observe(&detected(300.0), &detected(100.0));
        let result = resolver.observe(&detected(300.0), &detected(100.0));
        assert_eq!(result, Some(SideAssignment::LeftIsYellow));
    }

    #[test]
    fn test_exact_half_disagreement_inverts() {
        // [blue, blue, blue, yellow, yellow]: 2 disagreements, 2 >= 5/2
        // under integer division, so the verdict still inverts.
        let mut resolver = SideResolver::new(5);
        resolver.observe(&detected(100.0), &detected(300.0));
        resolver.observe(&detected(100.0), &detected(300.0));
        resolver.observe(&detected(100.0), &detected(300.0));
        resolver.observe(&detected(300.0), &detected(100.0));
        let result = resolver.observe(&detected(300.0), &detected(100.0));
        assert_eq!(result, Some(SideAssignment::LeftIsYellow));
    }

    #[test]
    fn test_single_disagreement_kept() {
        // [blue, yellow, blue, blue, blue]: 1 disagreement < 2, keep blue.
        let mut resolver = SideResolver::new(5);
        resolver.observe(&detected(100.0), &detected(300.0));
        resolver.observe(&detected(300.0), &detected(100.0));
        resolver.observe(&detected(100.0), &detected(300.0));
        resolver.observe(&detected(100.0), &detected(300.0));
        let result = resolver.observe(&detected(100.0), &detected(300.0));
        assert_eq!(result, Some(SideAssignment::LeftIsBlue));
    }

    #[test]
    fn test_sparse_frames_do_not_consume_window() {
        let mut resolver = SideResolver::new(5);
        resolver.observe(&detected(100.0), &detected(300.0));
        assert_eq!(resolver.remaining_sync_frames, 4);

        // Only one color visible: state must be untouched
        resolver.observe(&detected(100.0), &missing());
        resolver.observe(&missing(), &detected(300.0));
        resolver.observe(&missing(), &missing());
        assert_eq!(resolver.remaining_sync_frames, 4);
        assert_eq!(resolver.disagreeing_votes, 0);
        assert_eq!(resolver.provisional, Provisional::Blue);
    }

    #[test]
    fn test_resolution_is_one_shot() {
        let mut resolver = SideResolver::new(5);
        for _ in 0..5 {
            resolver.observe(&detected(100.0), &detected(300.0));
        }
        assert_eq!(resolver.assignment(), SideAssignment::LeftIsBlue);

        // Mistaken further calls must not alter the assignment, even
        // with contradicting observations.
        for _ in 0..10 {
            assert_eq!(resolver.observe(&detected(300.0), &detected(100.0)), None);
        }
        assert_eq!(resolver.assignment(), SideAssignment::LeftIsBlue);
    }

    #[test]
    fn test_no_evidence_falls_back_to_convention() {
        let mut resolver = SideResolver::new(5);
        for _ in 0..20 {
            resolver.observe(&detected(100.0), &missing());
        }
        assert!(!resolver.is_resolved());

        let result = resolver.finalize_degraded();
        assert_eq!(result, SideAssignment::LeftIsBlue);
        assert!(resolver.is_resolved());

        // Repeated finalization returns the frozen assignment
        assert_eq!(resolver.finalize_degraded(), SideAssignment::LeftIsBlue);
    }

    #[test]
    fn test_sparse_then_majority_override() {
        // Frame 1: blue (100,50), yellow (300,50) -> provisional blue,
        // window 5 -> 4. Frame 2: only blue -> unchanged. Frames 3-6:
        // yellow left, 4 disagreements, window closes, 4 >= 2 inverts.
        let mut resolver = SideResolver::new(5);
        resolver.observe(&detected(100.0), &detected(300.0));
        assert_eq!(resolver.remaining_sync_frames, 4);

        resolver.observe(&detected(100.0), &missing());
        assert_eq!(resolver.remaining_sync_frames, 4);

        let mut result = None;
        for _ in 0..4 {
            result = resolver.observe(&detected(300.0), &detected(100.0));
        }
        assert_eq!(resolver.disagreeing_votes, 4);
        assert_eq!(result, Some(SideAssignment::LeftIsYellow));
    }
}
