//! Per-hand landmark storage.

use glam::{Vec2, Vec3};
use log::debug;

use crate::landmarks::{Handedness, LandmarkFrame};

#[derive(Debug, Clone, Default)]
pub struct HandState {
    frame: Option<LandmarkFrame>,
    wrist: Vec2,
}

impl HandState {
    pub fn frame(&self) -> Option<&LandmarkFrame> {
        self.frame.as_ref()
    }

    pub fn is_detected(&self) -> bool {
        self.frame.is_some()
    }

    /// Wrist position in normalized space; `Vec2::ZERO` when undetected.
    pub fn wrist_position(&self) -> Vec2 {
        self.wrist
    }

    fn clear(&mut self) {
        *self = HandState::default();
    }
}

/// Latest frame for each hand. Slots are replaced wholesale on every ingest.
#[derive(Debug, Default)]
pub struct FrameStore {
    left: HandState,
    right: HandState,
}

impl FrameStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, hand: Handedness) -> &HandState {
        match hand {
            Handedness::Left => &self.left,
            Handedness::Right => &self.right,
        }
    }

    fn slot_mut(&mut self, hand: Handedness) -> &mut HandState {
        match hand {
            Handedness::Left => &mut self.left,
            Handedness::Right => &mut self.right,
        }
    }

    pub fn is_detected(&self, hand: Handedness) -> bool {
        self.get(hand).is_detected()
    }

    /// Replace `hand`'s slot. Returns whether the hand is detected afterwards;
    /// malformed landmark sets leave the slot empty.
    pub fn ingest(&mut self, hand: Handedness, landmarks: Option<&[Vec3]>) -> bool {
        let slot = self.slot_mut(hand);
        let Some(points) = landmarks else {
            slot.clear();
            return false;
        };
        match LandmarkFrame::new(hand, points) {
            Ok(frame) => {
                slot.wrist = frame.wrist_2d();
                slot.frame = Some(frame);
                true
            }
            Err(e) => {
                debug!("{hand} hand frame rejected: {e}");
                slot.clear();
                false
            }
        }
    }

    pub fn clear(&mut self) {
        self.left.clear();
        self.right.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::fixtures::open_hand;

    #[test]
    fn ingest_and_clear() {
        let mut store = FrameStore::new();
        assert!(store.ingest(Handedness::Right, Some(&open_hand())));
        assert!(store.is_detected(Handedness::Right));
        assert!(!store.is_detected(Handedness::Left));
        assert_eq!(
            store.get(Handedness::Right).wrist_position(),
            Vec2::new(0.5, 0.8)
        );

        assert!(!store.ingest(Handedness::Right, None));
        assert!(!store.is_detected(Handedness::Right));
        assert_eq!(store.get(Handedness::Right).wrist_position(), Vec2::ZERO);
    }

    #[test]
    fn malformed_frame_counts_as_undetected() {
        let mut store = FrameStore::new();
        store.ingest(Handedness::Left, Some(&open_hand()));
        let short = &open_hand()[..12];
        assert!(!store.ingest(Handedness::Left, Some(short)));
        assert!(store.get(Handedness::Left).frame().is_none());
    }
}
