//! Hand landmark frames in MediaPipe's 21-point layout.
//!
//! Coordinates are normalized: x and y in [0, 1] with Y increasing downward,
//! z relative depth. All thresholds in this crate are tuned to that convention.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::FrameError;

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub const BOTH: [Handedness; 2] = [Handedness::Left, Handedness::Right];

    /// Parse a tracker category label ("Left", "right_hand", ...).
    /// Anything that names neither side yields `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        let l = label.to_ascii_lowercase();
        if l.contains("left") {
            Some(Handedness::Left)
        } else if l.contains("right") {
            Some(Handedness::Right)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Handedness::Left => "left",
            Handedness::Right => "right",
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    #[default]
    Planar,
    Spatial,
}

/// One tracked hand for one tick. Always holds exactly 21 finite points.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkFrame {
    pub handedness: Handedness,
    points: [Vec3; LANDMARK_COUNT],
}

impl LandmarkFrame {
    pub fn new(handedness: Handedness, points: &[Vec3]) -> Result<Self, FrameError> {
        if points.len() != LANDMARK_COUNT {
            return Err(FrameError::WrongCount {
                expected: LANDMARK_COUNT,
                got: points.len(),
            });
        }
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(FrameError::NonFinite { index });
        }
        let mut arr = [Vec3::ZERO; LANDMARK_COUNT];
        arr.copy_from_slice(points);
        Ok(Self {
            handedness,
            points: arr,
        })
    }

    pub fn points(&self) -> &[Vec3; LANDMARK_COUNT] {
        &self.points
    }

    pub fn point(&self, index: usize) -> Vec3 {
        self.points[index]
    }

    pub fn wrist(&self) -> Vec3 {
        self.points[WRIST]
    }

    pub fn thumb_tip(&self) -> Vec3 {
        self.points[THUMB_TIP]
    }

    pub fn index_tip(&self) -> Vec3 {
        self.points[INDEX_TIP]
    }

    pub fn wrist_2d(&self) -> Vec2 {
        self.wrist().truncate()
    }

    /// Midpoint of thumb tip and index tip, in normalized image space.
    pub fn pinch_point(&self) -> Vec2 {
        (self.thumb_tip().truncate() + self.index_tip().truncate()) * 0.5
    }

    pub fn pinch_distance(&self, metric: DistanceMetric) -> f32 {
        match metric {
            DistanceMetric::Planar => self
                .thumb_tip()
                .truncate()
                .distance(self.index_tip().truncate()),
            DistanceMetric::Spatial => self.thumb_tip().distance(self.index_tip()),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A relaxed open hand centred around (0.5, 0.5) with thumb and index
    /// tips `gap` apart along x.
    pub fn hand_with_gap(gap: f32) -> Vec<Vec3> {
        let mut pts = open_hand();
        let mid = (pts[THUMB_TIP] + pts[INDEX_TIP]) * 0.5;
        pts[THUMB_TIP] = Vec3::new(mid.x - gap * 0.5, mid.y, 0.0);
        pts[INDEX_TIP] = Vec3::new(mid.x + gap * 0.5, mid.y, 0.0);
        pts
    }

    /// Same layout shifted so the pinch midpoint sits at `at`.
    pub fn pinch_at(at: Vec2, gap: f32) -> Vec<Vec3> {
        let pts = hand_with_gap(gap);
        let mid = (pts[THUMB_TIP] + pts[INDEX_TIP]) * 0.5;
        let shift = Vec3::new(at.x - mid.x, at.y - mid.y, 0.0);
        pts.into_iter().map(|p| p + shift).collect()
    }

    /// Wrist at (0.5, 0.8), fingers pointing up (towards smaller y).
    pub fn open_hand() -> Vec<Vec3> {
        let wrist = Vec3::new(0.5, 0.8, 0.0);
        let mut pts = vec![wrist; LANDMARK_COUNT];
        // thumb runs out to the left
        for (i, idx) in [THUMB_CMC, THUMB_MCP, THUMB_IP, THUMB_TIP].iter().enumerate() {
            let k = (i + 1) as f32;
            pts[*idx] = Vec3::new(0.5 - 0.05 * k, 0.78 - 0.03 * k, 0.0);
        }
        let fingers = [
            [INDEX_MCP, INDEX_PIP, INDEX_DIP, INDEX_TIP],
            [MIDDLE_MCP, MIDDLE_PIP, MIDDLE_DIP, MIDDLE_TIP],
            [RING_MCP, RING_PIP, RING_DIP, RING_TIP],
            [PINKY_MCP, PINKY_PIP, PINKY_DIP, PINKY_TIP],
        ];
        for (f, chain) in fingers.iter().enumerate() {
            let x = 0.44 + 0.04 * f as f32;
            for (j, idx) in chain.iter().enumerate() {
                pts[*idx] = Vec3::new(x, 0.65 - 0.06 * j as f32, 0.0);
            }
        }
        pts
    }
}
