//! Static hand poses and named touch zones.

use glam::Vec2;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, non_negative, positive};
use crate::landmarks::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandPose {
    #[default]
    None,
    Fist,
    OpenHand,
    FingerGun,
    Peace,
    ThumbsUp,
    Pointing,
    RockSign,
    OkSign,
    Pinch,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PoseConfig {
    /// A finger counts as extended when its tip is this many times further
    /// from the reference joint than its middle joint.
    pub extension_ratio: f32,
    /// Thumb/index tip distance, as a fraction of palm size, below which the
    /// tips are touching.
    pub contact_ratio: f32,
    /// Seconds a new pose must hold before it is reported.
    pub min_hold_secs: f32,
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            extension_ratio: 1.1,
            contact_ratio: 0.35,
            min_hold_secs: 0.15,
        }
    }
}

impl PoseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("poses.extension_ratio", self.extension_ratio)?;
        positive("poses.contact_ratio", self.contact_ratio)?;
        non_negative("poses.min_hold_secs", self.min_hold_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Digits {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl Digits {
    pub fn of(frame: &LandmarkFrame, cfg: &PoseConfig) -> Self {
        let p = |i| frame.point(i).truncate();
        let wrist = p(WRIST);
        let finger = |pip, tip| p(tip).distance(wrist) > p(pip).distance(wrist) * cfg.extension_ratio;
        // the thumb folds across the palm, so measure against the index knuckle
        let knuckle = p(INDEX_MCP);
        Self {
            thumb: p(THUMB_TIP).distance(knuckle) > p(THUMB_IP).distance(knuckle) * cfg.extension_ratio,
            index: finger(INDEX_PIP, INDEX_TIP),
            middle: finger(MIDDLE_PIP, MIDDLE_TIP),
            ring: finger(RING_PIP, RING_TIP),
            pinky: finger(PINKY_PIP, PINKY_TIP),
        }
    }
}

fn palm_size(frame: &LandmarkFrame) -> f32 {
    frame
        .point(WRIST)
        .truncate()
        .distance(frame.point(MIDDLE_MCP).truncate())
}

pub fn classify(frame: &LandmarkFrame, cfg: &PoseConfig) -> HandPose {
    let d = Digits::of(frame, cfg);
    let palm = palm_size(frame).max(crate::smoothing::EPSILON);
    let contact = frame.pinch_distance(DistanceMetric::Planar) / palm < cfg.contact_ratio;

    if contact {
        return if d.middle && d.ring && d.pinky {
            HandPose::OkSign
        } else {
            HandPose::Pinch
        };
    }

    match (d.thumb, d.index, d.middle, d.ring, d.pinky) {
        (false, false, false, false, false) => HandPose::Fist,
        (true, true, true, true, true) => HandPose::OpenHand,
        (true, true, false, false, false) => HandPose::FingerGun,
        (_, true, true, false, false) => HandPose::Peace,
        (true, false, false, false, false) => HandPose::ThumbsUp,
        (false, true, false, false, false) => HandPose::Pointing,
        (_, true, false, false, true) => HandPose::RockSign,
        _ => HandPose::None,
    }
}

/// Debounces per-frame classifications into pose changes.
#[derive(Debug, Clone)]
pub struct PoseTracker {
    cfg: PoseConfig,
    candidate: HandPose,
    held: f32,
    reported: HandPose,
}

impl PoseTracker {
    pub fn new(cfg: PoseConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            candidate: HandPose::None,
            held: 0.0,
            reported: HandPose::None,
        })
    }

    pub fn pose(&self) -> HandPose {
        self.reported
    }

    /// Returns the new pose on the tick it is confirmed. Losing the hand
    /// reports `None` straight away, once.
    pub fn update(&mut self, frame: Option<&LandmarkFrame>, dt: f32) -> Option<HandPose> {
        let Some(frame) = frame else {
            self.candidate = HandPose::None;
            self.held = 0.0;
            if self.reported != HandPose::None {
                self.reported = HandPose::None;
                return Some(HandPose::None);
            }
            return None;
        };

        let pose = classify(frame, &self.cfg);
        if pose != self.candidate {
            self.candidate = pose;
            self.held = 0.0;
        }
        if dt.is_finite() {
            self.held += dt.max(0.0);
        }

        if self.candidate != self.reported && self.held >= self.cfg.min_hold_secs {
            debug!(
                "{} hand pose {:?} -> {:?}",
                frame.handedness, self.reported, self.candidate
            );
            self.reported = self.candidate;
            return Some(self.reported);
        }
        None
    }
}

// --- touch zones ---

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TouchZone {
    pub name: String,
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl TouchZone {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ok = [self.min_x, self.max_x, self.min_y, self.max_y]
            .iter()
            .all(|v| v.is_finite())
            && self.min_x < self.max_x
            && self.min_y < self.max_y;
        if ok {
            Ok(())
        } else {
            Err(ConfigError::BadZone(self.name.clone()))
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

/// First zone containing `p`, in declaration order.
pub fn zone_at(zones: &[TouchZone], p: Vec2) -> Option<&TouchZone> {
    zones.iter().find(|z| z.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::fixtures::{hand_with_gap, open_hand};
    use glam::Vec3;

    const CHAINS: [[usize; 3]; 4] = [
        [INDEX_MCP, INDEX_DIP, INDEX_TIP],
        [MIDDLE_MCP, MIDDLE_DIP, MIDDLE_TIP],
        [RING_MCP, RING_DIP, RING_TIP],
        [PINKY_MCP, PINKY_DIP, PINKY_TIP],
    ];

    /// Fold finger `f` (0 = index) so its tip tucks into the palm.
    fn curl(pts: &mut [Vec3], f: usize) {
        let [mcp, dip, tip] = CHAINS[f];
        let base = pts[mcp];
        pts[dip] = base + Vec3::new(0.0, 0.05, 0.0);
        pts[tip] = base + Vec3::new(0.0, 0.10, 0.0);
    }

    fn curl_thumb(pts: &mut [Vec3]) {
        pts[THUMB_TIP] = pts[INDEX_MCP] + Vec3::new(-0.01, 0.03, 0.0);
    }

    fn frame(pts: &[Vec3]) -> LandmarkFrame {
        LandmarkFrame::new(Handedness::Right, pts).unwrap()
    }

    fn pose_of(pts: &[Vec3]) -> HandPose {
        classify(&frame(pts), &PoseConfig::default())
    }

    #[test]
    fn open_hand_and_fist() {
        let mut pts = open_hand();
        assert_eq!(pose_of(&pts), HandPose::OpenHand);
        for f in 0..4 {
            curl(&mut pts, f);
        }
        assert_eq!(pose_of(&pts), HandPose::ThumbsUp);
        curl_thumb(&mut pts);
        assert_eq!(pose_of(&pts), HandPose::Fist);
    }

    #[test]
    fn single_and_paired_fingers() {
        let mut pointing = open_hand();
        curl_thumb(&mut pointing);
        for f in 1..4 {
            curl(&mut pointing, f);
        }
        assert_eq!(pose_of(&pointing), HandPose::Pointing);

        let mut gun = open_hand();
        for f in 1..4 {
            curl(&mut gun, f);
        }
        assert_eq!(pose_of(&gun), HandPose::FingerGun);

        let mut peace = open_hand();
        curl(&mut peace, 2);
        curl(&mut peace, 3);
        assert_eq!(pose_of(&peace), HandPose::Peace);

        let mut rock = open_hand();
        curl(&mut rock, 1);
        curl(&mut rock, 2);
        assert_eq!(pose_of(&rock), HandPose::RockSign);
    }

    #[test]
    fn touching_tips() {
        let ok = hand_with_gap(0.02);
        assert_eq!(pose_of(&ok), HandPose::OkSign);

        let mut pinch = hand_with_gap(0.02);
        for f in 1..4 {
            curl(&mut pinch, f);
        }
        assert_eq!(pose_of(&pinch), HandPose::Pinch);
    }

    #[test]
    fn tracker_waits_for_hold_time() {
        let mut t = PoseTracker::new(PoseConfig {
            min_hold_secs: 0.1,
            ..PoseConfig::default()
        })
        .unwrap();
        let f = frame(&open_hand());
        assert_eq!(t.update(Some(&f), 0.04), None);
        assert_eq!(t.update(Some(&f), 0.04), None);
        assert_eq!(t.update(Some(&f), 0.04), Some(HandPose::OpenHand));
        assert_eq!(t.update(Some(&f), 0.04), None);
        assert_eq!(t.pose(), HandPose::OpenHand);
    }

    #[test]
    fn flicker_does_not_report() {
        let mut t = PoseTracker::new(PoseConfig {
            min_hold_secs: 0.1,
            ..PoseConfig::default()
        })
        .unwrap();
        let open = frame(&open_hand());
        let mut fist_pts = open_hand();
        for f in 0..4 {
            curl(&mut fist_pts, f);
        }
        curl_thumb(&mut fist_pts);
        let fist = frame(&fist_pts);
        for _ in 0..10 {
            assert_eq!(t.update(Some(&open), 0.04), None);
            assert_eq!(t.update(Some(&fist), 0.04), None);
        }
        assert_eq!(t.pose(), HandPose::None);
    }

    #[test]
    fn hand_loss_reports_none_once() {
        let mut t = PoseTracker::new(PoseConfig {
            min_hold_secs: 0.0,
            ..PoseConfig::default()
        })
        .unwrap();
        let f = frame(&open_hand());
        assert_eq!(t.update(Some(&f), 0.02), Some(HandPose::OpenHand));
        assert_eq!(t.update(None, 0.02), Some(HandPose::None));
        assert_eq!(t.update(None, 0.02), None);
    }

    #[test]
    fn zones_first_match_wins() {
        let zones = vec![
            TouchZone {
                name: "left".into(),
                min_x: 0.0,
                max_x: 0.5,
                min_y: 0.0,
                max_y: 1.0,
            },
            TouchZone {
                name: "all".into(),
                min_x: 0.0,
                max_x: 1.0,
                min_y: 0.0,
                max_y: 1.0,
            },
        ];
        assert_eq!(zone_at(&zones, Vec2::new(0.2, 0.5)).map(|z| z.name.as_str()), Some("left"));
        assert_eq!(zone_at(&zones, Vec2::new(0.8, 0.5)).map(|z| z.name.as_str()), Some("all"));
        assert!(zone_at(&zones, Vec2::new(1.5, 0.5)).is_none());
    }

    #[test]
    fn inverted_zone_rejected() {
        let z = TouchZone {
            name: "bad".into(),
            min_x: 0.6,
            max_x: 0.4,
            min_y: 0.0,
            max_y: 1.0,
        };
        assert_eq!(z.validate(), Err(ConfigError::BadZone("bad".into())));
    }
}
