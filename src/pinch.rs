//! Thumb/index pinch detection with a hysteresis band.

use log::debug;
use serde::Serialize;

use crate::error::{ConfigError, positive};
use crate::landmarks::{DistanceMetric, LandmarkFrame};

/// Engage/release pair. `release > engage` is enforced at construction so the
/// band can never collapse into per-frame chatter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchThresholds {
    engage: f32,
    release: f32,
}

impl PinchThresholds {
    pub fn new(engage: f32, release: f32) -> Result<Self, ConfigError> {
        positive("engage", engage)?;
        positive("release", release)?;
        if release <= engage {
            return Err(ConfigError::InvertedThresholds { engage, release });
        }
        Ok(Self { engage, release })
    }

    pub fn engage(&self) -> f32 {
        self.engage
    }

    pub fn release(&self) -> f32 {
        self.release
    }
}

impl Default for PinchThresholds {
    fn default() -> Self {
        Self {
            engage: 0.08,
            release: 0.12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PinchState {
    #[default]
    Idle,
    Engaged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinchEvent {
    None,
    Started,
    Released,
}

#[derive(Debug, Clone)]
pub struct PinchDetector {
    thresholds: PinchThresholds,
    metric: DistanceMetric,
    state: PinchState,
    distance: f32,
}

impl PinchDetector {
    pub fn new(thresholds: PinchThresholds, metric: DistanceMetric) -> Self {
        Self {
            thresholds,
            metric,
            state: PinchState::Idle,
            distance: f32::INFINITY,
        }
    }

    pub fn thresholds(&self) -> PinchThresholds {
        self.thresholds
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    pub fn state(&self) -> PinchState {
        self.state
    }

    pub fn is_engaged(&self) -> bool {
        self.state == PinchState::Engaged
    }

    /// Last measured distance; infinite until the first detected frame.
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Evaluate one tick. `None` means the hand was not detected, which
    /// force-releases an engaged session.
    pub fn update(&mut self, frame: Option<&LandmarkFrame>) -> PinchEvent {
        let Some(frame) = frame else {
            if self.state == PinchState::Engaged {
                self.state = PinchState::Idle;
                debug!("pinch released: hand lost");
                return PinchEvent::Released;
            }
            return PinchEvent::None;
        };
        self.observe(frame.pinch_distance(self.metric))
    }

    /// Feed a raw distance through the hysteresis band.
    pub fn observe(&mut self, distance: f32) -> PinchEvent {
        self.distance = distance;
        match self.state {
            PinchState::Idle if distance < self.thresholds.engage => {
                self.state = PinchState::Engaged;
                debug!(
                    "pinch start dist={distance:.3} engage<{:.3}",
                    self.thresholds.engage
                );
                PinchEvent::Started
            }
            PinchState::Engaged if distance > self.thresholds.release => {
                self.state = PinchState::Idle;
                debug!(
                    "pinch release dist={distance:.3} release>{:.3}",
                    self.thresholds.release
                );
                PinchEvent::Released
            }
            _ => PinchEvent::None,
        }
    }

    pub fn reset(&mut self) {
        self.state = PinchState::Idle;
        self.distance = f32::INFINITY;
    }
}
