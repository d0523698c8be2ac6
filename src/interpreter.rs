//! The gesture interpreter: one value that owns the frame store, every pinch
//! binding with its mapper, and the per-hand classifiers.

use glam::{Vec2, Vec3};
use log::{debug, info};
use serde::Serialize;

use crate::coords::{NormalizedProjection, Projection};
use crate::error::ConfigError;
use crate::gestures::{HandPose, PoseConfig, PoseTracker, TouchZone, zone_at};
use crate::landmarks::{DistanceMetric, Handedness, LandmarkFrame};
use crate::mappers::{InteractionMapper, MapperContext, MapperOutput};
use crate::pinch::{PinchDetector, PinchEvent};
use crate::store::FrameStore;
use crate::wave::{WaveConfig, WaveDetector};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InterpreterEvent {
    PinchStarted {
        hand: Handedness,
        binding: String,
        acquired: bool,
        /// First touch zone containing the pinch point, if any.
        zone: Option<String>,
    },
    PinchReleased {
        hand: Handedness,
        binding: String,
    },
    WaveDetected {
        hand: Handedness,
    },
    PoseChanged {
        hand: Handedness,
        pose: HandPose,
    },
}

/// One hand from a multi-hand tracker result. `label` is the tracker's
/// handedness string ("Left", "Right", ...).
#[derive(Debug, Clone, Default)]
pub struct Detection {
    pub label: String,
    pub landmarks: Vec<Vec3>,
}

struct Binding {
    name: String,
    hand: Handedness,
    detector: PinchDetector,
    mapper: Box<dyn InteractionMapper>,
}

struct PerHand<T> {
    left: T,
    right: T,
}

impl<T> PerHand<T> {
    fn get(&self, hand: Handedness) -> &T {
        match hand {
            Handedness::Left => &self.left,
            Handedness::Right => &self.right,
        }
    }

    fn get_mut(&mut self, hand: Handedness) -> &mut T {
        match hand {
            Handedness::Left => &mut self.left,
            Handedness::Right => &mut self.right,
        }
    }
}

pub struct GestureInterpreter {
    store: FrameStore,
    projection: Box<dyn Projection>,
    bindings: Vec<Binding>,
    waves: Option<PerHand<WaveDetector>>,
    poses: Option<PerHand<PoseTracker>>,
    zones: Vec<TouchZone>,
}

impl Default for GestureInterpreter {
    fn default() -> Self {
        Self::new(NormalizedProjection)
    }
}

impl GestureInterpreter {
    pub fn new(projection: impl Projection + 'static) -> Self {
        Self::with_boxed_projection(Box::new(projection))
    }

    pub fn with_boxed_projection(projection: Box<dyn Projection>) -> Self {
        Self {
            store: FrameStore::new(),
            projection,
            bindings: Vec::new(),
            waves: None,
            poses: None,
            zones: Vec::new(),
        }
    }

    /// Enable wave detection on both hands, each with its own cooldown.
    pub fn with_wave(mut self, cfg: WaveConfig) -> Result<Self, ConfigError> {
        self.waves = Some(PerHand {
            left: WaveDetector::new(cfg.clone())?,
            right: WaveDetector::new(cfg)?,
        });
        Ok(self)
    }

    pub fn with_poses(mut self, cfg: PoseConfig) -> Result<Self, ConfigError> {
        self.poses = Some(PerHand {
            left: PoseTracker::new(cfg.clone())?,
            right: PoseTracker::new(cfg)?,
        });
        Ok(self)
    }

    pub fn with_zones(mut self, zones: Vec<TouchZone>) -> Result<Self, ConfigError> {
        for z in &zones {
            z.validate()?;
        }
        self.zones = zones;
        Ok(self)
    }

    /// Register a pinch binding. Names are unique across both hands.
    pub fn add_binding(
        &mut self,
        name: impl Into<String>,
        hand: Handedness,
        detector: PinchDetector,
        mapper: Box<dyn InteractionMapper>,
    ) -> Result<(), ConfigError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ConfigError::EmptyBindingName);
        }
        if self.bindings.iter().any(|b| b.name == name) {
            return Err(ConfigError::DuplicateBinding(name));
        }
        debug!("binding '{name}' on {hand} hand ({:?})", detector.metric());
        self.bindings.push(Binding {
            name,
            hand,
            detector,
            mapper,
        });
        Ok(())
    }

    pub fn store(&self) -> &FrameStore {
        &self.store
    }

    pub fn binding_names(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(|b| b.name.as_str())
    }

    pub fn is_engaged(&self, binding: &str) -> bool {
        self.bindings
            .iter()
            .any(|b| b.name == binding && b.detector.is_engaged())
    }

    /// Last reported pose for `hand`; `None` when pose tracking is off.
    pub fn pose(&self, hand: Handedness) -> HandPose {
        self.poses
            .as_ref()
            .map(|p| p.get(hand).pose())
            .unwrap_or_default()
    }

    pub fn output(&self, binding: &str) -> Option<MapperOutput> {
        self.bindings
            .iter()
            .find(|b| b.name == binding)
            .map(|b| b.mapper.output())
    }

    pub fn outputs(&self) -> impl Iterator<Item = (&str, MapperOutput)> {
        self.bindings
            .iter()
            .map(|b| (b.name.as_str(), b.mapper.output()))
    }

    /// Ingest one tick for `hand`. `None` or a malformed landmark set means
    /// the hand was not detected this tick.
    pub fn submit_frame(
        &mut self,
        hand: Handedness,
        landmarks: Option<&[Vec3]>,
        dt: f32,
    ) -> Vec<InterpreterEvent> {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.store.ingest(hand, landmarks);

        let Self {
            store,
            projection,
            bindings,
            waves,
            poses,
            zones,
        } = self;
        let frame = store.get(hand).frame();
        let mut events = Vec::new();

        // --- pinch bindings ---
        for b in bindings.iter_mut().filter(|b| b.hand == hand) {
            let ctx = frame.map(|f| context(f, &**projection, b.detector.metric(), dt));
            let ev = b.detector.update(frame);
            match (ev, ctx) {
                (PinchEvent::Started, Some(ctx)) => {
                    let acquired = b.mapper.engage(&ctx);
                    let zone = zone_at(zones, ctx.pinch_norm).map(|z| z.name.clone());
                    info!(
                        "{hand} pinch '{}' started (acquired={acquired}, zone={})",
                        b.name,
                        zone.as_deref().unwrap_or("-")
                    );
                    events.push(InterpreterEvent::PinchStarted {
                        hand,
                        binding: b.name.clone(),
                        acquired,
                        zone,
                    });
                }
                (PinchEvent::Released, _) => {
                    b.mapper.release();
                    info!("{hand} pinch '{}' released", b.name);
                    events.push(InterpreterEvent::PinchReleased {
                        hand,
                        binding: b.name.clone(),
                    });
                }
                (PinchEvent::None, Some(ctx)) if b.detector.is_engaged() && b.mapper.is_active() => {
                    b.mapper.update(&ctx);
                }
                _ => {}
            }
            if !b.mapper.is_active() {
                b.mapper.relax(dt);
            }
        }

        // --- classifiers ---
        if let Some(w) = waves {
            if w.get_mut(hand).update(frame.map(|f| f.wrist_2d().x), dt) {
                events.push(InterpreterEvent::WaveDetected { hand });
            }
        }
        if let Some(p) = poses {
            if let Some(pose) = p.get_mut(hand).update(frame, dt) {
                events.push(InterpreterEvent::PoseChanged { hand, pose });
            }
        }

        events
    }

    /// Force every engaged binding back to idle and report the releases.
    /// Call before dropping an interpreter mid-session.
    pub fn release_all(&mut self) -> Vec<InterpreterEvent> {
        let mut events = Vec::new();
        for b in self.bindings.iter_mut().filter(|b| b.detector.is_engaged()) {
            b.detector.reset();
            b.mapper.release();
            info!("{} pinch '{}' released (forced)", b.hand, b.name);
            events.push(InterpreterEvent::PinchReleased {
                hand: b.hand,
                binding: b.name.clone(),
            });
        }
        events
    }

    /// Ingest a whole multi-hand result. The first detection per hand wins;
    /// a hand with no detection is submitted as absent. Left is processed
    /// before right.
    pub fn submit_detections(&mut self, detections: &[Detection], dt: f32) -> Vec<InterpreterEvent> {
        let mut left = None;
        let mut right = None;
        for d in detections {
            match Handedness::from_label(&d.label) {
                Some(Handedness::Left) if left.is_none() => left = Some(d.landmarks.as_slice()),
                Some(Handedness::Right) if right.is_none() => right = Some(d.landmarks.as_slice()),
                Some(hand) => debug!("extra {hand} detection ignored"),
                None => debug!("detection with label {:?} ignored", d.label),
            }
        }
        let mut events = self.submit_frame(Handedness::Left, left, dt);
        events.extend(self.submit_frame(Handedness::Right, right, dt));
        events
    }
}

fn context(
    frame: &LandmarkFrame,
    projection: &dyn Projection,
    metric: DistanceMetric,
    dt: f32,
) -> MapperContext {
    let pinch_norm: Vec2 = frame.pinch_point();
    MapperContext {
        hand: frame.handedness,
        pinch_norm,
        pinch_point: projection.project(pinch_norm),
        distance: frame.pinch_distance(metric),
        planar_distance: frame.pinch_distance(DistanceMetric::Planar),
        spatial_distance: frame.pinch_distance(DistanceMetric::Spatial),
        dt,
    }
}
