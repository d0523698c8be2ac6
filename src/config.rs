//! TOML profile model and interpreter construction.
//!
//! A profile names the host projection, optional wave and pose classifiers,
//! touch zones and a list of pinch bindings. Every section has defaults, so
//! an empty file is a valid (if useless) profile.

use glam::Vec2;
use serde::Deserialize;

use crate::coords::{
    CircleRegion, NormalizedProjection, Projection, RectRegion, Region, RegionHit,
    ScreenProjection, ViewportProjection,
};
use crate::error::{ConfigError, finite, positive};
use crate::gestures::{PoseConfig, TouchZone};
use crate::interpreter::GestureInterpreter;
use crate::landmarks::{DistanceMetric, Handedness};
use crate::mappers::{
    DeformConfig, DeformMapper, DragConfig, DragMapper, InteractionMapper, RotateConfig,
    RotateMapper, ScaleConfig, ScaleMapper,
};
use crate::pinch::{PinchDetector, PinchThresholds};
use crate::wave::WaveConfig;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Meta {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProjectionConfig {
    #[default]
    Normalized,
    Screen {
        width: f32,
        height: f32,
    },
    Viewport {
        min: Vec2,
        max: Vec2,
    },
}

impl ProjectionConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::Normalized => Ok(()),
            Self::Screen { width, height } => {
                positive("projection.width", *width)?;
                positive("projection.height", *height)
            }
            Self::Viewport { min, max } => {
                for v in [min.x, min.y, max.x, max.y] {
                    finite("projection.viewport", v)?;
                }
                if min.x >= max.x {
                    return Err(ConfigError::InvertedRange {
                        field: "projection.viewport.x",
                        min: min.x,
                        max: max.x,
                    });
                }
                if min.y >= max.y {
                    return Err(ConfigError::InvertedRange {
                        field: "projection.viewport.y",
                        min: min.y,
                        max: max.y,
                    });
                }
                Ok(())
            }
        }
    }

    pub fn build(&self) -> Box<dyn Projection> {
        match *self {
            Self::Normalized => Box::new(NormalizedProjection),
            Self::Screen { width, height } => Box::new(ScreenProjection { width, height }),
            Self::Viewport { min, max } => Box::new(ViewportProjection { min, max }),
        }
    }
}

/// A region in host space, as written in a profile.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegionConfig {
    Rect(RectRegion),
    Circle(CircleRegion),
}

impl RegionConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::Rect(r) => {
                for v in [r.min.x, r.min.y, r.max.x, r.max.y] {
                    finite("region.rect", v)?;
                }
                if r.min.x > r.max.x || r.min.y > r.max.y {
                    return Err(ConfigError::InvertedRange {
                        field: "region.rect",
                        min: r.min.x,
                        max: r.max.x,
                    });
                }
                Ok(())
            }
            Self::Circle(c) => {
                finite("region.center.x", c.center.x)?;
                finite("region.center.y", c.center.y)?;
                positive("region.radius", c.radius)
            }
        }
    }
}

impl Region for RegionConfig {
    fn contains(&self, p: Vec2) -> bool {
        match self {
            Self::Rect(r) => r.contains(p),
            Self::Circle(c) => c.contains(p),
        }
    }

    fn center(&self) -> Vec2 {
        match self {
            Self::Rect(r) => r.center(),
            Self::Circle(c) => c.center(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapperConfig {
    Drag {
        #[serde(flatten)]
        cfg: DragConfig,
        /// Pinches inside count as hitting the target; outside is a miss.
        target: Option<RegionConfig>,
    },
    Scale {
        #[serde(flatten)]
        cfg: ScaleConfig,
    },
    Rotate {
        #[serde(flatten)]
        cfg: RotateConfig,
        gate: Option<RegionConfig>,
    },
    Deform {
        #[serde(flatten)]
        cfg: DeformConfig,
        region: RegionConfig,
    },
}

impl MapperConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Drag { .. } => "drag",
            Self::Scale { .. } => "scale",
            Self::Rotate { .. } => "rotate",
            Self::Deform { .. } => "deform",
        }
    }

    /// Metric and engage/release band each mapper is tuned for.
    fn default_pinch(&self) -> (DistanceMetric, f32, f32) {
        match self {
            Self::Drag { .. } => (DistanceMetric::Planar, 0.08, 0.12),
            Self::Scale { .. } => (DistanceMetric::Spatial, 0.20, 0.45),
            Self::Rotate { .. } => (DistanceMetric::Planar, 0.05, 0.07),
            Self::Deform { .. } => (DistanceMetric::Spatial, 0.06, 0.09),
        }
    }

    fn build(&self) -> Result<Box<dyn InteractionMapper>, ConfigError> {
        Ok(match self {
            Self::Drag { cfg, target } => {
                let m = DragMapper::new(cfg.clone())?;
                match target {
                    Some(r) => {
                        r.validate()?;
                        Box::new(m.with_hit_test(RegionHit(*r)))
                    }
                    None => Box::new(m),
                }
            }
            Self::Scale { cfg } => Box::new(ScaleMapper::new(cfg.clone())?),
            Self::Rotate { cfg, gate } => {
                let m = RotateMapper::new(cfg.clone())?;
                match gate {
                    Some(r) => {
                        r.validate()?;
                        Box::new(m.with_gate(*r))
                    }
                    None => Box::new(m),
                }
            }
            Self::Deform { cfg, region } => {
                region.validate()?;
                Box::new(DeformMapper::new(cfg.clone(), *region)?)
            }
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BindingConfig {
    pub name: String,
    pub hand: Handedness,
    /// Falls back to the mapper's usual metric when unset.
    pub metric: Option<DistanceMetric>,
    pub engage: Option<f32>,
    pub release: Option<f32>,
    pub mapper: MapperConfig,
}

impl BindingConfig {
    pub fn detector(&self) -> Result<PinchDetector, ConfigError> {
        let (metric, engage, release) = self.mapper.default_pinch();
        let thresholds = PinchThresholds::new(
            self.engage.unwrap_or(engage),
            self.release.unwrap_or(release),
        )?;
        Ok(PinchDetector::new(thresholds, self.metric.unwrap_or(metric)))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub meta: Meta,
    pub projection: ProjectionConfig,
    /// Wave detection runs only when the section is present.
    pub wave: Option<WaveConfig>,
    /// Pose tracking runs only when the section is present.
    pub poses: Option<PoseConfig>,
    pub zones: Vec<TouchZone>,
    pub bindings: Vec<BindingConfig>,
}

impl Profile {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let profile: Profile = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        profile.validate()?;
        Ok(profile)
    }

    /// Check everything `build` would check, without building.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.build().map(|_| ())
    }

    pub fn build(&self) -> Result<GestureInterpreter, ConfigError> {
        self.projection.validate()?;
        let mut it = GestureInterpreter::with_boxed_projection(self.projection.build())
            .with_zones(self.zones.clone())?;
        if let Some(w) = &self.wave {
            it = it.with_wave(w.clone())?;
        }
        if let Some(p) = &self.poses {
            it = it.with_poses(p.clone())?;
        }
        for b in &self.bindings {
            it.add_binding(b.name.clone(), b.hand, b.detector()?, b.mapper.build()?)?;
        }
        Ok(it)
    }
}
