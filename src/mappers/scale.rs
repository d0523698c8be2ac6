//! Pinch-to-zoom: uniform scale follows the ratio of the current pinch span
//! to the span at engage time.

use log::info;
use serde::Deserialize;

use super::{InteractionMapper, MapperContext, MapperOutput};
use crate::error::{ConfigError, positive};
use crate::smoothing::{EPSILON, follow_factor};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScaleConfig {
    pub initial: f32,
    pub min: f32,
    pub max: f32,
    /// Exponent on the distance ratio; above 1 reacts more strongly.
    pub sensitivity: f32,
    /// Follow rate per second toward the desired scale.
    pub smooth: f32,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            initial: 1.0,
            min: 0.3,
            max: 2.5,
            sensitivity: 1.2,
            smooth: 15.0,
        }
    }
}

impl ScaleConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("scale.min", self.min)?;
        positive("scale.max", self.max)?;
        if self.min > self.max {
            return Err(ConfigError::InvertedRange {
                field: "scale",
                min: self.min,
                max: self.max,
            });
        }
        positive("scale.initial", self.initial)?;
        positive("scale.sensitivity", self.sensitivity)?;
        positive("scale.smooth", self.smooth)
    }
}

pub struct ScaleMapper {
    cfg: ScaleConfig,
    scale: f32,
    start_distance: f32,
    start_scale: f32,
    desired: f32,
    active: bool,
}

impl ScaleMapper {
    pub fn new(cfg: ScaleConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let scale = cfg.initial.clamp(cfg.min, cfg.max);
        Ok(Self {
            cfg,
            scale,
            start_distance: EPSILON,
            start_scale: scale,
            desired: scale,
            active: false,
        })
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f32) {
        if scale.is_finite() {
            self.scale = scale.clamp(self.cfg.min, self.cfg.max);
        }
    }

    pub fn desired(&self) -> f32 {
        self.desired
    }

    pub fn factor(&self, distance: f32) -> f32 {
        (distance.max(0.0) / self.start_distance).powf(self.cfg.sensitivity)
    }
}

impl InteractionMapper for ScaleMapper {
    fn engage(&mut self, ctx: &MapperContext) -> bool {
        self.start_distance = ctx.distance.max(EPSILON);
        self.start_scale = self.scale;
        self.desired = self.scale;
        self.active = true;
        info!(
            "zoom begin start_dist={:.3} start_scale={:.2}",
            self.start_distance, self.start_scale
        );
        true
    }

    fn update(&mut self, ctx: &MapperContext) {
        if !self.active {
            return;
        }
        let factor = self.factor(ctx.distance);
        self.desired = (self.start_scale * factor).clamp(self.cfg.min, self.cfg.max);
        self.scale += (self.desired - self.scale) * follow_factor(self.cfg.smooth, ctx.dt);
    }

    fn release(&mut self) {
        if self.active {
            info!("zoom end scale={:.2}", self.scale);
        }
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn output(&self) -> MapperOutput {
        MapperOutput::Scale { scale: self.scale }
    }
}
