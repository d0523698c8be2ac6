//! Pinch-to-grab: the target follows the pinch point with a fixed offset.

use glam::Vec2;
use log::{debug, info};
use serde::Deserialize;

use super::{InteractionMapper, MapperContext, MapperOutput};
use crate::coords::{Hit, HitTest};
use crate::error::{ConfigError, finite, non_negative, positive};
use crate::smoothing::follow_factor;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    pub position: Vec2,
    /// Follow rate per second; 15 closes most of the gap in a few frames.
    pub follow_speed: f32,
    /// With a hit test installed, a hit on something other than the target
    /// refuses the grab.
    pub require_hit_on_target: bool,
    /// On a miss, accept pinches within `pick_radius` of the target.
    pub fallback_pick: bool,
    pub pick_radius: f32,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            follow_speed: 15.0,
            require_hit_on_target: true,
            fallback_pick: true,
            pick_radius: 120.0,
        }
    }
}

impl DragConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        finite("drag.position.x", self.position.x)?;
        finite("drag.position.y", self.position.y)?;
        positive("drag.follow_speed", self.follow_speed)?;
        non_negative("drag.pick_radius", self.pick_radius)
    }
}

pub struct DragMapper {
    cfg: DragConfig,
    hit_test: Option<Box<dyn HitTest>>,
    position: Vec2,
    offset: Vec2,
    active: bool,
}

impl DragMapper {
    pub fn new(cfg: DragConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self {
            position: cfg.position,
            cfg,
            hit_test: None,
            offset: Vec2::ZERO,
            active: false,
        })
    }

    pub fn with_hit_test(mut self, hit_test: impl HitTest + 'static) -> Self {
        self.hit_test = Some(Box::new(hit_test));
        self
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Host-side override, e.g. when the scene moves the target itself.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    fn acquire(&self, p: Vec2) -> Option<&'static str> {
        let Some(ht) = &self.hit_test else {
            return Some("ungated");
        };
        match ht.hit_test(p) {
            Hit::Target => Some("hit"),
            Hit::Other if !self.cfg.require_hit_on_target => Some("hit other"),
            Hit::Other => {
                debug!("drag refused: hit something other than the target");
                None
            }
            Hit::Miss => {
                let d = self.position.distance(p);
                if self.cfg.fallback_pick && d <= self.cfg.pick_radius {
                    Some("proximity")
                } else {
                    debug!(
                        "drag refused: miss, distance {d:.1} > pick radius {:.1}",
                        self.cfg.pick_radius
                    );
                    None
                }
            }
        }
    }
}

impl InteractionMapper for DragMapper {
    fn engage(&mut self, ctx: &MapperContext) -> bool {
        let Some(how) = self.acquire(ctx.pinch_point) else {
            return false;
        };
        self.offset = self.position - ctx.pinch_point;
        self.active = true;
        info!("drag begin ({how})");
        true
    }

    fn update(&mut self, ctx: &MapperContext) {
        if !self.active {
            return;
        }
        let desired = ctx.pinch_point + self.offset;
        self.position = self
            .position
            .lerp(desired, follow_factor(self.cfg.follow_speed, ctx.dt));
    }

    fn release(&mut self) {
        if self.active {
            info!("drag end");
        }
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn output(&self) -> MapperOutput {
        MapperOutput::Position {
            position: self.position,
        }
    }
}
