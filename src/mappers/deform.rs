//! Region pull: a pinch inside a region stretches it outward from its centre.
//!
//! The pull is the pinch displacement projected onto the centre→pinch
//! direction, so sideways motion does not shear the region. After release
//! the offset eases back to rest instead of snapping.

use glam::Vec2;
use log::info;
use serde::Deserialize;

use super::{InteractionMapper, MapperContext, MapperOutput};
use crate::coords::Region;
use crate::error::{ConfigError, non_negative, positive};
use crate::smoothing::{clamp_length, follow_factor, smooth_damp_vec2, smoothstep};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeformConfig {
    pub pull_strength: f32,
    /// Maximum offset magnitude in host units.
    pub max_pull: f32,
    pub return_rate: f32,
    /// Falloff distance from the region centre; 0 gives a hard edge.
    pub soft_edge: f32,
    /// Spring time constant while pulling; 0 follows the target directly.
    pub smooth_time: f32,
    /// Seconds the blush lingers after the last pull; 0 disables it.
    pub blush_duration: f32,
}

impl Default for DeformConfig {
    fn default() -> Self {
        Self {
            pull_strength: 1.2,
            max_pull: 1.5,
            return_rate: 12.0,
            soft_edge: 0.0,
            smooth_time: 0.0,
            blush_duration: 2.0,
        }
    }
}

impl DeformConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("deform.pull_strength", self.pull_strength)?;
        positive("deform.max_pull", self.max_pull)?;
        positive("deform.return_rate", self.return_rate)?;
        non_negative("deform.soft_edge", self.soft_edge)?;
        non_negative("deform.smooth_time", self.smooth_time)?;
        non_negative("deform.blush_duration", self.blush_duration)
    }
}

/// Countdown that is topped up while pulling and drains while idle.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlushTimer {
    duration: f32,
    remaining: f32,
}

impl BlushTimer {
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            remaining: 0.0,
        }
    }

    pub fn trigger(&mut self) {
        self.remaining = self.duration;
    }

    pub fn advance(&mut self, dt: f32) {
        if dt.is_finite() {
            self.remaining = (self.remaining - dt.max(0.0)).max(0.0);
        }
    }

    /// 1 right after a pull, fading linearly to 0.
    pub fn intensity(&self) -> f32 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        (self.remaining / self.duration).clamp(0.0, 1.0)
    }
}

pub struct DeformMapper {
    cfg: DeformConfig,
    region: Box<dyn Region>,
    start: Vec2,
    target: Vec2,
    offset: Vec2,
    velocity: Vec2,
    blush: BlushTimer,
    active: bool,
}

impl DeformMapper {
    pub fn new(cfg: DeformConfig, region: impl Region + 'static) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self {
            blush: BlushTimer::new(cfg.blush_duration),
            cfg,
            region: Box::new(region),
            start: Vec2::ZERO,
            target: Vec2::ZERO,
            offset: Vec2::ZERO,
            velocity: Vec2::ZERO,
            active: false,
        })
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn blush(&self) -> f32 {
        self.blush.intensity()
    }

    /// Offset per axis relative to `max_pull`, in [-1, 1]. Hosts scale this
    /// into their own parameter range.
    pub fn normalized(&self) -> Vec2 {
        (self.offset / self.cfg.max_pull).clamp(Vec2::NEG_ONE, Vec2::ONE)
    }

    /// Deformation weight at `p`: 0 outside the region, 1 inside, or a
    /// smoothstep falloff from the centre when `soft_edge` is set.
    pub fn weight(&self, p: Vec2) -> f32 {
        if !self.region.contains(p) {
            return 0.0;
        }
        if self.cfg.soft_edge <= 0.0 {
            return 1.0;
        }
        let dist = p.distance(self.region.center());
        smoothstep(1.0 - dist / self.cfg.soft_edge)
    }

    pub fn deform_points(&self, base: &[Vec2], out: &mut [Vec2]) {
        for (o, b) in out.iter_mut().zip(base) {
            *o = *b + self.offset * self.weight(*b);
        }
    }

    fn pull(&self, p: Vec2) -> Vec2 {
        let dir = (p - self.region.center()).try_normalize().unwrap_or(Vec2::X);
        let amount = (p - self.start).dot(dir);
        clamp_length(dir * amount * self.cfg.pull_strength, self.cfg.max_pull)
    }
}

impl InteractionMapper for DeformMapper {
    fn engage(&mut self, ctx: &MapperContext) -> bool {
        if !self.region.contains(ctx.pinch_point) {
            return false;
        }
        self.start = ctx.pinch_point;
        self.velocity = Vec2::ZERO;
        self.active = true;
        info!("pull begin at ({:.3}, {:.3})", self.start.x, self.start.y);
        true
    }

    fn update(&mut self, ctx: &MapperContext) {
        if !self.active {
            return;
        }
        self.target = self.pull(ctx.pinch_point);
        self.offset = if self.cfg.smooth_time > 0.0 {
            smooth_damp_vec2(
                self.offset,
                self.target,
                &mut self.velocity,
                self.cfg.smooth_time,
                ctx.dt,
            )
        } else {
            self.target
        };
        self.blush.trigger();
    }

    fn release(&mut self) {
        if self.active {
            info!("pull end");
        }
        self.active = false;
        self.target = Vec2::ZERO;
        self.velocity = Vec2::ZERO;
    }

    fn relax(&mut self, dt: f32) {
        self.offset = self
            .offset
            .lerp(Vec2::ZERO, follow_factor(self.cfg.return_rate, dt));
        if self.offset.length_squared() < 1e-12 {
            self.offset = Vec2::ZERO;
        }
        self.blush.advance(dt);
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn output(&self) -> MapperOutput {
        MapperOutput::Deform {
            offset: self.offset,
            blush: self.blush.intensity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{CircleRegion, RectRegion};
    use crate::mappers::ctx_at;

    fn unit_region() -> RectRegion {
        RectRegion {
            min: Vec2::splat(-1.0),
            max: Vec2::splat(1.0),
        }
    }

    fn mapper(cfg: DeformConfig) -> DeformMapper {
        DeformMapper::new(cfg, unit_region()).unwrap()
    }

    #[test]
    fn pull_is_clamped_to_max() {
        let mut m = mapper(DeformConfig {
            pull_strength: 1.0,
            max_pull: 0.3,
            ..DeformConfig::default()
        });
        assert!(m.engage(&ctx_at(Vec2::ZERO, 0.02, 0.0)));
        m.update(&ctx_at(Vec2::new(0.5, 0.0), 0.02, 1.0 / 60.0));
        assert!(m.offset().distance(Vec2::new(0.3, 0.0)) < 1e-6);
    }

    #[test]
    fn sideways_motion_is_projected_out() {
        let mut m = mapper(DeformConfig {
            pull_strength: 1.0,
            ..DeformConfig::default()
        });
        assert!(m.engage(&ctx_at(Vec2::new(0.2, 0.0), 0.02, 0.0)));
        // move straight outward: full displacement along +x
        m.update(&ctx_at(Vec2::new(0.4, 0.0), 0.02, 1.0 / 60.0));
        assert!(m.offset().distance(Vec2::new(0.2, 0.0)) < 1e-6);
        // swing around the centre: only the component along the new direction counts
        m.update(&ctx_at(Vec2::new(0.0, 0.2), 0.02, 1.0 / 60.0));
        let dir = Vec2::Y;
        let expected = dir * (Vec2::new(0.0, 0.2) - Vec2::new(0.2, 0.0)).dot(dir);
        assert!(m.offset().distance(expected) < 1e-6);
    }

    #[test]
    fn refuses_outside_region() {
        let mut m = mapper(DeformConfig::default());
        assert!(!m.engage(&ctx_at(Vec2::new(3.0, 0.0), 0.02, 0.0)));
        assert!(!m.is_active());
    }

    #[test]
    fn eases_back_after_release() {
        let mut m = mapper(DeformConfig {
            pull_strength: 1.0,
            ..DeformConfig::default()
        });
        m.engage(&ctx_at(Vec2::ZERO, 0.02, 0.0));
        m.update(&ctx_at(Vec2::new(0.5, 0.0), 0.02, 1.0 / 60.0));
        m.release();

        m.relax(1.0 / 60.0);
        let after_one = m.offset().x;
        assert!(after_one > 0.0 && after_one < 0.5);

        for _ in 0..600 {
            m.relax(1.0 / 60.0);
        }
        assert_eq!(m.offset(), Vec2::ZERO);
    }

    #[test]
    fn blush_fades_after_pull() {
        let mut m = mapper(DeformConfig::default());
        m.engage(&ctx_at(Vec2::ZERO, 0.02, 0.0));
        m.update(&ctx_at(Vec2::new(0.1, 0.0), 0.02, 1.0 / 60.0));
        assert_eq!(m.blush(), 1.0);
        m.release();
        m.relax(1.0);
        assert!((m.blush() - 0.5).abs() < 1e-6);
        m.relax(5.0);
        assert_eq!(m.blush(), 0.0);
    }

    #[test]
    fn weights_hard_and_soft() {
        let hard = mapper(DeformConfig::default());
        assert_eq!(hard.weight(Vec2::new(0.9, 0.0)), 1.0);
        assert_eq!(hard.weight(Vec2::new(1.5, 0.0)), 0.0);

        let soft = DeformMapper::new(
            DeformConfig {
                soft_edge: 1.0,
                ..DeformConfig::default()
            },
            CircleRegion {
                center: Vec2::ZERO,
                radius: 1.0,
            },
        )
        .unwrap();
        assert_eq!(soft.weight(Vec2::ZERO), 1.0);
        assert!((soft.weight(Vec2::new(0.5, 0.0)) - 0.5).abs() < 1e-6);
        assert_eq!(soft.weight(Vec2::new(1.0, 0.0)), 0.0);
    }

    #[test]
    fn deform_points_moves_only_inside() {
        let mut m = mapper(DeformConfig {
            pull_strength: 1.0,
            ..DeformConfig::default()
        });
        m.engage(&ctx_at(Vec2::ZERO, 0.02, 0.0));
        m.update(&ctx_at(Vec2::new(0.25, 0.0), 0.02, 1.0 / 60.0));

        let base = [Vec2::new(0.5, 0.5), Vec2::new(2.0, 2.0)];
        let mut out = [Vec2::ZERO; 2];
        m.deform_points(&base, &mut out);
        assert!(out[0].distance(Vec2::new(0.75, 0.5)) < 1e-6);
        assert_eq!(out[1], base[1]);
    }

    #[test]
    fn normalized_stays_in_unit_range() {
        let mut m = mapper(DeformConfig {
            pull_strength: 10.0,
            max_pull: 0.2,
            ..DeformConfig::default()
        });
        m.engage(&ctx_at(Vec2::ZERO, 0.02, 0.0));
        m.update(&ctx_at(Vec2::new(0.0, -0.9), 0.02, 1.0 / 60.0));
        let n = m.normalized();
        assert!((n.y + 1.0).abs() < 1e-6);
        assert!(n.x.abs() < 1e-6);
    }
}
