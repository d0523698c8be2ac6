//! Pinch-to-rotate around a fixed pivot.

use glam::Vec2;
use log::info;
use serde::Deserialize;

use super::{InteractionMapper, MapperContext, MapperOutput};
use crate::coords::Region;
use crate::error::{ConfigError, finite, positive};
use crate::smoothing::{delta_angle, normalize_angle, smooth_damp_angle};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RotateConfig {
    pub pivot: Vec2,
    pub initial: f32,
    /// Output is held within [-max_angle, max_angle] degrees.
    pub max_angle: f32,
    pub sensitivity: f32,
    /// Spring time constant in seconds; smaller follows faster.
    pub smooth_time: f32,
    /// Degrees per second.
    pub max_angular_speed: f32,
}

impl Default for RotateConfig {
    fn default() -> Self {
        Self {
            pivot: Vec2::ZERO,
            initial: 0.0,
            max_angle: 50.0,
            sensitivity: 1.0,
            smooth_time: 0.06,
            max_angular_speed: 1080.0,
        }
    }
}

impl RotateConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        finite("rotate.pivot.x", self.pivot.x)?;
        finite("rotate.pivot.y", self.pivot.y)?;
        finite("rotate.initial", self.initial)?;
        positive("rotate.max_angle", self.max_angle)?;
        positive("rotate.sensitivity", self.sensitivity)?;
        positive("rotate.smooth_time", self.smooth_time)?;
        positive("rotate.max_angular_speed", self.max_angular_speed)
    }
}

pub struct RotateMapper {
    cfg: RotateConfig,
    gate: Option<Box<dyn Region>>,
    angle: f32,
    desired: f32,
    velocity: f32,
    start_pointer: f32,
    start_angle: f32,
    active: bool,
}

impl RotateMapper {
    pub fn new(cfg: RotateConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let angle = normalize_angle(cfg.initial).clamp(-cfg.max_angle, cfg.max_angle);
        Ok(Self {
            cfg,
            gate: None,
            angle,
            desired: angle,
            velocity: 0.0,
            start_pointer: 0.0,
            start_angle: angle,
            active: false,
        })
    }

    pub fn with_gate(mut self, region: impl Region + 'static) -> Self {
        self.gate = Some(Box::new(region));
        self
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn set_angle(&mut self, degrees: f32) {
        if degrees.is_finite() {
            self.angle = normalize_angle(degrees);
        }
    }

    pub fn desired(&self) -> f32 {
        self.desired
    }

    fn pointer_angle(&self, p: Vec2) -> f32 {
        let v = p - self.cfg.pivot;
        v.y.atan2(v.x).to_degrees()
    }
}

impl InteractionMapper for RotateMapper {
    fn engage(&mut self, ctx: &MapperContext) -> bool {
        if let Some(gate) = &self.gate {
            if !gate.contains(ctx.pinch_point) {
                return false;
            }
        }
        self.start_pointer = self.pointer_angle(ctx.pinch_point);
        self.start_angle = normalize_angle(self.angle);
        self.desired = self.start_angle;
        self.velocity = 0.0;
        self.active = true;
        info!(
            "rotate begin pointer={:.1} pivot={:.1}",
            self.start_pointer, self.start_angle
        );
        true
    }

    fn update(&mut self, ctx: &MapperContext) {
        if !self.active {
            return;
        }
        let pointer = self.pointer_angle(ctx.pinch_point);
        let delta = delta_angle(self.start_pointer, pointer) * self.cfg.sensitivity;
        self.desired = (self.start_angle + delta).clamp(-self.cfg.max_angle, self.cfg.max_angle);
        self.angle = smooth_damp_angle(
            self.angle,
            self.desired,
            &mut self.velocity,
            self.cfg.smooth_time,
            self.cfg.max_angular_speed,
            ctx.dt,
        );
    }

    fn release(&mut self) {
        if self.active {
            info!("rotate end angle={:.1}", self.angle);
        }
        self.active = false;
        self.velocity = 0.0;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn output(&self) -> MapperOutput {
        MapperOutput::Angle {
            degrees: self.angle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::CircleRegion;
    use crate::mappers::ctx_at;

    fn on_circle(deg: f32) -> Vec2 {
        let r = deg.to_radians();
        Vec2::new(r.cos(), r.sin())
    }

    fn engaged(cfg: RotateConfig) -> RotateMapper {
        let mut m = RotateMapper::new(cfg).unwrap();
        assert!(m.engage(&ctx_at(on_circle(0.0), 0.02, 0.0)));
        m
    }

    #[test]
    fn follows_pointer_angle() {
        let mut m = engaged(RotateConfig::default());
        for _ in 0..120 {
            m.update(&ctx_at(on_circle(30.0), 0.02, 1.0 / 60.0));
        }
        assert!((m.desired() - 30.0).abs() < 1e-3);
        assert!((m.angle() - 30.0).abs() < 0.01);
    }

    #[test]
    fn desired_is_clamped() {
        let mut m = engaged(RotateConfig::default());
        m.update(&ctx_at(on_circle(120.0), 0.02, 1.0 / 60.0));
        assert_eq!(m.desired(), 50.0);
        m.update(&ctx_at(on_circle(-170.0), 0.02, 1.0 / 60.0));
        assert_eq!(m.desired(), -50.0);
    }

    #[test]
    fn clamp_holds_with_high_sensitivity() {
        let mut m = engaged(RotateConfig {
            sensitivity: 4.0,
            ..RotateConfig::default()
        });
        for deg in [10.0, 20.0, 45.0, 90.0, 179.0] {
            m.update(&ctx_at(on_circle(deg), 0.02, 1.0 / 60.0));
            assert!(m.desired().abs() <= 50.0);
            assert!(m.angle().abs() <= 50.0 + 1e-3);
        }
    }

    #[test]
    fn crossing_the_seam_uses_shortest_path() {
        let mut m = RotateMapper::new(RotateConfig::default()).unwrap();
        assert!(m.engage(&ctx_at(on_circle(175.0), 0.02, 0.0)));
        m.update(&ctx_at(on_circle(-175.0), 0.02, 1.0 / 60.0));
        assert!((m.desired() - 10.0).abs() < 1e-3);
    }

    #[test]
    fn angular_speed_is_bounded() {
        let mut m = engaged(RotateConfig {
            max_angular_speed: 60.0,
            ..RotateConfig::default()
        });
        m.update(&ctx_at(on_circle(45.0), 0.02, 1.0 / 60.0));
        assert!(m.angle() <= 60.0 * 0.06);
    }

    #[test]
    fn gate_refuses_outside_pinch() {
        let mut m = RotateMapper::new(RotateConfig::default())
            .unwrap()
            .with_gate(CircleRegion {
                center: Vec2::new(5.0, 5.0),
                radius: 1.0,
            });
        assert!(!m.engage(&ctx_at(on_circle(0.0), 0.02, 0.0)));
        assert!(m.engage(&ctx_at(Vec2::new(5.2, 5.0), 0.02, 0.0)));
    }

    #[test]
    fn second_session_starts_from_current_angle() {
        let mut m = engaged(RotateConfig::default());
        for _ in 0..120 {
            m.update(&ctx_at(on_circle(20.0), 0.02, 1.0 / 60.0));
        }
        m.release();
        assert!(m.engage(&ctx_at(on_circle(90.0), 0.02, 0.0)));
        for _ in 0..120 {
            m.update(&ctx_at(on_circle(110.0), 0.02, 1.0 / 60.0));
        }
        assert!((m.angle() - 40.0).abs() < 0.05);
    }
}
