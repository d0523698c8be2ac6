//! Stateful transforms from a pinch session to a continuous control value.
//!
//! Every mapper follows the same lifecycle, driven by its binding's pinch
//! detector: `engage` on Started (may refuse), `update` on every following
//! engaged tick, `release` on Released, and `relax` on every tick without an
//! active session.

use glam::Vec2;
use serde::Serialize;

use crate::landmarks::Handedness;

pub mod deform;
pub mod drag;
pub mod rotate;
pub mod scale;

pub use deform::{DeformConfig, DeformMapper};
pub use drag::{DragConfig, DragMapper};
pub use rotate::{RotateConfig, RotateMapper};
pub use scale::{ScaleConfig, ScaleMapper};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapperContext {
    pub hand: Handedness,
    /// Thumb/index midpoint in normalized space.
    pub pinch_norm: Vec2,
    /// Thumb/index midpoint in host space.
    pub pinch_point: Vec2,
    /// Distance under the binding's metric.
    pub distance: f32,
    pub planar_distance: f32,
    pub spatial_distance: f32,
    pub dt: f32,
}

/// Current value of a mapper. Inactive mappers report their rest value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapperOutput {
    Position { position: Vec2 },
    Scale { scale: f32 },
    Angle { degrees: f32 },
    Deform { offset: Vec2, blush: f32 },
}

pub trait InteractionMapper: Send {
    /// Try to start a session. Returns false when acquisition fails; the
    /// mapper then stays inactive until the next pinch start.
    fn engage(&mut self, ctx: &MapperContext) -> bool;

    fn update(&mut self, ctx: &MapperContext);

    fn release(&mut self);

    fn relax(&mut self, _dt: f32) {}

    fn is_active(&self) -> bool;

    fn output(&self) -> MapperOutput;
}

#[cfg(test)]
pub(crate) fn ctx_at(pinch_point: Vec2, distance: f32, dt: f32) -> MapperContext {
    MapperContext {
        hand: Handedness::Right,
        pinch_norm: pinch_point,
        pinch_point,
        distance,
        planar_distance: distance,
        spatial_distance: distance,
        dt,
    }
}
