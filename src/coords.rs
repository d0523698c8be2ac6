//! Host-space projections and spatial predicates.
//!
//! The interpreter never ray-casts or renders. The host supplies a
//! [`Projection`] from normalized landmark space into whatever space its scene
//! lives in, and [`Region`] / [`HitTest`] predicates evaluated in that space.

use glam::Vec2;
use serde::Deserialize;

/// Maps normalized landmark coordinates (x, y in [0, 1], Y down) into host
/// space.
pub trait Projection: Send {
    fn project(&self, normalized: Vec2) -> Vec2;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizedProjection;

impl Projection for NormalizedProjection {
    fn project(&self, normalized: Vec2) -> Vec2 {
        normalized
    }
}

/// Screen pixels with the origin at the bottom-left (Y up).
#[derive(Debug, Clone, Copy)]
pub struct ScreenProjection {
    pub width: f32,
    pub height: f32,
}

impl Projection for ScreenProjection {
    fn project(&self, n: Vec2) -> Vec2 {
        Vec2::new(n.x * self.width, (1.0 - n.y) * self.height)
    }
}

/// Orthographic view onto a world-space rectangle: the bottom-left of the
/// image lands on `min`, the top-right on `max`.
#[derive(Debug, Clone, Copy)]
pub struct ViewportProjection {
    pub min: Vec2,
    pub max: Vec2,
}

impl Projection for ViewportProjection {
    fn project(&self, n: Vec2) -> Vec2 {
        let size = self.max - self.min;
        Vec2::new(
            self.min.x + n.x * size.x,
            self.min.y + (1.0 - n.y) * size.y,
        )
    }
}

pub trait Region: Send {
    fn contains(&self, p: Vec2) -> bool;
    fn center(&self) -> Vec2;
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RectRegion {
    pub min: Vec2,
    pub max: Vec2,
}

impl Region for RectRegion {
    fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CircleRegion {
    pub center: Vec2,
    pub radius: f32,
}

impl Region for CircleRegion {
    fn contains(&self, p: Vec2) -> bool {
        p.distance_squared(self.center) <= self.radius * self.radius
    }

    fn center(&self) -> Vec2 {
        self.center
    }
}

/// Outcome of a host hit test at the pinch point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Target,
    Other,
    Miss,
}

pub trait HitTest: Send {
    fn hit_test(&self, p: Vec2) -> Hit;
}

impl<F> HitTest for F
where
    F: Fn(Vec2) -> Hit + Send,
{
    fn hit_test(&self, p: Vec2) -> Hit {
        self(p)
    }
}

/// Treats a region as the target: inside is `Target`, outside is `Miss`.
pub struct RegionHit<R>(pub R);

impl<R: Region> HitTest for RegionHit<R> {
    fn hit_test(&self, p: Vec2) -> Hit {
        if self.0.contains(p) { Hit::Target } else { Hit::Miss }
    }
}
