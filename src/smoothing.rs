//! Frame-rate independent smoothing helpers shared by the mappers.

use glam::Vec2;

pub const EPSILON: f32 = 1e-4;

/// Fraction of the remaining gap to close this tick for a rate-limited follow.
pub fn follow_factor(rate: f32, dt: f32) -> f32 {
    let t = rate * dt;
    if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 }
}

/// Signed shortest difference `target - current` in degrees, in (-180, 180].
pub fn delta_angle(current: f32, target: f32) -> f32 {
    let mut d = (target - current).rem_euclid(360.0);
    if d > 180.0 {
        d -= 360.0;
    }
    d
}

pub fn normalize_angle(angle: f32) -> f32 {
    delta_angle(0.0, angle)
}

pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

pub fn clamp_length(v: Vec2, max: f32) -> Vec2 {
    v.clamp_length_max(max.max(0.0))
}

/// Critically damped spring toward `target` (Game Programming Gems 4, 1.10).
/// `velocity` carries state between calls; `max_speed` bounds the rate of
/// change in units per second.
pub fn smooth_damp(
    current: f32,
    target: f32,
    velocity: &mut f32,
    smooth_time: f32,
    max_speed: f32,
    dt: f32,
) -> f32 {
    if !(dt > 0.0) {
        return current;
    }
    let smooth_time = smooth_time.max(EPSILON);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let max_change = max_speed * smooth_time;
    let change = (current - target).clamp(-max_change, max_change);
    let goal = current - change;

    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * exp;
    let mut out = goal + (change + temp) * exp;

    // no overshoot past the target
    if (target - current > 0.0) == (out > target) {
        out = target;
        *velocity = (out - target) / dt;
    }
    out
}

pub fn smooth_damp_angle(
    current: f32,
    target: f32,
    velocity: &mut f32,
    smooth_time: f32,
    max_speed: f32,
    dt: f32,
) -> f32 {
    let target = current + delta_angle(current, target);
    smooth_damp(current, target, velocity, smooth_time, max_speed, dt)
}

pub fn smooth_damp_vec2(
    current: Vec2,
    target: Vec2,
    velocity: &mut Vec2,
    smooth_time: f32,
    dt: f32,
) -> Vec2 {
    let x = smooth_damp(
        current.x,
        target.x,
        &mut velocity.x,
        smooth_time,
        f32::INFINITY,
        dt,
    );
    let y = smooth_damp(
        current.y,
        target.y,
        &mut velocity.y,
        smooth_time,
        f32::INFINITY,
        dt,
    );
    Vec2::new(x, y)
}
