//! Hand-wave detection.
//!
//! Coarse oscillation counter: wrist x samples are collected over a fixed
//! window and the window is walked once, counting direction reversals whose
//! displacement since the previous reversal exceeds a threshold. This is a
//! zero-crossing-with-threshold approximation, not a frequency-domain
//! detector, so incidental side-to-side motion can still register.

use serde::Deserialize;

use crate::error::{ConfigError, positive};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    /// Minimum x displacement (normalized) for a reversal to count.
    pub threshold: f32,
    /// Window length in seconds.
    pub window_secs: f32,
    pub required_swings: usize,
    /// Quiet period after a detection, in seconds.
    pub cooldown_secs: f32,
    /// Windows with fewer samples reset without a verdict.
    pub min_samples: usize,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            window_secs: 1.0,
            required_swings: 3,
            cooldown_secs: 2.5,
            min_samples: 10,
        }
    }
}

impl WaveConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("wave.threshold", self.threshold)?;
        positive("wave.window_secs", self.window_secs)?;
        crate::error::non_negative("wave.cooldown_secs", self.cooldown_secs)?;
        if self.required_swings < 1 {
            return Err(ConfigError::TooSmall {
                field: "wave.required_swings",
                min: 1,
                value: self.required_swings,
            });
        }
        if self.min_samples < 2 {
            return Err(ConfigError::TooSmall {
                field: "wave.min_samples",
                min: 2,
                value: self.min_samples,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct WaveDetector {
    cfg: WaveConfig,
    /// Wrist x per detected tick in the current window.
    samples: Vec<f32>,
    window_elapsed: f32,
    clock: f32,
    cooldown_until: f32,
}

impl WaveDetector {
    pub fn new(cfg: WaveConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            samples: Vec::new(),
            window_elapsed: 0.0,
            clock: 0.0,
            cooldown_until: 0.0,
        })
    }

    pub fn config(&self) -> &WaveConfig {
        &self.cfg
    }

    pub fn in_cooldown(&self) -> bool {
        self.clock < self.cooldown_until
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Advance by `dt` seconds. `x` is the tracked wrist x, or `None` when the
    /// hand is not detected. Returns true exactly on the tick a wave fires.
    pub fn update(&mut self, x: Option<f32>, dt: f32) -> bool {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.clock += dt;

        let Some(x) = x else {
            self.clear();
            return false;
        };

        // zero dt: no new sample, the window cannot advance
        if dt == 0.0 {
            return false;
        }
        self.window_elapsed += dt;
        self.samples.push(x);

        if self.window_elapsed <= self.cfg.window_secs {
            return false;
        }

        let swings = self.count_swings();
        self.clear();
        if swings >= self.cfg.required_swings && !self.in_cooldown() {
            self.cooldown_until = self.clock + self.cfg.cooldown_secs;
            log::info!("wave detected ({swings} swings)");
            return true;
        }
        false
    }

    fn count_swings(&self) -> usize {
        if self.samples.len() < self.cfg.min_samples {
            return 0;
        }
        let mut swings = 0;
        let mut anchor = self.samples[0];
        let mut moving_right = self.samples[1] > self.samples[0];
        for &x in &self.samples[1..] {
            let diff = x - anchor;
            if moving_right && diff < -self.cfg.threshold {
                swings += 1;
                moving_right = false;
                anchor = x;
            } else if !moving_right && diff > self.cfg.threshold {
                swings += 1;
                moving_right = true;
                anchor = x;
            }
        }
        swings
    }

    /// Drop the window; the cooldown keeps running.
    pub fn clear(&mut self) {
        self.samples.clear();
        self.window_elapsed = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    const DT: f32 = 0.02;

    fn wave_x(i: usize) -> f32 {
        0.5 + 0.2 * (TAU * 2.0 * i as f32 * DT).sin()
    }

    fn run(det: &mut WaveDetector, frames: std::ops::Range<usize>, f: impl Fn(usize) -> f32) -> usize {
        frames.filter(|&i| det.update(Some(f(i)), DT)).count()
    }

    #[test]
    fn oscillation_fires_once_then_cools_down() {
        let mut det = WaveDetector::new(WaveConfig::default()).unwrap();
        // ~2.4 s: two windows, the second inside the 2.5 s cooldown
        assert_eq!(run(&mut det, 0..120, wave_x), 1);
        assert!(det.in_cooldown());
    }

    #[test]
    fn fires_again_after_cooldown() {
        let mut det = WaveDetector::new(WaveConfig::default()).unwrap();
        assert_eq!(run(&mut det, 0..220, wave_x), 2);
    }

    #[test]
    fn still_hand_never_fires() {
        let mut det = WaveDetector::new(WaveConfig::default()).unwrap();
        assert_eq!(run(&mut det, 0..200, |_| 0.5), 0);
    }

    #[test]
    fn small_jitter_is_ignored() {
        let mut det = WaveDetector::new(WaveConfig::default()).unwrap();
        let jitter = |i: usize| 0.5 + if i % 2 == 0 { 0.04 } else { -0.04 };
        assert_eq!(run(&mut det, 0..200, jitter), 0);
    }

    #[test]
    fn too_few_samples_gives_no_verdict() {
        let cfg = WaveConfig::default();
        let mut det = WaveDetector::new(cfg).unwrap();
        // 5 samples at 0.25 s spacing cross the window without enough data
        let xs = [0.2, 0.8, 0.2, 0.8, 0.2, 0.8];
        let fired = xs.iter().filter(|&&x| det.update(Some(x), 0.25)).count();
        assert_eq!(fired, 0);
    }

    #[test]
    fn losing_the_hand_clears_the_window() {
        let mut det = WaveDetector::new(WaveConfig::default()).unwrap();
        for i in 0..30 {
            det.update(Some(wave_x(i)), DT);
        }
        assert_eq!(det.sample_count(), 30);
        det.update(None, DT);
        assert_eq!(det.sample_count(), 0);
    }

    #[test]
    fn zero_dt_ticks_do_not_accumulate() {
        let mut det = WaveDetector::new(WaveConfig::default()).unwrap();
        for i in 0..10_000 {
            assert!(!det.update(Some(wave_x(i)), 0.0));
        }
        assert_eq!(det.sample_count(), 0);
        det.update(Some(0.5), -1.0);
        assert_eq!(det.sample_count(), 0);
        det.update(Some(0.5), DT);
        assert_eq!(det.sample_count(), 1);
    }

    #[test]
    fn rejects_bad_config() {
        let cfg = WaveConfig {
            required_swings: 0,
            ..WaveConfig::default()
        };
        assert!(WaveDetector::new(cfg).is_err());
    }
}
