use thiserror::Error;

/// Rejected landmark input. Never escapes `submit_frame`; the hand simply
/// counts as not detected for that tick.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameError {
    #[error("expected {expected} landmarks, got {got}")]
    WrongCount { expected: usize, got: usize },
    #[error("landmark {index} has a non-finite coordinate")]
    NonFinite { index: usize },
}

/// Configuration-time validation failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("release threshold {release} must be greater than engage threshold {engage}")]
    InvertedThresholds { engage: f32, release: f32 },
    #[error("{field} must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must be zero or a positive finite number, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f32 },
    #[error("{field}: min {min} must not exceed max {max}")]
    InvertedRange { field: &'static str, min: f32, max: f32 },
    #[error("{field} must be at least {min}, got {value}")]
    TooSmall { field: &'static str, min: usize, value: usize },
    #[error("duplicate binding name '{0}'")]
    DuplicateBinding(String),
    #[error("binding name must not be empty")]
    EmptyBindingName,
    #[error("touch zone '{0}' has an empty or inverted rectangle")]
    BadZone(String),
    #[error("profile parse error: {0}")]
    Parse(String),
}

pub(crate) fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

pub(crate) fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

pub(crate) fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field, value })
    }
}
