//! Hand-landmark gesture interpretation.
//!
//! Feed per-hand MediaPipe-style landmark frames into a [`GestureInterpreter`]
//! and get back pinch, wave and pose events plus continuous drag, scale,
//! rotate and deform values for the host to apply.

pub mod config;
pub mod coords;
pub mod error;
pub mod gestures;
pub mod interpreter;
pub mod landmarks;
pub mod mappers;
pub mod pinch;
pub mod smoothing;
pub mod store;
pub mod wave;

pub use config::Profile;
pub use error::{ConfigError, FrameError};
pub use interpreter::{Detection, GestureInterpreter, InterpreterEvent};
pub use landmarks::{DistanceMetric, Handedness, LandmarkFrame};
pub use mappers::{InteractionMapper, MapperContext, MapperOutput};
