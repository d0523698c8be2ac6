//! JSON-lines wire format for landmark input and event output.

use glam::Vec3;
use handctl::{Detection, GestureInterpreter, InterpreterEvent, MapperOutput};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One input line: every hand the tracker saw this tick.
#[derive(Debug, Clone, Deserialize)]
pub struct FrameRecord {
    /// Seconds since the previous line; the pipeline default applies when absent.
    pub dt: Option<f32>,
    #[serde(default)]
    pub hands: Vec<HandRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HandRecord {
    #[serde(default, alias = "label")]
    pub handedness: String,
    pub landmarks: Vec<Vec3>,
}

impl FrameRecord {
    pub fn into_detections(self) -> Vec<Detection> {
        self.hands
            .into_iter()
            .map(|h| Detection {
                label: h.handedness,
                landmarks: h.landmarks,
            })
            .collect()
    }
}

pub fn decode_line(line: &str) -> serde_json::Result<FrameRecord> {
    serde_json::from_str(line)
}

/// One output line.
#[derive(Debug, Serialize)]
pub struct OutputRecord<'a> {
    pub frame: u64,
    pub events: &'a [InterpreterEvent],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<BTreeMap<&'a str, MapperOutput>>,
}

impl<'a> OutputRecord<'a> {
    pub fn new(
        frame: u64,
        events: &'a [InterpreterEvent],
        interp: Option<&'a GestureInterpreter>,
    ) -> Self {
        Self {
            frame,
            events,
            outputs: interp.map(|it| it.outputs().collect()),
        }
    }
}

pub fn encode(record: &OutputRecord<'_>) -> serde_json::Result<String> {
    serde_json::to_string(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use handctl::Handedness;

    #[test]
    fn decodes_hands_with_either_label_key() {
        let pts: Vec<[f32; 3]> = vec![[0.5, 0.5, 0.0]; 21];
        let line = serde_json::json!({
            "dt": 0.02,
            "hands": [
                {"handedness": "Left", "landmarks": pts},
                {"label": "Right", "landmarks": pts}
            ]
        })
        .to_string();
        let rec = decode_line(&line).unwrap();
        assert_eq!(rec.dt, Some(0.02));
        let dets = rec.into_detections();
        assert_eq!(dets.len(), 2);
        assert_eq!(dets[0].label, "Left");
        assert_eq!(dets[1].label, "Right");
        assert_eq!(dets[1].landmarks.len(), 21);
        assert_eq!(dets[1].landmarks[3], Vec3::new(0.5, 0.5, 0.0));
    }

    #[test]
    fn empty_frame_is_valid() {
        let rec = decode_line("{}").unwrap();
        assert_eq!(rec.dt, None);
        assert!(rec.hands.is_empty());
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(decode_line("not json").is_err());
        assert!(decode_line(r#"{"hands": [{"handedness": "Left"}]}"#).is_err());
    }

    #[test]
    fn encodes_events_and_optional_outputs() {
        let events = vec![InterpreterEvent::WaveDetected {
            hand: Handedness::Right,
        }];
        let line = encode(&OutputRecord::new(7, &events, None)).unwrap();
        assert_eq!(
            line,
            r#"{"frame":7,"events":[{"event":"wave_detected","hand":"right"}]}"#
        );

        let it = GestureInterpreter::default();
        let line = encode(&OutputRecord::new(8, &[], Some(&it))).unwrap();
        assert_eq!(line, r#"{"frame":8,"events":[],"outputs":{}}"#);
    }
}
