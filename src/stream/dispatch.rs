use anyhow::Result;
use handctl::{GestureInterpreter, InterpreterEvent};
use log::{debug, info};
use std::io::Write;

use super::codec::{OutputRecord, encode};

/// Running totals reported when the stream ends.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    pub frames: u64,
    pub skipped: u64,
    pub pinch_started: u64,
    pub pinch_released: u64,
    pub waves: u64,
    pub pose_changes: u64,
    pub reloads: u64,
}

impl Summary {
    pub fn count(&mut self, ev: &InterpreterEvent) {
        match ev {
            InterpreterEvent::PinchStarted { .. } => self.pinch_started += 1,
            InterpreterEvent::PinchReleased { .. } => self.pinch_released += 1,
            InterpreterEvent::WaveDetected { .. } => self.waves += 1,
            InterpreterEvent::PoseChanged { .. } => self.pose_changes += 1,
        }
    }

    pub fn log(&self) {
        info!(
            "stream done: {} frames ({} skipped), {} pinches ({} released), {} waves, {} pose changes, {} reloads",
            self.frames,
            self.skipped,
            self.pinch_started,
            self.pinch_released,
            self.waves,
            self.pose_changes,
            self.reloads
        );
    }
}

/// Write one output line for `frame` when it produced events, or always when
/// `with_outputs` is set. Returns whether a line was written.
pub fn dispatch_events(
    frame: u64,
    events: &[InterpreterEvent],
    interp: &GestureInterpreter,
    with_outputs: bool,
    out: &mut impl Write,
) -> Result<bool> {
    for ev in events {
        debug!("frame {frame}: {ev:?}");
    }
    if events.is_empty() && !with_outputs {
        return Ok(false);
    }
    let record = OutputRecord::new(frame, events, with_outputs.then_some(interp));
    writeln!(out, "{}", encode(&record)?)?;
    out.flush()?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use handctl::Handedness;

    #[test]
    fn quiet_frames_are_not_written() {
        let it = GestureInterpreter::default();
        let mut buf = Vec::new();
        assert!(!dispatch_events(1, &[], &it, false, &mut buf).unwrap());
        assert!(buf.is_empty());
        assert!(dispatch_events(1, &[], &it, true, &mut buf).unwrap());
        assert_eq!(String::from_utf8(buf).unwrap(), "{\"frame\":1,\"events\":[],\"outputs\":{}}\n");
    }

    #[test]
    fn summary_counts_by_kind() {
        let mut s = Summary::default();
        s.count(&InterpreterEvent::WaveDetected {
            hand: Handedness::Left,
        });
        s.count(&InterpreterEvent::PinchReleased {
            hand: Handedness::Left,
            binding: "grab".into(),
        });
        assert_eq!(s.waves, 1);
        assert_eq!(s.pinch_released, 1);
        assert_eq!(s.pinch_started, 0);
    }
}
