use anyhow::Result;
use handctl::GestureInterpreter;
use log::{error, info, warn};
use signal_hook::{
    consts::{SIGINT, SIGTERM},
    iterator::Signals,
};
use std::{
    io::{BufRead, Write},
    sync::mpsc,
    thread,
};

use super::codec::decode_line;
use super::dispatch::{Summary, dispatch_events};
use super::watch::watch_profile;
use crate::profiles::ProfileSource;

pub enum PipelineMsg {
    Line(String),
    Eof,
    Reload,
    Shutdown,
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Write a line for every frame, with all binding outputs.
    pub with_outputs: bool,
    /// Used when an input line has no `dt`.
    pub default_dt: f32,
    /// Rebuild the interpreter when the profile file changes.
    pub watch: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            with_outputs: false,
            default_dt: 1.0 / 30.0,
            watch: false,
        }
    }
}

/// Interpreter plus stream bookkeeping, owned by the pipeline thread.
pub struct Session {
    interp: GestureInterpreter,
    opts: PipelineOptions,
    summary: Summary,
    line_no: u64,
}

impl Session {
    pub fn new(interp: GestureInterpreter, opts: PipelineOptions) -> Self {
        Self {
            interp,
            opts,
            summary: Summary::default(),
            line_no: 0,
        }
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Decode and process one input line. Undecodable lines are logged and
    /// skipped; only output errors are returned.
    pub fn feed(&mut self, line: &str, out: &mut impl Write) -> Result<()> {
        self.line_no += 1;
        if line.trim().is_empty() {
            return Ok(());
        }
        let rec = match decode_line(line) {
            Ok(r) => r,
            Err(e) => {
                warn!("line {}: {e}", self.line_no);
                self.summary.skipped += 1;
                return Ok(());
            }
        };
        let dt = match rec.dt {
            Some(dt) if !(dt.is_finite() && dt > 0.0) => {
                warn!("line {}: dt must be a positive number of seconds, got {dt}", self.line_no);
                self.summary.skipped += 1;
                return Ok(());
            }
            Some(dt) => dt,
            None => self.opts.default_dt,
        };
        let events = self.interp.submit_detections(&rec.into_detections(), dt);
        for ev in &events {
            self.summary.count(ev);
        }
        let frame = self.summary.frames;
        self.summary.frames += 1;
        dispatch_events(frame, &events, &self.interp, self.opts.with_outputs, out)?;
        Ok(())
    }

    /// Swap in a freshly built interpreter. Engaged pinches of the old one
    /// are released on the stream first; session state starts over.
    pub fn replace(&mut self, interp: GestureInterpreter, out: &mut impl Write) -> Result<()> {
        self.release_all(out)?;
        self.interp = interp;
        self.summary.reloads += 1;
        Ok(())
    }

    // Forced releases belong to no input line; they carry the last frame index.
    fn release_all(&mut self, out: &mut impl Write) -> Result<()> {
        let events = self.interp.release_all();
        if events.is_empty() {
            return Ok(());
        }
        for ev in &events {
            self.summary.count(ev);
        }
        let frame = self.summary.frames.saturating_sub(1);
        dispatch_events(frame, &events, &self.interp, self.opts.with_outputs, out)?;
        Ok(())
    }

    /// End of stream: release whatever is still held.
    pub fn finish(&mut self, out: &mut impl Write) -> Result<()> {
        self.release_all(out)
    }
}

/// Drive `input` through the profile's interpreter until EOF or a signal,
/// writing event lines to stdout.
pub fn run_pipeline<R>(input: R, source: ProfileSource, opts: PipelineOptions) -> Result<Summary>
where
    R: BufRead + Send + 'static,
{
    let interp = source.load()?.build()?;
    let (tx, rx) = mpsc::channel::<PipelineMsg>();

    // reader
    let tx_lines = tx.clone();
    thread::spawn(move || {
        for line in input.lines() {
            match line {
                Ok(l) => {
                    if tx_lines.send(PipelineMsg::Line(l)).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    error!("input read failed: {e}");
                    break;
                }
            }
        }
        let _ = tx_lines.send(PipelineMsg::Eof);
    });

    // signals
    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    let sig_handle = signals.handle();
    let tx_sig = tx.clone();
    thread::spawn(move || {
        if let Some(sig) = signals.forever().next() {
            info!("received signal {sig}, shutting down");
            let _ = tx_sig.send(PipelineMsg::Shutdown);
        }
    });

    let _watcher = if opts.watch {
        let path = source.path();
        info!("watching {} for changes", path.display());
        Some(watch_profile(&path, tx.clone())?)
    } else {
        None
    };
    drop(tx);

    let mut session = Session::new(interp, opts);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    while let Ok(msg) = rx.recv() {
        match msg {
            PipelineMsg::Line(l) => session.feed(&l, &mut out)?,
            PipelineMsg::Reload => match source.load().and_then(|p| Ok(p.build()?)) {
                Ok(it) => {
                    session.replace(it, &mut out)?;
                    info!("profile reloaded from {}", source.path().display());
                }
                Err(e) => error!("reload failed, keeping last good profile: {e}"),
            },
            PipelineMsg::Eof => {
                info!("end of input");
                break;
            }
            PipelineMsg::Shutdown => break,
        }
    }

    session.finish(&mut out)?;
    sig_handle.close();
    let summary = session.summary().clone();
    summary.log();
    Ok(summary)
}
