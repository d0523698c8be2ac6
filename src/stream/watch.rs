use anyhow::{Result, anyhow};
use log::{debug, warn};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher, recommended_watcher};
use std::{
    path::Path,
    sync::mpsc::Sender,
    time::{Duration, Instant},
};

use super::pipeline::PipelineMsg;

const SETTLE: Duration = Duration::from_millis(250);

/// Send `Reload` whenever the profile file changes. The parent directory is
/// watched since editors often save by replacing the file. Keep the returned
/// watcher alive for as long as reloads are wanted.
pub fn watch_profile(path: &Path, tx: Sender<PipelineMsg>) -> Result<RecommendedWatcher> {
    let dir = path
        .parent()
        .ok_or_else(|| anyhow!("profile path {} has no parent", path.display()))?;
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("profile path {} has no file name", path.display()))?
        .to_os_string();

    let mut last: Option<Instant> = None;
    let mut watcher = recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(ev) => {
            let relevant = matches!(ev.kind, EventKind::Create(_) | EventKind::Modify(_))
                && ev.paths.iter().any(|p| p.file_name() == Some(file_name.as_os_str()));
            if !relevant {
                return;
            }
            // one save usually arrives as several events
            if last.is_some_and(|t| t.elapsed() < SETTLE) {
                return;
            }
            last = Some(Instant::now());
            debug!("profile change: {:?}", ev.kind);
            let _ = tx.send(PipelineMsg::Reload);
        }
        Err(e) => warn!("profile watch error: {e}"),
    })?;

    // an empty parent means a bare file name in the working directory
    let dir = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };
    watcher.watch(dir, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}
