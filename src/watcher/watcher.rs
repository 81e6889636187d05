use log::warn;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::mpsc::Sender;

/// Watches the directory holding `file` and forwards create, modify and
/// remove events that concern `file` itself.
///
/// The directory is watched instead of the file so that editors which save by
/// writing a new file and renaming it over the old one are still seen.
pub fn setup_file_watcher(
    file: &Path,
    raw_event_tx: Sender<EventKind>,
) -> Result<RecommendedWatcher, notify::Error> {
    let dir = match file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let file_name = file.file_name().map(|name| name.to_os_string());

    let event_handler = move |res: Result<Event, notify::Error>| match res {
        Ok(event) => {
            if !matches!(
                event.kind,
                EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
            ) {
                return;
            }
            if event
                .paths
                .iter()
                .any(|path| path.file_name() == file_name.as_deref())
            {
                let _ = raw_event_tx.send(event.kind);
            }
        }
        Err(e) => warn!("watcher: {e}"),
    };

    let mut watcher = RecommendedWatcher::new(event_handler, Config::default())?;
    watcher.watch(dir, RecursiveMode::NonRecursive)?;

    Ok(watcher)
}
