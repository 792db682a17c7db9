use crate::errors::{SidebarError, SidebarResult};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use notify_debouncer_full::{new_debouncer, DebounceEventResult};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Events arriving within this window are delivered as one batch.
const DEBOUNCE: Duration = Duration::from_millis(300);

/// Whether `event` changes one of `targets`. A target is a file or a
/// directory whose whole subtree counts.
fn is_relevant(event: &Event, targets: &[PathBuf]) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) && event
        .paths
        .iter()
        .any(|path| targets.iter().any(|target| path.starts_with(target)))
}

/// Directory to register for `target`. Files are watched through their
/// parent so a save that renames a new file over the old one is still seen.
fn watch_root(target: &Path) -> (PathBuf, RecursiveMode) {
    if target.is_dir() {
        return (target.to_path_buf(), RecursiveMode::Recursive);
    }
    let parent = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    (parent.to_path_buf(), RecursiveMode::NonRecursive)
}

/// Runs `on_change` once, then after every debounced batch of changes to
/// `paths` until the watcher shuts down. Failures of `on_change` are
/// logged only.
pub fn watch<F>(paths: &[&Path], mut on_change: F) -> SidebarResult<()>
where
    F: FnMut() -> SidebarResult<()>,
{
    let targets: Vec<PathBuf> = paths
        .iter()
        .map(|p| p.canonicalize().unwrap_or_else(|_| p.to_path_buf()))
        .collect();

    let (tx, rx) = mpsc::channel::<DebounceEventResult>();
    let mut debouncer =
        new_debouncer(DEBOUNCE, None, tx).map_err(|e| SidebarError::Watch(e.to_string()))?;

    for target in &targets {
        let (root, mode) = watch_root(target);
        debouncer
            .watcher()
            .watch(&root, mode)
            .map_err(|e| SidebarError::Watch(format!("{}: {e}", root.display())))?;
        info!("Watching {}", target.display());
    }

    run_logged(&mut on_change);

    for result in rx {
        match result {
            Ok(events) => {
                if events.iter().any(|e| is_relevant(&e.event, &targets)) {
                    debug!("Change detected in {} event(s), re-running", events.len());
                    run_logged(&mut on_change);
                }
            }
            Err(errors) => error!("File watcher errors: {:?}", errors),
        }
    }
    Ok(())
}

fn run_logged<F>(on_change: &mut F)
where
    F: FnMut() -> SidebarResult<()>,
{
    if let Err(e) = on_change() {
        error!("{e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind};

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn access_events_are_ignored() {
        let targets = [PathBuf::from("/site/sidebars.yaml")];
        assert!(!is_relevant(
            &event(EventKind::Access(AccessKind::Any), "/site/sidebars.yaml"),
            &targets
        ));
        assert!(is_relevant(
            &event(EventKind::Create(CreateKind::File), "/site/sidebars.yaml"),
            &targets
        ));
    }

    #[test]
    fn only_changes_under_targets_count() {
        let targets = [
            PathBuf::from("/site/sidebars.yaml"),
            PathBuf::from("/site/docs"),
        ];
        let modify = EventKind::Modify(ModifyKind::Any);
        assert!(is_relevant(&event(modify, "/site/docs/interop/http4s.md"), &targets));
        assert!(!is_relevant(&event(modify, "/site/README.md"), &targets));
    }

    #[test]
    fn files_are_watched_through_their_parent() {
        let (root, mode) = watch_root(Path::new("/site/sidebars.yaml"));
        assert_eq!(root, PathBuf::from("/site"));
        assert_eq!(mode, RecursiveMode::NonRecursive);

        let (root, _) = watch_root(Path::new("sidebars.yaml"));
        assert_eq!(root, PathBuf::from("."));
    }
}
