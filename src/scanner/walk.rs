use std::path::{Component, Path, PathBuf};
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use compact_str::CompactString;
use jwalk::WalkDir;

use super::types::{Measure, Observation, ScanEvent};

/// Minimum time between progress events.
const PROGRESS_INTERVAL: Duration = Duration::from_secs(1);

/// Walk a local directory tree and send one observation per file, keyed by
/// its path relative to `base`. Unreadable entries are reported as
/// non-fatal errors and skipped. Returns early if the receiver goes away.
pub fn scan_local(base: &Path, measure: Measure, tx: &Sender<ScanEvent>) -> Result<()> {
    let base = expand_home(base);
    let meta = std::fs::metadata(&base)
        .with_context(|| format!("cannot read scan root {}", base.display()))?;
    if !meta.is_dir() {
        bail!("{} is not a directory", base.display());
    }

    let start = Instant::now();
    let mut last_progress = Instant::now();
    let mut objects: u64 = 0;
    let mut total: f64 = 0.0;

    if tx
        .send(ScanEvent::Started {
            root: base.display().to_string(),
        })
        .is_err()
    {
        return Ok(());
    }

    for entry in WalkDir::new(&base).skip_hidden(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let event = error_event(e.path(), &base, e.to_string());
                if let ScanEvent::Error { path, message } = &event {
                    tracing::debug!("skipping {}: {}", path.display(), message);
                }
                let _ = tx.send(event);
                continue;
            }
        };

        // Directories only contribute through their files; links are not followed
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let size = match entry.metadata() {
            Ok(meta) => meta.len(),
            Err(e) => {
                let _ = tx.send(ScanEvent::Error {
                    path,
                    message: e.to_string(),
                });
                continue;
            }
        };

        let segments = split_relative(&path, &base);
        if segments.is_empty() {
            continue;
        }

        let value = measure.value(size as f64);
        objects += 1;
        total += value;
        if tx
            .send(ScanEvent::Observation(Observation::new(segments, value)))
            .is_err()
        {
            tracing::debug!("observation receiver dropped, stopping walk");
            return Ok(());
        }

        if last_progress.elapsed() >= PROGRESS_INTERVAL {
            last_progress = Instant::now();
            let _ = tx.send(ScanEvent::Progress { objects, total });
        }
    }

    let _ = tx.send(ScanEvent::Completed {
        objects,
        total,
        elapsed_ms: start.elapsed().as_millis() as u64,
    });
    Ok(())
}

/// Non-fatal error for the entry that failed, or for the scan root when the
/// walker could not name one.
fn error_event(path: Option<&Path>, base: &Path, message: String) -> ScanEvent {
    ScanEvent::Error {
        path: path.unwrap_or(base).to_path_buf(),
        message,
    }
}

/// Split `path` into segments relative to `base`.
pub fn split_relative(path: &Path, base: &Path) -> Vec<CompactString> {
    let relative = path.strip_prefix(base).unwrap_or(path);
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(CompactString::new(name.to_string_lossy())),
            _ => None,
        })
        .collect()
}

/// Expand a leading `~` to the user's home directory.
fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
        Some(home) => PathBuf::from(home).join(rest),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::mpsc;

    fn collect(base: &Path) -> Vec<Observation> {
        let (tx, rx) = mpsc::channel();
        scan_local(base, Measure::Bytes, &tx).unwrap();
        drop(tx);
        let mut found: Vec<Observation> = rx
            .into_iter()
            .filter_map(|event| match event {
                ScanEvent::Observation(obs) => Some(obs),
                _ => None,
            })
            .collect();
        found.sort_by(|a, b| a.path.cmp(&b.path));
        found
    }

    #[test]
    fn walks_files_relative_to_base() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("001"), vec![0u8; 200]).unwrap();
        fs::create_dir_all(dir.path().join("sub_a")).unwrap();
        fs::write(dir.path().join("sub_a").join("002"), vec![0u8; 120]).unwrap();
        fs::create_dir_all(dir.path().join("sub_b").join("deep")).unwrap();
        fs::write(dir.path().join("sub_b").join("deep").join("003"), vec![0u8; 130]).unwrap();

        let found = collect(dir.path());
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].path, vec![CompactString::new("001")]);
        assert_eq!(found[0].value.size(), 200.0);
        assert_eq!(
            found[2].path,
            vec![
                CompactString::new("sub_b"),
                CompactString::new("deep"),
                CompactString::new("003")
            ]
        );
        assert_eq!(found[2].value.count(), 1);
    }

    #[test]
    fn empty_directories_produce_no_observations() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a").join("b")).unwrap();
        assert!(collect(dir.path()).is_empty());
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, _rx) = mpsc::channel();
        assert!(scan_local(&dir.path().join("nope"), Measure::Bytes, &tx).is_err());
    }

    #[test]
    fn errors_name_the_failing_entry() {
        let base = Path::new("/data");
        let entry = Path::new("/data/locked");
        match error_event(Some(entry), base, "denied".to_string()) {
            ScanEvent::Error { path, message } => {
                assert_eq!(path, PathBuf::from("/data/locked"));
                assert_eq!(message, "denied");
            }
            other => panic!("unexpected event {:?}", other),
        }
        match error_event(None, base, "loop".to_string()) {
            ScanEvent::Error { path, .. } => assert_eq!(path, PathBuf::from("/data")),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn split_drops_base_and_root_components() {
        let base = Path::new("/data");
        let segments = split_relative(Path::new("/data/x/y.txt"), base);
        assert_eq!(segments, vec![CompactString::new("x"), CompactString::new("y.txt")]);
    }
}
