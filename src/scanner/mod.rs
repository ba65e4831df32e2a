pub mod sample;
pub mod types;
pub mod walk;

use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::thread::JoinHandle;

use anyhow::Result;

use types::{Measure, ScanEvent};

/// Where observations come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Walk a local directory
    Local { base: PathBuf },
    /// The built-in sample dataset
    Sample,
}

impl Source {
    /// Human-readable description of what was scanned.
    pub fn location(&self) -> String {
        match self {
            Source::Local { base } => base.display().to_string(),
            Source::Sample => "Sample data".to_string(),
        }
    }

    /// Separator used when showing paths from this source.
    pub fn separator(&self) -> char {
        match self {
            Source::Local { .. } => std::path::MAIN_SEPARATOR,
            Source::Sample => '/',
        }
    }
}

/// Run a scan on the current thread, sending events to `tx`.
pub fn scan(source: &Source, measure: Measure, tx: &Sender<ScanEvent>) -> Result<()> {
    match source {
        Source::Local { base } => walk::scan_local(base, measure, tx),
        Source::Sample => sample::scan_sample(measure, tx),
    }
}

/// Run a scan on a background thread. The channel closes when the scan ends,
/// which is what ends [`crate::tree::build_tree`].
pub fn spawn(source: Source, measure: Measure, tx: Sender<ScanEvent>) -> JoinHandle<Result<()>> {
    std::thread::spawn(move || {
        let result = scan(&source, measure, &tx);
        if let Err(e) = &result {
            tracing::error!("Scan of {} failed: {:#}", source.location(), e);
        }
        result
    })
}
