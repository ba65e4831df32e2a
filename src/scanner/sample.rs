use std::sync::mpsc::Sender;
use std::time::Instant;

use anyhow::Result;

use super::types::{Measure, Observation, ScanEvent};

/// Hardcoded objects used to exercise the pipeline without touching a disk.
pub const SAMPLE_OBJECTS: [(&str, f64); 4] = [
    ("base/001", 200.0),
    ("base/sub_a/002", 120.0),
    ("base/sub_b/003", 130.0),
    ("base/sub_c/004", 140.0),
];

/// Send the sample dataset as observations.
pub fn scan_sample(measure: Measure, tx: &Sender<ScanEvent>) -> Result<()> {
    let start = Instant::now();
    let _ = tx.send(ScanEvent::Started {
        root: "sample".to_string(),
    });

    let mut total = 0.0;
    for (key, size) in SAMPLE_OBJECTS {
        let value = measure.value(size);
        total += value;
        if tx
            .send(ScanEvent::Observation(Observation::from_key(key, '/', value)))
            .is_err()
        {
            return Ok(());
        }
    }

    let _ = tx.send(ScanEvent::Completed {
        objects: SAMPLE_OBJECTS.len() as u64,
        total,
        elapsed_ms: start.elapsed().as_millis() as u64,
    });
    Ok(())
}
