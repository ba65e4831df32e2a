use std::path::PathBuf;

use compact_str::CompactString;

use crate::render::tooltip::Units;
use crate::tree::Value;

/// Storage prices are quoted per GiB.
const GIB: f64 = 1_073_741_824.0;

/// What a scanner reports as each object's value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Measure {
    /// Raw byte size
    #[default]
    Bytes,
    /// Storage cost of the object at a flat price per GiB
    Cost { per_gib: f64 },
}

impl Measure {
    pub fn units(self) -> Units {
        match self {
            Measure::Bytes => Units::Bytes,
            Measure::Cost { .. } => Units::Cost,
        }
    }

    /// Convert an object's byte size into the measured value.
    pub fn value(self, bytes: f64) -> f64 {
        match self {
            Measure::Bytes => bytes,
            Measure::Cost { per_gib } => bytes / GIB * per_gib,
        }
    }
}

/// One (path, value) pair produced by a scanner, before tree construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Path already split into individual segments
    pub path: Vec<CompactString>,
    /// Size of the object, or a pre-aggregated (size, count) pair
    pub value: Value,
}

impl Observation {
    pub fn new(path: Vec<CompactString>, value: impl Into<Value>) -> Self {
        Self {
            path,
            value: value.into(),
        }
    }

    /// Build an observation by splitting `key` on `separator`.
    pub fn from_key(key: &str, separator: char, value: impl Into<Value>) -> Self {
        Self::new(key.split(separator).map(CompactString::new).collect(), value)
    }
}

/// Events emitted by a scanner. Observations form the insertion stream;
/// everything else is out-of-band progress.
#[derive(Debug, Clone)]
pub enum ScanEvent {
    /// Starting scan of a path or dataset
    Started { root: String },
    /// A single object to fold into the tree
    Observation(Observation),
    /// Periodic progress update
    Progress { objects: u64, total: f64 },
    /// Scan completed
    Completed {
        objects: u64,
        total: f64,
        elapsed_ms: u64,
    },
    /// Error encountered (non-fatal)
    Error { path: PathBuf, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_is_priced_per_gib() {
        let measure = Measure::Cost { per_gib: 0.023 };
        assert_eq!(measure.units(), Units::Cost);
        assert!((measure.value(2.0 * GIB) - 0.046).abs() < 1e-12);
        assert_eq!(measure.value(0.0), 0.0);
    }

    #[test]
    fn bytes_pass_through() {
        assert_eq!(Measure::default(), Measure::Bytes);
        assert_eq!(Measure::Bytes.units(), Units::Bytes);
        assert_eq!(Measure::Bytes.value(1234.0), 1234.0);
    }

    #[test]
    fn keys_split_on_separator() {
        let obs = Observation::from_key("a/b/c", '/', 5u64);
        let expected: Vec<CompactString> = ["a", "b", "c"].into_iter().map(CompactString::new).collect();
        assert_eq!(obs.path, expected);
        assert_eq!(obs.value, Value::Size(5.0));
    }
}
