pub mod aggregate;
pub mod node;

use std::sync::mpsc::Receiver;

use anyhow::{Context, Result};
use compact_str::CompactString;

pub use self::node::{SizeNode, SizeTree, Value};
use crate::render::tooltip::format_count;
use crate::scanner::types::ScanEvent;

/// Where an object's size is attributed in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Granularity {
    /// Attribute each object to its containing folder (the final segment is dropped)
    #[default]
    Folder,
    /// Keep one node per object
    Object,
}

impl Granularity {
    /// The portion of an object's path that names its tree node.
    pub fn node_path(self, path: &[CompactString]) -> &[CompactString] {
        match self {
            Granularity::Folder => &path[..path.len().saturating_sub(1)],
            Granularity::Object => path,
        }
    }
}

/// Build a finalized SizeTree by draining a scanner's event channel.
/// Returns once every sender has been dropped.
pub fn build_tree(events: Receiver<ScanEvent>, granularity: Granularity) -> Result<SizeTree> {
    let mut tree = SizeTree::new();
    let mut observations: u64 = 0;

    for event in events {
        match event {
            ScanEvent::Started { root } => {
                tracing::info!("Scanning {}", root);
            }
            ScanEvent::Observation(observation) => {
                let path = granularity.node_path(&observation.path);
                tree.insert(path, observation.value)
                    .with_context(|| format!("inserting {:?}", observation.path))?;
                observations += 1;
            }
            ScanEvent::Progress { objects, total } => {
                tracing::debug!("Scanning, gathered {} objects totaling {:.0}", objects, total);
            }
            ScanEvent::Completed {
                objects,
                total,
                elapsed_ms,
            } => {
                tracing::info!(
                    "Scan completed: {} objects totaling {:.0} in {} ms",
                    format_count(objects),
                    total,
                    elapsed_ms
                );
            }
            ScanEvent::Error { path, message } => {
                tracing::warn!("Skipped {}: {}", path.display(), message);
            }
        }
    }

    tree.finalize();

    let root = tree.root();
    tracing::info!(
        "Tree built from {} observations: {} nodes, {} direct children of root",
        observations,
        tree.len(),
        root.child_count()
    );

    // Debug: show the largest direct children of root
    let mut top: Vec<(&str, &SizeNode)> = root.children().collect();
    top.sort_by(|a, b| b.1.size().total_cmp(&a.1.size()));
    for (i, (name, child)) in top.iter().take(10).enumerate() {
        tracing::debug!(
            "  [{}] '{}' (size={:.0}, count={})",
            i,
            name,
            child.size(),
            child.count()
        );
    }

    Ok(tree)
}
