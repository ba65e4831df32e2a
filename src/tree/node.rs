use std::collections::BTreeMap;

use compact_str::CompactString;

use crate::error::{Result, TreeError};

/// A single observation's contribution to a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// One item of the given size (bytes or cost). Counts as one object.
    Size(f64),
    /// A pre-aggregated observation, e.g. a whole bucket's byte and object totals.
    Counted { size: f64, count: u64 },
}

impl Value {
    pub fn size(self) -> f64 {
        match self {
            Value::Size(size) => size,
            Value::Counted { size, .. } => size,
        }
    }

    pub fn count(self) -> u64 {
        match self {
            Value::Size(_) => 1,
            Value::Counted { count, .. } => count,
        }
    }
}

impl From<f64> for Value {
    fn from(size: f64) -> Self {
        Value::Size(size)
    }
}

impl From<u64> for Value {
    fn from(size: u64) -> Self {
        Value::Size(size as f64)
    }
}

impl From<(f64, u64)> for Value {
    fn from((size, count): (f64, u64)) -> Self {
        Value::Counted { size, count }
    }
}

impl From<(u64, u64)> for Value {
    fn from((size, count): (u64, u64)) -> Self {
        Value::Counted {
            size: size as f64,
            count,
        }
    }
}

/// A node of the size tree. Owns its children through a segment-keyed map,
/// iterated in lexicographic order so layouts are reproducible.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SizeNode {
    /// Size inserted at exactly this path. Never aggregated.
    pub(crate) leaf_size: f64,
    /// Object count inserted at exactly this path. Never aggregated.
    pub(crate) leaf_count: u64,
    /// Total size. Equals `leaf_size` until the tree is finalized.
    pub(crate) size: f64,
    /// Total count. Equals `leaf_count` until the tree is finalized.
    pub(crate) count: u64,
    pub(crate) children: BTreeMap<CompactString, SizeNode>,
}

impl Drop for SizeNode {
    fn drop(&mut self) {
        // Detach descendants into a flat list so deep chains drop without recursion
        let mut pending: Vec<SizeNode> = std::mem::take(&mut self.children).into_values().collect();
        while let Some(mut node) = pending.pop() {
            pending.extend(std::mem::take(&mut node.children).into_values());
        }
    }
}

impl SizeNode {
    /// Total weight under this node (own leaf value only before finalization).
    pub fn size(&self) -> f64 {
        self.size
    }

    /// Number of objects under this node (own leaf count only before finalization).
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn leaf_size(&self) -> f64 {
        self.leaf_size
    }

    pub fn leaf_count(&self) -> u64 {
        self.leaf_count
    }

    /// Look up a direct child. Never creates nodes.
    pub fn child(&self, key: &str) -> Result<&SizeNode> {
        self.children.get(key).ok_or_else(|| TreeError::NotFound {
            key: CompactString::new(key),
        })
    }

    /// Walk a sequence of segments down from this node.
    pub fn descend<S: AsRef<str>>(&self, path: &[S]) -> Result<&SizeNode> {
        let mut node = self;
        for segment in path {
            node = node.child(segment.as_ref())?;
        }
        Ok(node)
    }

    /// Iterate over children in key order.
    pub fn children(&self) -> impl Iterator<Item = (&str, &SizeNode)> + '_ {
        self.children.iter().map(|(key, node)| (key.as_str(), node))
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    fn accumulate(&mut self, value: Value) {
        self.leaf_size += value.size();
        self.leaf_count += value.count();
        self.size += value.size();
        self.count += value.count();
    }
}

/// Hierarchical size aggregation keyed by path segments.
#[derive(Debug, Clone)]
pub struct SizeTree {
    root: SizeNode,
    finalized: bool,
    nodes: usize,
}

impl SizeTree {
    /// Create an empty tree (root only).
    pub fn new() -> Self {
        Self {
            root: SizeNode::default(),
            finalized: false,
            nodes: 1,
        }
    }

    pub fn root(&self) -> &SizeNode {
        &self.root
    }

    pub(crate) fn root_mut(&mut self) -> &mut SizeNode {
        &mut self.root
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub(crate) fn mark_finalized(&mut self) {
        self.finalized = true;
    }

    /// Total number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes
    }

    /// Whether the tree holds nothing but an empty root.
    pub fn is_empty(&self) -> bool {
        self.nodes <= 1 && self.root.leaf_count == 0 && self.root.leaf_size == 0.0
    }

    /// Look up a direct child of the root.
    pub fn lookup(&self, key: &str) -> Result<&SizeNode> {
        self.root.child(key)
    }

    /// Look up the node at a full path. An empty path is the root.
    pub fn get<S: AsRef<str>>(&self, path: &[S]) -> Result<&SizeNode> {
        self.root.descend(path)
    }

    /// Add an observation at `path`, creating intermediate nodes as needed.
    /// Repeated inserts at one path accumulate.
    pub fn insert<S: AsRef<str>>(&mut self, path: &[S], value: impl Into<Value>) -> Result<()> {
        if self.finalized {
            return Err(TreeError::Finalized {
                path: join_segments(path),
            });
        }

        let value = value.into();
        if !value.size().is_finite() || value.size() < 0.0 {
            return Err(TreeError::InvalidValue {
                path: join_segments(path),
                size: value.size(),
            });
        }

        // Iterative descent so deep paths never grow the call stack
        let mut node = &mut self.root;
        let nodes = &mut self.nodes;
        for segment in path {
            node = node
                .children
                .entry(CompactString::new(segment.as_ref()))
                .or_insert_with(|| {
                    *nodes += 1;
                    SizeNode::default()
                });
        }
        node.accumulate(value);
        Ok(())
    }
}

impl Default for SizeTree {
    fn default() -> Self {
        Self::new()
    }
}

fn join_segments<S: AsRef<str>>(path: &[S]) -> String {
    path.iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join("/")
}
