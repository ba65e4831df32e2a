use super::node::{SizeNode, SizeTree};

impl SizeTree {
    /// Aggregate every node's totals bottom-up.
    ///
    /// Totals are always recomputed from the raw leaf values, so calling this
    /// again is a no-op rather than a double count. Once finalized the tree
    /// rejects further inserts.
    pub fn finalize(&mut self) {
        if self.is_finalized() {
            tracing::debug!("finalize called on an already finalized tree");
        }
        aggregate_sizes(self.root_mut());
        self.mark_finalized();
    }
}

/// Postorder pass: each node's `size`/`count` become its own leaf values
/// plus the totals of all children. Runs as flat loops over a preorder
/// listing, so tree depth never grows the call stack.
pub fn aggregate_sizes(node: &mut SizeNode) {
    // Preorder listing with parent links; every child sits after its parent
    let mut parents: Vec<Option<usize>> = Vec::new();
    let mut totals: Vec<(f64, u64)> = Vec::new();
    let mut stack: Vec<(&SizeNode, Option<usize>)> = vec![(&*node, None)];
    while let Some((current, parent)) = stack.pop() {
        let index = totals.len();
        parents.push(parent);
        totals.push((current.leaf_size, current.leaf_count));
        stack.extend(current.children.values().map(|child| (child, Some(index))));
    }

    // Reverse order finishes every child before its parent is read
    for index in (1..totals.len()).rev() {
        if let Some(parent) = parents[index] {
            let (size, count) = totals[index];
            totals[parent].0 += size;
            totals[parent].1 += count;
        }
    }

    // Write back in the same preorder
    let mut totals = totals.into_iter();
    let mut stack: Vec<&mut SizeNode> = vec![node];
    while let Some(current) = stack.pop() {
        if let Some((size, count)) = totals.next() {
            current.size = size;
            current.count = count;
        }
        stack.extend(current.children.values_mut());
    }
}

/// Find the first node (depth-first, key order) whose totals disagree with
/// its leaf values plus its children. Returns the offending path.
pub fn find_mismatch(node: &SizeNode) -> Option<Vec<String>> {
    let mut stack: Vec<(Vec<String>, &SizeNode)> = vec![(Vec::new(), node)];
    while let Some((path, current)) = stack.pop() {
        let child_size: f64 = current.children.values().map(|c| c.size).sum();
        let child_count: u64 = current.children.values().map(|c| c.count).sum();
        let expected = current.leaf_size + child_size;
        let tolerance = expected.abs() * 1e-9;
        if (current.size - expected).abs() > tolerance
            || current.count != current.leaf_count + child_count
        {
            return Some(path);
        }
        for (key, child) in current.children.iter().rev() {
            let mut child_path = path.clone();
            child_path.push(key.to_string());
            stack.push((child_path, child));
        }
    }
    None
}
