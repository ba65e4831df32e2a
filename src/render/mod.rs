pub mod colors;
pub mod html;
pub mod tooltip;

use compact_str::CompactString;

use crate::error::{Result, TreeError};
use crate::layout::{layout, LayoutConfig, Rect};
use crate::tree::{SizeNode, SizeTree};
use colors::Rgb;
use tooltip::{format_count, format_value, Units};

/// Configuration for level-by-level drawing.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Canvas width in layout units
    pub width: f64,
    /// Canvas height in layout units
    pub height: f64,
    /// Inset applied on every side of a drawn node
    pub padding: f64,
    /// Nodes narrower or shorter than this are not drawn
    pub min_extent: f64,
    /// Placed cells must be at least this wide and tall to be descended into
    pub descend_extent: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            // About the real estate a browser leaves on a 1080p display
            width: 1900.0,
            height: 965.0,
            padding: 5.0,
            min_extent: 20.0,
            descend_extent: 10.0,
        }
    }
}

/// One node as drawn on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnCell {
    /// Segments from the root to this node (empty for the root)
    pub path: Vec<CompactString>,
    pub depth: usize,
    /// Absolute, unrounded placement after padding
    pub rect: Rect,
    pub color: Rgb,
    pub size: f64,
    pub count: u64,
}

struct Pending<'a> {
    node: &'a SizeNode,
    path: Vec<CompactString>,
    depth: usize,
    rect: Rect,
}

/// Draw a finalized tree onto a `config.width` x `config.height` canvas.
///
/// Cells come out parents-first in depth-first order, so later cells paint
/// over earlier ones. Every descended cell is resolved through a checked
/// child lookup. Nesting stops only when cells get too small to draw.
///
/// Fails with [`TreeError::NotFinalized`] before the tree has been finalized.
pub fn draw(
    tree: &SizeTree,
    config: &RenderConfig,
    layout_config: &LayoutConfig,
) -> Result<Vec<DrawnCell>> {
    if !tree.is_finalized() {
        return Err(TreeError::NotFinalized);
    }

    let mut cells = Vec::new();
    let mut stack = vec![Pending {
        node: tree.root(),
        path: Vec::new(),
        depth: 0,
        rect: Rect::sized(config.width, config.height),
    }];

    while let Some(job) = stack.pop() {
        if job.rect.width < config.min_extent || job.rect.height < config.min_extent {
            continue;
        }

        let inner = job.rect.inset(config.padding);
        // One unit is reserved for the cell's border
        let content = Rect::new(
            inner.x,
            inner.y,
            (inner.width - 1.0).max(0.0),
            (inner.height - 1.0).max(0.0),
        );
        let placed = layout(content, job.node, layout_config);

        // Reverse push so the first placed cell is popped first
        for cell in placed.iter().rev() {
            let Some(key) = &cell.key else {
                continue;
            };
            if cell.width < config.descend_extent || cell.height < config.descend_extent {
                continue;
            }
            let child = job.node.child(key)?;
            let mut path = job.path.clone();
            path.push(key.clone());
            stack.push(Pending {
                node: child,
                path,
                depth: job.depth + 1,
                rect: cell.rect(),
            });
        }

        cells.push(DrawnCell {
            path: job.path,
            depth: job.depth,
            rect: inner,
            color: colors::depth_color(job.depth),
            size: job.node.size(),
            count: job.node.count(),
        });
    }

    tracing::debug!("Drew {} cells", cells.len());
    Ok(cells)
}

/// Summary rows shown above the map.
pub fn summary(tree: &SizeTree, location: &str, units: Units) -> Vec<(&'static str, String)> {
    let root = tree.root();
    let total_label = match units {
        Units::Bytes => "Total size",
        Units::Cost => "Total cost",
    };
    vec![
        ("Location", location.to_string()),
        ("Total objects", format_count(root.count())),
        (total_label, format_value(root.size(), units)),
    ]
}
