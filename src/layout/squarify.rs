use compact_str::CompactString;

use crate::tree::SizeNode;

/// An axis-aligned rectangle in layout units, origin at the top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle of the given size anchored at the origin.
    pub const fn sized(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Shrink by `amount` on every side, never below zero size.
    pub fn inset(&self, amount: f64) -> Self {
        Self {
            x: self.x + amount,
            y: self.y + amount,
            width: (self.width - 2.0 * amount).max(0.0),
            height: (self.height - 2.0 * amount).max(0.0),
        }
    }

    /// Whether `other` lies inside this rectangle, allowing `eps` slack.
    pub fn contains(&self, other: &Rect, eps: f64) -> bool {
        other.x >= self.x - eps
            && other.y >= self.y - eps
            && other.x + other.width <= self.x + self.width + eps
            && other.y + other.height <= self.y + self.height + eps
    }

    /// Whether the interiors of the two rectangles intersect by more than `eps`.
    pub fn overlaps(&self, other: &Rect, eps: f64) -> bool {
        let dx = (self.x + self.width).min(other.x + other.width) - self.x.max(other.x);
        let dy = (self.y + self.height).min(other.y + other.height) - self.y.max(other.y);
        dx > eps && dy > eps
    }
}

/// One placed cell of a single-level layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Child segment, or `None` for the filler holding the parent's own leaf weight
    pub key: Option<CompactString>,
    /// Weight driving the area
    pub value: f64,
    /// Assigned area in square layout units
    pub area: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Cell {
    fn pending(key: Option<CompactString>, value: f64) -> Self {
        Self {
            key,
            value,
            area: 0.0,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn is_filler(&self) -> bool {
        self.key.is_none()
    }
}

/// Configuration for the treemap engine.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Items whose share of the group's weight is below this fraction are dropped
    pub negligible_fraction: f64,
    /// Upper bound on closed rows per layout call; the layout stops there
    pub max_rows: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            negligible_fraction: 0.0001,
            max_rows: 4096,
        }
    }
}

/// Lay out the children of `node` inside `rect`.
///
/// Returns one cell per surviving child plus an optional filler cell for the
/// node's own weight, largest first. Coordinates are absolute (`rect.x`,
/// `rect.y` included) and unrounded. Recursing into children is left to the
/// caller.
pub fn layout(rect: Rect, node: &SizeNode, config: &LayoutConfig) -> Vec<Cell> {
    let items = prepare_cells(node, rect.area(), config);
    if items.is_empty() {
        return items;
    }
    squarify(items, rect, config.max_rows)
}

/// Build the weighted, filtered and sorted cells for one level and assign
/// each its share of `total_area`.
pub(crate) fn prepare_cells(node: &SizeNode, total_area: f64, config: &LayoutConfig) -> Vec<Cell> {
    let mut cells: Vec<Cell> = node
        .children()
        .map(|(key, child)| Cell::pending(Some(CompactString::new(key)), child.size()))
        .collect();

    let children_total: f64 = cells.iter().map(|c| c.value).sum();
    let remaining = node.size() - children_total;
    if remaining > 0.0 {
        cells.push(Cell::pending(None, remaining));
    }

    let total: f64 = cells.iter().map(|c| c.value).filter(|v| *v > 0.0).sum();
    if total <= 0.0 {
        tracing::debug!("Skipping layout for node with zero total weight");
        return Vec::new();
    }

    cells.retain(|c| c.value > 0.0 && c.value / total >= config.negligible_fraction);
    // Stable sort: equal weights keep key order
    cells.sort_by(|a, b| b.value.total_cmp(&a.value));

    let kept: f64 = cells.iter().map(|c| c.value).sum();
    if kept <= 0.0 {
        return Vec::new();
    }
    for cell in &mut cells {
        cell.area = (cell.value / kept) * total_area;
    }
    cells
}

/// The part of the container not yet covered by placed rows.
struct Container {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    /// `true`: rows are columns running top-to-bottom and consume width
    vertical: bool,
}

impl Container {
    fn new(rect: Rect) -> Self {
        Self {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            vertical: false,
        }
    }

    /// Pick the layout axis from the current shape and return the fixed
    /// side length rows are laid along.
    fn orient(&mut self) -> f64 {
        if self.height > self.width {
            self.vertical = false;
            self.width
        } else {
            self.vertical = true;
            self.height
        }
    }

    /// Place a closed row and shrink the container by its thickness.
    fn place_row(&mut self, row: &mut Vec<Cell>, row_area: f64, side: f64, out: &mut Vec<Cell>) {
        let thickness = if side > 0.0 { row_area / side } else { 0.0 };
        if !(thickness > 0.0) || !thickness.is_finite() {
            tracing::warn!(
                "Squarify: dropping row of {} cells (area={}, side={})",
                row.len(),
                row_area,
                side
            );
            row.clear();
            return;
        }

        let mut offset = 0.0;
        for mut cell in row.drain(..) {
            let length = cell.area / thickness;
            if self.vertical {
                cell.x = self.x;
                cell.y = self.y + offset;
                cell.width = thickness;
                cell.height = length;
            } else {
                cell.x = self.x + offset;
                cell.y = self.y;
                cell.width = length;
                cell.height = thickness;
            }
            offset += length;
            out.push(cell);
        }

        if self.vertical {
            self.x += thickness;
            self.width = (self.width - thickness).max(0.0);
        } else {
            self.y += thickness;
            self.height = (self.height - thickness).max(0.0);
        }
    }
}

/// Worst aspect ratio of a row with the given area sum and extremes laid
/// along a side of length `side`. 1.0 is a perfect square.
fn worst_ratio(sum: f64, min: f64, max: f64, side: f64) -> f64 {
    let side_sq = side * side;
    let sum_sq = sum * sum;
    let a = (side_sq * max) / sum_sq;
    let b = sum_sq / (side_sq * min);
    a.max(b)
}

/// Greedy row building after Bruls, Huizing and van Wijk. Items must be
/// sorted by area, largest first.
///
/// Runs as a flat loop: a row only ever grows by the next item or is closed,
/// so no call stack is needed. At most `max_rows` rows are closed; anything
/// left after that is not placed.
fn squarify(items: Vec<Cell>, rect: Rect, max_rows: usize) -> Vec<Cell> {
    let mut placed = Vec::with_capacity(items.len());
    let mut container = Container::new(rect);
    let mut side = container.orient();

    let mut row: Vec<Cell> = Vec::new();
    let mut row_sum = 0.0;
    let mut row_min = f64::INFINITY;
    let mut row_max = 0.0_f64;
    let mut rows = 0;

    let mut pending = items.into_iter().peekable();
    while let Some(next) = pending.peek() {
        let accept = if row.is_empty() {
            true
        } else {
            let current = worst_ratio(row_sum, row_min, row_max, side);
            let candidate = worst_ratio(
                row_sum + next.area,
                row_min.min(next.area),
                row_max.max(next.area),
                side,
            );
            candidate < current && candidate >= 1.0
        };

        if accept {
            if let Some(cell) = pending.next() {
                row_sum += cell.area;
                row_min = row_min.min(cell.area);
                row_max = row_max.max(cell.area);
                row.push(cell);
            }
            continue;
        }

        container.place_row(&mut row, row_sum, side, &mut placed);
        row_sum = 0.0;
        row_min = f64::INFINITY;
        row_max = 0.0;
        rows += 1;

        if rows >= max_rows {
            tracing::warn!(
                "Squarify: stopped after {} rows with {} cells unplaced",
                rows,
                pending.len()
            );
            return placed;
        }

        side = container.orient();
        if side <= 0.0 {
            tracing::warn!(
                "Squarify: container exhausted with {} cells unplaced",
                pending.len()
            );
            return placed;
        }
    }

    if !row.is_empty() {
        container.place_row(&mut row, row_sum, side, &mut placed);
    }
    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::SizeTree;

    const EPS: f64 = 1e-6;

    fn finalized(entries: &[(&[&str], f64)]) -> SizeTree {
        let mut tree = SizeTree::new();
        for (path, size) in entries {
            tree.insert(*path, *size).unwrap();
        }
        tree.finalize();
        tree
    }

    fn flat(sizes: &[f64]) -> SizeTree {
        let names: Vec<String> = (0..sizes.len()).map(|i| format!("n{:03}", i)).collect();
        let mut tree = SizeTree::new();
        for (name, size) in names.iter().zip(sizes) {
            tree.insert(&[name.as_str()], *size).unwrap();
        }
        tree.finalize();
        tree
    }

    fn assert_partition(cells: &[Cell], rect: Rect) {
        let total: f64 = cells.iter().map(|c| c.width * c.height).sum();
        assert!(
            (total - rect.area()).abs() < rect.area() * 1e-9,
            "placed area {} != {}",
            total,
            rect.area()
        );
        for (i, a) in cells.iter().enumerate() {
            assert!(rect.contains(&a.rect(), EPS), "{:?} escapes {:?}", a, rect);
            assert!((a.width * a.height - a.area).abs() < 1e-6 * rect.area());
            for b in &cells[i + 1..] {
                assert!(!a.rect().overlaps(&b.rect(), EPS), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn single_item_fills_viewport_without_axis_swap() {
        let tree = flat(&[42.0]);
        let rect = Rect::sized(1920.0, 1080.0);
        let cells = layout(rect, tree.root(), &LayoutConfig::default());
        assert_eq!(cells.len(), 1);
        let r = &cells[0];
        assert!((r.width - 1920.0).abs() < EPS);
        assert!((r.height - 1080.0).abs() < EPS);
        assert_eq!(r.key.as_deref(), Some("n000"));
    }

    #[test]
    fn layout_preserves_area_for_simple_case() {
        let tree = flat(&[400.0, 300.0, 200.0, 100.0]);
        let rect = Rect::sized(50.0, 20.0);
        let cells = layout(rect, tree.root(), &LayoutConfig::default());
        assert_eq!(cells.len(), 4);
        assert_partition(&cells, rect);
    }

    #[test]
    fn partition_holds_for_mixed_weights_and_shapes() {
        let sizes: Vec<f64> = (1..=40).map(|i| ((i * 37) % 101 + 1) as f64).collect();
        let tree = flat(&sizes);
        for rect in [
            Rect::sized(300.0, 170.0),
            Rect::sized(100.0, 400.0),
            Rect::new(12.5, 40.0, 77.0, 77.0),
        ] {
            let cells = layout(rect, tree.root(), &LayoutConfig::default());
            assert_eq!(cells.len(), sizes.len());
            assert_partition(&cells, rect);
        }
    }

    #[test]
    fn cells_are_sorted_largest_first() {
        let tree = flat(&[5.0, 50.0, 20.0, 20.0, 1.0]);
        let cells = layout(Rect::sized(80.0, 60.0), tree.root(), &LayoutConfig::default());
        let values: Vec<f64> = cells.iter().map(|c| c.value).collect();
        assert_eq!(values, vec![50.0, 20.0, 20.0, 5.0, 1.0]);
        // Equal weights keep key order
        assert_eq!(cells[1].key.as_deref(), Some("n002"));
        assert_eq!(cells[2].key.as_deref(), Some("n003"));
    }

    #[test]
    fn wide_container_stacks_columns() {
        let tree = flat(&[1.0, 1.0]);
        let cells = layout(Rect::sized(200.0, 100.0), tree.root(), &LayoutConfig::default());
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].rect(), Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(cells[1].rect(), Rect::new(100.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn tall_container_stacks_rows() {
        let tree = flat(&[1.0, 1.0]);
        let cells = layout(Rect::sized(100.0, 200.0), tree.root(), &LayoutConfig::default());
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].rect(), Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(cells[1].rect(), Rect::new(0.0, 100.0, 100.0, 100.0));
    }

    #[test]
    fn own_weight_becomes_filler_cell() {
        let tree = finalized(&[(&[], 200.0), (&["sub_a"], 120.0), (&["sub_b"], 130.0), (&["sub_c"], 140.0)]);
        let rect = Rect::sized(100.0, 100.0);
        let cells = layout(rect, tree.root(), &LayoutConfig::default());

        assert_eq!(cells.len(), 4);
        assert!(cells[0].is_filler());
        assert_eq!(cells[0].value, 200.0);
        let keyed: Vec<&str> = cells.iter().filter_map(|c| c.key.as_deref()).collect();
        assert_eq!(keyed, vec!["sub_c", "sub_b", "sub_a"]);
        assert_partition(&cells, rect);
    }

    #[test]
    fn negative_remainder_never_produces_filler() {
        let mut tree = flat(&[10.0, 20.0]);
        tree.root_mut().size = 5.0;
        let cells = layout(Rect::sized(10.0, 10.0), tree.root(), &LayoutConfig::default());
        assert_eq!(cells.len(), 2);
        assert!(cells.iter().all(|c| !c.is_filler()));
    }

    #[test]
    fn leaf_without_own_weight_yields_nothing() {
        let tree = finalized(&[(&["a"], 0.0)]);
        let empty = tree.lookup("a").unwrap();
        assert!(layout(Rect::sized(10.0, 10.0), empty, &LayoutConfig::default()).is_empty());
        // Zero-weight child under a zero-weight root
        assert!(layout(Rect::sized(10.0, 10.0), tree.root(), &LayoutConfig::default()).is_empty());
    }

    #[test]
    fn negligible_items_are_dropped() {
        let tree = flat(&[1_000_000.0, 1.0, 500_000.0]);
        let rect = Rect::sized(64.0, 48.0);
        let cells = layout(rect, tree.root(), &LayoutConfig::default());
        assert_eq!(cells.len(), 2);
        assert!(cells.iter().all(|c| c.key.as_deref() != Some("n001")));
        // Survivors share the whole rectangle
        assert_partition(&cells, rect);

        let coarse = LayoutConfig {
            negligible_fraction: 0.5,
            ..LayoutConfig::default()
        };
        let cells = layout(rect, tree.root(), &coarse);
        assert_eq!(cells.len(), 1);

        let everything_negligible = LayoutConfig {
            negligible_fraction: 2.0,
            ..LayoutConfig::default()
        };
        assert!(layout(rect, tree.root(), &everything_negligible).is_empty());
    }

    #[test]
    fn row_bound_degrades_to_partial_layout() {
        let tree = flat(&vec![1.0; 64]);
        let config = LayoutConfig {
            max_rows: 2,
            ..LayoutConfig::default()
        };
        let rect = Rect::sized(100.0, 100.0);
        let cells = layout(rect, tree.root(), &config);
        assert!(!cells.is_empty());
        assert!(cells.len() < 64);
        for cell in &cells {
            assert!(rect.contains(&cell.rect(), EPS));
        }
    }

    #[test]
    fn layout_is_deterministic() {
        let sizes: Vec<f64> = (0..25).map(|i| (i as f64 * 1.7).sin().abs() * 100.0 + 1.0).collect();
        let tree = flat(&sizes);
        let rect = Rect::sized(333.0, 127.0);
        let first = layout(rect, tree.root(), &LayoutConfig::default());
        let second = layout(rect, tree.root(), &LayoutConfig::default());
        assert_eq!(first, second);
    }

    #[test]
    fn worst_ratio_of_square_row_is_one() {
        assert!((worst_ratio(100.0, 100.0, 100.0, 10.0) - 1.0).abs() < EPS);
        assert!(worst_ratio(200.0, 100.0, 100.0, 10.0) > 1.0);
    }
}
