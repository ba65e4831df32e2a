use compact_str::CompactString;

use super::DrawnCell;

/// What a node's `size` measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Units {
    #[default]
    Bytes,
    /// Monetary cost in dollars
    Cost,
}

/// Information to display in the tooltip when hovering over a cell.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipInfo {
    pub full_path: String,
    pub size_display: String,
    pub count_display: String,
}

/// Build tooltip info for a drawn cell.
pub fn build_tooltip(cell: &DrawnCell, units: Units, separator: char) -> TooltipInfo {
    TooltipInfo {
        full_path: build_path(&cell.path, separator),
        size_display: format_value(cell.size, units),
        count_display: format_count(cell.count),
    }
}

/// Format a size or cost for display.
pub fn format_value(value: f64, units: Units) -> String {
    match units {
        Units::Bytes => format_size(value),
        Units::Cost => format!("${:.2}", value),
    }
}

/// Format bytes into a human-readable size string using binary units.
pub fn format_size(bytes: f64) -> String {
    const UNITS: [&str; 6] = ["KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];

    let mut scale = 1024.0_f64.powi(UNITS.len() as i32);
    for unit in UNITS.iter().rev() {
        if bytes >= scale {
            return format!("{:.2} {}", bytes / scale, unit);
        }
        scale /= 1024.0;
    }
    format!("{:.0} B", bytes)
}

/// Format a count with thousands separators.
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Join path segments for display.
pub fn build_path(path: &[CompactString], separator: char) -> String {
    let mut out = String::new();
    for (i, segment) in path.iter().enumerate() {
        if i > 0 {
            out.push(separator);
        }
        out.push_str(segment);
    }
    out
}
