use std::io::{self, Write};

use super::tooltip::{build_tooltip, Units};
use super::DrawnCell;

/// Page-level inputs besides the cells themselves.
#[derive(Debug, Clone)]
pub struct Page<'a> {
    pub title: &'a str,
    pub summary: &'a [(&'static str, String)],
    pub units: Units,
    /// Separator used when showing a cell's path
    pub separator: char,
}

/// Write a standalone HTML page showing the drawn cells.
///
/// Cells are emitted as absolutely positioned divs in draw order, so nested
/// cells sit on top of their parents. Coordinates are rounded to whole pixels
/// here and nowhere earlier.
pub fn write_page<W: Write>(out: &mut W, page: &Page<'_>, cells: &[DrawnCell]) -> io::Result<()> {
    let top = summary_height(page.summary);

    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html>")?;
    writeln!(out, "<head>")?;
    writeln!(out, "<meta charset=\"utf-8\">")?;
    writeln!(out, "<title>{}</title>", escape_html(page.title))?;
    out.write_all(STYLE.as_bytes())?;
    writeln!(out, "<script>")?;
    writeln!(out, "var tooltips = {{")?;
    for (i, cell) in cells.iter().enumerate() {
        let info = build_tooltip(cell, page.units, page.separator);
        let entry = [info.full_path, info.size_display, info.count_display];
        let json = serde_json::to_string(&entry)
            .map_err(io::Error::other)?
            .replace("</", "<\\/");
        let comma = if i + 1 < cells.len() { "," } else { "" };
        writeln!(out, "\"t{}\":{}{}", i, json, comma)?;
    }
    writeln!(out, "}};")?;
    out.write_all(SCRIPT.as_bytes())?;
    writeln!(out, "</script>")?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;

    writeln!(out, "<table class=\"summary\">")?;
    for (label, value) in page.summary {
        writeln!(
            out,
            "<tr><td>{}:</td><td>{}</td></tr>",
            escape_html(label),
            escape_html(value)
        )?;
    }
    writeln!(out, "</table>")?;

    for (i, cell) in cells.iter().enumerate() {
        let border = cell.color.darken(0.25);
        writeln!(
            out,
            "{}<div class=\"cell\" id=\"t{}\" style=\"width:{}px;height:{}px;left:{}px;top:{}px;background-color:{};border-color:{}\"></div>",
            "  ".repeat(cell.depth),
            i,
            cell.rect.width.round(),
            cell.rect.height.round(),
            cell.rect.x.round(),
            (cell.rect.y + top).round(),
            cell.color.to_hex(),
            border.to_hex()
        )?;
    }

    writeln!(out, "<div class=\"tooltip\" id=\"tooltip\">")?;
    writeln!(out, "<nobr>Path: <span id=\"folder\"></span></nobr><br>")?;
    writeln!(out, "<nobr>Size: <span id=\"size\"></span></nobr><br>")?;
    writeln!(out, "<nobr>Objects: <span id=\"objects\"></span></nobr><br>")?;
    writeln!(out, "</div>")?;
    writeln!(out, "</body>")?;
    writeln!(out, "</html>")?;
    Ok(())
}

/// Vertical space reserved above the map for the summary table.
fn summary_height(summary: &[(&'static str, String)]) -> f64 {
    if summary.is_empty() {
        0.0
    } else {
        summary.len() as f64 * 20.0 + 10.0
    }
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

const STYLE: &str = r#"<style>
body { font-family: sans-serif; }
.cell {
    border-radius: 5px;
    border-width: 1px;
    border-style: solid;
    position: absolute;
    box-sizing: border-box;
}
.summary td { padding-right: 1em; }
.tooltip {
    display: none;
    background: #C8C8C8;
    margin: 25px;
    padding: 10px;
    position: absolute;
    z-index: 1000;
}
</style>
"#;

const SCRIPT: &str = r#"document.addEventListener('mousemove', on_mousemove, false);
var last = null;
var lastColor = "";
function safe_html(value) {
    return String(value).replace(/&/g, '&amp;').replace(/</g, '&lt;').replace(/>/g, '&gt;');
}
function on_mousemove(e) {
    var tooltip = document.getElementById("tooltip");
    tooltip.style.left = e.pageX + 'px';
    tooltip.style.top = e.pageY + 'px';
    var cur = e.target;
    if (cur.tagName != "DIV" || !(cur.id in tooltips)) {
        cur = null;
    }
    if (last != cur) {
        if (last != null) {
            last.style.backgroundColor = lastColor;
        }
        if (cur != null) {
            lastColor = cur.style.backgroundColor;
            cur.style.backgroundColor = 'yellow';
            document.getElementById("folder").innerHTML = safe_html(tooltips[cur.id][0]);
            document.getElementById("size").innerHTML = safe_html(tooltips[cur.id][1]);
            document.getElementById("objects").innerHTML = safe_html(tooltips[cur.id][2]);
            tooltip.style.display = 'block';
        } else {
            tooltip.style.display = 'none';
        }
        last = cur;
    }
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Rect;
    use crate::render::colors::depth_color;
    use compact_str::CompactString;

    fn cell(path: &[&str], rect: Rect, size: f64, count: u64) -> DrawnCell {
        DrawnCell {
            path: path.iter().map(|s| CompactString::new(s)).collect(),
            depth: path.len(),
            rect,
            color: depth_color(path.len()),
            size,
            count,
        }
    }

    fn render(cells: &[DrawnCell], summary: &[(&'static str, String)]) -> String {
        let page = Page {
            title: "Dir Sizer",
            summary,
            units: Units::Bytes,
            separator: '/',
        };
        let mut buf = Vec::new();
        write_page(&mut buf, &page, cells).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn cells_become_rounded_divs() {
        let cells = vec![
            cell(&[], Rect::new(5.0, 5.0, 1890.0, 955.0), 590.0, 4),
            cell(&["sub_c"], Rect::new(10.4, 20.6, 99.5, 50.2), 140.0, 1),
        ];
        let html = render(&cells, &[]);
        assert!(html.contains("id=\"t0\" style=\"width:1890px;height:955px;left:5px;top:5px;"));
        assert!(html.contains("id=\"t1\" style=\"width:100px;height:50px;left:10px;top:21px;"));
        assert!(html.contains(&depth_color(1).to_hex()));
    }

    #[test]
    fn tooltips_are_json_escaped() {
        let cells = vec![cell(&["a\"b", "<c>"], Rect::sized(30.0, 30.0), 2048.0, 1234)];
        let html = render(&cells, &[]);
        assert!(html.contains(r#""t0":["a\"b/<c>","2.00 KiB","1,234"]"#));
    }

    #[test]
    fn summary_shifts_the_map_down() {
        let cells = vec![cell(&[], Rect::new(5.0, 5.0, 100.0, 100.0), 1.0, 1)];
        let summary = vec![("Location", "<root>".to_string())];
        let html = render(&cells, &summary);
        assert!(html.contains("<td>Location:</td><td>&lt;root&gt;</td>"));
        assert!(html.contains("top:35px;"));
    }
}
