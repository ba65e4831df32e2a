/// Diagnostic tool to verify scan → tree → layout → draw pipeline
use dirsizer::layout::{layout, LayoutConfig, Rect};
use dirsizer::render::tooltip::{format_count, format_size};
use dirsizer::render::{self, RenderConfig};
use dirsizer::scanner::types::Measure;
use dirsizer::scanner::{self, Source};
use dirsizer::tree::{self, aggregate, Granularity, SizeNode};
use std::path::PathBuf;
use std::sync::mpsc;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dirsizer=debug".parse()?),
        )
        .init();

    let source = match std::env::args().nth(1) {
        Some(base) => Source::Local {
            base: PathBuf::from(base),
        },
        None => Source::Sample,
    };

    println!("=== DIAGNOSTIC: Tree → Layout Pipeline ===");
    println!("Scanning: {}", source.location());

    // Scan + build tree
    let (tx, rx) = mpsc::channel();
    let handle = scanner::spawn(source.clone(), Measure::Bytes, tx);
    let tree = tree::build_tree(rx, Granularity::Folder)?;
    if let Ok(Err(e)) = handle.join() {
        println!("    Scan reported an error: {:#}", e);
    }
    println!("\n[1] Tree built: {} nodes", tree.len());

    let root = tree.root();
    println!(
        "    Root: size={} count={} children={}",
        format_size(root.size()),
        format_count(root.count()),
        root.child_count()
    );

    // Check totals
    match aggregate::find_mismatch(root) {
        Some(path) => println!("\n[2] ✗ Totals mismatch at /{}", path.join("/")),
        None => println!("\n[2] ✓ Every node equals its leaf value plus its children"),
    }

    // Show top 10 children of root by size
    println!("\n[3] Top 10 children of root:");
    let mut root_children: Vec<(&str, &SizeNode)> = root.children().collect();
    root_children.sort_by(|a, b| b.1.size().total_cmp(&a.1.size()));
    for (i, (name, child)) in root_children.iter().take(10).enumerate() {
        println!(
            "    [{}] '{}' - {} ({} objects, children={})",
            i,
            name,
            format_size(child.size()),
            format_count(child.count()),
            child.child_count()
        );
    }

    // Single-level layout of the root
    let config = LayoutConfig::default();
    let viewport = Rect::sized(1920.0, 1080.0);
    let cells = layout(viewport, root, &config);
    println!("\n[4] Root layout: {} cells", cells.len());

    let mut sorted = cells.clone();
    sorted.sort_by(|a, b| (b.width * b.height).total_cmp(&(a.width * a.height)));
    println!("\n[5] Top 10 largest cells by area:");
    for (i, cell) in sorted.iter().take(10).enumerate() {
        println!(
            "    [{}] '{}' - rect: {:.1}x{:.1} ({:.0}px²) at ({:.1}, {:.1}) aspect {:.2}",
            i,
            cell.key.as_deref().unwrap_or("(own files)"),
            cell.width,
            cell.height,
            cell.width * cell.height,
            cell.x,
            cell.y,
            cell.width.max(cell.height) / cell.width.min(cell.height).max(1e-9)
        );
    }

    // Check for anomalies
    println!("\n[6] Checking for anomalies:");
    let area_sum: f64 = cells.iter().map(|c| c.width * c.height).sum();
    println!("    Total cell area: {:.0}px²", area_sum);
    println!("    Viewport area:   {:.0}px²", viewport.area());
    if !cells.is_empty() {
        println!("    Coverage: {:.3}%", (area_sum / viewport.area()) * 100.0);
    }
    let escaped = cells
        .iter()
        .filter(|c| !viewport.contains(&c.rect(), 1e-6))
        .count();
    let mut overlaps = 0;
    for (i, a) in cells.iter().enumerate() {
        overlaps += cells[i + 1..]
            .iter()
            .filter(|b| a.rect().overlaps(&b.rect(), 1e-6))
            .count();
    }
    println!("    Cells outside viewport: {}", escaped);
    println!("    Overlapping pairs:      {}", overlaps);

    // Full draw with production settings
    let render_config = RenderConfig {
        width: viewport.width,
        height: viewport.height,
        ..RenderConfig::default()
    };
    let drawn = render::draw(&tree, &render_config, &config)?;
    let max_depth = drawn.iter().map(|c| c.depth).max().unwrap_or(0);
    println!(
        "\n[7] Drawn cells: {} (deepest level {})",
        drawn.len(),
        max_depth
    );

    Ok(())
}
