use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use dirsizer::layout::LayoutConfig;
use dirsizer::render::{self, html, RenderConfig};
use dirsizer::scanner::types::Measure;
use dirsizer::scanner::{self, Source};
use dirsizer::tree::{self, Granularity};

/// Show where the space goes: aggregate object sizes by path and draw a treemap.
#[derive(Parser)]
#[command(name = "dirsizer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the local file system
    Local {
        /// Base path to scan for files
        #[arg(long)]
        base: PathBuf,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Use the built-in sample data
    Sample {
        #[command(flatten)]
        run: RunArgs,
    },
}

#[derive(Args)]
struct RunArgs {
    /// HTML file to write the treemap to
    #[arg(long, required_unless_present = "no_output", conflicts_with = "no_output")]
    output: Option<PathBuf>,

    /// Don't create any output file, only print the summary
    #[arg(long)]
    no_output: bool,

    /// Give every object its own cell instead of folding files into their folder
    #[arg(long)]
    per_object: bool,

    /// Report storage cost at this price per GiB instead of byte sizes
    #[arg(long, value_name = "PRICE")]
    cost_per_gib: Option<f64>,

    /// Children below this fraction of their parent's weight are not drawn
    #[arg(long, default_value_t = LayoutConfig::default().negligible_fraction)]
    threshold: f64,

    /// Canvas width in pixels
    #[arg(long, default_value_t = RenderConfig::default().width)]
    width: f64,

    /// Canvas height in pixels
    #[arg(long, default_value_t = RenderConfig::default().height)]
    height: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "dirsizer=info",
        1 => "dirsizer=debug",
        _ => "dirsizer=trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let (source, run) = match cli.command {
        Commands::Local { base, run } => (Source::Local { base }, run),
        Commands::Sample { run } => (Source::Sample, run),
    };

    let granularity = if run.per_object {
        Granularity::Object
    } else {
        Granularity::Folder
    };

    let measure = match run.cost_per_gib {
        Some(per_gib) if per_gib.is_finite() && per_gib >= 0.0 => Measure::Cost { per_gib },
        Some(per_gib) => bail!("invalid price per GiB: {}", per_gib),
        None => Measure::Bytes,
    };

    // Scanner thread produces, this thread is the single tree writer
    let (tx, rx) = mpsc::channel();
    let scan = scanner::spawn(source.clone(), measure, tx);
    let tree = tree::build_tree(rx, granularity)?;
    scan.join()
        .map_err(|_| anyhow!("scanner thread panicked"))?
        .with_context(|| format!("scanning {}", source.location()))?;

    let units = measure.units();
    let summary = render::summary(&tree, &source.location(), units);
    for (label, value) in &summary {
        println!("{}: {}", label, value);
    }

    let output = match run.output {
        Some(output) if !run.no_output => output,
        _ => {
            println!("All done");
            return Ok(());
        }
    };

    let layout_config = LayoutConfig {
        negligible_fraction: run.threshold,
        ..LayoutConfig::default()
    };
    let render_config = RenderConfig {
        width: run.width,
        height: run.height,
        ..RenderConfig::default()
    };
    let cells = render::draw(&tree, &render_config, &layout_config)?;
    tracing::info!("Drew {} cells at {}x{}", cells.len(), run.width, run.height);

    let file = File::create(&output)
        .with_context(|| format!("creating {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    let page = html::Page {
        title: "Dir Sizer",
        summary: &summary,
        units,
        separator: source.separator(),
    };
    html::write_page(&mut writer, &page, &cells)
        .and_then(|_| writer.flush())
        .with_context(|| format!("writing {}", output.display()))?;

    println!("All done, created {}", output.display());
    Ok(())
}
