use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use image_theme_wasm::{
    ExtractOptions, StyleMap, apply_theme, extract_theme_from_files, soften_text_color,
};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    /// `:root { --bg0: ...; }` block, after the readability check
    Css,
    /// Raw theme record
    Json,
}

/// Extract a colour theme from one or more images.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// One or more input image paths
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// JSON file with extraction options; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Working bitmap width limit
    #[arg(long)]
    max_width: Option<u32>,

    /// Working bitmap height limit
    #[arg(long)]
    max_height: Option<u32>,

    /// Samples taken per image at most
    #[arg(long)]
    max_samples: Option<usize>,

    /// Number of k-means clusters
    #[arg(short = 'k', long)]
    clusters: Option<usize>,

    /// Number of k-means iterations
    #[arg(long)]
    iterations: Option<usize>,

    /// Minimum pooled samples needed to produce a theme
    #[arg(long)]
    min_samples: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Css)]
    format: Format,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log pipeline details to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn options(&self) -> Result<ExtractOptions> {
        let mut opts = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => ExtractOptions::default(),
        };

        if let Some(v) = self.max_width {
            opts.sample.max_width = v;
        }
        if let Some(v) = self.max_height {
            opts.sample.max_height = v;
        }
        if let Some(v) = self.max_samples {
            opts.sample.max_samples = v;
        }
        if let Some(v) = self.clusters {
            opts.kmeans.k = v;
        }
        if let Some(v) = self.iterations {
            opts.kmeans.iterations = v;
        }
        if let Some(v) = self.min_samples {
            opts.min_samples = v;
        }
        Ok(opts)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let opts = args.options()?;
    tracing::debug!(?opts, "extraction options");

    let Some(theme) = extract_theme_from_files(&args.inputs, &opts).context("theme extraction failed")?
    else {
        eprintln!("Not enough usable pixels to build a theme; nothing written.");
        return Ok(());
    };

    let rendered = match args.format {
        Format::Css => {
            let mut sink = StyleMap::new();
            apply_theme(&theme, &mut sink);
            soften_text_color(&mut sink);
            let mut css = sink.to_css();
            if let Some(color) = sink.theme_color() {
                css.push_str(&format!("/* theme-color: {color} */\n"));
            }
            css
        }
        Format::Json => serde_json::to_string_pretty(&theme)? + "\n",
    };

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, rendered)?;
            eprintln!("Saved → {}", path.display());
        }
        None => print!("{rendered}"),
    }

    Ok(())
}
