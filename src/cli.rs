//! Command-line bundle inspector.

use anyhow::Context;
use clap::Parser;
use s2ssedit_core::ObjectFile;
use s2ssedit_settings::Config;
use std::path::PathBuf;

/// Inspect, export and re-save Sonic 2 special stage data.
#[derive(Debug, Parser)]
#[command(name = "s2ssedit", version)]
pub struct Cli {
    /// Directory holding the object location and layout files
    pub bundle_dir: PathBuf,

    /// Settings file to use instead of the one in the config directory
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Export the decoded stages as JSON
    #[arg(long, value_name = "OUT")]
    pub json: Option<PathBuf>,

    /// Write the stages back to the bundle after decoding
    #[arg(long)]
    pub resave: bool,
}

/// Object counts of one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSummary {
    pub index: usize,
    pub segments: usize,
    pub rings: usize,
    pub bombs: usize,
    /// Segments holding more objects than the configured limit.
    pub crowded_segments: Vec<usize>,
}

pub fn summarize(file: &ObjectFile, max_objects: u16) -> Vec<StageSummary> {
    file.stages()
        .iter()
        .enumerate()
        .map(|(index, stage)| {
            let mut summary = StageSummary {
                index,
                segments: stage.num_segments(),
                rings: 0,
                bombs: 0,
                crowded_segments: Vec::new(),
            };
            for (i, segment) in stage.segments().iter().enumerate() {
                let stats = segment.stats(max_objects);
                summary.rings += usize::from(stats.rings);
                summary.bombs += usize::from(stats.bombs);
                if stats.over_limit {
                    summary.crowded_segments.push(i);
                }
            }
            summary
        })
        .collect()
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    if let Some(path) = &cli.config {
        return Config::load_from_file(path)
            .with_context(|| format!("cannot load settings from {}", path.display()));
    }
    match Config::default_path() {
        Ok(path) => Ok(Config::load_or_default(&path)?),
        Err(e) => {
            tracing::warn!("{e}; using default settings");
            Ok(Config::default())
        }
    }
}

/// Opens the bundle, logs a summary and performs the requested exports.
pub fn run(cli: &Cli) -> anyhow::Result<Vec<StageSummary>> {
    let config = load_config(cli)?;
    let bundle = config.bundle_at(&cli.bundle_dir);
    let file = bundle
        .open()
        .with_context(|| format!("cannot open bundle in {}", cli.bundle_dir.display()))?;

    let summaries = summarize(&file, config.editor.max_objects_per_segment);
    for summary in &summaries {
        tracing::info!(
            stage = summary.index + 1,
            segments = summary.segments,
            rings = summary.rings,
            bombs = summary.bombs,
            "stage"
        );
        for segment in &summary.crowded_segments {
            tracing::warn!(
                stage = summary.index + 1,
                segment = segment + 1,
                limit = config.editor.max_objects_per_segment,
                "segment exceeds object limit"
            );
        }
    }

    if let Some(out) = &cli.json {
        file.save_json(out)
            .with_context(|| format!("cannot write {}", out.display()))?;
        tracing::info!(path = %out.display(), "exported JSON");
    }
    if cli.resave {
        bundle.save(&file).context("cannot re-save bundle")?;
    }
    Ok(summaries)
}
