use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use bevy::{
    app::App,
    log::{Level, LogPlugin, error, info},
};
use bevy_motion_graph::{
    builder::{MotionGraphBuilder, manifest::BuildManifest},
    core::{
        errors::{AssetLoaderError, MotionGraphError},
        motion_graph::{MotionGraph, ToDot},
    },
    runtime::{MotionWalker, RandomWalkSettings, RandomWalker},
};
use clap::Parser;
use thiserror::Error;

const MANIFEST_SUFFIX: &str = ".mgb.ron";

/// Builds a motion graph (`.mog`) from a build manifest (`.mgb.ron`).
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Build manifest listing the skeleton, the clips and the build settings
    manifest: PathBuf,
    /// Output file. Defaults to the manifest path with a `.mog` extension
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Also write the graph in Graphviz DOT format
    #[arg(long)]
    dot: Option<PathBuf>,
    /// Skip the transition cache
    #[arg(long)]
    no_precompute: bool,
    /// Log a random walk of this many states through the finished graph
    #[arg(long)]
    preview: Option<usize>,
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Error)]
enum BuilderError {
    #[error(transparent)]
    Asset(#[from] AssetLoaderError),
    #[error("build failed: {0}")]
    Build(#[from] MotionGraphError),
    #[error("could not write {}: {source}", path.display())]
    Dot {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn default_output(manifest: &Path) -> PathBuf {
    let name = manifest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.strip_suffix(MANIFEST_SUFFIX) {
        Some(stem) => manifest.with_file_name(format!("{stem}.mog")),
        None => manifest.with_extension("mog"),
    }
}

fn preview(graph: &MotionGraph, states: usize) -> Result<(), BuilderError> {
    if graph.is_empty() {
        info!("Graph has no states, skipping the random walk preview");
        return Ok(());
    }
    let mut walker = RandomWalker::new(graph, RandomWalkSettings::default())?;
    let mut walk = vec![walker.current()];
    walk.extend((0..states).map(|_| walker.tick().state));
    let placed = walker.placement();
    info!(
        "Random walk {:?} ends at {:?} facing {:.2} rad",
        walk, placed.position, placed.yaw
    );
    Ok(())
}

fn run(cli: &Cli) -> Result<(), BuilderError> {
    let manifest = BuildManifest::load(&cli.manifest)?;
    let base_dir = cli.manifest.parent().unwrap_or(Path::new("."));
    let dataset = manifest.load_dataset(base_dir)?;
    info!(
        "Loaded skeleton {:?} ({} bones) and {} clips",
        dataset.skeleton.name(),
        dataset.skeleton.bone_count(),
        dataset.clips.len()
    );

    let mut settings = manifest.settings.clone();
    if cli.no_precompute {
        settings.precompute.enabled = false;
    }

    let (graph, report) =
        MotionGraphBuilder::new(&dataset.skeleton, settings).build(&dataset.clips)?;
    info!("{report}");

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output(&cli.manifest));
    graph
        .save_to_file(&output)
        .map_err(|err| err.in_file(&output))?;
    info!("Wrote {} states to {}", graph.len(), output.display());

    if let Some(dot) = &cli.dot {
        graph.dot_to_file(dot).map_err(|source| BuilderError::Dot {
            path: dot.clone(),
            source,
        })?;
        info!("Wrote DOT graph to {}", dot.display());
    }

    if let Some(states) = cli.preview {
        preview(&graph, states)?;
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut app = App::new();
    app.add_plugins(LogPlugin {
        level: if cli.verbose { Level::DEBUG } else { Level::INFO },
        ..Default::default()
    });

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
