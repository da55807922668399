use crate::config::load_config;
use crate::engine::GraphEngine;
use crate::layout_dump::write_layout_dump;
use crate::parser::parse_snapshots;
use crate::render::{Renderer, SvgRenderer, write_output_png, write_output_svg};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gtree", version, about = "Layered commit-graph renderer")]
pub struct Args {
    /// Input file (git log lines or JSON snapshots) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG/JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme and layout settings)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
            OutputFormat::Json => "json",
        }
    }
}

pub fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    let width = args.width.unwrap_or(config.layout.width);
    let height = args.height.unwrap_or(config.layout.height);
    config.set_canvas(width, height);

    let input = read_input(args.input.as_deref())?;
    let snapshots = parse_snapshots(&input)?;
    tracing::info!(steps = snapshots.len(), "input parsed");

    let outputs = resolve_outputs(args.output.as_deref(), args.output_format, snapshots.len())?;
    let mut engine = GraphEngine::from_config(&config);
    let mut renderer = SvgRenderer::new(config.theme.clone(), config.layout.clone());

    for (idx, snapshot) in snapshots.iter().enumerate() {
        let update = engine.make_graph(&snapshot.commits, &snapshot.heads)?;
        renderer.render_update(&update)?;
        tracing::debug!(
            step = idx + 1,
            added = update.diff.added.len(),
            removed = update.diff.removed.len(),
            "step rendered"
        );
        let target = match outputs.get(idx) {
            Some(StepOutput::Skip) | None => continue,
            Some(StepOutput::Stdout) => None,
            Some(StepOutput::File(path)) => Some(path.as_path()),
        };
        match args.output_format {
            OutputFormat::Svg => write_output_svg(&renderer.svg(), target)?,
            OutputFormat::Json => write_layout_dump(target, &update)?,
            OutputFormat::Png => {
                let path = target
                    .ok_or_else(|| anyhow::anyhow!("Output path required for png output"))?;
                write_output_png(&renderer.svg(), path, &config.render)?;
            }
        }
    }

    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum StepOutput {
    Skip,
    Stdout,
    File(PathBuf),
}

/// One target per step. Without an output path only the final step is
/// written, to stdout; with several steps the path fans out into numbered
/// files (or numbered files inside it, for a directory).
fn resolve_outputs(
    output: Option<&Path>,
    format: OutputFormat,
    count: usize,
) -> Result<Vec<StepOutput>> {
    let Some(base) = output else {
        if format == OutputFormat::Png {
            return Err(anyhow::anyhow!("Output path required for png output"));
        }
        return Ok((0..count)
            .map(|idx| {
                if idx + 1 == count {
                    StepOutput::Stdout
                } else {
                    StepOutput::Skip
                }
            })
            .collect());
    };
    if count <= 1 {
        return Ok(vec![StepOutput::File(base.to_path_buf())]);
    }
    let ext = format.extension();
    if base.is_dir() {
        return Ok((0..count)
            .map(|idx| StepOutput::File(base.join(format!("step-{}.{}", idx + 1, ext))))
            .collect());
    }
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("graph");
    let parent = base.parent().unwrap_or_else(|| Path::new("."));
    Ok((0..count)
        .map(|idx| StepOutput::File(parent.join(format!("{}-{}.{}", stem, idx + 1, ext))))
        .collect())
}
