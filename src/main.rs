// Command-line entry point for callviz.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use callviz::application::{LiveUsecase, RenderUsecase};
use callviz::config::{ConfigOverrides, RenderConfig};
use callviz::domain::projection::GraphProjector;
use callviz::infrastructure::graphviz::{DEFAULT_IMAGE_FILE, DEFAULT_SOURCE_FILE};
use callviz::infrastructure::logging::init_logging;
use callviz::infrastructure::{GraphvizImageSink, GraphvizSourceSink, SnapshotSource, UbigraphSink, XmlRpcClient};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Aggregated profile (JSON)
    #[arg(short, long, global = true)]
    profile: Option<PathBuf>,

    /// Render configuration (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Hide nodes and edges whose time fraction is below this value (0..1)
    #[arg(long, global = true)]
    threshold: Option<f64>,

    /// Cluster functions by module when the profile has no groups
    #[arg(long, global = true)]
    group_by_module: bool,

    /// Debug logging for callviz
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    output: Output,
}

#[derive(Subcommand, Debug)]
enum Output {
    /// Graphviz source generation
    GraphvizSource {
        /// The generated GraphViz dot source
        #[arg(short, long, default_value = DEFAULT_SOURCE_FILE)]
        output_file: PathBuf,

        #[command(flatten)]
        font: FontArgs,
    },

    /// Graphviz image generation
    GraphvizImage {
        /// The generated GraphViz image
        #[arg(short, long, default_value = DEFAULT_IMAGE_FILE)]
        output_file: PathBuf,

        /// Image format to produce (png, ps, svg, etc.)
        #[arg(short = 't', long)]
        output_type: Option<String>,

        /// Layout tool to invoke
        #[arg(long)]
        tool: Option<String>,

        #[command(flatten)]
        font: FontArgs,
    },

    /// Update an Ubigraph visualisation in real time
    Ubigraph {
        /// The Ubigraph server
        #[arg(short, long)]
        server_url: Option<String>,

        /// Milliseconds between profile reloads
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Stop after this many reloads (at least 1)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        ticks: Option<u64>,
    },
}

#[derive(Args, Debug, Default)]
struct FontArgs {
    /// Name of the font to be used
    #[arg(long)]
    font_name: Option<String>,

    /// Size of the font to be used
    #[arg(long)]
    font_size: Option<u32>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let profile = cli
        .profile
        .clone()
        .context("Please provide the profile to render with --profile <file.json>")?;

    let mut overrides = ConfigOverrides {
        threshold: cli.threshold,
        group_by_module: cli.group_by_module,
        ..Default::default()
    };
    match &cli.output {
        Output::GraphvizSource { font, .. } => apply_font(&mut overrides, font),
        Output::GraphvizImage { output_type, tool, font, .. } => {
            apply_font(&mut overrides, font);
            overrides.image_format = output_type.clone();
            overrides.tool = tool.clone();
        }
        Output::Ubigraph { server_url, interval_ms, .. } => {
            overrides.server_url = server_url.clone();
            overrides.update_interval_ms = *interval_ms;
        }
    }

    let mut config = RenderConfig::load(cli.config.as_deref())?;
    config.apply_overrides(overrides)?;
    let projector = GraphProjector::from_config(&config);

    match cli.output {
        Output::GraphvizSource { output_file, .. } => {
            let source = load_source(&profile, &config)?;
            let mut sink = GraphvizSourceSink::new(projector, output_file.clone());
            RenderUsecase { source: &source, sink: &mut sink }.run()?;
            println!("Graphviz source written to {}", output_file.display());
        }
        Output::GraphvizImage { output_file, .. } => {
            let source = load_source(&profile, &config)?;
            let mut sink = GraphvizImageSink::new(projector, &config.tool, &config.image_format, output_file.clone());
            RenderUsecase { source: &source, sink: &mut sink }.run()?;
            println!(
                "Graphviz image written to {} (format: {})",
                output_file.display(),
                config.image_format
            );
        }
        Output::Ubigraph { ticks, .. } => {
            let client = XmlRpcClient::new(&config.server_url)?;
            let mut sink = UbigraphSink::new(client, projector);
            let updates = LiveUsecase {
                sink: &mut sink,
                loader: || load_source(&profile, &config),
                interval: Duration::from_millis(config.update_interval_ms),
                ticks,
            }
            .run()?;
            println!("Ubigraph session ended after {} updates", updates);
        }
    }

    Ok(())
}

fn apply_font(overrides: &mut ConfigOverrides, font: &FontArgs) {
    overrides.font_name = font.font_name.clone();
    overrides.font_size = font.font_size;
}

fn load_source(profile: &Path, config: &RenderConfig) -> Result<SnapshotSource> {
    Ok(SnapshotSource::load(profile)?.with_module_grouping(config.group_by_module))
}
