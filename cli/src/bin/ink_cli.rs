use clap::{Parser, Subcommand, ValueEnum};
use cli::InkJob;
use color_eyre::eyre::Result;
use ink_kit_common::{StylePreset, utils};
use segmentation::{ConfidenceMapModel, Pipeline};
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;
use studio::{AssetKind, AssetStore, EditorCommand, Session, SessionConfig};
use tracing::{info, warn};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Composite a tattoo onto a photograph from a job file and export it
    Render {
        /// Path to the TOML or JSON job file
        #[arg(short, long)]
        job: PathBuf,
    },
    /// Segment a photograph and save the binary skin mask
    Segment {
        /// Path to the input photograph
        #[arg(short, long)]
        input: PathBuf,
        /// Where to write the mask (PNG)
        #[arg(short, long)]
        output: PathBuf,
        /// Optional TOML or JSON session config for the segmentation settings
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Precomputed confidence map to use instead of the skin-tone model
        #[arg(long)]
        confidence_map: Option<PathBuf>,
    },
    /// List the built-in ink styles
    Styles,
    /// Print a JSON schema
    Schema {
        #[arg(value_enum, default_value = "job")]
        kind: SchemaKind,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SchemaKind {
    Job,
    Config,
    Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Render { job } => {
            render_job(job).await?;
        }
        Commands::Segment { input, output, config, confidence_map } => {
            segment_photo(input, output, config.as_deref(), confidence_map.as_deref()).await?;
        }
        Commands::Styles => list_styles(),
        Commands::Schema { kind } => {
            let schema = match kind {
                SchemaKind::Job => InkJob::schema(),
                SchemaKind::Config => SessionConfig::schema(),
                SchemaKind::Commands => EditorCommand::schema(),
            };
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }

    Ok(())
}

async fn render_job(job_path: &Path) -> Result<()> {
    let job = InkJob::from_file(job_path)?;
    info!(photo = %job.photo.display(), commands = job.commands.len(), "Loaded job");

    for path in std::iter::once(&job.photo).chain(job.tattoo.as_ref()) {
        if !utils::is_image_file(&path.to_string_lossy()) {
            warn!("{} does not look like an image file", path.display());
        }
    }

    let config = job.session_config();
    let mut session = match &job.confidence_map {
        Some(map) => Session::with_model(config, Box::new(ConfidenceMapModel::from_path(map)))?,
        None => Session::new(config)?,
    };

    let photo = AssetStore::read_asset(AssetKind::Photograph, &job.photo)?;
    session.set_photograph_bytes(&photo)?;
    match &job.tattoo {
        Some(path) => {
            let tattoo = AssetStore::read_asset(AssetKind::Tattoo, path)?;
            session.set_tattoo_bytes(&tattoo)?;
        }
        None => warn!("No tattoo in job, exporting the photograph as is"),
    }

    session.settle().await?;
    info!(status = session.status(), "Segmentation settled");

    for command in &job.commands {
        info!(command = %command, "{}", command.description());
        session.execute(command)?;
    }

    session.render()?;
    let path = session.export_composite()?;
    info!("Composite saved to {}", path.display());
    Ok(())
}

async fn segment_photo(
    input: &Path,
    output: &Path,
    config: Option<&Path>,
    confidence_map: Option<&Path>,
) -> Result<()> {
    let config = match config {
        Some(path) => SessionConfig::from_file(path)?,
        None => SessionConfig::default(),
    };
    let mut builder = config.segmentation.pipeline_builder();
    if let Some(map) = confidence_map {
        builder = builder.with_model(ConfidenceMapModel::from_path(map));
    }
    let pipeline: Pipeline = builder.build();
    info!("{}", pipeline.info());

    let photo = image::open(input)?.to_rgb8();
    let mask = tokio::task::spawn_blocking(move || {
        pipeline.run(&photo, &mut |progress| {
            info!(percent = progress.percent, "{}", progress.status);
        })
    })
    .await?;

    if mask.is_fallback() {
        warn!("No body detected, the mask covers the whole frame");
    }
    mask.image.save(output)?;
    info!(
        coverage = mask.coverage(),
        "Mask saved to {}",
        output.display()
    );
    Ok(())
}

fn list_styles() {
    for preset in StylePreset::iter() {
        let profile = preset.profile();
        println!(
            "{:<10} {:<10} opacity {:.2}  skin detail {:.2}  grain {:.2}  tint {}",
            profile.name,
            profile.label,
            profile.opacity,
            profile.skin_detail,
            profile.grain,
            profile.ink_tint.to_hex()
        );
    }
}
