use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use raster_registration::config::Config;
use raster_registration::raster::convert;
use raster_registration::{
    filter, DistanceField, DistanceKernel, MetricKind, Raster, RegistrationOutcome, Registrator,
};

#[derive(Parser)]
#[command(name = "register")]
#[command(about = "Rigid grayscale image registration via coarse-to-fine grid search")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a moving image against a reference image
    Register {
        /// Path to the reference image
        #[arg(short, long)]
        reference: PathBuf,

        /// Path to the moving (transformed) image
        #[arg(short, long)]
        moving: PathBuf,

        /// Similarity metric to drive the search
        #[arg(short = 'M', long, value_enum)]
        metric: Option<MetricKind>,

        /// Optional TOML/JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output file for the result as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Save the aligned moving image to this path
        #[arg(long)]
        save_aligned: Option<PathBuf>,

        /// Save a checkerboard of reference and aligned image to this path
        #[arg(long)]
        checkerboard: Option<PathBuf>,
    },

    /// Compute the chamfer distance map of a binary edge image
    DistanceMap {
        /// Path to the input edge image
        #[arg(short, long)]
        input: PathBuf,

        /// Distance kernel to use
        #[arg(short, long, value_enum, default_value = "euclidean")]
        kernel: KernelKind,

        /// Output image path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Extract Sobel edges from an image
    Edges {
        /// Path to the input image
        #[arg(short, long)]
        input: PathBuf,

        /// Binarize the edge response at this threshold
        #[arg(short, long)]
        threshold: Option<u16>,

        /// Output image path
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KernelKind {
    Manhattan,
    Euclidean,
}

impl KernelKind {
    fn kernel(self) -> DistanceKernel {
        match self {
            KernelKind::Manhattan => DistanceKernel::manhattan(),
            KernelKind::Euclidean => DistanceKernel::euclidean(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        })
        .init();

    match cli.command {
        Commands::Register {
            reference,
            moving,
            metric,
            config,
            output,
            save_aligned,
            checkerboard,
        } => handle_register(
            reference,
            moving,
            metric,
            config,
            output,
            save_aligned,
            checkerboard,
        ),
        Commands::DistanceMap {
            input,
            kernel,
            output,
        } => handle_distance_map(input, kernel, output),
        Commands::Edges {
            input,
            threshold,
            output,
        } => handle_edges(input, threshold, output),
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_register(
    reference_path: PathBuf,
    moving_path: PathBuf,
    metric_override: Option<MetricKind>,
    config_path: Option<PathBuf>,
    output: Option<PathBuf>,
    save_aligned: Option<PathBuf>,
    checkerboard: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = match config_path {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };
    let metric_kind = metric_override.unwrap_or(config.metric);

    println!("Loading images...");
    let reference = load_raster(&reference_path)?;
    let moving = load_raster(&moving_path)?;
    println!(
        "Reference: {}x{}, Moving: {}x{}",
        reference.width(),
        reference.height(),
        moving.width(),
        moving.height()
    );

    let metric = metric_kind.create(&reference, &moving)?;
    let registrator = Registrator::new(config.registration.clone())?;

    println!("Running registration with {} metric...", metric.name());
    let outcome = registrator.register(&reference, &moving, metric.as_ref())?;

    match &outcome {
        RegistrationOutcome::Improved(result) => {
            println!(
                "Best transform: tx={:.3} ty={:.3} rot={:.3} ({:?} order)",
                result.translation.0, result.translation.1, result.rotation_degrees, result.ordering
            );
            println!(
                "Score: {:.4} (initial {:.4}), took {:.1}ms",
                result.score, result.initial_score, result.processing_time_ms
            );

            if save_aligned.is_some() || checkerboard.is_some() {
                let aligned = result
                    .pipeline
                    .apply(&moving, config.output.final_interpolation)?;
                if let Some(path) = save_aligned {
                    convert::to_gray_image(&aligned).save(&path)?;
                    println!("Aligned image saved to {:?}", path);
                }
                if let Some(path) = checkerboard {
                    let board =
                        reference.checkerboard(&aligned, config.output.checkerboard_blocks)?;
                    convert::to_gray_image(&board).save(&path)?;
                    println!("Checkerboard saved to {:?}", path);
                }
            }
        }
        RegistrationOutcome::NoImprovement { initial_score } => {
            println!(
                "No candidate improved on the initial alignment (score {:.4})",
                initial_score
            );
        }
    }

    if let Some(output_path) = output {
        let json = serde_json::to_string_pretty(&outcome)?;
        std::fs::write(&output_path, json)?;
        println!("Results saved to {:?}", output_path);
    }

    Ok(())
}

fn handle_distance_map(input: PathBuf, kernel: KernelKind, output: PathBuf) -> anyhow::Result<()> {
    let raster = load_raster(&input)?;
    let field = DistanceField::compute(&raster, &kernel.kernel());
    let rendered = field.to_raster(raster.max_intensity());
    convert::to_gray_image(&rendered).save(&output)?;
    println!("Distance map saved to {:?}", output);
    Ok(())
}

fn handle_edges(input: PathBuf, threshold: Option<u16>, output: PathBuf) -> anyhow::Result<()> {
    let raster = load_raster(&input)?;
    let mut edges = filter::sobel_edges(&raster);
    if let Some(threshold) = threshold {
        edges = edges.binarize(threshold);
    }
    convert::to_gray_image(&edges).save(&output)?;
    println!("Edge image saved to {:?}", output);
    Ok(())
}

fn load_raster(path: &PathBuf) -> anyhow::Result<Raster> {
    let image = image::open(path)?.to_luma8();
    Ok(convert::from_gray_image(&image))
}
