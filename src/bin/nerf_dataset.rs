use clap::{Parser, Subcommand};
use nerf_capture_dataset::aggregate::aggregate;
use nerf_capture_dataset::dataset::{DatasetOptions, write_dataset};
use nerf_capture_dataset::io::object_from_json;
use nerf_capture_dataset::rig::{CameraRig, RigConfig};
use nerf_capture_dataset::synthetic::capture;
use nerf_capture_dataset::types::Frame;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a checkered ground plane from an orbit rig and write it as a dataset
    Synthetic {
        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Rig configuration JSON, defaults to a 30 camera double orbit
        #[arg(short, long)]
        rig_config: Option<PathBuf>,

        /// Checker square size in meters
        #[arg(long, default_value = "0.05")]
        square_size: f64,

        #[arg(long, default_value = "4")]
        aabb_scale: u32,

        #[arg(long, default_value = "1.0")]
        scale: f64,
    },
    /// Gather every trial_<N>/nerf_dataset under SOURCE into TARGET
    Aggregate {
        source: PathBuf,
        /// Wiped before copying
        target: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match args.command {
        Commands::Synthetic {
            output,
            rig_config,
            square_size,
            aabb_scale,
            scale,
        } => {
            let config: RigConfig = match rig_config {
                Some(path) => object_from_json(&path)?,
                None => RigConfig::default(),
            };
            let rig = CameraRig::from_config(&config)?;
            let now = Instant::now();
            let (rgbs, depths) = Frame::unzip(capture(&rig, square_size));
            log::info!(
                "rendered {} frames in {:.3} sec",
                rgbs.len(),
                now.elapsed().as_secs_f64()
            );
            let params = write_dataset(
                &rig,
                &rgbs,
                &depths,
                &output,
                &DatasetOptions { aabb_scale, scale },
            )?;
            println!(
                "translation: {:?}, scale: {:.6}",
                params.translation.as_slice(),
                params.scale
            );
        }
        Commands::Aggregate { source, target } => {
            let summary = aggregate(&source, &target)?;
            println!(
                "Aggregated {} datasets into {}",
                summary.num_datasets,
                target.display()
            );
        }
    }

    Ok(())
}
