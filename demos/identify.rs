use clap::{Parser, Subcommand};
use huginn_minutiae::{CandidateRecord, Gallery, HuginnMinutiae, PipelineConfig};
use std::fs::OpenOptions;
use std::io::Write;
use tracing::{debug, error, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Log file path
    #[arg(short = 'l', long = "log-file")]
    log_file: Option<String>,

    /// Number of worker threads, 0 for all available cores
    #[arg(short = 'w', long = "workers", default_value = "0")]
    workers: usize,

    /// Minimum matched minutiae to accept a candidate
    #[arg(short = 'm', long = "min-inliers", default_value = "4")]
    min_inliers: usize,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract minutiae from a fingerprint image and print its signature
    Extract {
        /// Fingerprint image
        #[arg(short = 'i', long)]
        image: String,

        /// Print JSON instead of the text signature
        #[arg(long)]
        json: bool,
    },
    /// Compare two fingerprint images
    Match {
        #[arg(short = 'p', long)]
        probe: String,

        #[arg(short = 'c', long)]
        candidate: String,
    },
    /// Extract an image and append it to a gallery file
    Enroll {
        #[arg(short = 'i', long)]
        image: String,

        /// Candidate label
        #[arg(long)]
        label: String,

        #[arg(short = 'g', long)]
        gallery: String,
    },
    /// Search a gallery for the best match of an image
    Identify {
        #[arg(short = 'i', long)]
        image: String,

        #[arg(short = 'g', long)]
        gallery: String,
    },
}

fn initialize_logging(log_file: Option<String>) {
    let console_writer = std::io::stdout.with_max_level(tracing::Level::INFO);

    let file_appender = if let Some(log_file) = log_file {
        RollingFileAppender::new(Rotation::NEVER, ".", log_file)
            .with_max_level(tracing::Level::INFO)
    } else {
        RollingFileAppender::new(Rotation::NEVER, ".", "default.log")
            .with_max_level(tracing::Level::INFO)
    };

    let writer = console_writer.and(file_appender);

    let subscriber = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(writer)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set subscriber: {e}");
        std::process::exit(1);
    }
}

fn main() {
    let args = Args::parse();
    initialize_logging(args.log_file);

    let config = PipelineConfig::default()
        .with_workers(args.workers)
        .with_min_inliers(args.min_inliers);
    let pipeline = match HuginnMinutiae::new(config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            error!("Invalid configuration: {e}");
            return;
        }
    };
    debug!("Pipeline ready: {:?}", pipeline.config());

    match args.command {
        Commands::Extract { image, json } => {
            let features = match pipeline.extract_path(&image) {
                Ok(features) => features,
                Err(e) => {
                    error!("Failed to extract {image}: {e}");
                    return;
                }
            };
            info!("{} minutiae, template {}", features.len(), features.template_hash());
            if json {
                match features.to_json() {
                    Ok(json) => println!("{json}"),
                    Err(e) => error!("Failed to encode features: {e}"),
                }
            } else {
                println!("{features}");
            }
        }
        Commands::Match { probe, candidate } => {
            let probe = match pipeline.extract_path(&probe) {
                Ok(features) => features,
                Err(e) => {
                    error!("Failed to extract probe: {e}");
                    return;
                }
            };
            let candidate = match pipeline.extract_path(&candidate) {
                Ok(features) => features,
                Err(e) => {
                    error!("Failed to extract candidate: {e}");
                    return;
                }
            };
            let outcome = pipeline.match_features(&probe, &candidate);
            let verdict = if pipeline.is_match(&outcome) { "match" } else { "no match" };
            info!("{outcome}: {verdict}");
        }
        Commands::Enroll { image, label, gallery } => {
            let features = match pipeline.extract_path(&image) {
                Ok(features) => features,
                Err(e) => {
                    error!("Failed to extract {image}: {e}");
                    return;
                }
            };
            let record = CandidateRecord::new(label, features);

            let file = OpenOptions::new().create(true).append(true).open(&gallery);
            let written = file.and_then(|mut f| writeln!(f, "\n{record}"));
            match written {
                Ok(()) => info!("Enrolled `{}` into {gallery}", record.id),
                Err(e) => error!("Failed to write {gallery}: {e}"),
            }
        }
        Commands::Identify { image, gallery } => {
            let gallery = match Gallery::load(&gallery) {
                Ok(gallery) => gallery,
                Err(e) => {
                    error!("Failed to load gallery: {e}");
                    return;
                }
            };
            info!("Searching {} enrolled candidates", gallery.len());

            match pipeline.identify_path(&image, gallery.as_slice()) {
                Ok(result) => info!("\n{result}"),
                Err(e) => error!("Identification failed: {e}"),
            }
        }
    }
}
