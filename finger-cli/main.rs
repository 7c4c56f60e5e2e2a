use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use finger_cli::{
    image_pipeline, scan, Candidate, CliResult, ImageDirectory, LogReporter, MatchImageReporter, Settings,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Find the image in a directory that best matches a reference fingerprint", long_about = None)]
struct Args {
    /// Reference fingerprint image
    reference: PathBuf,

    /// Directory of candidate images (.bmp, .jpg, .jpeg, .png)
    directory: PathBuf,

    /// Settings file (.toml or .json); flags below override it
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Lowe ratio-test threshold, in (0, 1]
    #[arg(long)]
    ratio: Option<f32>,

    /// Stop scanning once a candidate reaches this score
    #[arg(long, conflicts_with = "no_early_exit")]
    early_exit_score: Option<f32>,

    /// Scan every candidate even after a perfect match
    #[arg(long)]
    no_early_exit: bool,

    /// Maximum number of candidates to examine
    #[arg(short = 'n', long)]
    max_candidates: Option<usize>,

    /// Worker threads; 1 scans sequentially
    #[arg(short = 'w', long)]
    workers: Option<usize>,

    /// FAST intensity threshold
    #[arg(long)]
    fast_threshold: Option<u8>,

    /// Keypoints kept per image
    #[arg(long)]
    max_keypoints: Option<usize>,

    /// Save a side-by-side picture of the best match here
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Enlargement factor of the saved picture
    #[arg(long, default_value_t = 2)]
    scale: u32,
}

impl Args {
    fn settings(&self) -> CliResult<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };

        let matching = &mut settings.matching;
        if let Some(ratio) = self.ratio {
            matching.ratio_threshold = ratio;
        }
        if let Some(score) = self.early_exit_score {
            matching.early_exit = true;
            matching.early_exit_score = score;
        }
        if self.no_early_exit {
            matching.early_exit = false;
        }
        if let Some(max) = self.max_candidates {
            matching.max_candidates = max;
        }
        if let Some(workers) = self.workers {
            matching.workers = workers;
        }

        let detector = &mut settings.detector;
        if let Some(threshold) = self.fast_threshold {
            detector.threshold = threshold;
        }
        if let Some(max) = self.max_keypoints {
            detector.max_keypoints = max;
        }

        settings.validate()?;
        Ok(settings)
    }
}

fn initialize_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set subscriber: {}", e);
    }
}

fn run(args: Args) -> CliResult<()> {
    let settings = args.settings()?;
    info!("{}", settings.matching.summary());

    let mut pipeline = image_pipeline(&settings)?;
    let reference = Candidate::from_path(&args.reference);
    let candidates = ImageDirectory::new(&args.directory)
        .excluding(&args.reference)
        .candidates()?;
    info!("{} candidate images in {}", candidates.len(), args.directory.display());

    let t0 = Instant::now();
    let outcome = scan(&mut pipeline, &reference, candidates)?;
    info!("Time taken: {:.2?}", t0.elapsed());

    pipeline.report(&outcome, &mut LogReporter)?;
    if let Some(output) = &args.output {
        pipeline.report(&outcome, &mut MatchImageReporter::new(output, args.scale))?;
    }
    Ok(())
}

fn main() -> ExitCode {
    initialize_logging();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
