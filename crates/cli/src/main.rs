use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::Parser;

use haarscan_core::detection::infrastructure::cascade_face_detector::CascadeFaceDetector;
use haarscan_core::detection::infrastructure::cascade_loader;
use haarscan_core::detection::infrastructure::detector_config::DetectorConfig;
use haarscan_core::detection::infrastructure::executor_factory::create_executor;
use haarscan_core::imaging::infrastructure::image_file_reader::ImageFileReader;
use haarscan_core::imaging::infrastructure::image_file_writer::ImageFileWriter;
use haarscan_core::imaging::infrastructure::rectangle_annotator::RectangleAnnotator;
use haarscan_core::pipeline::detect_image_use_case::DetectImageUseCase;
use haarscan_core::shared::constants::IMAGE_EXTENSIONS;
use haarscan_core::shared::region::Region;

const OUTLINE_COLOR: [u8; 4] = [255, 0, 0, 255];

/// Haar cascade face detection for still images.
#[derive(Parser)]
#[command(name = "haarscan")]
struct Cli {
    /// Input image file.
    input: PathBuf,

    /// Cascade JSON produced by the XML-to-JSON converter.
    #[arg(long)]
    cascade: PathBuf,

    /// Write a copy of the input with detections outlined.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Detector config JSON (initial_scale, scale_factor, step_size, workers).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Scale applied to the cascade window on the first level.
    #[arg(long)]
    initial_scale: Option<f64>,

    /// Scale growth between levels (must be greater than 1).
    #[arg(long)]
    scale_factor: Option<f64>,

    /// Stride multiplier; the stride at a level is round(scale * step).
    #[arg(long)]
    step_size: Option<f64>,

    /// Scan threads (1 = scan on the main thread).
    #[arg(long)]
    workers: Option<usize>,

    /// Output format: text or json.
    #[arg(long, default_value = "text")]
    format: String,

    /// Outline thickness in pixels for --output.
    #[arg(long, default_value = "2")]
    thickness: u32,

    /// Render the --output image in the grayscale the detector saw.
    #[arg(long)]
    grayscale: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let config = resolve_config(&cli)?;
    log::info!(
        "Scan parameters: initial_scale={} scale_factor={} step_size={} workers={}",
        config.initial_scale,
        config.scale_factor,
        config.step_size,
        config.workers
    );

    let model = Arc::new(cascade_loader::load(&cli.cascade)?);
    let detector = CascadeFaceDetector::with_executor(
        model,
        config.scan_params(),
        create_executor(config.workers),
    )?;
    let annotator =
        RectangleAnnotator::new(OUTLINE_COLOR, cli.thickness).with_grayscale_preview(cli.grayscale);

    let use_case = DetectImageUseCase::new(
        Box::new(ImageFileReader::new()),
        Box::new(detector),
        Box::new(annotator),
        Box::new(ImageFileWriter::new()),
    );
    let regions = use_case.execute(&cli.input, cli.output.as_deref())?;

    print_regions(&regions, &cli.format)?;
    Ok(())
}

/// Defaults, then the config file, then individual flags.
fn resolve_config(cli: &Cli) -> Result<DetectorConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => DetectorConfig::load(path)?,
        None => DetectorConfig::default(),
    };
    if let Some(v) = cli.initial_scale {
        config.initial_scale = v;
    }
    if let Some(v) = cli.scale_factor {
        config.scale_factor = v;
    }
    if let Some(v) = cli.step_size {
        config.step_size = v;
    }
    if let Some(v) = cli.workers {
        config.workers = v;
    }
    config.validate()?;
    Ok(config)
}

fn print_regions(regions: &[Region], format: &str) -> Result<(), Box<dyn std::error::Error>> {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(regions)?);
    } else {
        for r in regions {
            println!("{r}");
        }
    }
    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input file not found: {}", cli.input.display()).into());
    }
    if !is_image(&cli.input) {
        return Err(format!(
            "Unsupported input type: {} (expected one of: {})",
            cli.input.display(),
            IMAGE_EXTENSIONS.join(", ")
        )
        .into());
    }
    if !cli.cascade.exists() {
        return Err(format!("Cascade file not found: {}", cli.cascade.display()).into());
    }
    if let Some(output) = &cli.output {
        if !is_image(output) {
            return Err(format!(
                "Output must be an image file, got {}",
                output.display()
            )
            .into());
        }
    }
    if cli.format != "text" && cli.format != "json" {
        return Err(format!("Format must be 'text' or 'json', got '{}'", cli.format).into());
    }
    if cli.thickness == 0 {
        return Err("Thickness must be at least 1".into());
    }
    Ok(())
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
