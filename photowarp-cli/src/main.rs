use clap::Parser;
use photowarp::io::load_gray_image;
use photowarp::{
    Affine, Evaluator, Homography, ImageView, KernelChoice, Projector, Rect, ResidualStats,
    TemplatePoints, Translation, WarpConfig,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "PhotoWarp CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum KernelConfig {
    #[default]
    Auto,
    Scalar,
    Simd,
}

impl From<KernelConfig> for KernelChoice {
    fn from(value: KernelConfig) -> Self {
        match value {
            KernelConfig::Auto => KernelChoice::Auto,
            KernelConfig::Scalar => KernelChoice::Scalar,
            KernelConfig::Simd => KernelChoice::Simd,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct EvaluatorConfigJson {
    kernel: KernelConfig,
    parallel: bool,
    chunk_size: usize,
}

impl Default for EvaluatorConfigJson {
    fn default() -> Self {
        let cfg = WarpConfig::default();
        Self {
            kernel: KernelConfig::Auto,
            parallel: cfg.parallel,
            chunk_size: cfg.chunk_size,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum MotionConfig {
    Translation { tx: f32, ty: f32 },
    Affine { matrix: Vec<f32> },
    Homography { matrix: Vec<f32> },
}

impl Default for MotionConfig {
    fn default() -> Self {
        MotionConfig::Translation { tx: 0.0, ty: 0.0 }
    }
}

#[derive(Debug, Deserialize)]
struct RoiJson {
    x: usize,
    y: usize,
    width: usize,
    height: usize,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    image_path: String,
    template_path: String,
    output_path: Option<String>,
    roi: Option<RoiJson>,
    step: usize,
    motion: MotionConfig,
    evaluator: EvaluatorConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image_path: String::new(),
            template_path: String::new(),
            output_path: None,
            roi: None,
            step: 1,
            motion: MotionConfig::default(),
            evaluator: EvaluatorConfigJson::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    kernel: &'static str,
    num_points: usize,
    num_valid: usize,
    valid_ratio: f32,
    mean_abs: f32,
    rms: f32,
}

impl Output {
    fn new(kernel: &'static str, stats: ResidualStats) -> Self {
        Self {
            kernel,
            num_points: stats.num_points,
            num_valid: stats.num_valid,
            valid_ratio: stats.valid_ratio(),
            mean_abs: stats.mean_abs,
            rms: stats.rms,
        }
    }
}

fn evaluate<P: Projector<Point = [f32; 3]>>(
    evaluator: &Evaluator,
    image: ImageView<'_, u8>,
    model: &P,
    template: &TemplatePoints,
) -> Result<ResidualStats, Box<dyn std::error::Error>> {
    let mut residuals = vec![0.0f32; template.len()];
    let mut valid = vec![false; template.len()];
    let mut batch = template.batch(&mut residuals, &mut valid)?;
    evaluator.evaluate(image, model, &mut batch)?;
    Ok(batch.stats())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("photowarp=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.image_path.is_empty() || config.template_path.is_empty() {
        return Err("image_path and template_path must be set in the config".into());
    }

    let image = load_gray_image(&config.image_path)?;
    let template_img = load_gray_image(&config.template_path)?;
    let roi = match config.roi {
        Some(r) => Rect::new(r.x, r.y, r.width, r.height),
        None => Rect::new(0, 0, template_img.width(), template_img.height()),
    };
    let template = TemplatePoints::from_roi(template_img.view(), roi, config.step)?;

    let evaluator = Evaluator::new(WarpConfig {
        kernel: config.evaluator.kernel.into(),
        parallel: config.evaluator.parallel,
        chunk_size: config.evaluator.chunk_size,
    })?;

    let image_view = image.view();
    let stats = match config.motion {
        MotionConfig::Translation { tx, ty } => {
            evaluate(&evaluator, image_view, &Translation::new(tx, ty), &template)?
        }
        MotionConfig::Affine { matrix } => {
            if matrix.len() != 6 {
                return Err(format!("affine matrix needs 6 values, got {}", matrix.len()).into());
            }
            let affine = Affine::new([
                [matrix[0], matrix[1], matrix[2]],
                [matrix[3], matrix[4], matrix[5]],
            ]);
            evaluate(&evaluator, image_view, &affine, &template)?
        }
        MotionConfig::Homography { matrix } => {
            let h = Homography::from_row_major(&matrix)?;
            evaluate(&evaluator, image_view, &h, &template)?
        }
    };

    let output = Output::new(evaluator.kind().name(), stats);
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
