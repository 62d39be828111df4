use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use glint_core::{IntegratorMode, SceneDescription};
use glint_tracer::{Environment, RenderContext, SphereScene};

/// Render a JSON sphere scene progressively and write a PNG.
#[derive(Parser, Debug)]
#[command(name = "glint", version, about)]
struct Args {
    /// Scene description (JSON)
    scene: PathBuf,

    /// Output image
    #[arg(short, long, default_value = "render.png")]
    output: PathBuf,

    /// Display width in pixels
    #[arg(short = 'W', long, default_value_t = 640)]
    width: u32,

    /// Display height in pixels
    #[arg(short = 'H', long, default_value_t = 360)]
    height: u32,

    /// Progressive frames to accumulate (one path per pixel each)
    #[arg(short, long, default_value_t = 64)]
    frames: u32,

    /// Override the scene's bounce budget
    #[arg(long)]
    max_bounces: Option<u32>,

    /// Override the scene's subsampling factor
    #[arg(long)]
    subsampling: Option<u32>,

    /// Override the scene's radiance estimator
    #[arg(long, value_enum)]
    integrator: Option<CliIntegrator>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliIntegrator {
    /// Point light and emission at the first hit only
    Direct,
    /// Full path tracing with next-event estimation
    Path,
}

impl From<CliIntegrator> for IntegratorMode {
    fn from(mode: CliIntegrator) -> Self {
        match mode {
            CliIntegrator::Direct => IntegratorMode::DirectLighting,
            CliIntegrator::Path => IntegratorMode::PathTracing,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let desc = SceneDescription::from_json_file(&args.scene)
        .with_context(|| format!("Failed to load scene {}", args.scene.display()))?;
    let scene = SphereScene::from_description(&desc).context("Failed to build scene")?;

    let map = desc
        .environment
        .build_map(desc.base_dir.as_deref())
        .context("Failed to load environment map")?;
    let environment = Environment::new(Arc::new(map), desc.environment.multiplier);

    let mut settings = desc.settings.clone();
    if let Some(max_bounces) = args.max_bounces {
        settings.max_bounces = max_bounces;
    }
    if let Some(subsampling) = args.subsampling {
        settings.subsampling = subsampling;
    }
    if let Some(integrator) = args.integrator {
        settings.integrator = integrator.into();
    }
    log::info!("Settings: {:?}", settings);

    let mut ctx = RenderContext::new(settings, desc.light.clone(), environment);
    ctx.resize(args.width, args.height);
    anyhow::ensure!(
        !ctx.image().is_empty(),
        "Resolution {}x{} is empty after subsampling",
        args.width,
        args.height
    );

    let (width, height) = (ctx.image().width(), ctx.image().height());
    let view = desc.camera.view_matrix();
    let projection = desc.camera.projection_matrix(width as f32 / height as f32);

    let start = Instant::now();
    let report_every = (args.frames / 8).max(1);
    for frame in 0..args.frames {
        if !ctx.trace_paths(&scene, view, projection) {
            break;
        }
        if (frame + 1) % report_every == 0 {
            log::info!(
                "{}/{} frames ({:.1}s)",
                frame + 1,
                args.frames,
                start.elapsed().as_secs_f32()
            );
        }
    }

    log::info!(
        "Accumulated {} paths per pixel at {}x{} in {:.2}s",
        ctx.image().number_of_samples(),
        width,
        height,
        start.elapsed().as_secs_f32()
    );

    ctx.image()
        .save_png(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    log::info!("Saved {}", args.output.display());

    Ok(())
}
