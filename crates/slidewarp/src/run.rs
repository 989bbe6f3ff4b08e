use anyhow::Result;
use renderer::{BlendTweaks, Renderer, StaticBlend};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::paths::AppPaths;
use crate::settings::{self, Settings};
use crate::tweaks::FileTweaks;

pub fn run(cli: Cli) -> Result<()> {
    let paths = AppPaths::discover()?;
    let origin = settings::locate_config(cli.config.as_deref(), &paths.config_file());
    tracing::debug!(
        config_dir = %paths.config_dir().display(),
        origin = ?origin,
        "resolved slidewarp paths"
    );
    let settings = settings::resolve(&cli, origin)?;

    if cli.check {
        print_summary(&settings);
        return Ok(());
    }

    let tweaks: Box<dyn BlendTweaks> = match settings.tweaks.clone() {
        Some(source) => Box::new(FileTweaks::new(source, settings.blend)),
        None => Box::new(StaticBlend(settings.blend)),
    };

    tracing::info!(
        images = settings.renderer.images.len(),
        sensitivity = settings.renderer.motion.drag_sensitivity,
        live_tweaks = settings.tweaks.is_some(),
        "starting slidewarp"
    );
    Renderer::new(settings.renderer).with_tweaks(tweaks).run()
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn print_summary(settings: &Settings) {
    let config = &settings.renderer;
    match settings.origin.path() {
        Some(path) => println!("config:      {}", path.display()),
        None => println!("config:      (none)"),
    }
    println!("images:      {}", config.images.len());
    for (index, image) in config.images.iter().enumerate() {
        let marker = if index == config.start_at { '*' } else { ' ' };
        println!("  {marker}{index:>2} {}", image.display());
    }
    println!(
        "window:      {}x{} \"{}\"",
        config.surface_size.0, config.surface_size.1, config.title
    );
    match config.target_fps {
        Some(fps) => println!("fps cap:     {fps}"),
        None => println!("fps cap:     none"),
    }
    println!(
        "motion:      sensitivity={} settle_rate={} overscroll_depth={}",
        config.motion.drag_sensitivity, config.motion.settle_rate, config.motion.overscroll_depth
    );
    println!(
        "blend:       range={} strength={} frequency={} clarity={}",
        settings.blend.distortion_range,
        settings.blend.distortion_strength,
        settings.blend.distortion_frequency,
        settings.blend.boundary_clarity
    );
    match &settings.tweaks {
        Some(source) => println!("live tweaks: every {:?}", source.interval),
        None => println!("live tweaks: off"),
    }
}
