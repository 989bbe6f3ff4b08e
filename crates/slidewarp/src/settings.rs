//! Merges the config file and command-line flags into renderer settings.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use renderer::{Antialiasing, BlendParams, RendererConfig};
use slideconfig::{
    parse_size, AntialiasSetting, BlendSection, MotionSection, SliderConfig, WindowSection,
};
use slidemotion::{MotionTuning, MAX_IMAGES};

use crate::cli::Cli;

const DEFAULT_SIZE: (u32, u32) = (1280, 720);

/// Where the config came from, if anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    Explicit(PathBuf),
    Discovered(PathBuf),
    None,
}

impl ConfigOrigin {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigOrigin::Explicit(path) | ConfigOrigin::Discovered(path) => Some(path),
            ConfigOrigin::None => None,
        }
    }
}

/// Source for live `[blend]` reloads.
#[derive(Debug, Clone, PartialEq)]
pub struct TweakSource {
    pub path: PathBuf,
    pub interval: Duration,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub origin: ConfigOrigin,
    pub renderer: RendererConfig,
    pub blend: BlendParams,
    pub tweaks: Option<TweakSource>,
}

/// Picks the config file: `--config`/`SLIDEWARP_CONFIG` must exist, the
/// per-user default is used only when present.
pub fn locate_config(explicit: Option<&Path>, default_file: &Path) -> ConfigOrigin {
    match explicit {
        Some(path) => ConfigOrigin::Explicit(path.to_path_buf()),
        None if default_file.is_file() => ConfigOrigin::Discovered(default_file.to_path_buf()),
        None => ConfigOrigin::None,
    }
}

/// Sections used when the file is absent or lists no images of its own.
struct Sections {
    images: Vec<PathBuf>,
    start_at: usize,
    motion: MotionSection,
    blend: BlendSection,
    window: WindowSection,
}

impl From<SliderConfig> for Sections {
    fn from(config: SliderConfig) -> Self {
        Self {
            images: config.images,
            start_at: config.start_at,
            motion: config.motion,
            blend: config.blend,
            window: config.window,
        }
    }
}

impl Default for Sections {
    fn default() -> Self {
        Self {
            images: Vec::new(),
            start_at: 0,
            motion: MotionSection::default(),
            blend: BlendSection::default(),
            window: WindowSection::default(),
        }
    }
}

pub fn resolve(cli: &Cli, origin: ConfigOrigin) -> Result<Settings> {
    let sections = match origin.path() {
        Some(path) => {
            let config = load_config(path)?;
            tracing::debug!(
                path = %path.display(),
                images = config.images.len(),
                "loaded configuration"
            );
            Sections::from(config)
        }
        None => Sections::default(),
    };

    let images = if cli.images.is_empty() {
        sections.images
    } else {
        cli.images.clone()
    };
    if images.is_empty() {
        bail!("no images to show; pass image paths or list them under `images` in the config file");
    }
    if images.len() > MAX_IMAGES {
        bail!(
            "{} images given; at most {MAX_IMAGES} are supported",
            images.len()
        );
    }

    let start_at = cli.start_at.unwrap_or(sections.start_at);
    if start_at >= images.len() {
        bail!(
            "start index {start_at} is out of range for {} images",
            images.len()
        );
    }

    let mut motion = motion_tuning(&sections.motion);
    if let Some(sensitivity) = cli.sensitivity {
        motion.drag_sensitivity = sensitivity;
    }
    motion
        .validate()
        .context("invalid motion settings")?;

    let surface_size = match cli.size.as_deref().or(sections.window.size.as_deref()) {
        Some(raw) => parse_size(raw)?,
        None => DEFAULT_SIZE,
    };

    let target_fps = cli
        .fps
        .or(sections.window.fps)
        .filter(|fps| *fps > 0.0);

    let antialiasing = cli
        .antialias
        .or(sections.window.antialias)
        .map(antialiasing)
        .unwrap_or_default();

    let fixed_step_ms = match cli.fixed_step {
        Some(step) if !(step > 0.0) => bail!("--fixed-step must be greater than zero"),
        other => other,
    };

    let tweaks = match (origin.path(), sections.window.tweak_poll) {
        (Some(path), Some(interval)) => Some(TweakSource {
            path: path.to_path_buf(),
            interval,
        }),
        _ => None,
    };

    Ok(Settings {
        renderer: RendererConfig {
            surface_size,
            title: sections.window.title,
            images,
            start_at,
            motion,
            target_fps,
            fixed_step_ms,
            antialiasing,
            color_space: cli.color_space,
        },
        blend: blend_params(&sections.blend),
        tweaks,
        origin,
    })
}

fn load_config(path: &Path) -> Result<SliderConfig> {
    SliderConfig::load(path)
        .with_context(|| format!("failed to load config {}", path.display()))
}

pub fn motion_tuning(section: &MotionSection) -> MotionTuning {
    MotionTuning {
        drag_sensitivity: section.drag_sensitivity,
        settle_rate: section.settle_rate,
        overscroll_depth: section.overscroll_depth,
    }
}

pub fn blend_params(section: &BlendSection) -> BlendParams {
    BlendParams {
        distortion_range: section.distortion_range,
        distortion_strength: section.distortion_strength,
        distortion_frequency: section.distortion_frequency,
        boundary_clarity: section.boundary_clarity,
    }
}

pub fn antialiasing(setting: AntialiasSetting) -> Antialiasing {
    match setting {
        AntialiasSetting::Auto => Antialiasing::Auto,
        AntialiasSetting::Off => Antialiasing::Off,
        AntialiasSetting::Samples2 => Antialiasing::Samples(2),
        AntialiasSetting::Samples4 => Antialiasing::Samples(4),
        AntialiasSetting::Samples8 => Antialiasing::Samples(8),
        AntialiasSetting::Samples16 => Antialiasing::Samples(16),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        let mut full = vec!["slidewarp"];
        full.extend_from_slice(args);
        Cli::try_parse_from(full).unwrap()
    }

    fn write_config(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("slidewarp.toml");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn cli_only_run_uses_defaults() {
        let settings = resolve(&cli(&["a.png", "b.png"]), ConfigOrigin::None).unwrap();
        assert_eq!(settings.renderer.images.len(), 2);
        assert_eq!(settings.renderer.surface_size, DEFAULT_SIZE);
        assert_eq!(settings.renderer.motion, MotionTuning::default());
        assert_eq!(settings.blend, BlendParams::default());
        assert!(settings.tweaks.is_none());
    }

    #[test]
    fn missing_images_is_an_error() {
        let err = resolve(&cli(&[]), ConfigOrigin::None).unwrap_err();
        assert!(err.to_string().contains("no images"));
    }

    #[test]
    fn flags_override_config_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            dir.path(),
            r#"
version = 1
images = ["one.png", "two.png", "three.png"]
start_at = 2

[motion]
drag_sensitivity = 3.0

[blend]
distortion_strength = 0.1

[window]
size = "640x480"
fps = 24.0
antialias = "off"
tweak_poll = "1s"
"#,
        );

        let settings = resolve(
            &cli(&["--sensitivity", "0.75", "--start-at", "1", "--fps", "0"]),
            ConfigOrigin::Explicit(path.clone()),
        )
        .unwrap();

        assert_eq!(settings.renderer.images[0], dir.path().join("one.png"));
        assert_eq!(settings.renderer.start_at, 1);
        assert_eq!(settings.renderer.motion.drag_sensitivity, 0.75);
        assert_eq!(settings.renderer.surface_size, (640, 480));
        assert_eq!(settings.renderer.target_fps, None);
        assert_eq!(settings.renderer.antialiasing, Antialiasing::Off);
        assert_eq!(settings.blend.distortion_strength, 0.1);
        assert_eq!(
            settings.tweaks,
            Some(TweakSource {
                path,
                interval: Duration::from_secs(1),
            })
        );
    }

    #[test]
    fn cli_images_replace_config_images() {
        let dir = TempDir::new().unwrap();
        let path = write_config(dir.path(), "version = 1\nimages = [\"x.png\", \"y.png\"]\n");
        let settings =
            resolve(&cli(&["only.png"]), ConfigOrigin::Discovered(path)).unwrap();
        assert_eq!(settings.renderer.images, vec![PathBuf::from("only.png")]);
    }

    #[test]
    fn out_of_range_start_is_rejected() {
        assert!(resolve(&cli(&["a.png", "--start-at", "1"]), ConfigOrigin::None).is_err());
    }

    #[test]
    fn invalid_sensitivity_is_rejected() {
        assert!(resolve(&cli(&["a.png", "--sensitivity", "0"]), ConfigOrigin::None).is_err());
    }

    #[test]
    fn explicit_config_must_exist() {
        let dir = TempDir::new().unwrap();
        let origin = locate_config(Some(&dir.path().join("missing.toml")), Path::new("/nope"));
        assert!(resolve(&cli(&["a.png"]), origin).is_err());
    }

    #[test]
    fn default_config_is_optional() {
        let dir = TempDir::new().unwrap();
        let default_file = dir.path().join("slidewarp.toml");
        assert_eq!(locate_config(None, &default_file), ConfigOrigin::None);
        fs::write(&default_file, "version = 1\nimages = [\"a.png\"]\n").unwrap();
        assert_eq!(
            locate_config(None, &default_file),
            ConfigOrigin::Discovered(default_file.clone())
        );
    }

    #[test]
    fn too_many_images_are_rejected() {
        let names: Vec<String> = (0..=MAX_IMAGES).map(|i| format!("{i}.png")).collect();
        let args: Vec<&str> = names.iter().map(String::as_str).collect();
        assert!(resolve(&cli(&args), ConfigOrigin::None).is_err());
    }
}
