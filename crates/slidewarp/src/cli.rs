use std::path::PathBuf;

use clap::Parser;
use renderer::ColorSpaceMode;
use slideconfig::{parse_antialias, AntialiasSetting};

#[derive(Parser, Debug)]
#[command(
    name = "slidewarp",
    author,
    version,
    about = "Drag-to-scrub image slider with a warped cross-fade"
)]
pub struct Cli {
    /// Images to show, in order. Overrides the `images` list from the config file.
    #[arg(value_name = "IMAGE")]
    pub images: Vec<PathBuf>,

    /// Config file; defaults to `slidewarp.toml` in the user config directory.
    #[arg(long, value_name = "FILE", env = "SLIDEWARP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Window size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT")]
    pub size: Option<String>,

    /// FPS cap (0=uncapped).
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// Progress change per viewport width dragged.
    #[arg(long, value_name = "FACTOR")]
    pub sensitivity: Option<f32>,

    /// Index of the image shown first.
    #[arg(long, value_name = "INDEX")]
    pub start_at: Option<usize>,

    /// Anti-aliasing policy: `auto`, `off`, or an explicit MSAA sample count (e.g. `4`).
    #[arg(long, value_name = "MODE", value_parser = parse_antialias)]
    pub antialias: Option<AntialiasSetting>,

    /// Output color space handling: `auto`, `gamma`, or `linear`.
    #[arg(
        long,
        value_name = "MODE",
        value_parser = parse_color_space,
        default_value = "auto"
    )]
    pub color_space: ColorSpaceMode,

    /// Advance the clock by a fixed number of milliseconds per frame.
    #[arg(long, value_name = "MILLISECONDS")]
    pub fixed_step: Option<f32>,

    /// Validate the configuration, print the resolved settings and exit.
    #[arg(long)]
    pub check: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_color_space(value: &str) -> Result<ColorSpaceMode, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("color space must not be empty".to_string());
    }

    let normalized = trimmed.to_ascii_lowercase();
    match normalized.as_str() {
        "auto" => Ok(ColorSpaceMode::Auto),
        "gamma" | "srgb-off" => Ok(ColorSpaceMode::Gamma),
        "linear" | "srgb" => Ok(ColorSpaceMode::Linear),
        other => Err(format!(
            "unknown color space '{other}'; expected auto, gamma, or linear"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_images_and_flags() {
        let cli = Cli::try_parse_from([
            "slidewarp",
            "a.png",
            "b.jpg",
            "--size",
            "800x600",
            "--fps",
            "30",
            "--sensitivity",
            "2.5",
            "--start-at",
            "1",
            "--antialias",
            "4",
        ])
        .unwrap();

        assert_eq!(cli.images, vec![PathBuf::from("a.png"), PathBuf::from("b.jpg")]);
        assert_eq!(cli.size.as_deref(), Some("800x600"));
        assert_eq!(cli.fps, Some(30.0));
        assert_eq!(cli.sensitivity, Some(2.5));
        assert_eq!(cli.start_at, Some(1));
        assert_eq!(cli.antialias, Some(AntialiasSetting::Samples4));
        assert_eq!(cli.color_space, ColorSpaceMode::Auto);
        assert!(!cli.check);
    }

    #[test]
    fn rejects_bad_antialias() {
        assert!(Cli::try_parse_from(["slidewarp", "--antialias", "3"]).is_err());
    }

    #[test]
    fn parses_color_space_aliases() {
        assert_eq!(parse_color_space("sRGB").unwrap(), ColorSpaceMode::Linear);
        assert_eq!(parse_color_space(" gamma ").unwrap(), ColorSpaceMode::Gamma);
        assert!(parse_color_space("").is_err());
        assert!(parse_color_space("hdr").is_err());
    }
}
