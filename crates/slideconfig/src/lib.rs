use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SliderConfig {
    pub version: u32,
    #[serde(default)]
    pub images: Vec<PathBuf>,
    #[serde(default)]
    pub start_at: usize,
    #[serde(default)]
    pub motion: MotionSection,
    #[serde(default)]
    pub blend: BlendSection,
    #[serde(default)]
    pub window: WindowSection,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MotionSection {
    pub drag_sensitivity: f32,
    pub settle_rate: f32,
    pub overscroll_depth: f32,
}

impl Default for MotionSection {
    fn default() -> Self {
        Self {
            drag_sensitivity: 1.5,
            settle_rate: 0.1,
            overscroll_depth: 50.0,
        }
    }
}

/// Live-tweakable shader knobs.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BlendSection {
    pub distortion_range: f32,
    pub distortion_strength: f32,
    pub distortion_frequency: f32,
    pub boundary_clarity: f32,
}

impl Default for BlendSection {
    fn default() -> Self {
        Self {
            distortion_range: 0.5,
            distortion_strength: 0.06,
            distortion_frequency: 8.0,
            boundary_clarity: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WindowSection {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub fps: Option<f32>,
    #[serde(default, deserialize_with = "deserialize_antialias_opt")]
    pub antialias: Option<AntialiasSetting>,
    #[serde(
        default = "default_tweak_poll",
        deserialize_with = "deserialize_duration_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub tweak_poll: Option<Duration>,
}

impl Default for WindowSection {
    fn default() -> Self {
        Self {
            title: default_title(),
            size: None,
            fps: None,
            antialias: None,
            tweak_poll: default_tweak_poll(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AntialiasSetting {
    Auto,
    Off,
    Samples2,
    Samples4,
    Samples8,
    Samples16,
}

impl AntialiasSetting {
    pub fn from_samples(samples: u32) -> Option<Self> {
        match samples {
            0 | 1 => Some(Self::Off),
            2 => Some(Self::Samples2),
            4 => Some(Self::Samples4),
            8 => Some(Self::Samples8),
            16 => Some(Self::Samples16),
            _ => None,
        }
    }
}

fn default_title() -> String {
    "slidewarp".to_string()
}

fn default_tweak_poll() -> Option<Duration> {
    Some(Duration::from_millis(500))
}

fn deserialize_duration_opt<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Option<Duration>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            let trimmed = v.trim();
            if trimmed.eq_ignore_ascii_case("off") || trimmed.eq_ignore_ascii_case("never") {
                return Ok(None);
            }
            humantime::parse_duration(trimmed)
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(Duration::from_secs(v)))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs(v as u64)))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs_f64(v)))
        }
    }

    deserializer.deserialize_any(Visitor)
}

fn deserialize_antialias_opt<'de, D>(deserializer: D) -> Result<Option<AntialiasSetting>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Str(String),
        Num(i64),
    }

    let helper: Option<Helper> = Option::deserialize(deserializer)?;
    let result = match helper {
        None => None,
        Some(Helper::Str(raw)) => Some(parse_antialias(&raw).map_err(de::Error::custom)?),
        Some(Helper::Num(value)) => {
            if value < 0 {
                return Err(de::Error::custom("antialias value must be non-negative"));
            }
            Some(parse_antialias(&value.to_string()).map_err(de::Error::custom)?)
        }
    };
    Ok(result)
}

pub fn parse_antialias(raw: &str) -> Result<AntialiasSetting, String> {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "auto" | "max" | "default" => Ok(AntialiasSetting::Auto),
        "off" | "none" | "disable" | "disabled" | "0" | "1" => Ok(AntialiasSetting::Off),
        "2" => Ok(AntialiasSetting::Samples2),
        "4" => Ok(AntialiasSetting::Samples4),
        "8" => Ok(AntialiasSetting::Samples8),
        "16" => Ok(AntialiasSetting::Samples16),
        other => Err(format!("invalid antialias setting '{other}'")),
    }
}

/// Parses `WIDTHxHEIGHT` into a pixel size.
pub fn parse_size(raw: &str) -> Result<(u32, u32), ConfigError> {
    let (width, height) = raw
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| ConfigError::Invalid(format!("size '{raw}' must look like WIDTHxHEIGHT")))?;
    let parse = |value: &str| {
        value
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|value| *value > 0)
            .ok_or_else(|| ConfigError::Invalid(format!("size '{raw}' has an invalid dimension")))
    };
    Ok((parse(width)?, parse(height)?))
}

impl SliderConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: SliderConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    /// Reads and validates a config file, resolving relative image paths
    /// against the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&contents)?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }

    pub fn resolve_relative_to(&mut self, base: &Path) {
        for image in &mut self.images {
            if image.is_relative() {
                *image = base.join(&*image);
            }
        }
    }

    pub fn window_size(&self) -> Result<Option<(u32, u32)>, ConfigError> {
        self.window.size.as_deref().map(parse_size).transpose()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if self.images.iter().any(|path| path.as_os_str().is_empty()) {
            return Err(ConfigError::Invalid("image paths may not be empty".into()));
        }

        // An empty list is allowed; images may come from the command line.
        if !self.images.is_empty() && self.start_at >= self.images.len() {
            return Err(ConfigError::Invalid(format!(
                "start_at {} is out of range for {} images",
                self.start_at,
                self.images.len()
            )));
        }

        self.motion.validate()?;
        self.blend.validate()?;

        if let Some(fps) = self.window.fps {
            if fps < 0.0 {
                return Err(ConfigError::Invalid("window.fps must be >= 0".into()));
            }
        }

        self.window_size()?;

        Ok(())
    }
}

impl MotionSection {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.drag_sensitivity.is_finite() && self.drag_sensitivity > 0.0) {
            return Err(ConfigError::Invalid(
                "motion.drag_sensitivity must be a finite number greater than zero".into(),
            ));
        }
        if !(self.settle_rate > 0.0 && self.settle_rate <= 1.0) {
            return Err(ConfigError::Invalid(
                "motion.settle_rate must be within (0, 1]".into(),
            ));
        }
        if !(self.overscroll_depth.is_finite() && self.overscroll_depth >= 0.0) {
            return Err(ConfigError::Invalid(
                "motion.overscroll_depth must be a finite number >= 0".into(),
            ));
        }
        Ok(())
    }
}

impl BlendSection {
    /// Re-reads only the `[blend]` table, used when the config file changes at runtime.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        #[derive(Deserialize)]
        struct BlendOnly {
            #[serde(default)]
            blend: BlendSection,
        }

        let parsed: BlendOnly = toml::from_str(input)?;
        parsed.blend.validate()?;
        Ok(parsed.blend)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let values = [
            ("distortion_range", self.distortion_range),
            ("distortion_strength", self.distortion_strength),
            ("distortion_frequency", self.distortion_frequency),
            ("boundary_clarity", self.boundary_clarity),
        ];
        for (name, value) in values {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!("blend.{name} must be finite")));
            }
        }
        if self.distortion_range < 0.0 {
            return Err(ConfigError::Invalid(
                "blend.distortion_range must be >= 0".into(),
            ));
        }
        if self.boundary_clarity < 1.0 {
            return Err(ConfigError::Invalid(
                "blend.boundary_clarity must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
version = 1
images = ["1.jpg", "2.jpg", "3.jpg", "/abs/4.jpg"]
start_at = 1

[motion]
drag_sensitivity = 4
settle_rate = 0.1

[blend]
distortion_strength = 0.1
boundary_clarity = 2.5

[window]
size = "1280x720"
fps = 60
antialias = 4
tweak_poll = "250ms"
"#;

    #[test]
    fn parses_sample_config() {
        let config = SliderConfig::from_toml_str(SAMPLE).expect("parse config");
        assert_eq!(config.images.len(), 4);
        assert_eq!(config.start_at, 1);
        assert_eq!(config.motion.drag_sensitivity, 4.0);
        assert_eq!(config.motion.overscroll_depth, 50.0);
        assert_eq!(config.blend.boundary_clarity, 2.5);
        assert_eq!(config.blend.distortion_frequency, 8.0);
        assert_eq!(config.window.antialias, Some(AntialiasSetting::Samples4));
        assert_eq!(config.window.tweak_poll, Some(Duration::from_millis(250)));
        assert_eq!(config.window_size().unwrap(), Some((1280, 720)));
    }

    #[test]
    fn defaults_fill_missing_sections() {
        let config = SliderConfig::from_toml_str("version = 1\nimages = [\"a.png\"]\n").unwrap();
        assert_eq!(config.motion, MotionSection::default());
        assert_eq!(config.blend, BlendSection::default());
        assert_eq!(config.window.title, "slidewarp");
        assert_eq!(config.window.tweak_poll, Some(Duration::from_millis(500)));
    }

    #[test]
    fn tweak_poll_can_be_disabled() {
        let config = SliderConfig::from_toml_str(
            "version = 1\nimages = [\"a.png\"]\n[window]\ntweak_poll = \"off\"\n",
        )
        .unwrap();
        assert_eq!(config.window.tweak_poll, None);
    }

    #[test]
    fn image_list_may_be_left_to_the_command_line() {
        let config = SliderConfig::from_toml_str("version = 1\n[blend]\ndistortion_strength = 0.2\n")
            .unwrap();
        assert!(config.images.is_empty());
        assert_eq!(config.blend.distortion_strength, 0.2);
    }

    #[test]
    fn rejects_out_of_range_start() {
        let err = SliderConfig::from_toml_str("version = 1\nimages = [\"a.png\"]\nstart_at = 1\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_soft_boundary_clarity() {
        let err = SliderConfig::from_toml_str(
            "version = 1\nimages = [\"a.png\"]\n[blend]\nboundary_clarity = 0.5\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_bad_settle_rate() {
        let err = SliderConfig::from_toml_str(
            "version = 1\nimages = [\"a.png\"]\n[motion]\nsettle_rate = 0\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_infinite_motion_values() {
        for table in ["drag_sensitivity = inf", "overscroll_depth = inf", "settle_rate = nan"] {
            let err = SliderConfig::from_toml_str(&format!(
                "version = 1\nimages = [\"a.png\"]\n[motion]\n{table}\n"
            ))
            .unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{table}");
        }
    }

    #[test]
    fn parse_size_accepts_upper_case_separator() {
        assert_eq!(parse_size("800X450").unwrap(), (800, 450));
        assert!(parse_size("800").is_err());
        assert!(parse_size("0x10").is_err());
    }

    #[test]
    fn blend_section_reloads_alone() {
        let blend = BlendSection::from_toml_str(SAMPLE).unwrap();
        assert_eq!(blend.distortion_strength, 0.1);
        assert_eq!(blend.distortion_range, 0.5);
        assert!(BlendSection::from_toml_str("[blend]\nboundary_clarity = -1\n").is_err());
    }

    #[test]
    fn load_resolves_images_next_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slidewarp.toml");
        fs::write(&path, SAMPLE).unwrap();
        let config = SliderConfig::load(&path).unwrap();
        assert_eq!(config.images[0], dir.path().join("1.jpg"));
        assert_eq!(config.images[3], PathBuf::from("/abs/4.jpg"));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SliderConfig::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
