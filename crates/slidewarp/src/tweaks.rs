//! Live blend tweaks read from the config file's `[blend]` table.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime};

use renderer::{BlendParams, BlendTweaks};
use slideconfig::BlendSection;

use crate::settings::{blend_params, TweakSource};

/// Identifies one revision of the watched file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stamp {
    modified: Option<SystemTime>,
    len: u64,
}

/// Re-reads `[blend]` whenever the config file changes, at most once per interval.
#[derive(Debug)]
pub struct FileTweaks {
    path: PathBuf,
    interval: Duration,
    next_check: Instant,
    stamp: Option<Stamp>,
    params: BlendParams,
}

impl FileTweaks {
    pub fn new(source: TweakSource, initial: BlendParams) -> Self {
        let stamp = stamp(&source.path);
        tracing::debug!(
            path = %source.path.display(),
            interval = ?source.interval,
            "watching config for blend changes"
        );
        Self {
            next_check: Instant::now() + source.interval,
            path: source.path,
            interval: source.interval,
            stamp,
            params: initial,
        }
    }

    /// Checks the file now, ignoring the poll interval. Returns true if the
    /// parameters changed.
    pub fn poll_now(&mut self) -> bool {
        self.next_check = Instant::now() + self.interval;
        let current = stamp(&self.path);
        if current == self.stamp {
            return false;
        }
        self.stamp = current;

        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "failed to read config; keeping blend parameters");
                return false;
            }
        };
        match BlendSection::from_toml_str(&contents) {
            Ok(section) => {
                let params = blend_params(&section);
                if params == self.params {
                    return false;
                }
                tracing::info!(
                    range = params.distortion_range,
                    strength = params.distortion_strength,
                    frequency = params.distortion_frequency,
                    clarity = params.boundary_clarity,
                    "blend parameters reloaded"
                );
                self.params = params;
                true
            }
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "invalid blend settings; keeping previous values");
                false
            }
        }
    }
}

impl BlendTweaks for FileTweaks {
    fn refresh(&mut self) {
        if Instant::now() >= self.next_check {
            self.poll_now();
        }
    }

    fn params(&self) -> &BlendParams {
        &self.params
    }
}

fn stamp(path: &std::path::Path) -> Option<Stamp> {
    let metadata = fs::metadata(path).ok()?;
    Some(Stamp {
        modified: metadata.modified().ok(),
        len: metadata.len(),
    })
}
