use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

pub const MIN_SCALE: f32 = 0.5;
pub const MAX_SCALE: f32 = 1.5;
pub const SCALE_STEP: f32 = 0.1;

/// Persisted widget settings. `scale` is clamped only when the mouse wheel
/// changes it; values read from disk are taken as written.
#[derive(Debug, Clone, PartialEq)]
pub struct ClockConfig {
    pub window_x: i32,
    pub window_y: i32,
    pub scale: f32,
    pub shadow_enabled: bool,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            window_x: 100,
            window_y: 100,
            scale: 1.0,
            shadow_enabled: true,
        }
    }
}

impl ClockConfig {
    pub fn increase_scale(&mut self) {
        self.scale = (self.scale + SCALE_STEP).clamp(MIN_SCALE, MAX_SCALE);
    }

    pub fn decrease_scale(&mut self) {
        self.scale = (self.scale - SCALE_STEP).clamp(MIN_SCALE, MAX_SCALE);
    }

    pub fn toggle_shadow(&mut self) {
        self.shadow_enabled = !self.shadow_enabled;
    }

    pub fn to_text(&self) -> String {
        format!(
            "x={}\ny={}\nclockScale={}\nshadow={}\n",
            self.window_x,
            self.window_y,
            written_scale(self.scale),
            u8::from(self.shadow_enabled)
        )
    }
}

/// Drops the float noise repeated wheel steps leave behind (`1.2000001`).
fn written_scale(scale: f32) -> f32 {
    (scale * 10_000.0).round() / 10_000.0
}

/// Applies every recognised `key=value` line of `content` on top of `base`.
/// Unknown keys and unparsable values are skipped.
pub fn parse_config_text(content: &str, base: ClockConfig) -> ClockConfig {
    let mut config = base;
    for line in content.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "x" => {
                if let Ok(x) = value.parse() {
                    config.window_x = x;
                }
            }
            "y" => {
                if let Ok(y) = value.parse() {
                    config.window_y = y;
                }
            }
            "clockScale" => {
                if let Some(scale) = value.parse::<f32>().ok().filter(|s| s.is_finite()) {
                    config.scale = scale;
                }
            }
            "shadow" => {
                if let Some(shadow) = parse_flag(value) {
                    config.shadow_enabled = shadow;
                }
            }
            other => debug!(key = other, "ignoring unknown config key"),
        }
    }
    config
}

fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

/// Reads the config file if present. `Ok(None)` means there is no file yet.
pub fn load_config(path: &Path) -> Result<Option<ClockConfig>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(parse_config_text(&content, ClockConfig::default()))),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => {
            Err(err).with_context(|| format!("unable to read config file {}", path.display()))
        }
    }
}

pub fn save_config(path: &Path, config: &ClockConfig) -> Result<()> {
    fs::write(path, config.to_text())
        .with_context(|| format!("unable to write config file {}", path.display()))
}

/// Startup path: load what exists, otherwise write the defaults right away.
/// Never fails; I/O problems fall back to defaults.
pub fn load_or_create(path: &Path) -> ClockConfig {
    match load_config(path) {
        Ok(Some(config)) => {
            debug!(path = %path.display(), ?config, "loaded config");
            config
        }
        Ok(None) => {
            let config = ClockConfig::default();
            if let Err(err) = save_config(path, &config) {
                debug!("could not create config file: {err:#}");
            }
            config
        }
        Err(err) => {
            debug!("falling back to default config: {err:#}");
            ClockConfig::default()
        }
    }
}
