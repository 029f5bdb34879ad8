mod config;
mod diagnostics;
mod error;
mod input;
mod logging;
mod time_source;
mod timer;
mod ui;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};

use crate::config::{ClockConfig, load_config, load_or_create};
use crate::diagnostics::DiagnosticsReport;
use crate::error::StartupError;
use crate::ui::app::GuiOptions;

#[derive(Parser, Debug)]
#[command(
    name = "cclock",
    version,
    about = "Borderless always-on-top desktop clock with countdown and stopwatch"
)]
struct Cli {
    #[arg(long, default_value = "cclock.ini")]
    config: PathBuf,

    #[arg(long, default_value = "digital-mono.ttf")]
    font: PathBuf,

    #[arg(long, visible_alias = "FPS", default_value_t = 24)]
    fps: u16,

    /// Neither read nor write the config file.
    #[arg(long)]
    no_persist: bool,

    /// Start with the drop shadow off, whatever the config file says.
    #[arg(long)]
    no_shadow: bool,

    /// Lay the time out digit by digit in fixed-width cells.
    #[arg(long)]
    aligned_digits: bool,

    #[arg(long)]
    debug: bool,

    /// Print the resolved startup state and a pacing benchmark, then exit.
    #[arg(long)]
    diagnostics: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.debug);
    if cli.fps == 0 {
        return Err(StartupError::InvalidFps.into());
    }

    let font = load_font(&cli.font)?;
    debug!(path = %cli.font.display(), bytes = font.len(), "font loaded");

    if cli.diagnostics {
        let (config, config_source) = diagnostics_config(&cli);
        diagnostics::run_diagnostics(&DiagnosticsReport {
            config_path: &cli.config,
            config_source,
            config: &config,
            font_path: &cli.font,
            font_bytes: font.len(),
            fps: cli.fps,
        });
        return Ok(());
    }

    let mut config = if cli.no_persist {
        ClockConfig::default()
    } else {
        load_or_create(&cli.config)
    };
    if cli.no_shadow {
        config.shadow_enabled = false;
    }
    info!(
        scale = config.scale,
        shadow = config.shadow_enabled,
        "starting clock"
    );

    ui::app::run_gui(
        GuiOptions {
            config_path: (!cli.no_persist).then_some(cli.config),
            font,
            fps: cli.fps,
            aligned_digits: cli.aligned_digits,
        },
        config,
    )
}

fn load_font(path: &Path) -> Result<Vec<u8>, StartupError> {
    let bytes = fs::read(path).map_err(|source| StartupError::FontRead {
        path: path.to_path_buf(),
        source,
    })?;
    if bytes.is_empty() {
        return Err(StartupError::FontEmpty {
            path: path.to_path_buf(),
        });
    }
    // egui parses the same way on its first pass and panics on failure.
    ab_glyph::FontRef::try_from_slice(&bytes).map_err(|source| StartupError::FontParse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(bytes)
}

/// Diagnostics never create or rewrite the config file.
fn diagnostics_config(cli: &Cli) -> (ClockConfig, &'static str) {
    let (mut config, source) = if cli.no_persist {
        (ClockConfig::default(), "disabled")
    } else {
        match load_config(&cli.config) {
            Ok(Some(config)) => (config, "loaded"),
            Ok(None) => (ClockConfig::default(), "missing, defaults"),
            Err(err) => {
                debug!("{err:#}");
                (ClockConfig::default(), "unreadable, defaults")
            }
        }
    };
    if cli.no_shadow {
        config.shadow_enabled = false;
    }
    (config, source)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn load_font_accepts_a_real_font() {
        let path =
            Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/DejaVuSansMono.ttf");
        let bytes = load_font(&path).expect("fixture font");
        assert!(!bytes.is_empty());
    }

    #[test]
    fn load_font_rejects_bytes_that_do_not_parse() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("junk.ttf");
        fs::write(&path, b"\x00\x01\x00\x00font").expect("write junk");

        let err = load_font(&path).expect_err("junk font");
        assert!(matches!(err, StartupError::FontParse { .. }));
    }
}
