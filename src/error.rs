use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures that stop the widget before its first frame.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("frame rate must be greater than zero")]
    InvalidFps,
    #[error("failed to read font {}", path.display())]
    FontRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("font file {} is empty", path.display())]
    FontEmpty { path: PathBuf },
    #[error("font file {} is not a usable TTF/OTF font", path.display())]
    FontParse {
        path: PathBuf,
        #[source]
        source: ab_glyph::InvalidFont,
    },
    #[error("failed to open clock window: {0}")]
    Window(String),
    #[error("failed to measure clock text")]
    Measure(#[from] MeasureError),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeasureError {
    #[error("text '{text}' measured as {width}x{height}")]
    EmptyExtent {
        text: String,
        width: f32,
        height: f32,
    },
}
