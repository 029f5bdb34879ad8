use chrono::{DateTime, Datelike, Local, Timelike};
use eframe::egui::{self, Align2, Color32, FontFamily, FontId, Painter, Pos2};

use crate::error::MeasureError;
use crate::timer::state::Readout;

pub const FONT_FAMILY: &str = "digital";
pub const CLOCK_PLACEHOLDER: &str = "00:00:00";

pub const CLOCK_COLOR: Color32 = Color32::from_rgb(245, 245, 245);
pub const ALERT_COLOR: Color32 = Color32::from_rgb(255, 87, 51);
pub const SHADOW_COLOR: Color32 = Color32::from_rgb(1, 1, 1);

const TIME_SHADOW_OFFSET: f32 = 4.0;
const DATE_SHADOW_OFFSET: f32 = TIME_SHADOW_OFFSET * 0.5;
const DATE_OFFSET_X: i32 = 15;
const DATE_OFFSET_Y: i32 = -40;

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FontSlot {
    Time,
    Date,
}

impl FontSlot {
    pub fn base_size(self) -> f32 {
        match self {
            FontSlot::Time => 256.0,
            FontSlot::Date => 48.0,
        }
    }

    pub fn font_id(self, scale: f32) -> FontId {
        FontId::new(
            self.base_size() * scale,
            FontFamily::Name(FONT_FAMILY.into()),
        )
    }
}

/// Unscaled text extents, in points.
pub trait TextMeasure {
    fn measure(&self, text: &str, slot: FontSlot) -> Result<egui::Vec2, MeasureError>;
}

pub struct EguiMeasure<'a> {
    pub ctx: &'a egui::Context,
}

impl TextMeasure for EguiMeasure<'_> {
    fn measure(&self, text: &str, slot: FontSlot) -> Result<egui::Vec2, MeasureError> {
        let galley = self
            .ctx
            .fonts(|fonts| fonts.layout_no_wrap(text.to_owned(), slot.font_id(1.0), CLOCK_COLOR));
        checked_extent(text, galley.size())
    }
}

fn checked_extent(text: &str, size: egui::Vec2) -> Result<egui::Vec2, MeasureError> {
    if size.x.is_finite() && size.y.is_finite() && size.x > 0.0 && size.y > 0.0 {
        Ok(size)
    } else {
        Err(MeasureError::EmptyExtent {
            text: text.to_owned(),
            width: size.x,
            height: size.y,
        })
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct IntSize {
    pub width: i32,
    pub height: i32,
}

impl IntSize {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn from_vec2(size: egui::Vec2) -> Self {
        Self::new(size.x as i32, size.y as i32)
    }
}

/// Destination rectangle of the time text.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct FrameGeometry {
    pub x: i32,
    pub y: i32,
}

impl FrameGeometry {
    pub fn centered(window: IntSize, text: IntSize) -> Self {
        Self {
            x: (window.width - text.width) / 2,
            y: (window.height - text.height) / 2,
        }
    }
}

/// Window size, scaled clock text size and the geometry derived from both.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ClockLayout {
    window: IntSize,
    text: IntSize,
    geometry: FrameGeometry,
}

impl ClockLayout {
    pub fn new(window: IntSize, text: IntSize) -> Self {
        Self {
            window,
            text,
            geometry: FrameGeometry::centered(window, text),
        }
    }

    pub fn window(&self) -> IntSize {
        self.window
    }

    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    pub fn resize(&mut self, window: IntSize) {
        self.window = window;
        self.geometry = FrameGeometry::centered(window, self.text);
    }

    pub fn set_text_size(&mut self, text: IntSize) {
        self.text = text;
        self.geometry = FrameGeometry::centered(self.window, text);
    }

    /// Measures the clock text again at `scale`. On error the previous
    /// geometry is kept.
    pub fn rescale(
        &mut self,
        measure: &dyn TextMeasure,
        scale: f32,
    ) -> Result<(), MeasureError> {
        let text = measure_clock_text(measure, scale)?;
        self.set_text_size(text);
        Ok(())
    }
}

/// Size of `"00:00:00"` in the time font at `scale`, truncated to pixels.
pub fn measure_clock_text(
    measure: &dyn TextMeasure,
    scale: f32,
) -> Result<IntSize, MeasureError> {
    let size = measure.measure(CLOCK_PLACEHOLDER, FontSlot::Time)?;
    Ok(IntSize::new(
        (size.x * scale) as i32,
        (size.y * scale) as i32,
    ))
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameText {
    pub time: String,
    pub date: String,
    pub color: Color32,
    pub title: String,
}

pub fn compose_frame(readout: Readout) -> FrameText {
    match readout {
        Readout::Clock(now) => {
            let time = format_clock_time(&now);
            FrameText {
                title: format!("{time} - CClock"),
                date: format_date(&now),
                time,
                color: CLOCK_COLOR,
            }
        }
        Readout::Remaining { seconds, expired } => {
            let time = format_hms(seconds);
            FrameText {
                title: format!("{time} - CClock (Timer Mode)"),
                date: "Timer Mode:".to_string(),
                time,
                color: if expired { ALERT_COLOR } else { CLOCK_COLOR },
            }
        }
        Readout::Elapsed { seconds } => {
            let time = format_hms(seconds);
            FrameText {
                title: format!("{time} - CClock (Timer Mode)"),
                date: "Stopwatch:".to_string(),
                time,
                color: CLOCK_COLOR,
            }
        }
    }
}

pub fn format_clock_time(now: &DateTime<Local>) -> String {
    format!("{:02}:{:02}:{:02}", now.hour(), now.minute(), now.second())
}

pub fn format_date<Tz: chrono::TimeZone>(now: &DateTime<Tz>) -> String {
    format!(
        "{} {} {} {}",
        DAY_NAMES[now.weekday().num_days_from_sunday() as usize],
        now.day(),
        MONTH_NAMES[now.month0() as usize],
        now.year()
    )
}

pub fn format_hms(total_seconds: i64) -> String {
    let total = total_seconds.max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// One drawing pass over both strings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawPass {
    pub time_offset: f32,
    pub date_offset: f32,
    pub color: Color32,
}

/// The shadow pass, when enabled, comes first so the main pass covers it.
pub fn draw_passes(shadow_enabled: bool, color: Color32) -> Vec<DrawPass> {
    let mut passes = Vec::with_capacity(2);
    if shadow_enabled {
        passes.push(DrawPass {
            time_offset: TIME_SHADOW_OFFSET,
            date_offset: DATE_SHADOW_OFFSET,
            color: SHADOW_COLOR,
        });
    }
    passes.push(DrawPass {
        time_offset: 0.0,
        date_offset: 0.0,
        color,
    });
    passes
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphPlacement {
    pub glyph: char,
    pub x: f32,
}

/// Places `text` glyph by glyph from `origin_x`. Digits share the cell width
/// of `"0"`; a `1` is pushed to the right edge of its cell. Anything else
/// advances by its own width.
pub fn layout_digits(
    measure: &dyn TextMeasure,
    text: &str,
    origin_x: f32,
    scale: f32,
) -> Result<Vec<GlyphPlacement>, MeasureError> {
    let cell = measure.measure("0", FontSlot::Time)?.x * scale;
    let mut cursor = origin_x;
    let mut placements = Vec::with_capacity(text.len());
    let mut buffer = [0_u8; 4];
    for glyph in text.chars() {
        let width = measure.measure(glyph.encode_utf8(&mut buffer), FontSlot::Time)?.x * scale;
        let x = if glyph == '1' {
            cursor + cell - width
        } else {
            cursor
        };
        placements.push(GlyphPlacement { glyph, x });
        cursor += if glyph.is_ascii_digit() { cell } else { width };
    }
    Ok(placements)
}

pub struct PaintRequest<'a> {
    pub frame: &'a FrameText,
    pub geometry: FrameGeometry,
    pub scale: f32,
    pub shadow_enabled: bool,
    pub aligned_digits: bool,
}

pub fn paint_frame(
    painter: &Painter,
    measure: &dyn TextMeasure,
    request: &PaintRequest<'_>,
) -> Result<(), MeasureError> {
    let time_font = FontSlot::Time.font_id(request.scale);
    let date_font = FontSlot::Date.font_id(request.scale);
    let origin = Pos2::new(request.geometry.x as f32, request.geometry.y as f32);
    let date_origin = Pos2::new(
        (request.geometry.x + DATE_OFFSET_X) as f32,
        (request.geometry.y + DATE_OFFSET_Y) as f32,
    );
    let glyphs = if request.aligned_digits {
        Some(layout_digits(
            measure,
            &request.frame.time,
            origin.x,
            request.scale,
        )?)
    } else {
        None
    };

    for pass in draw_passes(request.shadow_enabled, request.frame.color) {
        painter.text(
            date_origin + egui::vec2(pass.date_offset, pass.date_offset),
            Align2::LEFT_TOP,
            &request.frame.date,
            date_font.clone(),
            pass.color,
        );
        match &glyphs {
            Some(glyphs) => {
                for glyph in glyphs {
                    painter.text(
                        Pos2::new(glyph.x + pass.time_offset, origin.y + pass.time_offset),
                        Align2::LEFT_TOP,
                        glyph.glyph,
                        time_font.clone(),
                        pass.color,
                    );
                }
            }
            None => {
                painter.text(
                    origin + egui::vec2(pass.time_offset, pass.time_offset),
                    Align2::LEFT_TOP,
                    &request.frame.time,
                    time_font.clone(),
                    pass.color,
                );
            }
        }
    }
    Ok(())
}
