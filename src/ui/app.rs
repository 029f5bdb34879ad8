use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Local};
use eframe::egui::{self, Event, Key, PointerButton, Pos2, ViewportCommand};
use tracing::{debug, error, info, warn};

use crate::config::{ClockConfig, save_config};
use crate::diagnostics::FramePacer;
use crate::error::StartupError;
use crate::input::{InputEvent, RouteOutcome, RouteTarget, route};
use crate::time_source::{SystemClock, TimeSource};
use crate::timer::state::ChronoState;
use crate::ui::menu::{EguiPopup, PopupOutcome, menu_layout};
use crate::ui::render::{
    ClockLayout, EguiMeasure, FONT_FAMILY, IntSize, PaintRequest, compose_frame,
    measure_clock_text, paint_frame,
};

const WINDOW_WIDTH: f32 = 1600.0;
const WINDOW_HEIGHT: f32 = 350.0;
/// Touchpad scroll distance that counts as one wheel notch.
const POINTS_PER_NOTCH: f32 = 50.0;

pub struct GuiOptions {
    /// `None` when persistence is switched off.
    pub config_path: Option<PathBuf>,
    pub font: Vec<u8>,
    pub fps: u16,
    pub aligned_digits: bool,
}

pub fn run_gui(options: GuiOptions, config: ClockConfig) -> Result<()> {
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("CClock")
            .with_inner_size([WINDOW_WIDTH, WINDOW_HEIGHT])
            .with_position([config.window_x as f32, config.window_y as f32])
            .with_decorations(false)
            .with_always_on_top()
            .with_transparent(true)
            .with_resizable(true),
        ..Default::default()
    };

    let startup_failure = Rc::new(RefCell::new(None));
    let GuiOptions {
        config_path,
        font,
        fps,
        aligned_digits,
    } = options;
    let app = ClockApp {
        clock: SystemClock,
        chrono: ChronoState::new(),
        config,
        config_path,
        layout: None,
        aligned_digits,
        title: String::new(),
        pacer: FramePacer::new(fps),
        popup: None,
        wheel: WheelNotches::default(),
        startup_failure: Rc::clone(&startup_failure),
    };

    eframe::run_native(
        "CClock",
        native_options,
        Box::new(move |cc| {
            install_font(&cc.egui_ctx, font);
            Ok(Box::new(app))
        }),
    )
    .map_err(|err| StartupError::Window(err.to_string()))?;

    if let Some(err) = startup_failure.borrow_mut().take() {
        return Err(err.into());
    }
    Ok(())
}

fn install_font(ctx: &egui::Context, bytes: Vec<u8>) {
    let mut fonts = egui::FontDefinitions::default();
    fonts.font_data.insert(
        FONT_FAMILY.to_owned(),
        Arc::new(egui::FontData::from_owned(bytes)),
    );
    // Default fonts stay behind the display font for glyphs it lacks.
    let mut family = vec![FONT_FAMILY.to_owned()];
    if let Some(fallback) = fonts.families.get(&egui::FontFamily::Proportional) {
        family.extend(fallback.iter().cloned());
    }
    fonts
        .families
        .insert(egui::FontFamily::Name(FONT_FAMILY.into()), family);
    ctx.set_fonts(fonts);
}

struct ClockApp {
    clock: SystemClock,
    chrono: ChronoState,
    config: ClockConfig,
    config_path: Option<PathBuf>,
    /// Measured on the first frame, once the display font is live.
    layout: Option<ClockLayout>,
    aligned_digits: bool,
    title: String,
    pacer: FramePacer,
    popup: Option<EguiPopup>,
    wheel: WheelNotches,
    startup_failure: Rc<RefCell<Option<StartupError>>>,
}

/// Turns wheel events into scale steps. Line and page scrolls are one step
/// each; point deltas from touchpads add up to a notch first.
#[derive(Debug, Default)]
struct WheelNotches {
    pending: f32,
}

impl WheelNotches {
    fn feed(&mut self, unit: egui::MouseWheelUnit, delta: f32) -> Option<f32> {
        match unit {
            egui::MouseWheelUnit::Line | egui::MouseWheelUnit::Page => {
                self.pending = 0.0;
                (delta != 0.0).then_some(delta)
            }
            egui::MouseWheelUnit::Point => {
                // A reversed swipe starts a fresh notch.
                if self.pending * delta < 0.0 {
                    self.pending = 0.0;
                }
                self.pending += delta;
                if self.pending.abs() < POINTS_PER_NOTCH {
                    return None;
                }
                let notch = self.pending.signum();
                self.pending = 0.0;
                Some(notch)
            }
        }
    }
}

impl ClockApp {
    fn collect_input(&mut self, ctx: &egui::Context, window: IntSize) -> Vec<InputEvent> {
        let menu_open = self.popup.is_some();
        let wheel = &mut self.wheel;
        let (mut events, close_requested, outer_rect) = ctx.input(|i| {
            let mut events = Vec::new();
            // An open menu owns keyboard and pointer input.
            if !menu_open {
                for event in &i.events {
                    if let Some(mapped) = map_event(event, wheel) {
                        events.push(mapped);
                    }
                }
            }
            (events, i.viewport().close_requested(), i.viewport().outer_rect)
        });

        if let Some(layout) = &self.layout
            && layout.window() != window
        {
            events.push(InputEvent::Resized {
                width: window.width,
                height: window.height,
            });
        }
        if let Some(outer) = outer_rect {
            let x = outer.min.x.round() as i32;
            let y = outer.min.y.round() as i32;
            if (x, y) != (self.config.window_x, self.config.window_y) {
                events.push(InputEvent::Moved { x, y });
            }
        }
        if close_requested {
            events.push(InputEvent::CloseRequested);
        }
        events
    }

    /// Applies one event; returns `true` when the widget should close.
    fn dispatch(
        &mut self,
        ctx: &egui::Context,
        frame: &eframe::Frame,
        event: InputEvent,
        now: DateTime<Local>,
    ) -> bool {
        let Some(layout) = self.layout.as_mut() else {
            return false;
        };
        let mut target = RouteTarget {
            chrono: &mut self.chrono,
            config: &mut self.config,
            layout,
        };
        match route(event, now, &mut target) {
            RouteOutcome::Continue => false,
            RouteOutcome::Exit => true,
            RouteOutcome::StartDrag => {
                ctx.send_viewport_cmd(ViewportCommand::StartDrag);
                false
            }
            RouteOutcome::Remeasure => {
                self.remeasure(ctx);
                false
            }
            RouteOutcome::OpenMenu { x, y } => self.open_menu(ctx, frame, Pos2::new(x, y), now),
        }
    }

    fn remeasure(&mut self, ctx: &egui::Context) {
        let Some(layout) = self.layout.as_mut() else {
            return;
        };
        if let Err(err) = layout.rescale(&EguiMeasure { ctx }, self.config.scale) {
            warn!("keeping previous clock geometry: {err}");
        }
    }

    fn open_menu(
        &mut self,
        ctx: &egui::Context,
        frame: &eframe::Frame,
        anchor: Pos2,
        now: DateTime<Local>,
    ) -> bool {
        #[cfg(windows)]
        {
            if let Some(hwnd) = native_window(frame) {
                let layout = menu_layout(self.config.shadow_enabled);
                let pixels_per_point = ctx.pixels_per_point();
                let selected = crate::ui::menu::show_native_menu(
                    hwnd,
                    (anchor.x * pixels_per_point) as i32,
                    (anchor.y * pixels_per_point) as i32,
                    &layout,
                );
                return match selected {
                    Some(command) => self.dispatch(ctx, frame, InputEvent::Menu(command), now),
                    None => {
                        warn!("context menu failed to show");
                        false
                    }
                };
            }
        }
        #[cfg(not(windows))]
        {
            let _ = (frame, now);
        }

        debug!(x = anchor.x, y = anchor.y, "opening in-window context menu");
        self.popup = Some(EguiPopup::new(anchor));
        ctx.request_repaint();
        false
    }

    fn show_popup(&mut self, ctx: &egui::Context, frame: &eframe::Frame, now: DateTime<Local>) -> bool {
        let Some(popup) = self.popup.as_mut() else {
            return false;
        };
        match popup.show(ctx, &menu_layout(self.config.shadow_enabled)) {
            PopupOutcome::Open => false,
            PopupOutcome::Selected(command) => {
                self.popup = None;
                self.dispatch(ctx, frame, InputEvent::Menu(command), now)
            }
            PopupOutcome::Dismissed => {
                self.popup = None;
                warn!("context menu closed without a selection");
                false
            }
        }
    }

    fn ensure_layout(&mut self, ctx: &egui::Context, window: IntSize) -> bool {
        if self.layout.is_some() {
            return true;
        }
        match measure_clock_text(&EguiMeasure { ctx }, self.config.scale) {
            Ok(text) => {
                self.layout = Some(ClockLayout::new(window, text));
                true
            }
            Err(err) => {
                error!("could not measure clock text: {err}");
                *self.startup_failure.borrow_mut() = Some(err.into());
                ctx.send_viewport_cmd(ViewportCommand::Close);
                false
            }
        }
    }
}

fn map_event(event: &Event, wheel: &mut WheelNotches) -> Option<InputEvent> {
    match event {
        Event::Key {
            key: Key::Escape,
            pressed: true,
            ..
        } => Some(InputEvent::Escape),
        Event::Key {
            key: Key::T,
            pressed: true,
            repeat: false,
            modifiers,
            ..
        } if modifiers.ctrl => Some(InputEvent::QuickCountdown),
        Event::MouseWheel { unit, delta, .. } => wheel
            .feed(*unit, delta.y)
            .map(|delta| InputEvent::Wheel { delta }),
        Event::PointerButton {
            pos,
            button: PointerButton::Primary,
            pressed: true,
            ..
        } => Some(InputEvent::PrimaryPressed { y: pos.y }),
        Event::PointerButton {
            pos,
            button: PointerButton::Secondary,
            pressed: true,
            ..
        } => Some(InputEvent::SecondaryPressed { x: pos.x, y: pos.y }),
        _ => None,
    }
}

#[cfg(windows)]
fn native_window(frame: &eframe::Frame) -> Option<isize> {
    use raw_window_handle::{HasWindowHandle, RawWindowHandle};

    let handle = frame.window_handle().ok()?;
    match handle.as_raw() {
        RawWindowHandle::Win32(win32) => Some(win32.hwnd.get()),
        _ => None,
    }
}

impl eframe::App for ClockApp {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        self.pacer.wait();

        let window = IntSize::from_vec2(ctx.screen_rect().size());
        if !self.ensure_layout(ctx, window) {
            return;
        }

        let now = self.clock.now();
        let mut exit = false;
        for event in self.collect_input(ctx, window) {
            exit |= self.dispatch(ctx, frame, event, now);
        }
        exit |= self.show_popup(ctx, frame, now);
        if exit {
            info!("closing clock");
            ctx.send_viewport_cmd(ViewportCommand::Close);
        }

        // Menu selections above may have changed the mode; sample again.
        let frame_text = compose_frame(self.chrono.readout(self.clock.now()));
        if frame_text.title != self.title {
            ctx.send_viewport_cmd(ViewportCommand::Title(frame_text.title.clone()));
            self.title.clone_from(&frame_text.title);
        }

        if let Some(layout) = &self.layout {
            let painter = ctx.layer_painter(egui::LayerId::background());
            let request = PaintRequest {
                frame: &frame_text,
                geometry: layout.geometry(),
                scale: self.config.scale,
                shadow_enabled: self.config.shadow_enabled,
                aligned_digits: self.aligned_digits,
            };
            if let Err(err) = paint_frame(&painter, &EguiMeasure { ctx }, &request) {
                warn!("skipping clock text this frame: {err}");
            }
        }

        ctx.request_repaint_after(self.pacer.until_next_tick());
    }

    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        [0.0; 4]
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        let Some(path) = &self.config_path else {
            return;
        };
        match save_config(path, &self.config) {
            Ok(()) => debug!(path = %path.display(), "config saved"),
            Err(err) => debug!("could not save config: {err:#}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_and_ctrl_t_map_to_commands() {
        let escape = Event::Key {
            key: Key::Escape,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers: egui::Modifiers::NONE,
        };
        assert_eq!(map_event(&escape, &mut WheelNotches::default()), Some(InputEvent::Escape));

        let ctrl_t = Event::Key {
            key: Key::T,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers: egui::Modifiers::CTRL,
        };
        assert_eq!(map_event(&ctrl_t, &mut WheelNotches::default()), Some(InputEvent::QuickCountdown));

        let plain_t = Event::Key {
            key: Key::T,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers: egui::Modifiers::NONE,
        };
        assert_eq!(map_event(&plain_t, &mut WheelNotches::default()), None);
    }

    #[test]
    fn pointer_presses_map_by_button() {
        let mut wheel = WheelNotches::default();
        let right = Event::PointerButton {
            pos: Pos2::new(30.0, 20.0),
            button: PointerButton::Secondary,
            pressed: true,
            modifiers: egui::Modifiers::NONE,
        };
        assert_eq!(
            map_event(&right, &mut wheel),
            Some(InputEvent::SecondaryPressed { x: 30.0, y: 20.0 })
        );

        let left = Event::PointerButton {
            pos: Pos2::new(30.0, 20.0),
            button: PointerButton::Primary,
            pressed: true,
            modifiers: egui::Modifiers::NONE,
        };
        assert_eq!(
            map_event(&left, &mut wheel),
            Some(InputEvent::PrimaryPressed { y: 20.0 })
        );

        let release = Event::PointerButton {
            pos: Pos2::new(30.0, 20.0),
            button: PointerButton::Secondary,
            pressed: false,
            modifiers: egui::Modifiers::NONE,
        };
        assert_eq!(map_event(&release, &mut wheel), None);
    }

    fn wheel(unit: egui::MouseWheelUnit, y: f32) -> Event {
        Event::MouseWheel {
            unit,
            delta: egui::vec2(0.0, y),
            modifiers: egui::Modifiers::NONE,
        }
    }

    #[test]
    fn line_wheel_keeps_vertical_delta() {
        let mut notches = WheelNotches::default();
        assert_eq!(
            map_event(&wheel(egui::MouseWheelUnit::Line, -1.0), &mut notches),
            Some(InputEvent::Wheel { delta: -1.0 })
        );
        assert_eq!(
            map_event(&wheel(egui::MouseWheelUnit::Page, 1.0), &mut notches),
            Some(InputEvent::Wheel { delta: 1.0 })
        );
        assert_eq!(
            map_event(&wheel(egui::MouseWheelUnit::Line, 0.0), &mut notches),
            None
        );
    }

    #[test]
    fn touchpad_swipe_steps_once_per_notch() {
        let mut notches = WheelNotches::default();
        // A 100 point swipe delivered as 40 small deltas.
        let steps = (0..40)
            .filter_map(|_| map_event(&wheel(egui::MouseWheelUnit::Point, 2.5), &mut notches))
            .collect::<Vec<_>>();
        assert_eq!(steps, vec![InputEvent::Wheel { delta: 1.0 }; 2]);
    }

    #[test]
    fn reversed_touchpad_swipe_starts_a_fresh_notch() {
        let mut notches = WheelNotches::default();
        assert_eq!(notches.feed(egui::MouseWheelUnit::Point, 45.0), None);
        assert_eq!(notches.feed(egui::MouseWheelUnit::Point, -10.0), None);
        assert_eq!(notches.feed(egui::MouseWheelUnit::Point, -45.0), Some(-1.0));
    }
}
