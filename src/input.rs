use chrono::{DateTime, Local};
use tracing::debug;

use crate::config::ClockConfig;
use crate::timer::model::ChronoPreset;
use crate::timer::state::ChronoState;
use crate::ui::menu::MenuCommand;
use crate::ui::render::{ClockLayout, IntSize};

/// Platform input, already stripped of toolkit types.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Escape,
    /// Ctrl+T: start a ten second countdown.
    QuickCountdown,
    Resized { width: i32, height: i32 },
    Moved { x: i32, y: i32 },
    PrimaryPressed { y: f32 },
    SecondaryPressed { x: f32, y: f32 },
    Wheel { delta: f32 },
    Menu(MenuCommand),
    CloseRequested,
}

/// Work the frame loop has to do after an event was applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RouteOutcome {
    Continue,
    Exit,
    OpenMenu { x: f32, y: f32 },
    /// Scale changed; the clock text has to be measured again.
    Remeasure,
    StartDrag,
}

pub struct RouteTarget<'a> {
    pub chrono: &'a mut ChronoState,
    pub config: &'a mut ClockConfig,
    pub layout: &'a mut ClockLayout,
}

pub fn route(event: InputEvent, now: DateTime<Local>, target: &mut RouteTarget<'_>) -> RouteOutcome {
    match event {
        InputEvent::Escape | InputEvent::CloseRequested => RouteOutcome::Exit,
        InputEvent::QuickCountdown => {
            target
                .chrono
                .start_countdown(ChronoPreset::TenSeconds, now);
            RouteOutcome::Continue
        }
        InputEvent::Resized { width, height } => {
            target.layout.resize(IntSize::new(width, height));
            RouteOutcome::Continue
        }
        InputEvent::Moved { x, y } => {
            target.config.window_x = x;
            target.config.window_y = y;
            RouteOutcome::Continue
        }
        InputEvent::PrimaryPressed { y } => {
            // Upper half of the window drags it, lower half is ordinary client area.
            let drag_limit = target.layout.window().height as f32 * 0.5;
            if y < drag_limit {
                RouteOutcome::StartDrag
            } else {
                RouteOutcome::Continue
            }
        }
        InputEvent::SecondaryPressed { x, y } => RouteOutcome::OpenMenu { x, y },
        InputEvent::Wheel { delta } => {
            if delta > 0.0 {
                target.config.increase_scale();
            } else if delta < 0.0 {
                target.config.decrease_scale();
            } else {
                return RouteOutcome::Continue;
            }
            debug!(scale = target.config.scale, "clock rescaled");
            RouteOutcome::Remeasure
        }
        InputEvent::Menu(command) => apply_menu_command(command, now, target),
    }
}

fn apply_menu_command(
    command: MenuCommand,
    now: DateTime<Local>,
    target: &mut RouteTarget<'_>,
) -> RouteOutcome {
    match command {
        MenuCommand::ClockMode => target.chrono.select_clock(),
        MenuCommand::Chrono(preset) => target.chrono.start_countdown(preset, now),
        MenuCommand::Stopwatch => target.chrono.start_stopwatch(now),
        MenuCommand::Shadow => target.config.toggle_shadow(),
        MenuCommand::Exit => return RouteOutcome::Exit,
    }
    debug!(
        id = command.id(),
        mode = ?target.chrono.mode(),
        target = ?target.chrono.countdown_target(),
        "menu command applied"
    );
    RouteOutcome::Continue
}
