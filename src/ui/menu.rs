use eframe::egui;

use crate::timer::model::ChronoPreset;

/// Commands offered by the right-click menu. The integer ids are stable and
/// are what the native menu hands back.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum MenuCommand {
    ClockMode,
    Chrono(ChronoPreset),
    Shadow,
    Exit,
    Stopwatch,
}

const CLOCK_MODE_ID: u32 = 1;
const FIRST_CHRONO_ID: u32 = 2;
const SHADOW_ID: u32 = 11;
const EXIT_ID: u32 = 12;
const STOPWATCH_ID: u32 = 13;

impl MenuCommand {
    pub fn id(self) -> u32 {
        match self {
            MenuCommand::ClockMode => CLOCK_MODE_ID,
            MenuCommand::Chrono(preset) => {
                let index = ChronoPreset::ALL
                    .iter()
                    .position(|candidate| *candidate == preset)
                    .unwrap_or_default();
                FIRST_CHRONO_ID + index as u32
            }
            MenuCommand::Shadow => SHADOW_ID,
            MenuCommand::Exit => EXIT_ID,
            MenuCommand::Stopwatch => STOPWATCH_ID,
        }
    }

    #[cfg_attr(not(windows), allow(dead_code))]
    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            CLOCK_MODE_ID => Some(MenuCommand::ClockMode),
            SHADOW_ID => Some(MenuCommand::Shadow),
            EXIT_ID => Some(MenuCommand::Exit),
            STOPWATCH_ID => Some(MenuCommand::Stopwatch),
            id if id >= FIRST_CHRONO_ID => ChronoPreset::ALL
                .get((id - FIRST_CHRONO_ID) as usize)
                .copied()
                .map(MenuCommand::Chrono),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MenuEntry {
    Item {
        command: MenuCommand,
        label: &'static str,
    },
    Toggle {
        command: MenuCommand,
        label: &'static str,
        checked: bool,
    },
    Submenu {
        label: &'static str,
        items: Vec<MenuEntry>,
    },
}

pub fn menu_layout(shadow_enabled: bool) -> Vec<MenuEntry> {
    let presets = ChronoPreset::ALL
        .iter()
        .map(|preset| MenuEntry::Item {
            command: MenuCommand::Chrono(*preset),
            label: preset.label(),
        })
        .collect();

    vec![
        MenuEntry::Item {
            command: MenuCommand::ClockMode,
            label: "Clock Mode",
        },
        MenuEntry::Submenu {
            label: "Chrono Mode",
            items: presets,
        },
        MenuEntry::Item {
            command: MenuCommand::Stopwatch,
            label: "Stopwatch",
        },
        MenuEntry::Toggle {
            command: MenuCommand::Shadow,
            label: "Shadow",
            checked: shadow_enabled,
        },
        MenuEntry::Item {
            command: MenuCommand::Exit,
            label: "Exit",
        },
    ]
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PopupOutcome {
    Open,
    Selected(MenuCommand),
    Dismissed,
}

/// In-window stand-in for the native popup on platforms without one.
pub struct EguiPopup {
    anchor: egui::Pos2,
    just_opened: bool,
}

impl EguiPopup {
    pub fn new(anchor: egui::Pos2) -> Self {
        Self {
            anchor,
            just_opened: true,
        }
    }

    pub fn show(&mut self, ctx: &egui::Context, layout: &[MenuEntry]) -> PopupOutcome {
        let mut selected = None;
        egui::Area::new(egui::Id::new("cclock_context_menu"))
            .order(egui::Order::Foreground)
            .fixed_pos(self.anchor)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_min_width(140.0);
                    for entry in layout {
                        if let Some(command) = show_entry(ui, entry) {
                            selected = Some(command);
                        }
                    }
                });
            });

        if let Some(command) = selected {
            return PopupOutcome::Selected(command);
        }
        // The press that opened the menu must not also dismiss it.
        if std::mem::take(&mut self.just_opened) {
            return PopupOutcome::Open;
        }
        let clicked_elsewhere =
            ctx.input(|i| i.pointer.any_pressed()) && !ctx.is_pointer_over_area();
        if clicked_elsewhere || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            return PopupOutcome::Dismissed;
        }
        PopupOutcome::Open
    }
}

fn show_entry(ui: &mut egui::Ui, entry: &MenuEntry) -> Option<MenuCommand> {
    match entry {
        MenuEntry::Item { command, label } => ui.button(*label).clicked().then_some(*command),
        MenuEntry::Toggle {
            command,
            label,
            checked,
        } => ui
            .selectable_label(*checked, *label)
            .clicked()
            .then_some(*command),
        MenuEntry::Submenu { label, items } => {
            let mut selected = None;
            ui.menu_button(*label, |ui| {
                for item in items {
                    if let Some(command) = show_entry(ui, item) {
                        selected = Some(command);
                        ui.close_menu();
                    }
                }
            });
            selected
        }
    }
}

/// Shows the Win32 popup menu at a client-area point and blocks until the
/// user picks an entry or dismisses it.
#[cfg(windows)]
pub fn show_native_menu(
    hwnd: isize,
    client_x: i32,
    client_y: i32,
    layout: &[MenuEntry],
) -> Option<MenuCommand> {
    use windows_sys::Win32::Foundation::{HWND, POINT};
    use windows_sys::Win32::Graphics::Gdi::ClientToScreen;
    use windows_sys::Win32::UI::WindowsAndMessaging::{
        CreatePopupMenu, DestroyMenu, SetForegroundWindow, TPM_BOTTOMALIGN, TPM_LEFTALIGN,
        TPM_RETURNCMD, TrackPopupMenu,
    };

    let hwnd = hwnd as HWND;
    // SAFETY: plain Win32 calls on a menu we own and the live window handle
    // eframe gave us for this frame.
    unsafe {
        let menu = CreatePopupMenu();
        if menu.is_null() {
            return None;
        }
        for entry in layout {
            append_native_entry(menu, entry);
        }

        SetForegroundWindow(hwnd);
        let mut point = POINT {
            x: client_x,
            y: client_y,
        };
        ClientToScreen(hwnd, &mut point);
        let selected = TrackPopupMenu(
            menu,
            TPM_BOTTOMALIGN | TPM_LEFTALIGN | TPM_RETURNCMD,
            point.x,
            point.y,
            0,
            hwnd,
            std::ptr::null(),
        );
        // Submenus attached to `menu` are destroyed with it.
        DestroyMenu(menu);

        MenuCommand::from_id(u32::try_from(selected).ok()?)
    }
}

#[cfg(windows)]
unsafe fn append_native_entry(
    menu: windows_sys::Win32::UI::WindowsAndMessaging::HMENU,
    entry: &MenuEntry,
) {
    use std::ffi::CString;

    use windows_sys::Win32::UI::WindowsAndMessaging::{
        AppendMenuA, CreatePopupMenu, MF_CHECKED, MF_POPUP, MF_STRING, MF_UNCHECKED,
    };

    let label = |text: &str| CString::new(text).unwrap_or_default();
    match entry {
        MenuEntry::Item { command, label: text } => {
            let text = label(text);
            // SAFETY: `menu` is a valid popup menu and `text` outlives the call.
            unsafe { AppendMenuA(menu, MF_STRING, command.id() as usize, text.as_ptr().cast()) };
        }
        MenuEntry::Toggle {
            command,
            label: text,
            checked,
        } => {
            let text = label(text);
            let flags = if *checked { MF_CHECKED } else { MF_UNCHECKED };
            // SAFETY: as above.
            unsafe { AppendMenuA(menu, flags, command.id() as usize, text.as_ptr().cast()) };
        }
        MenuEntry::Submenu { label: text, items } => {
            // SAFETY: the submenu is owned by `menu` once appended.
            unsafe {
                let submenu = CreatePopupMenu();
                if submenu.is_null() {
                    return;
                }
                for item in items {
                    append_native_entry(submenu, item);
                }
                let text = label(text);
                AppendMenuA(menu, MF_POPUP, submenu as usize, text.as_ptr().cast());
            }
        }
    }
}
