//! Work-mode window model.
//!
//! The desktop build has two windows: the main window and a small floating
//! task bar. In work mode the main window is hidden and the task bar stays
//! on top, out of the OS task switcher. This module tracks what each window
//! should look like; a native shell applies it.

use std::fmt;

/// Default main window size.
pub const MAIN_WINDOW_SIZE: (u32, u32) = (1200, 800);

/// Default task bar size, also used when a resize asks for a zero dimension.
pub const TASK_BAR_SIZE: (u32, u32) = (400, 600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowMode {
    Normal,
    WorkMode,
}

impl fmt::Display for WindowMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::WorkMode => write!(f, "work mode"),
        }
    }
}

/// Usable screen area of the primary display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkArea {
    pub width: u32,
    pub height: u32,
}

impl Default for WorkArea {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1040,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowState {
    pub visible: bool,
    pub focused: bool,
    pub always_on_top: bool,
    pub skip_taskbar: bool,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl WindowState {
    fn sized(width: u32, height: u32, visible: bool) -> Self {
        Self {
            visible,
            focused: visible,
            always_on_top: false,
            skip_taskbar: false,
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    fn show(&mut self) {
        self.visible = true;
        self.focused = true;
    }

    fn hide(&mut self) {
        self.visible = false;
        self.focused = false;
    }
}

/// State of both windows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkModeWindows {
    mode: WindowMode,
    work_area: WorkArea,
    main: WindowState,
    task_bar: WindowState,
}

impl WorkModeWindows {
    /// Main window shown, task bar hidden and centred.
    pub fn new(work_area: WorkArea) -> Self {
        let mut windows = Self {
            mode: WindowMode::Normal,
            work_area,
            main: WindowState::sized(MAIN_WINDOW_SIZE.0, MAIN_WINDOW_SIZE.1, true),
            task_bar: WindowState::sized(TASK_BAR_SIZE.0, TASK_BAR_SIZE.1, false),
        };
        windows.center_task_bar();
        windows
    }

    pub fn mode(&self) -> WindowMode {
        self.mode
    }

    pub fn is_work_mode(&self) -> bool {
        self.mode == WindowMode::WorkMode
    }

    pub fn main(&self) -> &WindowState {
        &self.main
    }

    pub fn task_bar(&self) -> &WindowState {
        &self.task_bar
    }

    pub fn work_area(&self) -> WorkArea {
        self.work_area
    }

    /// Flip between normal and work mode. Returns whether work mode is now on.
    pub fn toggle(&mut self) -> bool {
        match self.mode {
            WindowMode::Normal => {
                self.mode = WindowMode::WorkMode;
                self.main.hide();
                self.task_bar.always_on_top = true;
                self.task_bar.skip_taskbar = true;
                self.task_bar.show();
            }
            WindowMode::WorkMode => {
                self.mode = WindowMode::Normal;
                self.task_bar.always_on_top = false;
                self.task_bar.skip_taskbar = false;
                self.task_bar.hide();
                self.main.show();
            }
        }
        self.is_work_mode()
    }

    pub fn show_main(&mut self) {
        self.main.show();
    }

    pub fn show_task_bar(&mut self) {
        self.task_bar.show();
    }

    pub fn hide_task_bar(&mut self) {
        self.task_bar.hide();
    }

    /// Resize the task bar and centre it in the work area. A zero dimension
    /// falls back to the default size.
    pub fn resize_task_bar(&mut self, width: u32, height: u32) {
        self.task_bar.width = if width == 0 { TASK_BAR_SIZE.0 } else { width };
        self.task_bar.height = if height == 0 { TASK_BAR_SIZE.1 } else { height };
        self.center_task_bar();
    }

    /// Move the task bar, keeping it inside the work area.
    pub fn move_task_bar(&mut self, x: i32, y: i32) {
        self.task_bar.x = clamp_axis(x, self.work_area.width, self.task_bar.width);
        self.task_bar.y = clamp_axis(y, self.work_area.height, self.task_bar.height);
    }

    pub fn task_bar_position(&self) -> (i32, i32) {
        (self.task_bar.x, self.task_bar.y)
    }

    fn center_task_bar(&mut self) {
        self.task_bar.x = center_axis(self.work_area.width, self.task_bar.width);
        self.task_bar.y = center_axis(self.work_area.height, self.task_bar.height);
    }
}

impl Default for WorkModeWindows {
    fn default() -> Self {
        Self::new(WorkArea::default())
    }
}

fn center_axis(screen: u32, window: u32) -> i32 {
    let offset = (i64::from(screen) - i64::from(window)) as f64 / 2.0;
    offset.round() as i32
}

/// `max(0, min(screen - window, pos))`
fn clamp_axis(pos: i32, screen: u32, window: u32) -> i32 {
    let limit = i64::from(screen) - i64::from(window);
    i64::from(pos).min(limit).max(0) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> WorkArea {
        WorkArea {
            width: 1920,
            height: 1080,
        }
    }

    #[test]
    fn test_initial_state() {
        let windows = WorkModeWindows::new(area());
        assert_eq!(windows.mode(), WindowMode::Normal);
        assert!(windows.main().visible);
        assert!(!windows.task_bar().visible);
        assert_eq!(windows.task_bar_position(), (760, 240));
    }

    #[test]
    fn test_toggle_round_trip() {
        let mut windows = WorkModeWindows::new(area());
        assert!(windows.toggle());
        assert!(!windows.main().visible);
        let bar = windows.task_bar();
        assert!(bar.visible && bar.focused && bar.always_on_top && bar.skip_taskbar);

        assert!(!windows.toggle());
        assert!(windows.main().visible);
        let bar = windows.task_bar();
        assert!(!bar.visible && !bar.always_on_top && !bar.skip_taskbar);
    }

    #[test]
    fn test_resize_centres_task_bar() {
        let mut windows = WorkModeWindows::new(area());
        windows.resize_task_bar(300, 101);
        assert_eq!((windows.task_bar().width, windows.task_bar().height), (300, 101));
        // (1080 - 101) / 2 = 489.5 rounds up
        assert_eq!(windows.task_bar_position(), (810, 490));

        windows.resize_task_bar(0, 0);
        assert_eq!((windows.task_bar().width, windows.task_bar().height), TASK_BAR_SIZE);
    }

    #[test]
    fn test_move_clamps_to_work_area() {
        let mut windows = WorkModeWindows::new(area());
        windows.move_task_bar(-50, 5000);
        assert_eq!(windows.task_bar_position(), (0, 480));
        windows.move_task_bar(100, 200);
        assert_eq!(windows.task_bar_position(), (100, 200));
        windows.move_task_bar(99999, -1);
        assert_eq!(windows.task_bar_position(), (1520, 0));
    }

    #[test]
    fn test_oversized_window_pins_to_origin() {
        let mut windows = WorkModeWindows::new(WorkArea {
            width: 300,
            height: 300,
        });
        windows.move_task_bar(10, 10);
        assert_eq!(windows.task_bar_position(), (0, 0));
    }
}
