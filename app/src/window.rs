//! `minifb`-backed `platform::Platform`. Tracks last frame's key/mouse state
//! itself so `is_key_pressed`/`is_mouse_pressed` can report edge transitions,
//! since `minifb` only exposes level state.

use minifb::{Window, WindowOptions};
use platform::{Key, MouseButton, Platform, PlatformError};
use std::collections::HashSet;
use std::time::Instant;

fn to_minifb_key(key: Key) -> minifb::Key {
    use minifb::Key as M;
    match key {
        Key::A => M::A, Key::B => M::B, Key::C => M::C, Key::D => M::D, Key::E => M::E,
        Key::F => M::F, Key::G => M::G, Key::H => M::H, Key::I => M::I, Key::J => M::J,
        Key::K => M::K, Key::L => M::L, Key::M => M::M, Key::N => M::N, Key::O => M::O,
        Key::P => M::P, Key::Q => M::Q, Key::R => M::R, Key::S => M::S, Key::T => M::T,
        Key::U => M::U, Key::V => M::V, Key::W => M::W, Key::X => M::X, Key::Y => M::Y,
        Key::Z => M::Z,
        Key::Num0 => M::Key0, Key::Num1 => M::Key1, Key::Num2 => M::Key2, Key::Num3 => M::Key3,
        Key::Num4 => M::Key4, Key::Num5 => M::Key5, Key::Num6 => M::Key6, Key::Num7 => M::Key7,
        Key::Num8 => M::Key8, Key::Num9 => M::Key9,
        Key::Up => M::Up, Key::Down => M::Down, Key::Left => M::Left, Key::Right => M::Right,
        Key::Space => M::Space, Key::Enter => M::Enter, Key::Escape => M::Escape,
        Key::Tab => M::Tab, Key::Backspace => M::Backspace, Key::Delete => M::Delete, Key::Grave => M::Backquote,
        Key::LeftShift => M::LeftShift, Key::RightShift => M::RightShift,
        Key::LeftCtrl => M::LeftCtrl, Key::RightCtrl => M::RightCtrl,
        Key::LeftAlt => M::LeftAlt, Key::RightAlt => M::RightAlt,
        Key::F1 => M::F1, Key::F2 => M::F2, Key::F3 => M::F3, Key::F4 => M::F4,
        Key::F5 => M::F5, Key::F6 => M::F6, Key::F7 => M::F7, Key::F8 => M::F8,
        Key::F9 => M::F9, Key::F10 => M::F10, Key::F11 => M::F11, Key::F12 => M::F12,
    }
}

fn to_minifb_button(button: MouseButton) -> minifb::MouseButton {
    match button {
        MouseButton::Left => minifb::MouseButton::Left,
        MouseButton::Right => minifb::MouseButton::Right,
        MouseButton::Middle => minifb::MouseButton::Middle,
    }
}

const ALL_KEYS: [Key; 47] = [
    Key::A, Key::B, Key::C, Key::D, Key::E, Key::F, Key::G, Key::H, Key::I, Key::J, Key::K, Key::L,
    Key::M, Key::N, Key::O, Key::P, Key::Q, Key::R, Key::S, Key::T, Key::U, Key::V, Key::W, Key::X,
    Key::Y, Key::Z, Key::Num0, Key::Num1, Key::Num2, Key::Num3, Key::Num4, Key::Num5, Key::Num6,
    Key::Num7, Key::Num8, Key::Num9, Key::Up, Key::Down, Key::Left, Key::Right, Key::Space,
    Key::Enter, Key::Escape, Key::Tab, Key::Backspace, Key::Delete, Key::Grave,
];

const ALL_MOUSE_BUTTONS: [MouseButton; 3] = [MouseButton::Left, MouseButton::Right, MouseButton::Middle];

pub struct MinifbPlatform {
    window: Window,
    keys_down: HashSet<Key>,
    keys_down_prev: HashSet<Key>,
    mouse_down: HashSet<MouseButton>,
    mouse_down_prev: HashSet<MouseButton>,
    mouse_position: (f32, f32),
    mouse_position_prev: (f32, f32),
    wheel_delta: f32,
    last_frame: Instant,
    dt: f32,
}

impl MinifbPlatform {
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, PlatformError> {
        let window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| PlatformError::InitFailed(e.to_string()))?;
        Ok(Self {
            window,
            keys_down: HashSet::new(),
            keys_down_prev: HashSet::new(),
            mouse_down: HashSet::new(),
            mouse_down_prev: HashSet::new(),
            mouse_position: (0.0, 0.0),
            mouse_position_prev: (0.0, 0.0),
            wheel_delta: 0.0,
            last_frame: Instant::now(),
            dt: 1.0 / 60.0,
        })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }
}

impl Platform for MinifbPlatform {
    fn poll_input(&mut self) {
        self.window.update();

        self.keys_down_prev = std::mem::take(&mut self.keys_down);
        for &key in &ALL_KEYS {
            if self.window.is_key_down(to_minifb_key(key)) {
                self.keys_down.insert(key);
            }
        }

        self.mouse_down_prev = std::mem::take(&mut self.mouse_down);
        for &button in &ALL_MOUSE_BUTTONS {
            if self.window.get_mouse_down(to_minifb_button(button)) {
                self.mouse_down.insert(button);
            }
        }

        self.mouse_position_prev = self.mouse_position;
        if let Some((x, y)) = self.window.get_mouse_pos(minifb::MouseMode::Pass) {
            self.mouse_position = (x, y);
        }

        self.wheel_delta = self.window.get_scroll_wheel().map(|(_, y)| y).unwrap_or(0.0);

        let now = Instant::now();
        self.dt = (now - self.last_frame).as_secs_f32().max(1.0 / 1000.0);
        self.last_frame = now;
    }

    fn is_key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    fn is_key_pressed(&self, key: Key) -> bool {
        self.keys_down.contains(&key) && !self.keys_down_prev.contains(&key)
    }

    fn is_mouse_down(&self, button: MouseButton) -> bool {
        self.mouse_down.contains(&button)
    }

    fn is_mouse_pressed(&self, button: MouseButton) -> bool {
        self.mouse_down.contains(&button) && !self.mouse_down_prev.contains(&button)
    }

    fn mouse_position(&self) -> (f32, f32) {
        self.mouse_position
    }

    fn mouse_delta(&self) -> (f32, f32) {
        (self.mouse_position.0 - self.mouse_position_prev.0, self.mouse_position.1 - self.mouse_position_prev.1)
    }

    fn mouse_wheel_delta(&self) -> f32 {
        self.wheel_delta
    }

    fn frame_delta_seconds(&self) -> f32 {
        self.dt
    }

    fn screen_size(&self) -> (u32, u32) {
        let (w, h) = self.window.get_size();
        (w as u32, h as u32)
    }

    fn present_framebuffer(&mut self, pixels: &[u32], w: u32, h: u32) {
        if let Err(err) = self.window.update_with_buffer(pixels, w as usize, h as usize) {
            log::error!("failed to present framebuffer: {}", err);
        }
    }
}
