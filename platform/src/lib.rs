//! Contracts for the systems the core treats as external collaborators:
//! windowing/input, asset storage, texture decoding, and the scripting
//! runtime that owns live entities. None of these are implemented here —
//! the `app` crate provides concrete, `minifb`-backed implementations.

pub mod key;

pub use key::{Key, MouseButton};

use map::{EntitySnapshot, TextureHandle, Vec3};
use thiserror::Error;

/// Windowing, input polling and framebuffer presentation.
pub trait Platform {
    /// Pumps the platform's event queue. Must be called once per frame before
    /// any of the other methods are queried for this frame's state.
    fn poll_input(&mut self);

    fn is_key_down(&self, key: Key) -> bool;

    /// True only on the frame the key transitioned from up to down.
    fn is_key_pressed(&self, key: Key) -> bool;

    fn is_mouse_down(&self, button: MouseButton) -> bool;

    fn is_mouse_pressed(&self, button: MouseButton) -> bool;

    /// Cursor position in window pixels, origin top-left.
    fn mouse_position(&self) -> (f32, f32);

    /// Mouse delta since the last `poll_input`, in window pixels.
    fn mouse_delta(&self) -> (f32, f32);

    /// Scroll notches since the last `poll_input`; positive is "away from
    /// the user" (zoom in, by editor convention).
    fn mouse_wheel_delta(&self) -> f32;

    fn frame_delta_seconds(&self) -> f32;

    fn screen_size(&self) -> (u32, u32);

    /// Uploads a `w * h` framebuffer (see the `render` crate's pixel format)
    /// to the window, upscaling as the platform sees fit.
    fn present_framebuffer(&mut self, pixels: &[u32], w: u32, h: u32);
}

/// Directory-or-archive asset mount, plus a writable per-user data area.
pub trait Filesystem {
    fn read(&self, path: &str) -> Option<Vec<u8>>;

    fn read_user_data(&self, path: &str) -> Option<Vec<u8>>;

    fn write_user_data(&self, path: &str, bytes: &[u8]) -> Result<(), PlatformError>;
}

/// A decoded texture, borrowed from the store for the duration of a sample.
pub struct TextureImage<'a> {
    pub width: u32,
    pub height: u32,
    pub pixels: &'a [u32],
}

/// Image decoding and texture handle allocation. The core only ever holds
/// opaque [`TextureHandle`]s; it never owns pixels.
pub trait TextureStore {
    /// Decodes and registers the image at `path`, returning its handle.
    /// Returns `None` (never an error) on any decode or I/O failure — the
    /// core's policy is to fall back to flat gray, never to abort.
    fn load(&mut self, path: &str) -> Option<TextureHandle>;

    fn get(&self, handle: TextureHandle) -> Option<TextureImage<'_>>;

    fn handle_of(&self, path: &str) -> Option<TextureHandle>;

    fn name_of(&self, handle: TextureHandle) -> Option<&str>;
}

/// The scripting runtime's entity table, as seen by the core. The core never
/// inspects script state; it only spawns, moves, snapshots and destroys.
pub trait EntityRuntime {
    fn enumerate(&self) -> Vec<EntitySnapshot>;

    /// Spawns a new instance of the script at `path`, returning its id.
    fn spawn(&mut self, script_path: &str, position: Vec3, yaw: f32) -> u32;

    /// Spawns a new instance and forces its id, for undo/redo restore where
    /// the id must match the snapshot being replayed.
    fn spawn_with_id(&mut self, id: u32, script_path: &str, position: Vec3, yaw: f32);

    fn set_position(&mut self, id: u32, position: Vec3, yaw: f32);

    fn get_position(&self, id: u32) -> Option<(Vec3, f32)>;

    fn destroy(&mut self, id: u32);

    /// Resets the id the next unforced `spawn` will allocate. Used by undo
    /// restore, which replays exact ids via `spawn_with_id` and then must
    /// resume normal allocation above the highest id it just replayed.
    fn set_next_id(&mut self, next_id: u32);

    fn max_slots(&self) -> u32;

    /// Advances all active entities by `dt` seconds. The core does not
    /// inspect what happens during the tick.
    fn tick(&mut self, dt: f32);
}

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("platform I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("platform initialization failed: {0}")]
    InitFailed(String),
}
