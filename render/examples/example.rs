//! Minimal standalone viewer: load a map JSON file and fly a camera through it
//! with both renderers, with no editor/input crate wired in.

use map::json::RawMap;
use map::{Camera, Map, TextureHandle, Vec3};
use minifb::{Key, Window, WindowOptions};
use platform::{TextureImage, TextureStore};
use render::frame::Framebuffer;
use render::{d2, d3};
use std::{env, fs, path::PathBuf};

const WIDTH: usize = 320;
const HEIGHT: usize = 200;
const MOVE_SPEED: f32 = 64.0;
const TURN_SPEED: f32 = 1.5;

struct NoTextures;

impl TextureStore for NoTextures {
    fn load(&mut self, _path: &str) -> Option<TextureHandle> {
        None
    }
    fn get(&self, _handle: TextureHandle) -> Option<TextureImage<'_>> {
        None
    }
    fn handle_of(&self, _path: &str) -> Option<TextureHandle> {
        None
    }
    fn name_of(&self, _handle: TextureHandle) -> Option<&str> {
        None
    }
}

fn main() {
    let path = env::args().nth(1).map(PathBuf::from).expect("Missing MAP argument.");
    let text = fs::read_to_string(&path).expect("failed to read map file");
    let raw = RawMap::from_str(&text).expect("malformed map JSON");
    let map = Map::from_raw(&raw, |_| None).expect("invalid map geometry");

    let mut camera = Camera::new(Vec3::new(0.0, 0.0, 32.0), 0.0);
    let mut frame = Framebuffer::new(WIDTH, HEIGHT);
    let d3 = d3::Renderer::new();
    let d2 = d2::Renderer::new();
    let textures = NoTextures;

    let title = path.file_name().unwrap().to_str().unwrap();
    let mut window = Window::new(title, WIDTH, HEIGHT, WindowOptions::default()).unwrap();
    let delta = std::time::Duration::from_micros(16600);
    window.limit_update_rate(Some(delta));
    let mut top_down = false;

    while window.is_open() && !window.is_key_down(Key::Escape) {
        let dt = delta.as_secs_f32();
        if window.is_key_down(Key::W) {
            camera.pos.x += camera.yaw.cos() * MOVE_SPEED * dt;
            camera.pos.y += camera.yaw.sin() * MOVE_SPEED * dt;
        }
        if window.is_key_down(Key::S) {
            camera.pos.x -= camera.yaw.cos() * MOVE_SPEED * dt;
            camera.pos.y -= camera.yaw.sin() * MOVE_SPEED * dt;
        }
        if window.is_key_down(Key::A) {
            camera.yaw -= TURN_SPEED * dt;
        }
        if window.is_key_down(Key::D) {
            camera.yaw += TURN_SPEED * dt;
        }
        if window.is_key_down(Key::Tab) {
            top_down = !top_down;
        }

        frame.clear();
        if top_down {
            let view = d2::View { center: map::Point::new(camera.pos.x, camera.pos.y), zoom: 8.0, grid_size: 32.0 };
            d2.render(&map, &camera, &[], &view, &d2::Overlay::default(), &mut frame);
        } else {
            d3.render(&map, &camera, &textures, &mut frame);
        }

        window
            .update_with_buffer(frame.pixels(), WIDTH, HEIGHT)
            .unwrap();
    }
}
