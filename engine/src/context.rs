//! The explicit engine context SPEC_FULL §4.3 calls for: owns the live
//! `Map`/`Camera`/`Editor`/`Bindings`, borrows the platform collaborators
//! for the duration of a frame, and drives the frame loop in one `tick`
//! (spec §5 data flow: input → editor-or-game update → render → present).

use editor::Editor;
use input::Bindings;
use map::{Camera, Map};
use platform::{EntityRuntime, Platform, TextureStore};
use render::d2;
use render::d3;
use render::frame::Framebuffer;

/// Movement speed (world units/second) and turn speed (radians/second) for
/// the uncontested first-person camera, matching the teacher's standalone
/// viewer (`render/examples/example.rs`).
const MOVE_SPEED: f32 = 64.0;
const TURN_SPEED: f32 = std::f32::consts::FRAC_PI_2;

/// Owns the simulation state for the lifetime of the process; constructed
/// once at startup and dropped at shutdown (spec §9 "explicit engine
/// context... construct on startup, drop on shutdown").
pub struct Context {
    pub map: Map,
    pub camera: Camera,
    pub editor: Editor,
    pub input: Bindings,
    pub editor_active: bool,
    d2: d2::Renderer,
    d3: d3::Renderer,
}

impl Context {
    pub fn new(map: Map, camera: Camera, input: Bindings) -> Self {
        Self {
            map,
            camera,
            editor: Editor::new(),
            input,
            editor_active: false,
            d2: d2::Renderer::new(),
            d3: d3::Renderer::new(),
        }
    }

    /// One frame: poll input, run either the editor or the game update
    /// (never both — the editor pauses simulation while active, an Open
    /// Question resolved this way in DESIGN.md), render, present.
    pub fn tick(
        &mut self,
        platform: &mut dyn Platform,
        textures: &mut dyn TextureStore,
        entities: &mut dyn EntityRuntime,
        frame: &mut Framebuffer,
    ) {
        platform.poll_input();

        if self.input.is_action_pressed(platform, "toggle_editor") {
            self.editor_active = !self.editor_active;
        }

        let (w, h) = platform.screen_size();
        if self.editor_active {
            self.editor.update(platform, (w as f32, h as f32), &mut self.map, &mut self.camera, entities);
        } else {
            let dt = platform.frame_delta_seconds();
            self.update_camera(platform, dt);
            entities.tick(dt);
        }

        frame.clear();
        if self.editor_active {
            let view = self.editor.view();
            let overlay = self.editor.overlay();
            self.d2.render(&self.map, &self.camera, self.editor.entities(), &view, &overlay, frame);
        } else {
            self.d3.render(&self.map, &self.camera, textures, frame);
        }

        platform.present_framebuffer(frame.pixels(), frame.width() as u32, frame.height() as u32);
    }

    fn update_camera(&mut self, platform: &dyn Platform, dt: f32) {
        if self.input.is_action_down(platform, "move_forward") {
            self.camera.pos.x += self.camera.yaw.cos() * MOVE_SPEED * dt;
            self.camera.pos.y += self.camera.yaw.sin() * MOVE_SPEED * dt;
        }
        if self.input.is_action_down(platform, "move_backward") {
            self.camera.pos.x -= self.camera.yaw.cos() * MOVE_SPEED * dt;
            self.camera.pos.y -= self.camera.yaw.sin() * MOVE_SPEED * dt;
        }
        if self.input.is_action_down(platform, "strafe_left") {
            self.camera.pos.x += (self.camera.yaw - std::f32::consts::FRAC_PI_2).cos() * MOVE_SPEED * dt;
            self.camera.pos.y += (self.camera.yaw - std::f32::consts::FRAC_PI_2).sin() * MOVE_SPEED * dt;
        }
        if self.input.is_action_down(platform, "strafe_right") {
            self.camera.pos.x += (self.camera.yaw + std::f32::consts::FRAC_PI_2).cos() * MOVE_SPEED * dt;
            self.camera.pos.y += (self.camera.yaw + std::f32::consts::FRAC_PI_2).sin() * MOVE_SPEED * dt;
        }
        if self.input.is_action_down(platform, "turn_left") {
            self.camera.yaw -= TURN_SPEED * dt;
        }
        if self.input.is_action_down(platform, "turn_right") {
            self.camera.yaw += TURN_SPEED * dt;
        }
    }
}
