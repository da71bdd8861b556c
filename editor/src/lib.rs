//! The 2D sector editor's state machine (spec §4.F): hover hierarchy,
//! selection, drag session lifecycle (grid snap + validity test), and the
//! undo/redo shortcuts. Nothing here touches pixels — `render::d2` draws
//! whatever [`Editor::view`]/[`Editor::overlay`] report.

pub mod selection;
pub mod undo;
pub mod validate;

use log::debug;
use map::{geom, Camera, EntitySnapshot, Map, Point, Vec3};
use platform::{EntityRuntime, Key, MouseButton, Platform};
use render::d2::{screen_to_world, world_to_screen, Overlay, View};
use selection::{Selection, Tool};
use undo::UndoStack;

const ZOOM_MIN: f32 = 1.0 / 32.0;
const ZOOM_MAX: f32 = 32.0;
const GRID_MIN: f32 = 1.0;
const GRID_MAX: f32 = 1024.0;
const COORD_MIN: f32 = -32768.0;
const COORD_MAX: f32 = 32767.0;
const ENTITY_HALF_EXTENT: f32 = 16.0;
const HOVER_RADIUS_PX: f32 = 10.0;
const TELEPORT_EYE_OFFSET: f32 = 50.0;

fn clamp_coord(v: f32) -> f32 {
    v.clamp(COORD_MIN, COORD_MAX)
}

fn snap(v: f32, grid: f32) -> f32 {
    (v / grid).round() * grid
}

/// The anchor's grid-snapped position after `raw_delta` is added, per spec
/// §4.F: the anchor snaps to the grid, everything else in the drag shares
/// the same resulting translation.
fn snap_anchor(anchor: Point, raw_delta: Point, grid: f32) -> Point {
    let target = Point::new(anchor.x + raw_delta.x, anchor.y + raw_delta.y);
    Point::new(snap(target.x, grid), snap(target.y, grid))
}

/// Shortest distance in screen space from `p` to the segment `a`-`b`.
fn segment_distance(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (abx, aby) = (b.0 - a.0, b.1 - a.1);
    let len_sq = abx * abx + aby * aby;
    if len_sq < 1e-8 {
        let (dx, dy) = (p.0 - a.0, p.1 - a.1);
        return (dx * dx + dy * dy).sqrt();
    }
    let t = (((p.0 - a.0) * abx + (p.1 - a.1) * aby) / len_sq).clamp(0.0, 1.0);
    let (cx, cy) = (a.0 + t * abx, a.1 + t * aby);
    let (dx, dy) = (p.0 - cx, p.1 - cy);
    (dx * dx + dy * dy).sqrt()
}

/// What a drag session may move, and the geometry it had before the drag
/// started — restored verbatim if the drag is cancelled or ends invalid.
#[derive(Debug, Clone)]
enum DragOriginal {
    Entity { id: u32, position: Vec3, yaw: f32 },
    Point { index: u32, position: Point },
    Wall { index: u32, p1_index: u32, p2_index: u32, p1: Point, p2: Point },
    /// `(point_index, original_position)` for every wall `p1` the sector owns.
    Sector { index: u32, anchor_index: u32, points: Vec<(u32, Point)> },
}

#[derive(Debug, Clone)]
struct DragSession {
    original: DragOriginal,
    mouse_start_world: Point,
}

/// The editor's per-frame state (spec §4.F).
pub struct Editor {
    pub tool: Tool,
    zoom: f32,
    grid_size: f32,
    view_center: Point,
    selection: Selection,
    hovered_entity: Option<usize>,
    hovered_point: Option<u32>,
    hovered_wall: Option<u32>,
    hovered_sector: Option<u32>,
    drag: Option<DragSession>,
    drag_invalid: bool,
    drag_invalid_sector: Option<u32>,
    undo: UndoStack,
    entities: Vec<EntitySnapshot>,
}

impl Default for Editor {
    fn default() -> Self {
        Self {
            tool: Tool::Select,
            zoom: 1.0,
            grid_size: 32.0,
            view_center: Point::new(0.0, 0.0),
            selection: Selection::None,
            hovered_entity: None,
            hovered_point: None,
            hovered_wall: None,
            hovered_sector: None,
            drag: None,
            drag_invalid: false,
            drag_invalid_sector: None,
            undo: UndoStack::new(),
            entities: Vec::new(),
        }
    }
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn grid_size(&self) -> f32 {
        self.grid_size
    }

    pub fn set_grid_size(&mut self, grid_size: f32) {
        self.grid_size = grid_size.clamp(GRID_MIN, GRID_MAX);
    }

    pub fn view_center(&self) -> Point {
        self.view_center
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn drag_is_invalid(&self) -> bool {
        self.drag.is_some() && self.drag_invalid
    }

    /// What the 2D renderer should draw the canvas at this frame.
    pub fn view(&self) -> View {
        View { center: self.view_center, zoom: self.zoom, grid_size: self.grid_size }
    }

    /// The entity snapshots as of the last [`Editor::update`] call — the 2D
    /// renderer must be handed this exact list so entity-index selections
    /// stay in agreement between picking and drawing within the frame.
    pub fn entities(&self) -> &[EntitySnapshot] {
        &self.entities
    }

    /// Highlight state for `render::d2::Renderer::render`.
    pub fn overlay(&self) -> Overlay {
        let mut overlay = Overlay {
            hovered_entity: self.hovered_entity,
            hovered_point: self.hovered_point,
            hovered_wall: self.hovered_wall,
            hovered_sector: self.hovered_sector,
            selected_entity: self.selection.entity(),
            selected_point: self.selection.point(),
            selected_wall: self.selection.wall(),
            selected_sector: self.selection.sector(),
            drag_invalid_sector: None,
        };
        if self.drag_is_invalid() {
            overlay.drag_invalid_sector = self.drag_invalid_sector;
        }
        overlay
    }

    /// One frame of editor logic. Assumes `platform.poll_input()` has
    /// already been called by the caller this frame (spec §5 ordering).
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        platform: &dyn Platform,
        view_size: (f32, f32),
        map: &mut Map,
        game_camera: &mut Camera,
        runtime: &mut dyn EntityRuntime,
    ) {
        self.entities = runtime.enumerate();

        let wheel = platform.mouse_wheel_delta();
        if wheel != 0.0 {
            self.zoom = (self.zoom * 2f32.powf(wheel)).clamp(ZOOM_MIN, ZOOM_MAX);
        }

        let (mx, my) = platform.mouse_position();
        let mouse_world = screen_to_world(&self.view(), view_size.0, view_size.1, mx, my);

        if platform.is_mouse_down(MouseButton::Right) {
            if self.drag.is_some() {
                self.cancel_drag(map, runtime);
            } else {
                let (dx, dy) = platform.mouse_delta();
                self.view_center.x -= dx / self.zoom;
                self.view_center.y += dy / self.zoom;
            }
        }

        if platform.is_mouse_pressed(MouseButton::Middle) {
            game_camera.pos.x = mouse_world.x;
            game_camera.pos.y = mouse_world.y;
            self.view_center = mouse_world;
            if let Some(sector) = geom::sector_of_point(map, mouse_world).and_then(|i| map.sectors().get(i as usize)) {
                game_camera.pos.z = sector.floor_height + TELEPORT_EYE_OFFSET;
            }
        }

        if platform.is_key_pressed(Key::Escape) && self.drag.is_some() {
            self.cancel_drag(map, runtime);
        }

        let ctrl = platform.is_key_down(Key::LeftCtrl) || platform.is_key_down(Key::RightCtrl);
        if ctrl && platform.is_key_pressed(Key::Z) {
            self.cancel_drag(map, runtime);
            if self.undo.undo(map, runtime) {
                debug!("editor: undo");
            }
        } else if ctrl && platform.is_key_pressed(Key::Y) {
            self.cancel_drag(map, runtime);
            if self.undo.redo(map, runtime) {
                debug!("editor: redo");
            }
        }

        if platform.is_key_pressed(Key::Delete) {
            if let Selection::Entity(index) = self.selection {
                if let Some(e) = self.entities.get(index) {
                    self.undo.push_state(map, runtime);
                    runtime.destroy(e.id);
                    self.selection = Selection::None;
                }
            }
        }

        self.update_hover(map, view_size, mouse_world, (mx, my));

        if platform.is_mouse_pressed(MouseButton::Left) && self.drag.is_none() {
            self.handle_left_click(map, runtime, mouse_world);
        }

        if let Some(start) = self.drag.as_ref().map(|d| d.mouse_start_world) {
            if platform.is_mouse_down(MouseButton::Left) {
                let delta = Point::new(mouse_world.x - start.x, mouse_world.y - start.y);
                self.apply_drag(map, runtime, delta);
            } else {
                self.release_drag(map, runtime);
            }
        }
    }

    fn update_hover(&mut self, map: &Map, view_size: (f32, f32), mouse_world: Point, mouse_screen: (f32, f32)) {
        self.hovered_entity = None;
        self.hovered_point = None;
        self.hovered_wall = None;
        self.hovered_sector = None;

        for (i, e) in self.entities.iter().enumerate() {
            let dx = (mouse_world.x - e.position.x).abs();
            let dy = (mouse_world.y - e.position.y).abs();
            if dx <= ENTITY_HALF_EXTENT && dy <= ENTITY_HALF_EXTENT {
                self.hovered_entity = Some(i);
                return;
            }
        }

        let view = self.view();
        for (i, &p) in map.points().iter().enumerate() {
            let s = world_to_screen(&view, view_size.0, view_size.1, p);
            let dx = s.x() - mouse_screen.0;
            let dy = s.y() - mouse_screen.1;
            if (dx * dx + dy * dy).sqrt() <= HOVER_RADIUS_PX {
                self.hovered_point = Some(i as u32);
                return;
            }
        }

        for (i, wall) in map.walls().iter().enumerate() {
            let (a, b) = match (map.points().get(wall.p1 as usize), map.points().get(wall.p2 as usize)) {
                (Some(&a), Some(&b)) => (a, b),
                _ => continue,
            };
            let sa = world_to_screen(&view, view_size.0, view_size.1, a);
            let sb = world_to_screen(&view, view_size.0, view_size.1, b);
            if segment_distance(mouse_screen, (sa.x(), sa.y()), (sb.x(), sb.y())) > HOVER_RADIUS_PX {
                continue;
            }
            if wall.is_portal() {
                let owner = geom::sector_of_wall(map, i as u32);
                if owner.is_none() || geom::sector_of_point(map, mouse_world) != owner {
                    continue;
                }
            }
            self.hovered_wall = Some(i as u32);
            return;
        }

        self.hovered_sector = geom::sector_of_point(map, mouse_world);
    }

    fn hovered_selection(&self) -> Selection {
        if let Some(i) = self.hovered_entity {
            Selection::Entity(i)
        } else if let Some(i) = self.hovered_point {
            Selection::Point(i)
        } else if let Some(i) = self.hovered_wall {
            Selection::Wall(i)
        } else if let Some(i) = self.hovered_sector {
            Selection::Sector(i)
        } else {
            Selection::None
        }
    }

    fn handle_left_click(&mut self, map: &mut Map, runtime: &mut dyn EntityRuntime, mouse_world: Point) {
        self.selection = self.hovered_selection();
        if self.selection != Selection::None && self.tool == Tool::Select {
            self.start_drag(map, runtime, mouse_world);
        }
    }

    fn start_drag(&mut self, map: &Map, runtime: &dyn EntityRuntime, mouse_world: Point) {
        let original = match self.selection {
            Selection::None => return,
            Selection::Entity(index) => {
                let e = match self.entities.get(index) {
                    Some(e) => e,
                    None => return,
                };
                DragOriginal::Entity { id: e.id, position: e.position, yaw: e.yaw }
            }
            Selection::Point(index) => {
                let p = match map.points().get(index as usize) {
                    Some(&p) => p,
                    None => return,
                };
                DragOriginal::Point { index, position: p }
            }
            Selection::Wall(index) => {
                let wall = match map.walls().get(index as usize) {
                    Some(w) => w,
                    None => return,
                };
                let (p1, p2) = match (map.points().get(wall.p1 as usize), map.points().get(wall.p2 as usize)) {
                    (Some(&p1), Some(&p2)) => (p1, p2),
                    _ => return,
                };
                DragOriginal::Wall { index, p1_index: wall.p1, p2_index: wall.p2, p1, p2 }
            }
            Selection::Sector(index) => {
                let sector = match map.sectors().get(index as usize) {
                    Some(s) => s,
                    None => return,
                };
                let mut points = Vec::new();
                let mut anchor_index = None;
                for wi in sector.wall_range() {
                    if let Some(wall) = map.walls().get(wi as usize) {
                        if anchor_index.is_none() {
                            anchor_index = Some(wall.p1);
                        }
                        if let Some(&p) = map.points().get(wall.p1 as usize) {
                            if !points.iter().any(|&(i, _)| i == wall.p1) {
                                points.push((wall.p1, p));
                            }
                        }
                    }
                }
                let anchor_index = match anchor_index {
                    Some(i) => i,
                    None => return,
                };
                DragOriginal::Sector { index, anchor_index, points }
            }
        };

        self.undo.push_state(map, runtime);
        self.drag_invalid = false;
        self.drag = Some(DragSession { original, mouse_start_world: mouse_world });
    }

    fn apply_drag(&mut self, map: &mut Map, runtime: &mut dyn EntityRuntime, raw_delta: Point) {
        let drag = match &self.drag {
            Some(d) => d.clone(),
            None => return,
        };

        let valid = match &drag.original {
            DragOriginal::Entity { id, position, yaw } => {
                let target = snap_anchor(Point::new(position.x, position.y), raw_delta, self.grid_size);
                let valid = validate::entity_move_is_valid(map, target);
                runtime.set_position(*id, Vec3::new(target.x, target.y, position.z), *yaw);
                valid
            }
            DragOriginal::Point { index, position } => {
                let target = snap_anchor(*position, raw_delta, self.grid_size);
                map.points_mut()[*index as usize] = Point::new(clamp_coord(target.x), clamp_coord(target.y));
                validate::point_move_is_valid(map, *index)
            }
            DragOriginal::Wall { index, p1_index, p2_index, p1, p2 } => {
                let target_p1 = snap_anchor(*p1, raw_delta, self.grid_size);
                let actual_delta = Point::new(target_p1.x - p1.x, target_p1.y - p1.y);
                map.points_mut()[*p1_index as usize] =
                    Point::new(clamp_coord(target_p1.x), clamp_coord(target_p1.y));
                map.points_mut()[*p2_index as usize] =
                    Point::new(clamp_coord(p2.x + actual_delta.x), clamp_coord(p2.y + actual_delta.y));
                validate::wall_move_is_valid(map, *index)
            }
            DragOriginal::Sector { index, anchor_index, points } => {
                let anchor_original = points.iter().find(|(i, _)| i == anchor_index).map(|(_, p)| *p);
                let anchor_original = match anchor_original {
                    Some(p) => p,
                    None => return,
                };
                let target_anchor = snap_anchor(anchor_original, raw_delta, self.grid_size);
                let actual_delta =
                    Point::new(target_anchor.x - anchor_original.x, target_anchor.y - anchor_original.y);
                for &(point_index, original) in points {
                    map.points_mut()[point_index as usize] = Point::new(
                        clamp_coord(original.x + actual_delta.x),
                        clamp_coord(original.y + actual_delta.y),
                    );
                }
                validate::sector_move_is_valid(map, *index)
            }
        };

        self.drag_invalid = !valid;
        self.drag_invalid_sector = if valid {
            None
        } else {
            match &drag.original {
                DragOriginal::Entity { .. } => None,
                DragOriginal::Point { index, .. } => {
                    map.walls().iter().position(|w| w.p1 == *index || w.p2 == *index).and_then(|wi| geom::sector_of_wall(map, wi as u32))
                }
                DragOriginal::Wall { index, .. } => geom::sector_of_wall(map, *index),
                DragOriginal::Sector { index, .. } => Some(*index),
            }
        };
    }

    /// Reverts the drag's geometry to what it was before the drag started,
    /// without touching the undo stack (the snapshot already pushed at drag
    /// start stays as the undo entry for whatever the user does next).
    fn revert_drag(&self, map: &mut Map, runtime: &mut dyn EntityRuntime) {
        let drag = match &self.drag {
            Some(d) => d,
            None => return,
        };
        match &drag.original {
            DragOriginal::Entity { id, position, yaw } => runtime.set_position(*id, *position, *yaw),
            DragOriginal::Point { index, position } => {
                map.points_mut()[*index as usize] = *position;
            }
            DragOriginal::Wall { p1_index, p2_index, p1, p2, .. } => {
                map.points_mut()[*p1_index as usize] = *p1;
                map.points_mut()[*p2_index as usize] = *p2;
            }
            DragOriginal::Sector { points, .. } => {
                for &(point_index, original) in points {
                    map.points_mut()[point_index as usize] = original;
                }
            }
        }
    }

    fn cancel_drag(&mut self, map: &mut Map, runtime: &mut dyn EntityRuntime) {
        if self.drag.is_some() {
            self.revert_drag(map, runtime);
            self.drag = None;
            self.drag_invalid = false;
            self.drag_invalid_sector = None;
        }
    }

    fn release_drag(&mut self, map: &mut Map, runtime: &mut dyn EntityRuntime) {
        if self.drag_invalid {
            self.revert_drag(map, runtime);
        }
        self.drag = None;
        self.drag_invalid = false;
        self.drag_invalid_sector = None;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use map::json::RawMap;
    use map::Vec3;
    use platform::{Key, MouseButton};
    use std::cell::RefCell;

    struct FakePlatform {
        mouse: RefCell<(f32, f32)>,
        mouse_down: RefCell<Vec<MouseButton>>,
        keys_down: RefCell<Vec<Key>>,
        wheel: f32,
    }

    impl FakePlatform {
        fn new() -> Self {
            Self {
                mouse: RefCell::new((0.0, 0.0)),
                mouse_down: RefCell::new(Vec::new()),
                keys_down: RefCell::new(Vec::new()),
                wheel: 0.0,
            }
        }
    }

    impl Platform for FakePlatform {
        fn poll_input(&mut self) {}
        fn is_key_down(&self, key: Key) -> bool {
            self.keys_down.borrow().contains(&key)
        }
        fn is_key_pressed(&self, _key: Key) -> bool {
            false
        }
        fn is_mouse_down(&self, button: MouseButton) -> bool {
            self.mouse_down.borrow().contains(&button)
        }
        fn is_mouse_pressed(&self, _button: MouseButton) -> bool {
            false
        }
        fn mouse_position(&self) -> (f32, f32) {
            *self.mouse.borrow()
        }
        fn mouse_delta(&self) -> (f32, f32) {
            (0.0, 0.0)
        }
        fn mouse_wheel_delta(&self) -> f32 {
            self.wheel
        }
        fn frame_delta_seconds(&self) -> f32 {
            1.0 / 60.0
        }
        fn screen_size(&self) -> (u32, u32) {
            (320, 200)
        }
        fn present_framebuffer(&mut self, _pixels: &[u32], _width: u32, _height: u32) {}
    }

    struct FakeRuntime {
        entities: Vec<EntitySnapshot>,
    }

    impl EntityRuntime for FakeRuntime {
        fn enumerate(&self) -> Vec<EntitySnapshot> {
            self.entities.clone()
        }
        fn spawn(&mut self, _script_path: &str, _position: Vec3, _yaw: f32) -> u32 {
            0
        }
        fn spawn_with_id(&mut self, id: u32, script_path: &str, position: Vec3, yaw: f32) {
            self.entities.push(EntitySnapshot { id, position, yaw, script_path: script_path.to_string() });
        }
        fn set_position(&mut self, id: u32, position: Vec3, yaw: f32) {
            if let Some(e) = self.entities.iter_mut().find(|e| e.id == id) {
                e.position = position;
                e.yaw = yaw;
            }
        }
        fn get_position(&self, id: u32) -> Option<(Vec3, f32)> {
            self.entities.iter().find(|e| e.id == id).map(|e| (e.position, e.yaw))
        }
        fn destroy(&mut self, id: u32) {
            self.entities.retain(|e| e.id != id);
        }
        fn set_next_id(&mut self, _id: u32) {}
        fn max_slots(&self) -> u32 {
            256
        }
        fn tick(&mut self, _dt: f32) {}
    }

    fn square_room() -> Map {
        let raw = RawMap::from_str(
            r#"{
                "points": [[0.0,0.0],[128.0,0.0],[128.0,128.0],[0.0,128.0]],
                "sectors": [{"floor_height":0.0,"ceil_height":128.0,"floor_tex":-1,"ceil_tex":-1,
                    "walls": [{"p1":0,"p2":1},{"p1":1,"p2":2},{"p1":2,"p2":3},{"p1":3,"p2":0}]}],
                "textures": [],
                "entities": []
            }"#,
        )
        .unwrap();
        Map::from_raw(&raw, |_| None).unwrap()
    }

    #[test]
    fn zoom_clamps_to_bounds() {
        let mut editor = Editor::new();
        editor.zoom = ZOOM_MAX;
        let platform = FakePlatform { wheel: 10.0, ..FakePlatform::new() };
        let mut map = square_room();
        let mut camera = Camera::new(Vec3::new(64.0, 64.0, 32.0), 0.0);
        let mut runtime = FakeRuntime { entities: Vec::new() };
        editor.update(&platform, (320.0, 200.0), &mut map, &mut camera, &mut runtime);
        assert!(editor.zoom() <= ZOOM_MAX);
    }

    #[test]
    fn hover_detects_sector_under_cursor() {
        let mut editor = Editor::new();
        let map = square_room();
        editor.update_hover(&map, (320.0, 200.0), Point::new(64.0, 64.0), (160.0, 100.0));
        assert_eq!(editor.hovered_sector, Some(0));
        assert_eq!(editor.hovered_wall, None);
    }

    #[test]
    fn hover_detects_point_over_sector() {
        let mut editor = Editor::new();
        editor.view_center = Point::new(64.0, 64.0);
        let map = square_room();
        let view = editor.view();
        let screen = world_to_screen(&view, 320.0, 200.0, Point::new(0.0, 0.0));
        editor.update_hover(&map, (320.0, 200.0), Point::new(0.0, 0.0), (screen.x(), screen.y()));
        assert_eq!(editor.hovered_point, Some(0));
    }

    #[test]
    fn dragging_point_onto_crossing_geometry_is_invalid_then_reverts() {
        let mut editor = Editor::new();
        let mut map = square_room();
        let mut runtime = FakeRuntime { entities: Vec::new() };
        editor.selection = Selection::Point(0);
        editor.start_drag(&map, &runtime, Point::new(0.0, 0.0));
        assert!(editor.drag.is_some());

        // Drag point 0 across to the far side of the square, crossing the opposite walls.
        editor.apply_drag(&mut map, &mut runtime, Point::new(256.0, 256.0));
        assert!(editor.drag_invalid);

        editor.release_drag(&mut map, &mut runtime);
        assert_eq!(map.points()[0], Point::new(0.0, 0.0));
    }

    #[test]
    fn valid_point_drag_commits_in_place() {
        let mut editor = Editor::new();
        let mut map = square_room();
        let mut runtime = FakeRuntime { entities: Vec::new() };
        editor.selection = Selection::Point(0);
        editor.start_drag(&map, &runtime, Point::new(0.0, 0.0));
        editor.apply_drag(&mut map, &mut runtime, Point::new(-32.0, -32.0));
        assert!(!editor.drag_invalid);
        editor.release_drag(&mut map, &mut runtime);
        assert_eq!(map.points()[0], Point::new(-32.0, -32.0));
    }
}
