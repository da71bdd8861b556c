//! Top-down 2D map view: the editor's main canvas.
//!
//! This module only draws; hover/selection/drag-validity are decided by the
//! `editor` crate and handed in as an [`Overlay`]. Screen/world conversion
//! matches the editor's own `view_center`/`zoom` formulas so that picking and
//! drawing never drift apart.

use crate::frame::{EgFrame, Framebuffer};
use embedded_graphics::{
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{Line, Rectangle},
    style::PrimitiveStyle,
};
use map::{Camera, EntitySnapshot, Map, Point};

const ENTITY_HALF_EXTENT: f32 = 16.0;
const POINT_GLYPH_PX: i32 = 5;
const HOVER_POINT_GLYPH_PX: i32 = 11;
const HOVER_RADIUS_PX: f32 = 10.0;
const TICK_LEN_PX: f32 = 6.0;
const CAMERA_FORWARD: f32 = 32.0;
const CAMERA_BASE_WIDTH: f32 = 16.0;

/// Current editor viewport: what part of the world is visible and at what
/// scale. Mirrors the editor state machine's `view_center`/`zoom` (spec
/// §4.F) so the two never disagree about where things are on screen.
#[derive(Debug, Clone, Copy)]
pub struct View {
    pub center: Point,
    pub zoom: f32,
    pub grid_size: f32,
}

/// What the editor wants highlighted this frame. `None` in a field means
/// "nothing of that kind is hovered/selected".
#[derive(Debug, Clone, Copy, Default)]
pub struct Overlay {
    pub hovered_entity: Option<usize>,
    pub hovered_point: Option<u32>,
    pub hovered_wall: Option<u32>,
    pub hovered_sector: Option<u32>,
    pub selected_entity: Option<usize>,
    pub selected_point: Option<u32>,
    pub selected_wall: Option<u32>,
    pub selected_sector: Option<u32>,
    /// The sector an in-progress drag would leave invalid; painted red.
    pub drag_invalid_sector: Option<u32>,
}

const WHITE: Rgb888 = Rgb888::new(0xff, 0xff, 0xff);
const RED: Rgb888 = Rgb888::new(0xff, 0x00, 0x00);
const YELLOW: Rgb888 = Rgb888::new(0xff, 0xff, 0x00);
const ORANGE: Rgb888 = Rgb888::new(0xff, 0xa5, 0x00);
const CYAN: Rgb888 = Rgb888::new(0x00, 0xff, 0xff);
const LIME: Rgb888 = Rgb888::new(0x00, 0xff, 0x00);
const MAGENTA: Rgb888 = Rgb888::new(0xff, 0x00, 0xff);

/// The top-down map renderer.
#[derive(Debug, Default)]
pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(
        &self,
        map: &Map,
        camera: &Camera,
        entities: &[EntitySnapshot],
        view: &View,
        overlay: &Overlay,
        frame: &mut Framebuffer,
    ) {
        self.draw_grid(view, frame);
        self.draw_walls(map, view, overlay, frame);
        self.draw_point_glyphs(map, view, frame);
        self.draw_entities(entities, view, overlay, frame);
        self.draw_overlays(map, entities, view, overlay, frame);
        self.draw_camera(camera, view, frame);
    }

    fn world_to_screen(&self, view: &View, frame: &Framebuffer, p: Point) -> Point2 {
        world_to_screen(view, frame.width() as f32, frame.height() as f32, p)
    }

    fn draw_grid(&self, view: &View, frame: &mut Framebuffer) {
        let mut step = view.grid_size.max(1.0);
        while step * view.zoom < 4.0 {
            step *= 2.0;
        }
        let w = frame.width() as f32;
        let h = frame.height() as f32;
        let color = Rgb888::new(0x22, 0x22, 0x22);

        let half_w_world = (w / 2.0) / view.zoom;
        let half_h_world = (h / 2.0) / view.zoom;
        let x0 = ((view.center.x - half_w_world) / step).floor() as i32;
        let x1 = ((view.center.x + half_w_world) / step).ceil() as i32;
        for k in x0..=x1 {
            let wx = k as f32 * step;
            let sx = self.world_to_screen(view, frame, Point::new(wx, view.center.y)).x;
            draw_line(frame, sx as i32, 0, sx as i32, h as i32, color, 1);
        }
        let y0 = ((view.center.y - half_h_world) / step).floor() as i32;
        let y1 = ((view.center.y + half_h_world) / step).ceil() as i32;
        for k in y0..=y1 {
            let wy = k as f32 * step;
            let sy = self.world_to_screen(view, frame, Point::new(view.center.x, wy)).y;
            draw_line(frame, 0, sy as i32, w as i32, sy as i32, color, 1);
        }
    }

    fn draw_walls(&self, map: &Map, view: &View, overlay: &Overlay, frame: &mut Framebuffer) {
        for (i, wall) in map.walls().iter().enumerate() {
            let i = i as u32;
            if overlay.hovered_wall == Some(i) || overlay.selected_wall == Some(i) {
                continue; // drawn by the overlay pass with the right color
            }
            let color = if wall.is_portal() { RED } else { WHITE };
            self.stroke_wall(map, view, frame, wall, color, 1);
        }
    }

    fn stroke_wall(
        &self,
        map: &Map,
        view: &View,
        frame: &mut Framebuffer,
        wall: &map::Wall,
        color: Rgb888,
        stroke: u32,
    ) {
        let (a, b) = match (map.points().get(wall.p1 as usize), map.points().get(wall.p2 as usize)) {
            (Some(&a), Some(&b)) => (a, b),
            _ => return,
        };
        let sa = self.world_to_screen(view, frame, a);
        let sb = self.world_to_screen(view, frame, b);
        draw_line(frame, sa.x as i32, sa.y as i32, sb.x as i32, sb.y as i32, color, stroke);

        // inward normal tick at the midpoint
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let len = (dx * dx + dy * dy).sqrt().max(1e-6);
        let (nx, ny) = (dy / len, -dx / len);
        let mx = (sa.x + sb.x) / 2.0;
        let my = (sa.y + sb.y) / 2.0;
        let tx = mx + nx * TICK_LEN_PX;
        let ty = my - ny * TICK_LEN_PX; // screen y grows downward
        draw_line(frame, mx as i32, my as i32, tx as i32, ty as i32, color, 1);
    }

    fn draw_point_glyphs(&self, map: &Map, view: &View, frame: &mut Framebuffer) {
        for wall in map.walls() {
            if wall.is_portal() {
                continue;
            }
            for &pi in &[wall.p1, wall.p2] {
                if let Some(&p) = map.points().get(pi as usize) {
                    let s = self.world_to_screen(view, frame, p);
                    draw_square(frame, s.x as i32, s.y as i32, POINT_GLYPH_PX, WHITE);
                }
            }
        }
    }

    fn draw_entities(&self, entities: &[EntitySnapshot], view: &View, overlay: &Overlay, frame: &mut Framebuffer) {
        for (i, e) in entities.iter().enumerate() {
            if overlay.hovered_entity == Some(i) || overlay.selected_entity == Some(i) {
                continue;
            }
            self.draw_entity_glyph(view, frame, Point::new(e.position.x, e.position.y), WHITE);
        }
    }

    fn draw_entity_glyph(&self, view: &View, frame: &mut Framebuffer, p: Point, color: Rgb888) {
        let c = self.world_to_screen(view, frame, p);
        let half = (ENTITY_HALF_EXTENT * view.zoom).max(1.0);
        let (x, y) = (c.x as i32, c.y as i32);
        let h = half as i32;
        Rectangle::new(
            embedded_graphics::geometry::Point::new(x - h, y - h),
            embedded_graphics::geometry::Point::new(x + h, y + h),
        )
        .into_styled(PrimitiveStyle::with_stroke(color, 1))
        .draw(&mut EgFrame(frame))
        .ok();
        draw_line(frame, x - h, y - h, x + h, y + h, color, 1);
        draw_line(frame, x - h, y + h, x + h, y - h, color, 1);
    }

    fn sector_edges(&self, map: &Map, view: &View, frame: &mut Framebuffer, sector_index: u32, color: Rgb888) {
        if let Some(sector) = map.sectors().get(sector_index as usize) {
            for wi in sector.wall_range() {
                if let Some(wall) = map.walls().get(wi as usize) {
                    self.stroke_wall(map, view, frame, wall, color, 1);
                }
            }
        }
    }

    fn draw_overlays(
        &self,
        map: &Map,
        entities: &[EntitySnapshot],
        view: &View,
        overlay: &Overlay,
        frame: &mut Framebuffer,
    ) {
        if let Some(sector) = overlay.drag_invalid_sector {
            self.sector_edges(map, view, frame, sector, RED);
        }

        // hover, strict priority entity > point > wall > sector
        if let Some(ei) = overlay.hovered_entity {
            if let Some(e) = entities.get(ei) {
                self.draw_entity_glyph(view, frame, Point::new(e.position.x, e.position.y), YELLOW);
            }
        } else if let Some(pi) = overlay.hovered_point {
            if let Some(&p) = map.points().get(pi as usize) {
                let s = self.world_to_screen(view, frame, p);
                draw_square(frame, s.x as i32, s.y as i32, HOVER_POINT_GLYPH_PX, YELLOW);
            }
            if let Some(wi) = overlay.hovered_wall {
                if let Some(sector) = map::geom::sector_of_wall(map, wi) {
                    self.sector_edges(map, view, frame, sector, ORANGE);
                }
            }
        } else if let Some(wi) = overlay.hovered_wall {
            if let Some(sector) = map::geom::sector_of_wall(map, wi) {
                self.sector_edges(map, view, frame, sector, ORANGE);
            }
            if let Some(wall) = map.walls().get(wi as usize) {
                self.stroke_wall(map, view, frame, wall, YELLOW, 2);
            }
        } else if let Some(si) = overlay.hovered_sector {
            self.sector_edges(map, view, frame, si, YELLOW);
        }

        // selection, same priority
        if let Some(ei) = overlay.selected_entity {
            if let Some(e) = entities.get(ei) {
                self.draw_entity_glyph(view, frame, Point::new(e.position.x, e.position.y), MAGENTA);
            }
        }
        if let Some(si) = overlay.selected_point {
            if let Some(&p) = map.points().get(si as usize) {
                let s = self.world_to_screen(view, frame, p);
                draw_square(frame, s.x as i32, s.y as i32, HOVER_POINT_GLYPH_PX, CYAN);
            }
        }
        if let Some(wi) = overlay.selected_wall {
            if let Some(sector) = map::geom::sector_of_wall(map, wi) {
                self.sector_edges(map, view, frame, sector, LIME);
            }
            if let Some(wall) = map.walls().get(wi as usize) {
                self.stroke_wall(map, view, frame, wall, CYAN, 2);
            }
        }
        if let Some(si) = overlay.selected_sector {
            self.sector_edges(map, view, frame, si, LIME);
        }
    }

    fn draw_camera(&self, camera: &Camera, view: &View, frame: &mut Framebuffer) {
        let (sin_y, cos_y) = camera.yaw.sin_cos();
        let pos = Point::new(camera.pos.x, camera.pos.y);
        let apex = Point::new(pos.x + cos_y * CAMERA_FORWARD, pos.y + sin_y * CAMERA_FORWARD);
        let left = Point::new(
            pos.x - sin_y * CAMERA_BASE_WIDTH / 2.0,
            pos.y + cos_y * CAMERA_BASE_WIDTH / 2.0,
        );
        let right = Point::new(
            pos.x + sin_y * CAMERA_BASE_WIDTH / 2.0,
            pos.y - cos_y * CAMERA_BASE_WIDTH / 2.0,
        );
        let sa = self.world_to_screen(view, frame, apex);
        let sl = self.world_to_screen(view, frame, left);
        let sr = self.world_to_screen(view, frame, right);
        draw_line(frame, sl.x as i32, sl.y as i32, sa.x as i32, sa.y as i32, MAGENTA, 1);
        draw_line(frame, sa.x as i32, sa.y as i32, sr.x as i32, sr.y as i32, MAGENTA, 1);
        draw_line(frame, sr.x as i32, sr.y as i32, sl.x as i32, sl.y as i32, MAGENTA, 1);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Point2 {
    x: f32,
    y: f32,
}

/// World -> screen conversion matching the editor's picking math (spec
/// §4.F). Exposed so `editor` never has to re-derive this formula to keep
/// hover/drag picking in agreement with what gets drawn.
pub fn world_to_screen(view: &View, width: f32, height: f32, p: Point) -> Point2 {
    Point2 {
        x: (p.x - view.center.x) * view.zoom + width / 2.0,
        y: height / 2.0 - (p.y - view.center.y) * view.zoom,
    }
}

/// Inverse of [`world_to_screen`].
pub fn screen_to_world(view: &View, width: f32, height: f32, sx: f32, sy: f32) -> Point {
    Point::new(
        (sx - width / 2.0) / view.zoom + view.center.x,
        view.center.y - (sy - height / 2.0) / view.zoom,
    )
}

impl Point2 {
    pub fn x(&self) -> f32 {
        self.x
    }
    pub fn y(&self) -> f32 {
        self.y
    }
}

fn draw_line(frame: &mut Framebuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb888, stroke: u32) {
    Line::new(
        embedded_graphics::geometry::Point::new(x0, y0),
        embedded_graphics::geometry::Point::new(x1, y1),
    )
    .into_styled(PrimitiveStyle::with_stroke(color, stroke))
    .draw(&mut EgFrame(frame))
    .ok();
}

fn draw_square(frame: &mut Framebuffer, cx: i32, cy: i32, size: i32, color: Rgb888) {
    let h = size / 2;
    Rectangle::new(
        embedded_graphics::geometry::Point::new(cx - h, cy - h),
        embedded_graphics::geometry::Point::new(cx + h, cy + h),
    )
    .into_styled(PrimitiveStyle::with_stroke(color, 1))
    .draw(&mut EgFrame(frame))
    .ok();
}

#[cfg(test)]
mod test {
    use super::*;
    use map::{Sector, Wall};

    fn single_room() -> Map {
        let mut map = Map::new();
        map.push_point(Point::new(0.0, 0.0));
        map.push_point(Point::new(4.0, 0.0));
        map.push_point(Point::new(4.0, 4.0));
        map.push_point(Point::new(0.0, 4.0));
        map.push_wall(Wall::solid(0, 1, None));
        map.push_wall(Wall::solid(1, 2, None));
        map.push_wall(Wall::solid(2, 3, None));
        map.push_wall(Wall::solid(3, 0, None));
        map.push_sector(Sector::new(0, 4, 0.0, 2.0));
        map
    }

    #[test]
    fn renders_without_panicking() {
        let map = single_room();
        let camera = Camera::new(map::Vec3::new(2.0, 2.0, 1.0), 0.0);
        let view = View { center: Point::new(2.0, 2.0), zoom: 16.0, grid_size: 32.0 };
        let overlay = Overlay::default();
        let mut frame = Framebuffer::new(64, 64);
        Renderer::new().render(&map, &camera, &[], &view, &overlay, &mut frame);
        assert!(frame.pixels().iter().any(|&p| p != crate::frame::CLEAR_COLOR));
    }
}
