//! The portal-recursive software renderer.
//!
//! Walks the sector graph starting from the sector under the camera,
//! clipping and projecting one wall at a time, narrowing a per-column
//! visibility window as it recurses through portals. See [`Renderer::render`].

use crate::frame::{Framebuffer, FALLBACK_GRAY, MAX_WIDTH};
use map::{geom, Camera, Map, Point, Sector, TextureHandle, Wall};
use platform::{TextureImage, TextureStore};

const FOV_H: f32 = std::f32::consts::FRAC_PI_2;
const Z_NEAR_SOLID: f32 = 0.1;
const Z_NEAR_PORTAL: f32 = 0.005;
const MAX_DEPTH: u32 = 16;

/// 3D portal renderer. Holds no per-frame state of its own; `render` is
/// re-entrant and safe to call every frame with a different map or camera.
#[derive(Debug, Default)]
pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    /// Renders `map` as seen by `camera` into `frame`. Never panics: a
    /// camera outside any sector falls back to sector 0, missing textures
    /// fall back to flat gray, and the recursion is depth-capped so cyclic
    /// portal graphs still terminate.
    pub fn render(&self, map: &Map, camera: &Camera, textures: &dyn TextureStore, frame: &mut Framebuffer) {
        if map.sectors().is_empty() {
            return;
        }
        let width = frame.width();
        let height = frame.height() as i32;

        let start = geom::sector_of_point(map, Point::new(camera.pos.x, camera.pos.y))
            .unwrap_or(0)
            .min(map.sectors().len() as u32 - 1);

        let mut y_top = heapless::Vec::<i32, MAX_WIDTH>::new();
        let mut y_bot = heapless::Vec::<i32, MAX_WIDTH>::new();
        for _ in 0..width {
            let _ = y_top.push(0);
            let _ = y_bot.push(height);
        }

        render_sector(
            map,
            camera,
            textures,
            frame,
            &y_top,
            &y_bot,
            start,
            0,
            width as i32,
            0,
        );
    }
}

#[derive(Debug, Clone, Copy)]
struct CamPoint {
    x: f32,
    y: f32,
}

fn to_camera_space(camera: &Camera, p: Point) -> CamPoint {
    let dx = p.x - camera.pos.x;
    let dy = p.y - camera.pos.y;
    let (sin_yaw, cos_yaw) = camera.yaw.sin_cos();
    CamPoint {
        x: dx * cos_yaw + dy * sin_yaw,
        y: -dx * sin_yaw + dy * cos_yaw,
    }
}

/// Clips a camera-space segment against the near plane `x = z_near`,
/// returning the (possibly replaced) endpoints plus the parametric `t`
/// values of each, used later for perspective-correct U interpolation.
/// `None` means the whole segment is behind the near plane.
fn clip_near(a: CamPoint, b: CamPoint, z_near: f32) -> Option<(CamPoint, CamPoint, f32, f32)> {
    let behind_a = a.x < z_near;
    let behind_b = b.x < z_near;
    if behind_a && behind_b {
        return None;
    }
    let mut out_a = a;
    let mut out_b = b;
    let mut t1 = 0.0;
    let mut t2 = 1.0;
    if behind_a != behind_b {
        let t = (z_near - a.x) / (b.x - a.x);
        let clipped = CamPoint {
            x: a.x + t * (b.x - a.x),
            y: a.y + t * (b.y - a.y),
        };
        if behind_a {
            out_a = clipped;
            t1 = t;
        } else {
            out_b = clipped;
            t2 = t;
        }
    }
    Some((out_a, out_b, t1, t2))
}

#[derive(Debug, Clone, Copy)]
struct Projected {
    x_a: f32,
    x_b: f32,
    y_ceil_a: f32,
    y_ceil_b: f32,
    y_floor_a: f32,
    y_floor_b: f32,
    iz_a: f32,
    iz_b: f32,
    uz_a: f32,
    uz_b: f32,
}

/// Projects one wall into screen space. Returns `None` if the wall is fully
/// behind the near plane or back-facing (the renderer swaps `p1`/`p2` before
/// projecting to make clockwise-wound sectors front-face-right, so a wall
/// only survives if its first endpoint lands left of its second on screen).
fn project_wall(
    map: &Map,
    camera: &Camera,
    sector: &Sector,
    wall: &Wall,
    z_near: f32,
    half_w: f32,
    half_h: f32,
    f: f32,
) -> Option<Projected> {
    let pa = *map.points().get(wall.p2 as usize)?;
    let pb = *map.points().get(wall.p1 as usize)?;
    let world_length = pa.distance(&pb);

    let cam_a = to_camera_space(camera, pa);
    let cam_b = to_camera_space(camera, pb);
    let (ca, cb, t1, t2) = clip_near(cam_a, cam_b, z_near)?;
    if ca.x < 1e-4 || cb.x < 1e-4 {
        return None;
    }

    let x_a = half_w + (ca.y / ca.x) * f;
    let x_b = half_w + (cb.y / cb.x) * f;
    if !(x_a < x_b) {
        return None;
    }

    let z_ceil = sector.ceil_height - camera.pos.z;
    let z_floor = sector.floor_height - camera.pos.z;
    let iz_a = 1.0 / ca.x;
    let iz_b = 1.0 / cb.x;

    Some(Projected {
        x_a,
        x_b,
        y_ceil_a: half_h - z_ceil * iz_a * f,
        y_ceil_b: half_h - z_ceil * iz_b * f,
        y_floor_a: half_h - z_floor * iz_a * f,
        y_floor_b: half_h - z_floor * iz_b * f,
        iz_a,
        iz_b,
        uz_a: t1 * world_length * iz_a,
        uz_b: t2 * world_length * iz_b,
    })
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[allow(clippy::too_many_arguments)]
fn render_sector(
    map: &Map,
    camera: &Camera,
    textures: &dyn TextureStore,
    frame: &mut Framebuffer,
    y_top: &heapless::Vec<i32, MAX_WIDTH>,
    y_bot: &heapless::Vec<i32, MAX_WIDTH>,
    sector_index: u32,
    min_x: i32,
    max_x: i32,
    depth: u32,
) {
    if depth >= MAX_DEPTH || min_x >= max_x {
        return;
    }
    let sector = match map.sectors().get(sector_index as usize) {
        Some(s) => s,
        None => return,
    };

    let width = frame.width();
    let height = frame.height();
    let half_w = width as f32 / 2.0;
    let half_h = height as f32 / 2.0;
    let f = half_w / (FOV_H / 2.0).tan();

    for wi in sector.wall_range() {
        let wall = match map.walls().get(wi as usize) {
            Some(w) => w,
            None => continue,
        };
        let z_near = if wall.is_portal() { Z_NEAR_PORTAL } else { Z_NEAR_SOLID };
        let proj = match project_wall(map, camera, sector, wall, z_near, half_w, half_h, f) {
            Some(p) => p,
            None => continue,
        };

        let draw_x1 = (proj.x_a.ceil() as i32).max(min_x).max(0);
        let draw_x2 = (proj.x_b.ceil() as i32).min(max_x).min(width as i32);
        if draw_x1 >= draw_x2 {
            continue;
        }

        let neighbor = wall.next_sector.and_then(|ns| map.sectors().get(ns as usize));

        let mut child_top = heapless::Vec::from_slice(y_top).unwrap_or_default();
        let mut child_bot = heapless::Vec::from_slice(y_bot).unwrap_or_default();
        let mut any_open = false;

        for x in draw_x1..draw_x2 {
            let col_top = y_top[x as usize];
            let col_bot = y_bot[x as usize];
            if col_top >= col_bot {
                continue;
            }

            let t = (x as f32 + 0.5 - proj.x_a) / (proj.x_b - proj.x_a);
            let y_ceil_f = lerp(proj.y_ceil_a, proj.y_ceil_b, t);
            let y_floor_f = lerp(proj.y_floor_a, proj.y_floor_b, t);
            let ceil_i = (y_ceil_f.round() as i32).clamp(col_top, col_bot);
            let floor_i = (y_floor_f.round() as i32).clamp(col_top, col_bot);

            cast_flat(
                frame, textures, sector.ceil_texture, sector.ceil_height, camera, x, col_top, ceil_i, half_w, half_h, f,
            );
            cast_flat(
                frame, textures, sector.floor_texture, sector.floor_height, camera, x, floor_i, col_bot, half_w, half_h, f,
            );

            let iz_col = lerp(proj.iz_a, proj.iz_b, t);
            let uz_col = lerp(proj.uz_a, proj.uz_b, t);
            let u = if iz_col.abs() > 1e-8 { uz_col / iz_col } else { 0.0 };
            let tex_x = u.floor() as i64;

            match neighbor {
                None => {
                    draw_vertical_texture(
                        frame, textures, wall.texture, x, y_ceil_f, y_floor_f,
                        sector.ceil_height - sector.floor_height, ceil_i, floor_i, tex_x,
                    );
                    child_top[x as usize] = col_bot;
                    child_bot[x as usize] = col_bot;
                }
                Some(next) => {
                    let nz_ceil = next.ceil_height - camera.pos.z;
                    let nz_floor = next.floor_height - camera.pos.z;
                    let ny_ceil_f = half_h - nz_ceil * iz_col * f;
                    let ny_floor_f = half_h - nz_floor * iz_col * f;
                    let ny_ceil_i = (ny_ceil_f.round() as i32).clamp(col_top, col_bot);
                    let ny_floor_i = (ny_floor_f.round() as i32).clamp(col_top, col_bot);

                    if ny_ceil_i > ceil_i {
                        draw_vertical_texture(
                            frame, textures, wall.top_texture, x, y_ceil_f, ny_ceil_f,
                            sector.ceil_height - next.ceil_height, ceil_i, ny_ceil_i, tex_x,
                        );
                    }
                    if ny_floor_i < floor_i {
                        draw_vertical_texture(
                            frame, textures, wall.bottom_texture, x, ny_floor_f, y_floor_f,
                            next.floor_height - sector.floor_height, ny_floor_i, floor_i, tex_x,
                        );
                    }

                    let open_top = ceil_i.max(ny_ceil_i).max(col_top);
                    let open_bot = floor_i.min(ny_floor_i).min(col_bot);
                    child_top[x as usize] = open_top;
                    child_bot[x as usize] = open_bot.max(open_top);
                    if open_top < open_bot {
                        any_open = true;
                    }
                }
            }
        }

        if let (Some(next_sector), true) = (wall.next_sector, any_open) {
            render_sector(
                map, camera, textures, frame, &child_top, &child_bot, next_sector, draw_x1, draw_x2, depth + 1,
            );
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_vertical_texture(
    frame: &mut Framebuffer,
    textures: &dyn TextureStore,
    handle: Option<TextureHandle>,
    x: i32,
    y_top_f: f32,
    y_bot_f: f32,
    height_span: f32,
    clip_top: i32,
    clip_bot: i32,
    tex_x: i64,
) {
    if clip_top >= clip_bot {
        return;
    }
    let denom = y_bot_f - y_top_f;
    if denom.abs() < 1e-5 {
        return;
    }
    let img = handle.and_then(|h| textures.get(h));
    let v_step = height_span / denom;
    let mut v = (clip_top as f32 - y_top_f) * v_step;
    for y in clip_top..clip_bot {
        frame.set(x, y, sample(img.as_ref(), tex_x, v.floor() as i64));
        v += v_step;
    }
}

#[allow(clippy::too_many_arguments)]
fn cast_flat(
    frame: &mut Framebuffer,
    textures: &dyn TextureStore,
    handle: Option<TextureHandle>,
    flat_height: f32,
    camera: &Camera,
    x: i32,
    y_from: i32,
    y_to: i32,
    half_w: f32,
    half_h: f32,
    f: f32,
) {
    if y_from >= y_to {
        return;
    }
    let img = handle.and_then(|h| textures.get(h));
    let height_diff = flat_height - camera.pos.z;
    let view_x = (x as f32 + 0.5 - half_w) / f;
    let (sin_yaw, cos_yaw) = camera.yaw.sin_cos();
    let ray_x = cos_yaw + view_x * sin_yaw;
    let ray_y = sin_yaw - view_x * cos_yaw;
    for y in y_from..y_to {
        let dy = y as f32 + 0.5 - half_h;
        if dy.abs() < 1e-4 {
            continue;
        }
        let z = (height_diff.abs() * f) / dy.abs();
        let world_x = camera.pos.x + ray_x * z;
        let world_y = camera.pos.y + ray_y * z;
        frame.set(x, y, sample(img.as_ref(), world_x.floor() as i64, world_y.floor() as i64));
    }
}

fn sample(img: Option<&TextureImage<'_>>, tx: i64, ty: i64) -> u32 {
    match img {
        Some(im) if im.width > 0 && im.height > 0 => {
            let x = tx.rem_euclid(im.width as i64) as usize;
            let y = ty.rem_euclid(im.height as i64) as usize;
            im.pixels[y * im.width as usize + x]
        }
        _ => FALLBACK_GRAY,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use map::{Point, Sector, Wall};
    use platform::TextureImage;

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

    fn single_room() -> Map {
        let mut map = Map::new();
        map.push_point(Point::new(0.0, 0.0));
        map.push_point(Point::new(4.0, 0.0));
        map.push_point(Point::new(4.0, 4.0));
        map.push_point(Point::new(0.0, 4.0));
        // wound so that, after the renderer's p2->p1 swap, walls face inward
        map.push_wall(Wall::solid(1, 0, None));
        map.push_wall(Wall::solid(2, 1, None));
        map.push_wall(Wall::solid(3, 2, None));
        map.push_wall(Wall::solid(0, 3, None));
        map.push_sector(Sector::new(0, 4, 0.0, 2.0));
        map
    }

    #[test]
    fn renders_single_room_without_panicking() {
        let map = single_room();
        let camera = Camera::new(map::Vec3::new(2.0, 2.0, 1.0), 0.0);
        let mut frame = Framebuffer::new(64, 48);
        let renderer = Renderer::new();
        renderer.render(&map, &camera, &NoTextures, &mut frame);
        assert!(frame.pixels().iter().any(|&p| p != crate::frame::CLEAR_COLOR));
    }

    #[test]
    fn near_clip_produces_t_in_unit_range() {
        let a = CamPoint { x: -0.05, y: -1.0 };
        let b = CamPoint { x: 1.95, y: 1.0 };
        let (_, _, t1, t2) = clip_near(a, b, 0.1).unwrap();
        assert!(t1 > 0.0 && t1 < 1.0);
        assert_eq!(t2, 1.0);
    }

    #[test]
    fn fully_behind_segment_is_culled() {
        let a = CamPoint { x: -1.0, y: 0.0 };
        let b = CamPoint { x: -0.5, y: 0.0 };
        assert!(clip_near(a, b, 0.1).is_none());
    }
}
