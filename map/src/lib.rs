#![deny(unused)]
use thiserror::Error;

pub mod camera;
pub mod entity;
pub mod geom;
pub mod json;
pub mod point;
pub mod sector;
pub mod texture;
pub mod wall;

pub use camera::Camera;
pub use entity::EntitySnapshot;
pub use point::{Point, Vec3};
pub use sector::Sector;
pub use texture::TextureHandle;
pub use wall::Wall;

use json::RawMap;

#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed map JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("wall {wall} references point {point}, but the map only has {num_points} points")]
    PointOutOfRange {
        wall: usize,
        point: u32,
        num_points: usize,
    },

    #[error("sector {sector} references texture {index}, but the map only lists {num_textures} textures")]
    TextureOutOfRange {
        sector: usize,
        index: i32,
        num_textures: usize,
    },
}

/// The full geometric state of a level: a dense point table, walls addressed
/// by point index, and sectors addressed by a contiguous range of walls.
///
/// `Map` owns no collaborator state (no filesystem, no texture pixels, no
/// running scripts) — it is pure data, which is what lets the editor clone it
/// wholesale for undo/redo (see [`Map::clone_state`] / [`Map::restore`]).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Map {
    points: Vec<Point>,
    walls: Vec<Wall>,
    sectors: Vec<Sector>,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    pub fn points_mut(&mut self) -> &mut [Point] {
        &mut self.points
    }

    pub fn walls_mut(&mut self) -> &mut [Wall] {
        &mut self.walls
    }

    pub fn sectors_mut(&mut self) -> &mut [Sector] {
        &mut self.sectors
    }

    /// Appends a point, returning its index.
    pub fn push_point(&mut self, point: Point) -> u32 {
        self.points.push(point);
        self.points.len() as u32 - 1
    }

    /// Appends a wall, returning its index.
    pub fn push_wall(&mut self, wall: Wall) -> u32 {
        self.walls.push(wall);
        self.walls.len() as u32 - 1
    }

    /// Appends a sector, returning its index.
    pub fn push_sector(&mut self, sector: Sector) -> u32 {
        self.sectors.push(sector);
        self.sectors.len() as u32 - 1
    }

    /// Releases all owned geometry and resets the map to empty.
    pub fn free(&mut self) {
        self.points.clear();
        self.walls.clear();
        self.sectors.clear();
    }

    /// A deep copy, independent of `self`. `Map` derives `Clone`, but this
    /// name matches the vocabulary the undo stack and the editor use
    /// (`clone_state` captures a snapshot to push; `restore` plays one back).
    pub fn clone_state(&self) -> Map {
        self.clone()
    }

    /// Replaces `self` with `src`'s geometry. Equivalent to `self.free()`
    /// followed by a clone of `src` into `self`.
    pub fn restore(&mut self, src: &Map) {
        self.free();
        self.points.extend_from_slice(&src.points);
        self.walls.extend_from_slice(&src.walls);
        self.sectors.extend_from_slice(&src.sectors);
    }

    /// Builds a `Map` from its on-disk JSON form.
    ///
    /// `resolve_texture` maps a texture index from the raw `textures` list to
    /// a live handle; `map` never touches pixels or paths directly, so the
    /// resolution strategy (disk load, caching, ...) is entirely up to the
    /// caller (the `engine` crate, backed by a `TextureStore`).
    ///
    /// A wall's `tex` field serves double duty: on a solid wall it is the
    /// full-height face; on a portal wall the same index is used for both
    /// the upper transom and the lower riser, since the wire format carries
    /// only one texture slot per wall.
    pub fn from_raw(
        raw: &RawMap,
        mut resolve_texture: impl FnMut(usize) -> Option<TextureHandle>,
    ) -> Result<Map, Error> {
        let mut map = Map::new();

        for p in &raw.points {
            map.push_point(Point::new(p[0], p[1]));
        }

        let resolve = |index: i32, sector: usize, num_textures: usize| -> Result<Option<TextureHandle>, Error> {
            if index < 0 {
                Ok(None)
            } else if index as usize >= num_textures {
                Err(Error::TextureOutOfRange {
                    sector,
                    index,
                    num_textures,
                })
            } else {
                Ok(resolve_texture(index as usize))
            }
        };

        for (sector_index, raw_sector) in raw.sectors.iter().enumerate() {
            let first_wall = map.walls.len() as u32;
            for raw_wall in &raw_sector.walls {
                if raw_wall.p1 as usize >= map.points.len() || raw_wall.p2 as usize >= map.points.len() {
                    return Err(Error::PointOutOfRange {
                        wall: map.walls.len(),
                        point: raw_wall.p1.max(raw_wall.p2),
                        num_points: map.points.len(),
                    });
                }
                let tex = resolve(raw_wall.tex, sector_index, raw.textures.len())?;
                let wall = if raw_wall.portal >= 0 {
                    Wall::portal(raw_wall.p1, raw_wall.p2, raw_wall.portal as u32, tex, tex)
                } else {
                    Wall::solid(raw_wall.p1, raw_wall.p2, tex)
                };
                map.push_wall(wall);
            }
            let num_walls = map.walls.len() as u32 - first_wall;
            let mut sector = Sector::new(
                first_wall,
                num_walls,
                raw_sector.floor_height,
                raw_sector.ceil_height,
            );
            sector.floor_texture = resolve(raw_sector.floor_tex, sector_index, raw.textures.len())?;
            sector.ceil_texture = resolve(raw_sector.ceil_tex, sector_index, raw.textures.len())?;
            map.push_sector(sector);
        }

        Ok(map)
    }
}

#[cfg(test)]
mod test {
    use super::*;

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
    fn new_map_is_empty() {
        let map = Map::new();
        assert!(map.points().is_empty());
        assert!(map.walls().is_empty());
        assert!(map.sectors().is_empty());
    }

    #[test]
    fn clone_then_restore_round_trips() {
        let original = single_room();
        let snapshot = original.clone_state();

        let mut working = original.clone();
        working.push_point(Point::new(9.0, 9.0));
        assert_ne!(working, original);

        working.restore(&snapshot);
        assert_eq!(working, original);
    }

    #[test]
    fn free_empties_all_tables() {
        let mut map = single_room();
        map.free();
        assert!(map.points().is_empty());
        assert!(map.walls().is_empty());
        assert!(map.sectors().is_empty());
    }

    #[test]
    fn from_raw_builds_single_room() {
        let text = r#"{
            "points": [[0,0],[4,0],[4,4],[0,4]],
            "sectors": [{
                "floor_height": 0, "ceil_height": 2,
                "floor_tex": -1, "ceil_tex": -1,
                "walls": [
                    {"p1":0,"p2":1,"portal":-1,"tex":-1},
                    {"p1":1,"p2":2,"portal":-1,"tex":-1},
                    {"p1":2,"p2":3,"portal":-1,"tex":-1},
                    {"p1":3,"p2":0,"portal":-1,"tex":-1}
                ]
            }]
        }"#;
        let raw = RawMap::from_str(text).unwrap();
        let map = Map::from_raw(&raw, |_| None).unwrap();
        assert_eq!(map.points().len(), 4);
        assert_eq!(map.walls().len(), 4);
        assert_eq!(map.sectors().len(), 1);
    }

    #[test]
    fn from_raw_rejects_out_of_range_point() {
        let text = r#"{
            "points": [[0,0],[4,0]],
            "sectors": [{
                "floor_height": 0, "ceil_height": 2,
                "walls": [{"p1":0,"p2":5,"portal":-1,"tex":-1}]
            }]
        }"#;
        let raw = RawMap::from_str(text).unwrap();
        assert!(matches!(
            Map::from_raw(&raw, |_| None),
            Err(Error::PointOutOfRange { .. })
        ));
    }

    #[test]
    fn from_raw_shares_portal_texture_top_and_bottom() {
        let text = r#"{
            "points": [[0,0],[4,0]],
            "textures": [{"path": "step.png"}],
            "sectors": [{
                "floor_height": 0, "ceil_height": 2,
                "walls": [{"p1":0,"p2":1,"portal":1,"tex":0}]
            }]
        }"#;
        let raw = RawMap::from_str(text).unwrap();
        let map = Map::from_raw(&raw, |i| Some(TextureHandle(i as u32))).unwrap();
        let wall = &map.walls()[0];
        assert_eq!(wall.top_texture, Some(TextureHandle(0)));
        assert_eq!(wall.bottom_texture, Some(TextureHandle(0)));
        assert_eq!(wall.texture, None);
    }
}
