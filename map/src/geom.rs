//! Geometric services shared by the renderer and the editor: point-in-sector
//! containment, segment intersection and the wall/sector lookups built on
//! top of them.
//!
//! All tests use IEEE-754 single precision; degenerate zero-length segments
//! are treated as non-crossing.

use crate::point::Point;
use crate::{Map, Sector};
use std::collections::HashSet;

/// Ray-casts `p` against a single sector's boundary (even-odd rule).
fn point_in_sector_polygon(map: &Map, sector: &Sector, p: Point) -> bool {
    let mut inside = false;
    for w in sector.wall_range() {
        let wall = &map.walls()[w as usize];
        let a = map.points()[wall.p1 as usize];
        let b = map.points()[wall.p2 as usize];
        if (a.y > p.y) != (b.y > p.y) {
            let t = (p.y - a.y) / (b.y - a.y);
            let x_intersect = a.x + t * (b.x - a.x);
            if p.x < x_intersect {
                inside = !inside;
            }
        }
    }
    inside
}

/// Returns the first sector (lowest index) whose polygon contains `p`, or
/// `None` if `p` lies in the void. Sectors are expected to partition the
/// plane (invariant 6), so in a well-formed map there is at most one match;
/// if a degenerate map violates that, the lowest index wins.
pub fn sector_of_point(map: &Map, p: Point) -> Option<u32> {
    map.sectors()
        .iter()
        .position(|s| point_in_sector_polygon(map, s, p))
        .map(|i| i as u32)
}

/// Returns the sector whose wall range covers `wall_index`, or `None` if the
/// index is unused by any sector.
pub fn sector_of_wall(map: &Map, wall_index: u32) -> Option<u32> {
    map.sectors()
        .iter()
        .position(|s| s.contains_wall(wall_index))
        .map(|i| i as u32)
}

fn ccw(a: Point, b: Point, c: Point) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Strict segment crossing test using the CCW sign of the four endpoints.
/// Collinear touches (including shared endpoints) do not count as crossing.
pub fn segments_cross(a1: Point, a2: Point, b1: Point, b2: Point) -> bool {
    let d1 = ccw(b1, b2, a1);
    let d2 = ccw(b1, b2, a2);
    let d3 = ccw(a1, a2, b1);
    let d4 = ccw(a1, a2, b2);

    let straddles_ab = (d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0);
    let straddles_cd = (d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0);

    straddles_ab && straddles_cd
}

/// True iff `wall_index` crosses any non-neighbor wall in the map. Walls
/// sharing an endpoint index with it are skipped, since they are expected to
/// touch at that vertex.
pub fn wall_crosses_any(map: &Map, wall_index: u32) -> bool {
    let walls = map.walls();
    let points = map.points();
    let wall = &walls[wall_index as usize];
    let a1 = points[wall.p1 as usize];
    let a2 = points[wall.p2 as usize];

    walls.iter().enumerate().any(|(i, other)| {
        if i as u32 == wall_index || wall.is_neighbor(other) {
            return false;
        }
        let b1 = points[other.p1 as usize];
        let b2 = points[other.p2 as usize];
        segments_cross(a1, a2, b1, b2)
    })
}

/// True iff any map point that is not on `sector_index`'s own boundary lies
/// inside that sector's polygon. This is the editor's "consuming points"
/// validity test, a corollary of the non-self-intersection invariant.
pub fn sector_contains_foreign_point(map: &Map, sector_index: u32) -> bool {
    let sector = &map.sectors()[sector_index as usize];
    let boundary: HashSet<u32> = sector
        .wall_range()
        .flat_map(|w| {
            let wall = &map.walls()[w as usize];
            [wall.p1, wall.p2]
        })
        .collect();

    map.points().iter().enumerate().any(|(i, &p)| {
        if boundary.contains(&(i as u32)) {
            return false;
        }
        point_in_sector_polygon(map, sector, p)
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Map, Wall};

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
        map.push_sector(crate::Sector::new(0, 4, 0.0, 2.0));
        map
    }

    #[test]
    fn point_inside_single_room() {
        let map = single_room();
        assert_eq!(sector_of_point(&map, Point::new(2.0, 2.0)), Some(0));
        assert_eq!(sector_of_point(&map, Point::new(-1.0, 2.0)), None);
    }

    #[test]
    fn wall_lookup() {
        let map = single_room();
        assert_eq!(sector_of_wall(&map, 2), Some(0));
        assert_eq!(sector_of_wall(&map, 99), None);
    }

    #[test]
    fn segments_cross_is_symmetric() {
        let a1 = Point::new(0.0, 0.0);
        let a2 = Point::new(4.0, 4.0);
        let b1 = Point::new(0.0, 4.0);
        let b2 = Point::new(4.0, 0.0);
        assert!(segments_cross(a1, a2, b1, b2));
        assert!(segments_cross(b1, b2, a1, a2));
    }

    #[test]
    fn collinear_touch_does_not_cross() {
        let a1 = Point::new(0.0, 0.0);
        let a2 = Point::new(2.0, 0.0);
        let b1 = Point::new(2.0, 0.0);
        let b2 = Point::new(4.0, 0.0);
        assert!(!segments_cross(a1, a2, b1, b2));
    }

    #[test]
    fn neighbor_walls_are_not_reported_as_crossing() {
        let map = single_room();
        assert!(!wall_crosses_any(&map, 0));
    }

    #[test]
    fn no_foreign_point_in_convex_room() {
        let map = single_room();
        assert!(!sector_contains_foreign_point(&map, 0));
    }
}
