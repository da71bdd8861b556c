//! Drag-commit validity tests (spec §4.F "After applying, validate").
//!
//! These build directly on `map::geom`'s primitives; nothing here is novel
//! geometry, just the bookkeeping of which walls/sectors a given point or
//! wall touches.

use map::{geom, Map};

/// Indices of every wall that has `point_index` as an endpoint.
pub fn walls_touching_point(map: &Map, point_index: u32) -> Vec<u32> {
    map.walls()
        .iter()
        .enumerate()
        .filter(|(_, w)| w.p1 == point_index || w.p2 == point_index)
        .map(|(i, _)| i as u32)
        .collect()
}

/// Indices of every sector with a wall that has `point_index` as an
/// endpoint (possibly more than one, since a shared portal vertex belongs to
/// both sides).
pub fn sectors_touching_point(map: &Map, point_index: u32) -> Vec<u32> {
    map.sectors()
        .iter()
        .enumerate()
        .filter(|(_, s)| {
            s.wall_range().any(|wi| {
                let w = &map.walls()[wi as usize];
                w.p1 == point_index || w.p2 == point_index
            })
        })
        .map(|(i, _)| i as u32)
        .collect()
}

/// A moved point is valid iff none of the walls touching it newly cross a
/// non-neighbor wall, and none of the sectors using it now contain a
/// foreign point.
pub fn point_move_is_valid(map: &Map, point_index: u32) -> bool {
    let walls = walls_touching_point(map, point_index);
    if walls.iter().any(|&w| geom::wall_crosses_any(map, w)) {
        return false;
    }
    let sectors = sectors_touching_point(map, point_index);
    !sectors.iter().any(|&s| geom::sector_contains_foreign_point(map, s))
}

/// A moved wall is valid iff it and every wall sharing an endpoint with it
/// avoid crossing a non-neighbor wall, and every sector touching either
/// endpoint (including the far side of a portal) stays free of foreign
/// points.
pub fn wall_move_is_valid(map: &Map, wall_index: u32) -> bool {
    let wall = &map.walls()[wall_index as usize];
    let affected: Vec<u32> = std::iter::once(wall_index)
        .chain(map.walls().iter().enumerate().filter_map(|(i, other)| {
            (i as u32 != wall_index && wall.is_neighbor(other)).then(|| i as u32)
        }))
        .collect();
    if affected.iter().any(|&w| geom::wall_crosses_any(map, w)) {
        return false;
    }

    let (p1, p2) = (wall.p1, wall.p2);
    let mut sectors = sectors_touching_point(map, p1);
    sectors.extend(sectors_touching_point(map, p2));
    sectors.sort_unstable();
    sectors.dedup();
    !sectors.iter().any(|&s| geom::sector_contains_foreign_point(map, s))
}

/// A moved sector is valid iff none of its own walls cross a non-neighbor
/// wall and it does not contain a foreign point.
pub fn sector_move_is_valid(map: &Map, sector_index: u32) -> bool {
    let sector = &map.sectors()[sector_index as usize];
    if sector.wall_range().any(|w| geom::wall_crosses_any(map, w)) {
        return false;
    }
    !geom::sector_contains_foreign_point(map, sector_index)
}

/// An entity is valid wherever it lies inside some sector.
pub fn entity_move_is_valid(map: &Map, world_xy: map::Point) -> bool {
    geom::sector_of_point(map, world_xy).is_some()
}

#[cfg(test)]
mod test {
    use super::*;
    use map::{Point, Sector, Wall};

    fn two_sectors() -> Map {
        let mut map = Map::new();
        // sector 0: a 4x4 room, right edge shared with sector 1 via a portal
        map.push_point(Point::new(0.0, 0.0)); // 0
        map.push_point(Point::new(4.0, 0.0)); // 1
        map.push_point(Point::new(4.0, 4.0)); // 2
        map.push_point(Point::new(0.0, 4.0)); // 3
        map.push_point(Point::new(8.0, 0.0)); // 4
        map.push_point(Point::new(8.0, 4.0)); // 5

        map.push_wall(Wall::solid(0, 1, None));
        map.push_wall(Wall::portal(1, 2, 1, None, None));
        map.push_wall(Wall::solid(2, 3, None));
        map.push_wall(Wall::solid(3, 0, None));
        map.push_sector(Sector::new(0, 4, 0.0, 2.0));

        map.push_wall(Wall::portal(2, 1, 0, None, None));
        map.push_wall(Wall::solid(1, 4, None));
        map.push_wall(Wall::solid(4, 5, None));
        map.push_wall(Wall::solid(5, 2, None));
        map.push_sector(Sector::new(4, 4, 0.0, 2.0));

        map
    }

    #[test]
    fn sectors_touching_shared_portal_point() {
        let map = two_sectors();
        let sectors = sectors_touching_point(&map, 1);
        assert_eq!(sectors, vec![0, 1]);
    }

    #[test]
    fn point_move_invalid_when_it_would_cross() {
        let mut map = two_sectors();
        // drag point 0 across wall 3->0's neighbor (wall 2->3) into a crossing position
        map.points_mut()[0] = Point::new(4.5, 2.0);
        assert!(!point_move_is_valid(&map, 0));
    }

    #[test]
    fn point_move_valid_when_still_simple() {
        let map = two_sectors();
        assert!(point_move_is_valid(&map, 1));
    }

    #[test]
    fn sector_move_invalid_with_foreign_point() {
        let mut map = two_sectors();
        map.push_point(Point::new(2.0, 2.0)); // lands inside sector 0, not on its boundary
        assert!(!sector_move_is_valid(&map, 0));
    }
}
