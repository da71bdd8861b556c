//! Two bounded LIFO stacks of deep-cloned `(Map, EntitySnapshot[])` pairs.
//!
//! Mirrors the spec's `Undo_PushState` / `Undo_PerformUndo` / `Undo_PerformRedo`
//! one-for-one: pushing clears redo, a full stack drops its oldest entry, and
//! undo/redo each capture the *current* state onto the opposite stack before
//! restoring, so the two operations are exact inverses of each other.

use map::{EntitySnapshot, Map};
use platform::EntityRuntime;
use std::collections::{HashSet, VecDeque};

/// Capacity of each of the undo and redo stacks (spec §4.G).
pub const CAPACITY: usize = 100;

#[derive(Debug, Clone)]
struct Snapshot {
    map: Map,
    entities: Vec<EntitySnapshot>,
}

/// Deep-copies `map` and snapshots every active entity through `runtime`.
fn capture(map: &Map, runtime: &dyn EntityRuntime) -> Snapshot {
    Snapshot {
        map: map.clone_state(),
        entities: runtime.enumerate(),
    }
}

/// Mutates `runtime`'s live entities to match `snapshot` exactly: existing
/// ids are repositioned, missing ones are spawned with their forced id, and
/// any entity not present in the snapshot is destroyed. The next unforced
/// spawn id is reset to `max(id) + 1` (or `0` if the snapshot is empty).
fn restore_entities(snapshot: &[EntitySnapshot], runtime: &mut dyn EntityRuntime) {
    let current = runtime.enumerate();
    let keep: HashSet<u32> = snapshot.iter().map(|e| e.id).collect();
    for e in &current {
        if !keep.contains(&e.id) {
            runtime.destroy(e.id);
        }
    }

    let had: HashSet<u32> = current.iter().map(|e| e.id).collect();
    let mut next_id = 0u32;
    for e in snapshot {
        next_id = next_id.max(e.id + 1);
        if had.contains(&e.id) {
            runtime.set_position(e.id, e.position, e.yaw);
        } else {
            runtime.spawn_with_id(e.id, &e.script_path, e.position, e.yaw);
        }
    }
    runtime.set_next_id(next_id);
}

/// The undo/redo stack pair the editor pushes to before every destructive
/// operation (drag start, entity delete, ...).
#[derive(Debug, Default)]
pub struct UndoStack {
    undo: VecDeque<Snapshot>,
    redo: VecDeque<Snapshot>,
}

impl UndoStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Captures the current state onto the undo stack and clears redo.
    /// Call this *before* performing a destructive edit.
    pub fn push_state(&mut self, map: &Map, runtime: &dyn EntityRuntime) {
        self.redo.clear();
        if self.undo.len() >= CAPACITY {
            self.undo.pop_front();
        }
        self.undo.push_back(capture(map, runtime));
    }

    /// Restores the top of the undo stack, pushing the current state to
    /// redo first. A no-op (returns `false`) on an empty undo stack.
    pub fn undo(&mut self, map: &mut Map, runtime: &mut dyn EntityRuntime) -> bool {
        let state = match self.undo.pop_back() {
            Some(s) => s,
            None => return false,
        };
        if self.redo.len() >= CAPACITY {
            self.redo.pop_front();
        }
        self.redo.push_back(capture(map, runtime));

        map.restore(&state.map);
        restore_entities(&state.entities, runtime);
        true
    }

    /// Symmetric to [`UndoStack::undo`].
    pub fn redo(&mut self, map: &mut Map, runtime: &mut dyn EntityRuntime) -> bool {
        let state = match self.redo.pop_back() {
            Some(s) => s,
            None => return false,
        };
        if self.undo.len() >= CAPACITY {
            self.undo.pop_front();
        }
        self.undo.push_back(capture(map, runtime));

        map.restore(&state.map);
        restore_entities(&state.entities, runtime);
        true
    }

    /// Drops all history, freeing every snapshot. Used on map swap.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use map::{Point, Sector, Vec3, Wall};

    #[derive(Default)]
    struct FakeRuntime {
        entities: Vec<EntitySnapshot>,
        next_id: u32,
    }

    impl EntityRuntime for FakeRuntime {
        fn enumerate(&self) -> Vec<EntitySnapshot> {
            self.entities.clone()
        }
        fn spawn(&mut self, script_path: &str, position: Vec3, yaw: f32) -> u32 {
            let id = self.next_id;
            self.next_id += 1;
            self.entities.push(EntitySnapshot {
                id,
                position,
                yaw,
                script_path: script_path.to_string(),
            });
            id
        }
        fn spawn_with_id(&mut self, id: u32, script_path: &str, position: Vec3, yaw: f32) {
            self.entities.push(EntitySnapshot {
                id,
                position,
                yaw,
                script_path: script_path.to_string(),
            });
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
        fn set_next_id(&mut self, next_id: u32) {
            self.next_id = next_id;
        }
        fn max_slots(&self) -> u32 {
            64
        }
        fn tick(&mut self, _dt: f32) {}
    }

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
    fn undo_on_empty_stack_is_noop() {
        let mut map = single_room();
        let mut rt = FakeRuntime::default();
        let mut stack = UndoStack::new();
        assert!(!stack.undo(&mut map, &mut rt));
    }

    #[test]
    fn apply_then_undo_restores_original() {
        let original = single_room();
        let mut map = original.clone();
        let mut rt = FakeRuntime::default();
        let mut stack = UndoStack::new();

        stack.push_state(&map, &rt);
        map.points_mut()[1] = Point::new(5.0, 0.0);
        assert_ne!(map, original);

        assert!(stack.undo(&mut map, &mut rt));
        assert_eq!(map, original);
    }

    #[test]
    fn undo_then_redo_reapplies_the_edit() {
        let original = single_room();
        let mut map = original.clone();
        let mut rt = FakeRuntime::default();
        let mut stack = UndoStack::new();

        stack.push_state(&map, &rt);
        map.points_mut()[1] = Point::new(5.0, 0.0);
        let edited = map.clone();

        stack.undo(&mut map, &mut rt);
        assert_eq!(map, original);

        assert!(stack.redo(&mut map, &mut rt));
        assert_eq!(map, edited);
    }

    #[test]
    fn push_clears_redo_stack() {
        let mut map = single_room();
        let mut rt = FakeRuntime::default();
        let mut stack = UndoStack::new();

        stack.push_state(&map, &rt);
        map.push_point(Point::new(9.0, 9.0));
        stack.undo(&mut map, &mut rt);
        assert!(stack.can_redo());

        stack.push_state(&map, &rt);
        assert!(!stack.can_redo());
    }

    #[test]
    fn dropped_oldest_entry_when_capacity_exceeded() {
        let mut map = single_room();
        let mut rt = FakeRuntime::default();
        let mut stack = UndoStack::new();
        for i in 0..(CAPACITY + 5) {
            stack.push_state(&map, &rt);
            map.points_mut()[0] = Point::new(i as f32, 0.0);
        }
        assert_eq!(stack.undo.len(), CAPACITY);
    }

    #[test]
    fn entity_restore_spawns_missing_and_destroys_extra() {
        let mut rt = FakeRuntime::default();
        let a = rt.spawn("monster.lua", Vec3::new(0.0, 0.0, 0.0), 0.0);
        let snapshot = vec![EntitySnapshot {
            id: 42,
            position: Vec3::new(1.0, 2.0, 3.0),
            yaw: 1.0,
            script_path: "torch.lua".to_string(),
        }];
        restore_entities(&snapshot, &mut rt);
        assert!(rt.get_position(a).is_none());
        assert_eq!(rt.get_position(42), Some((Vec3::new(1.0, 2.0, 3.0), 1.0)));
        assert_eq!(rt.next_id, 43);
    }
}
