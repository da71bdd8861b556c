//! The default in-process `EntityRuntime` used when no scripting host is
//! wired in (SPEC_FULL §4.4): a fixed-capacity slot table, grounded on
//! `original_source/src/game/entity.c`'s static `MAX_ENTITIES` array, just
//! expressed as a `Vec<Option<Slot>>` instead of a raw C array.

use map::{EntitySnapshot, Vec3};
use platform::EntityRuntime;

const DEFAULT_MAX_SLOTS: usize = 256;

#[derive(Debug, Clone)]
struct Slot {
    id: u32,
    position: Vec3,
    yaw: f32,
    script_path: String,
}

/// A fixed-capacity entity table with no scripting behind it: `tick` is a
/// no-op, since there is no script to advance. Spawns beyond capacity are
/// refused (`spawn` returns `u32::MAX`), matching the "never abort" policy
/// asset/runtime failures get elsewhere in this engine.
pub struct SlotTable {
    slots: Vec<Option<Slot>>,
    next_id: u32,
}

impl SlotTable {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_SLOTS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { slots: vec![None; capacity], next_id: 0 }
    }

    fn free_index(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }
}

impl Default for SlotTable {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRuntime for SlotTable {
    fn enumerate(&self) -> Vec<EntitySnapshot> {
        self.slots
            .iter()
            .filter_map(|slot| slot.as_ref())
            .map(|slot| EntitySnapshot {
                id: slot.id,
                position: slot.position,
                yaw: slot.yaw,
                script_path: slot.script_path.clone(),
            })
            .collect()
    }

    fn spawn(&mut self, script_path: &str, position: Vec3, yaw: f32) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.spawn_with_id(id, script_path, position, yaw);
        id
    }

    fn spawn_with_id(&mut self, id: u32, script_path: &str, position: Vec3, yaw: f32) {
        match self.free_index() {
            Some(index) => {
                self.slots[index] = Some(Slot { id, position, yaw, script_path: script_path.to_string() });
            }
            None => log::warn!("entity slot table full ({} slots); dropping spawn of {}", self.slots.len(), script_path),
        }
    }

    fn set_position(&mut self, id: u32, position: Vec3, yaw: f32) {
        if let Some(slot) = self.slots.iter_mut().flatten().find(|slot| slot.id == id) {
            slot.position = position;
            slot.yaw = yaw;
        }
    }

    fn get_position(&self, id: u32) -> Option<(Vec3, f32)> {
        self.slots.iter().flatten().find(|slot| slot.id == id).map(|slot| (slot.position, slot.yaw))
    }

    fn destroy(&mut self, id: u32) {
        if let Some(slot) = self.slots.iter_mut().find(|slot| slot.as_ref().map_or(false, |s| s.id == id)) {
            *slot = None;
        }
    }

    fn set_next_id(&mut self, next_id: u32) {
        self.next_id = next_id;
    }

    fn max_slots(&self) -> u32 {
        self.slots.len() as u32
    }

    fn tick(&mut self, _dt: f32) {}
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn spawn_and_enumerate_round_trips() {
        let mut table = SlotTable::new();
        let id = table.spawn("scripts/torch.lua", Vec3::new(1.0, 2.0, 3.0), 0.5);
        let entities = table.enumerate();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].id, id);
    }

    #[test]
    fn destroy_frees_the_slot_for_reuse() {
        let mut table = SlotTable::with_capacity(1);
        let id = table.spawn("a", Vec3::default(), 0.0);
        table.destroy(id);
        assert!(table.enumerate().is_empty());
        let reused = table.spawn("c", Vec3::default(), 0.0);
        assert_eq!(table.enumerate().len(), 1);
        assert_ne!(reused, id);
    }

    #[test]
    fn spawn_beyond_capacity_is_dropped_not_fatal() {
        let mut table = SlotTable::with_capacity(1);
        table.spawn("a", Vec3::default(), 0.0);
        table.spawn("b", Vec3::default(), 0.0);
        assert_eq!(table.enumerate().len(), 1);
    }

    #[test]
    fn spawn_with_id_is_used_by_undo_restore() {
        let mut table = SlotTable::new();
        table.spawn_with_id(42, "scripts/torch.lua", Vec3::default(), 0.0);
        assert!(table.get_position(42).is_some());
    }
}
