//! Turns Map JSON text into a live `Map`, resolving texture paths and
//! spawning entities through the platform collaborators (SPEC_FULL §4.2).

use map::json::RawMap;
use map::{Map, TextureHandle};
use platform::{EntityRuntime, TextureStore};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed map JSON: {0}")]
    Json(#[from] map::Error),
}

/// Loads `text` into a `Map`, registering its textures with `textures` and
/// spawning its entities through `entities`. A texture or script that fails
/// to resolve is skipped with a warning rather than failing the whole load
/// (spec §7 "asset-missing: logged, substituted with a safe fallback").
pub fn load_map(
    text: &str,
    textures: &mut dyn TextureStore,
    entities: &mut dyn EntityRuntime,
) -> Result<Map, Error> {
    let raw = RawMap::from_str(text).map_err(Error::Json)?;

    let handles: Vec<Option<TextureHandle>> = raw
        .textures
        .iter()
        .map(|t| {
            textures.load(&t.path).or_else(|| {
                log::warn!("failed to load texture '{}', falling back to flat gray", t.path);
                None
            })
        })
        .collect();

    let map = Map::from_raw(&raw, |index| handles.get(index).copied().flatten())?;

    for entity in &raw.entities {
        let position = map::Vec3::new(entity.pos[0], entity.pos[1], entity.pos[2]);
        entities.spawn(&entity.script, position, 0.0);
    }

    Ok(map)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::entity::SlotTable;
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

    #[test]
    fn loads_single_room_and_spawns_entities() {
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
            }],
            "entities": [{"script": "scripts/torch.lua", "pos": [2.0, 2.0, 0.0]}]
        }"#;
        let mut textures = NoTextures;
        let mut runtime = SlotTable::new();
        let map = load_map(text, &mut textures, &mut runtime).unwrap();
        assert_eq!(map.sectors().len(), 1);
        assert_eq!(runtime.enumerate().len(), 1);
    }

    #[test]
    fn malformed_json_is_rejected() {
        let mut textures = NoTextures;
        let mut runtime = SlotTable::new();
        assert!(load_map("not json", &mut textures, &mut runtime).is_err());
    }
}
