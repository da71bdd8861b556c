//! The on-disk Map JSON contract (see the engine crate for the loader that
//! resolves texture paths to handles and spawns entities through the
//! `EntityRuntime` collaborator).
//!
//! This module only knows about the wire shape; it has no opinion about how
//! texture paths get turned into handles, which keeps `map` free of any
//! dependency on the platform collaborator traits.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawWall {
    pub p1: u32,
    pub p2: u32,
    #[serde(default = "default_none_index")]
    pub portal: i32,
    #[serde(default = "default_none_index")]
    pub tex: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSector {
    pub floor_height: f32,
    pub ceil_height: f32,
    #[serde(default = "default_none_index")]
    pub floor_tex: i32,
    #[serde(default = "default_none_index")]
    pub ceil_tex: i32,
    pub walls: Vec<RawWall>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTexture {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEntity {
    pub script: String,
    pub pos: [f32; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RawMap {
    pub points: Vec<[f32; 2]>,
    pub sectors: Vec<RawSector>,
    #[serde(default)]
    pub textures: Vec<RawTexture>,
    #[serde(default)]
    pub entities: Vec<RawEntity>,
}

fn default_none_index() -> i32 {
    -1
}

impl RawMap {
    pub fn from_str(text: &str) -> Result<Self, crate::Error> {
        serde_json::from_str(text).map_err(crate::Error::Json)
    }

    pub fn to_string_pretty(&self) -> Result<String, crate::Error> {
        serde_json::to_string_pretty(self).map_err(crate::Error::Json)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_single_room() {
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
        assert_eq!(raw.points.len(), 4);
        assert_eq!(raw.sectors[0].walls.len(), 4);
    }
}
