use crate::point::Vec3;

/// A script-driven actor. The core only ever sees entities through their
/// snapshot: the `EntityRuntime` collaborator (see the `platform` crate)
/// owns the live scripted instances.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EntitySnapshot {
    pub id: u32,
    pub position: Vec3,
    pub yaw: f32,
    pub script_path: String,
}
