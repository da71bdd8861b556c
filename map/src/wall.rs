use crate::texture::TextureHandle;

/// A directed edge `p1 -> p2` between two point indices.
///
/// A solid wall has `next_sector = None`. A portal wall has `next_sector =
/// Some(sector)`, and the renderer recurses through it. `texture` is the
/// full-height face used on solid walls; `top_texture`/`bottom_texture` fill
/// the step above/below a portal opening when neighbor heights differ.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Wall {
    pub p1: u32,
    pub p2: u32,
    pub next_sector: Option<u32>,
    pub texture: Option<TextureHandle>,
    pub top_texture: Option<TextureHandle>,
    pub bottom_texture: Option<TextureHandle>,
}

impl Wall {
    pub fn solid(p1: u32, p2: u32, texture: Option<TextureHandle>) -> Self {
        Self {
            p1,
            p2,
            next_sector: None,
            texture,
            top_texture: None,
            bottom_texture: None,
        }
    }

    pub fn portal(
        p1: u32,
        p2: u32,
        next_sector: u32,
        top_texture: Option<TextureHandle>,
        bottom_texture: Option<TextureHandle>,
    ) -> Self {
        Self {
            p1,
            p2,
            next_sector: Some(next_sector),
            texture: None,
            top_texture,
            bottom_texture,
        }
    }

    pub fn is_portal(&self) -> bool {
        self.next_sector.is_some()
    }

    /// True if this wall shares at least one point index with `other`.
    ///
    /// Neighboring walls are expected to touch, so geometry checks (segment
    /// crossing, foreign-point containment) must not treat the shared vertex
    /// as a collision.
    pub fn is_neighbor(&self, other: &Wall) -> bool {
        self.p1 == other.p1 || self.p1 == other.p2 || self.p2 == other.p1 || self.p2 == other.p2
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn neighbor_detection() {
        let a = Wall::solid(0, 1, None);
        let b = Wall::solid(1, 2, None);
        let c = Wall::solid(2, 3, None);
        assert!(a.is_neighbor(&b));
        assert!(!a.is_neighbor(&c));
    }
}
