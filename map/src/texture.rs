/// An opaque reference to a texture owned by an external `TextureStore`.
///
/// The core never inspects pixels directly; `None` means "untextured" and
/// renderers fall back to a flat gray.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TextureHandle(pub u32);
