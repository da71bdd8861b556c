/// Which editing tool is active. Only `Select` is specified in the core;
/// `Sector` and `Entity` are the creation tools the spec treats as future
/// extensions, kept here so callers have somewhere to switch into them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Select,
    Sector,
    Entity,
}

/// What is currently selected. `render::d2::Overlay` splits this back out
/// into its four `Option` fields when handed to the 2D renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Entity(usize),
    Point(u32),
    Wall(u32),
    Sector(u32),
}

impl Selection {
    pub fn entity(self) -> Option<usize> {
        match self {
            Selection::Entity(i) => Some(i),
            _ => None,
        }
    }

    pub fn point(self) -> Option<u32> {
        match self {
            Selection::Point(i) => Some(i),
            _ => None,
        }
    }

    pub fn wall(self) -> Option<u32> {
        match self {
            Selection::Wall(i) => Some(i),
            _ => None,
        }
    }

    pub fn sector(self) -> Option<u32> {
        match self {
            Selection::Sector(i) => Some(i),
            _ => None,
        }
    }
}
