use serde::{Deserialize, Serialize};

/// Identifier for a target or fireball inside one arena.
///
/// Ids are handed out by a monotonically increasing counter, so ordering by
/// id is ordering by creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl EntityId {
    /// The id that follows this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Texture handle carried by drawable entities.
///
/// The renderer owns the actual images; the simulation only records which
/// one an entity wears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Skin {
    Gold,
    Lava,
}

impl Skin {
    pub const ALL: [Skin; 2] = [Skin::Gold, Skin::Lava];

    pub fn name(self) -> &'static str {
        match self {
            Skin::Gold => "gold",
            Skin::Lava => "lava",
        }
    }
}
