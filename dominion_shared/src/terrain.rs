//! Terrain classification.
//!
//! Terrain at a point is derived from the elevation and forest-density
//! fields, never stored per cell. Forest wins whenever the forest density
//! exceeds its threshold; otherwise the highest elevation threshold that the
//! sampled elevation exceeds decides.

use serde::{Deserialize, Serialize};

/// Terrain kinds, ordered by elevation threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainKind {
    Water,
    Forest,
    Plains,
    Hill,
    Mountain,
}

/// Classification order: highest threshold wins, forest excluded (it is
/// decided by density, not elevation).
const BY_ELEVATION_DESC: [TerrainKind; 4] = [
    TerrainKind::Mountain,
    TerrainKind::Hill,
    TerrainKind::Plains,
    TerrainKind::Water,
];

impl TerrainKind {
    /// Elevation threshold (forest: density threshold).
    pub const fn threshold(self) -> f32 {
        match self {
            TerrainKind::Water => -0.1,
            TerrainKind::Forest => 0.5,
            TerrainKind::Plains => 0.1,
            TerrainKind::Hill => 0.7,
            TerrainKind::Mountain => 0.83,
        }
    }

    pub const fn attack_mult(self) -> f32 {
        match self {
            TerrainKind::Water => 0.5,
            TerrainKind::Forest => 0.75,
            TerrainKind::Plains => 1.0,
            TerrainKind::Hill => 1.5,
            TerrainKind::Mountain => 0.0,
        }
    }

    pub const fn speed_mult(self) -> f32 {
        match self {
            TerrainKind::Water => 0.6,
            TerrainKind::Forest => 0.8,
            TerrainKind::Plains => 1.0,
            TerrainKind::Hill => 0.7,
            TerrainKind::Mountain => 3.0,
        }
    }

    /// Mountains block movement but not occupancy resolution.
    pub const fn passable(self) -> bool {
        !matches!(self, TerrainKind::Mountain)
    }

    /// Resolves the terrain at a point from sampled elevation and forest
    /// density.
    pub fn classify(elevation: f32, forest: f32) -> TerrainKind {
        if forest > TerrainKind::Forest.threshold() {
            return TerrainKind::Forest;
        }
        for kind in BY_ELEVATION_DESC {
            if elevation > kind.threshold() {
                return kind;
            }
        }
        TerrainKind::Water
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forest_density_overrides_elevation() {
        assert_eq!(TerrainKind::classify(0.3, 0.9), TerrainKind::Forest);
        assert_eq!(TerrainKind::classify(0.3, 0.5), TerrainKind::Plains);
    }

    #[test]
    fn elevation_bands() {
        assert_eq!(TerrainKind::classify(0.05, 0.0), TerrainKind::Water);
        assert_eq!(TerrainKind::classify(0.3, 0.0), TerrainKind::Plains);
        assert_eq!(TerrainKind::classify(0.75, 0.0), TerrainKind::Hill);
        assert_eq!(TerrainKind::classify(0.9, 0.0), TerrainKind::Mountain);
    }

    #[test]
    fn mountain_is_impassable() {
        assert!(!TerrainKind::Mountain.passable());
        assert!(TerrainKind::Water.passable());
    }
}
