//! Built-in maps: playfield bounds and the waypoint polyline enemies follow.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::enums::Theme;

/// Playfield width in map units.
pub const PLAYFIELD_WIDTH: f64 = 800.0;

/// Playfield height in map units.
pub const PLAYFIELD_HEIGHT: f64 = 600.0;

/// A playable map. Enemies enter at the first waypoint and leak at the last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDefinition {
    pub theme: Theme,
    pub width: f64,
    pub height: f64,
    pub waypoints: Vec<DVec2>,
}

impl MapDefinition {
    /// The built-in map for a theme.
    pub fn for_theme(theme: Theme) -> Self {
        let points: &[(f64, f64)] = match theme {
            Theme::Meadow => &[
                (0.0, 60.0),
                (220.0, 60.0),
                (220.0, 300.0),
                (540.0, 300.0),
                (540.0, 140.0),
                (740.0, 140.0),
                (740.0, 460.0),
                (300.0, 460.0),
                (300.0, 600.0),
            ],
            Theme::Desert => &[
                (0.0, 300.0),
                (140.0, 300.0),
                (140.0, 100.0),
                (420.0, 100.0),
                (420.0, 500.0),
                (660.0, 500.0),
                (660.0, 300.0),
                (800.0, 300.0),
            ],
            Theme::Tundra => &[
                (60.0, 0.0),
                (60.0, 540.0),
                (380.0, 540.0),
                (380.0, 60.0),
                (700.0, 60.0),
                (700.0, 600.0),
            ],
        };

        Self {
            theme,
            width: PLAYFIELD_WIDTH,
            height: PLAYFIELD_HEIGHT,
            waypoints: points.iter().map(|&(x, y)| DVec2::new(x, y)).collect(),
        }
    }

    /// Entry point for freshly spawned enemies.
    pub fn spawn_point(&self) -> DVec2 {
        self.waypoints.first().copied().unwrap_or_default()
    }

    /// True if `p` lies inside the playfield rectangle (edges inclusive).
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x <= self.width && p.y <= self.height
    }

    /// Total length of the path polyline.
    pub fn path_length(&self) -> f64 {
        self.waypoints
            .windows(2)
            .map(|seg| seg[0].distance(seg[1]))
            .sum()
    }
}

impl Default for MapDefinition {
    fn default() -> Self {
        Self::for_theme(Theme::default())
    }
}
