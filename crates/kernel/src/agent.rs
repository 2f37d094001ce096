use pathworld_common::TerrainType;
use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// Movement profile: traversal speed on each terrain type.
///
/// Indexed by `TerrainType::index()`. A speed of 0 marks the terrain as
/// impassable for the agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Navigation {
    pub speed: [f32; TerrainType::COUNT],
}

impl Navigation {
    pub fn new(speed: [f32; TerrainType::COUNT]) -> Self {
        Self { speed }
    }

    /// Same speed on every terrain type.
    pub fn uniform(speed: f32) -> Self {
        Self {
            speed: [speed; TerrainType::COUNT],
        }
    }

    /// Speed on the given terrain type.
    pub fn speed(&self, kind: TerrainType) -> f32 {
        self.speed[kind.index()]
    }

    /// Check every speed is finite and non-negative.
    pub fn validate(&self) -> Result<(), AgentError> {
        for kind in TerrainType::ALL {
            let speed = self.speed(kind);
            if !(speed.is_finite() && speed >= 0.0) {
                return Err(AgentError::InvalidSpeed {
                    terrain: kind,
                    speed,
                });
            }
        }
        Ok(())
    }
}

/// An agent moving through the world. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    navigation: Navigation,
}

impl Agent {
    pub fn new(navigation: Navigation) -> Self {
        Self { navigation }
    }

    /// Per-terrain speed table.
    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_lookup_by_terrain() {
        let nav = Navigation::new([80.0, 60.0, 50.0, 30.0, 20.0, 40.0, 45.0]);
        assert_eq!(nav.speed(TerrainType::Ocean), 80.0);
        assert_eq!(nav.speed(TerrainType::Forest), 50.0);
        assert_eq!(nav.speed(TerrainType::Rock), 45.0);
        assert!(nav.validate().is_ok());
    }

    #[test]
    fn zero_speed_is_allowed() {
        let mut nav = Navigation::uniform(10.0);
        nav.speed[TerrainType::Ocean.index()] = 0.0;
        assert!(nav.validate().is_ok());
    }

    #[test]
    fn negative_or_nan_speed_is_rejected() {
        let mut nav = Navigation::uniform(10.0);
        nav.speed[TerrainType::Clay.index()] = -1.0;
        assert_eq!(
            nav.validate(),
            Err(AgentError::InvalidSpeed {
                terrain: TerrainType::Clay,
                speed: -1.0
            })
        );

        let mut nav = Navigation::uniform(10.0);
        nav.speed[TerrainType::Sand.index()] = f32::NAN;
        assert!(nav.validate().is_err());
    }

    #[test]
    fn navigation_loads_from_json() {
        let nav: Navigation =
            serde_json::from_str(r#"{ "speed": [80, 60, 50, 30, 20, 40, 40] }"#).unwrap();
        assert_eq!(nav.speed(TerrainType::Swamp), 60.0);

        let agent = Agent::new(nav);
        assert_eq!(agent.navigation().speed(TerrainType::Limestone), 20.0);
    }
}
