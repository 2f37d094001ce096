//! Edge cost functions for path search.
//!
//! Agent-aware cost is traversal time: edge length over the mean of the two
//! endpoint speeds, scaled by the height change between the endpoints.

use pathworld_common::Terrain;

use crate::agent::Agent;
use crate::graph::{EdgeInfo, TerrainGraph};

/// Height difference (world units) that doubles or halves traversal time.
pub const HEIGHT_SCALE: f32 = 1000.0;
/// Lower clamp of the height factor (steep descent).
pub const MIN_HEIGHT_FACTOR: f32 = 0.5;
/// Upper clamp of the height factor (steep climb).
pub const MAX_HEIGHT_FACTOR: f32 = 2.0;

/// Which cost an edge carries during search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightMode {
    /// Traversal time for a specific agent.
    AgentAware,
    /// Stored edge distance, ignoring the agent.
    RawDistance,
}

impl WeightMode {
    /// Map the `speed_mode` flag: `true` selects raw distance.
    pub fn from_speed_mode(speed_mode: bool) -> Self {
        if speed_mode {
            WeightMode::RawDistance
        } else {
            WeightMode::AgentAware
        }
    }

    pub fn weight(self, graph: &TerrainGraph, agent: &Agent, edge: &EdgeInfo) -> f32 {
        match self {
            WeightMode::AgentAware => agent_weight(graph, agent, edge),
            WeightMode::RawDistance => distance_weight(edge),
        }
    }
}

/// Multiplier for moving from `from` to `to`: climbing costs more,
/// descending less, clamped to `[0.5, 2.0]`.
pub fn height_factor(from: &Terrain, to: &Terrain) -> f32 {
    ((HEIGHT_SCALE + to.height - from.height) / HEIGHT_SCALE)
        .clamp(MIN_HEIGHT_FACTOR, MAX_HEIGHT_FACTOR)
}

/// Traversal time of `edge` for `agent`.
///
/// Returns `f32::INFINITY` when either endpoint terrain is impassable
/// (speed 0) for the agent.
///
/// # Panics
/// Panics if either endpoint speed is negative.
pub fn agent_weight(graph: &TerrainGraph, agent: &Agent, edge: &EdgeInfo) -> f32 {
    let from = &graph.node(edge.from).terrain;
    let to = &graph.node(edge.to).terrain;
    let nav = agent.navigation();
    let from_speed = nav.speed(from.kind);
    let to_speed = nav.speed(to.kind);
    assert!(
        from_speed >= 0.0 && to_speed >= 0.0,
        "agent speed must be non-negative ({} on {}, {} on {})",
        from_speed,
        from.kind,
        to_speed,
        to.kind
    );
    if from_speed == 0.0 || to_speed == 0.0 {
        return f32::INFINITY;
    }

    let mean = (from_speed + to_speed) * 0.5;
    edge.distance / mean * height_factor(from, to)
}

/// Stored length of `edge`, unmodified.
pub fn distance_weight(edge: &EdgeInfo) -> f32 {
    edge.distance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Navigation;
    use crate::graph::WalkTerrain;
    use glam::Vec2;
    use pathworld_common::{NodeId, SimplePolygon, TerrainType};

    fn two_nodes(a: Terrain, b: Terrain, distance: f32) -> (TerrainGraph, EdgeInfo) {
        let mut g = TerrainGraph::new();
        for (i, terrain) in [a, b].into_iter().enumerate() {
            g.add_node(WalkTerrain {
                terrain,
                centroid: Vec2::new(i as f32 * distance, 0.0),
                polygon: SimplePolygon::default(),
                subgraph_id: 1,
            });
        }
        let (fwd, _) = g.add_edge_pair(NodeId(0), NodeId(1), distance);
        let edge = *g.edge(fwd);
        (g, edge)
    }

    fn forest_agent() -> Agent {
        let mut nav = Navigation::uniform(10.0);
        nav.speed[TerrainType::Forest.index()] = 50.0;
        Agent::new(nav)
    }

    #[test]
    fn flat_forest_edge_takes_distance_over_speed() {
        let forest = Terrain::new(TerrainType::Forest, 0.0);
        let (g, edge) = two_nodes(forest, forest, 10.0);
        assert_eq!(agent_weight(&g, &forest_agent(), &edge), 0.2);
    }

    #[test]
    fn raw_distance_is_identity() {
        let (g, edge) = two_nodes(
            Terrain::new(TerrainType::Forest, 0.0),
            Terrain::new(TerrainType::Rock, 300.0),
            10.0,
        );
        assert_eq!(distance_weight(&edge), 10.0);
        assert_eq!(WeightMode::RawDistance.weight(&g, &forest_agent(), &edge), 10.0);
    }

    #[test]
    fn speed_mode_flag_mapping() {
        assert_eq!(WeightMode::from_speed_mode(true), WeightMode::RawDistance);
        assert_eq!(WeightMode::from_speed_mode(false), WeightMode::AgentAware);
    }

    #[test]
    fn mean_speed_of_mixed_terrain() {
        let (g, edge) = two_nodes(
            Terrain::new(TerrainType::Forest, 0.0),
            Terrain::new(TerrainType::Sand, 0.0),
            30.0,
        );
        // (50 + 10) / 2 = 30
        assert_eq!(agent_weight(&g, &forest_agent(), &edge), 1.0);
    }

    #[test]
    fn height_factor_is_clamped() {
        let low = Terrain::new(TerrainType::Sand, 0.0);
        assert_eq!(height_factor(&low, &Terrain::new(TerrainType::Sand, 500.0)), 1.5);
        assert_eq!(height_factor(&low, &Terrain::new(TerrainType::Sand, 5000.0)), 2.0);
        assert_eq!(height_factor(&low, &Terrain::new(TerrainType::Sand, -250.0)), 0.75);
        assert_eq!(height_factor(&low, &Terrain::new(TerrainType::Sand, -5000.0)), 0.5);
    }

    #[test]
    fn climbing_costs_more_than_descending() {
        let agent = Agent::new(Navigation::uniform(10.0));
        let (g, up) = two_nodes(
            Terrain::new(TerrainType::Clay, 0.0),
            Terrain::new(TerrainType::Clay, 400.0),
            100.0,
        );
        let down = EdgeInfo {
            from: up.to,
            to: up.from,
            distance: up.distance,
        };
        let up_cost = agent_weight(&g, &agent, &up);
        let down_cost = agent_weight(&g, &agent, &down);
        assert!(up_cost > down_cost);
        assert!(up_cost <= 100.0 / 10.0 * MAX_HEIGHT_FACTOR);
        assert!(down_cost >= 100.0 / 10.0 * MIN_HEIGHT_FACTOR);
    }

    #[test]
    fn weight_grows_with_distance() {
        let agent = forest_agent();
        let forest = Terrain::new(TerrainType::Forest, 10.0);
        let mut last = 0.0;
        for d in [1.0, 2.0, 8.0, 64.0] {
            let (g, edge) = two_nodes(forest, forest, d);
            let w = agent_weight(&g, &agent, &edge);
            assert!(w > last);
            last = w;
        }
    }

    #[test]
    fn zero_speed_is_impassable() {
        let mut nav = Navigation::uniform(10.0);
        nav.speed[TerrainType::Swamp.index()] = 0.0;
        let (g, edge) = two_nodes(
            Terrain::new(TerrainType::Sand, 0.0),
            Terrain::new(TerrainType::Swamp, 0.0),
            5.0,
        );
        assert_eq!(agent_weight(&g, &Agent::new(nav), &edge), f32::INFINITY);
    }

    #[test]
    #[should_panic(expected = "non-negative")]
    fn negative_speed_panics() {
        let (g, edge) = two_nodes(
            Terrain::new(TerrainType::Sand, 0.0),
            Terrain::new(TerrainType::Sand, 0.0),
            5.0,
        );
        agent_weight(&g, &Agent::new(Navigation::uniform(-1.0)), &edge);
    }
}
