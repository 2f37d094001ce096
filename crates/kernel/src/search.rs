// Heuristic-guided best-path search over the terrain graph.
//
// A* in tree form: no closed set, a node is re-expanded whenever a cheaper
// path to it is found. The open set is a `BinaryHeap` (min-heap via reversed
// ordering); stale entries left behind by a cost improvement are skipped on
// pop. Costs and predecessors live in `Vec`s indexed by `NodeId`.
//
// The search stops as soon as the goal is popped. Every node starts as its
// own predecessor, so the start is the only root of the predecessor tree.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use pathworld_common::{NodeId, Point, dot};

use crate::agent::Agent;
use crate::error::QueryError;
use crate::graph::{EdgeInfo, TerrainGraph};
use crate::weight::WeightMode;

/// Predecessor tree left by a search that reached its goal.
#[derive(Clone, Debug)]
pub struct SearchTree {
    /// `predecessors[v]` is the node `v` was reached from; the start (and any
    /// node never reached) is its own predecessor.
    pub predecessors: Vec<NodeId>,
    /// Cost of the best known path to the goal.
    pub goal_cost: f32,
    /// Number of nodes popped from the open set.
    pub expanded: usize,
}

impl SearchTree {
    /// Nodes from `goal` back to the root of the tree, goal first.
    pub fn walk_back(&self, goal: NodeId) -> Vec<NodeId> {
        let mut nodes = Vec::new();
        let mut v = goal;
        loop {
            nodes.push(v);
            let prev = self.predecessors[v.index()];
            if prev == v {
                break;
            }
            v = prev;
        }
        nodes
    }
}

/// A route found between two regions.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    /// Visited nodes in goal-to-start order.
    pub nodes: Vec<NodeId>,
    /// Total cost under the weight function used.
    pub cost: f32,
    /// Nodes expanded by the search.
    pub expanded: usize,
}

impl Route {
    /// Region centroids along the route, goal first.
    pub fn waypoints(&self, graph: &TerrainGraph) -> Vec<Point> {
        self.nodes.iter().map(|&n| graph.node(n).centroid).collect()
    }
}

/// Entry in the open set (min-heap via reversed ordering).
struct Frontier {
    node: NodeId,
    /// Cost from start when the entry was pushed.
    g_score: f32,
    f_score: f32,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap: smallest f_score is "greatest".
        other
            .f_score
            .total_cmp(&self.f_score)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Run A* from `start` until `goal` is popped.
///
/// `weight` gives the cost of each directed edge (never negative; an
/// infinite weight makes the edge unusable) and `heuristic` the estimate for
/// a node. Returns `None` when the open set empties without reaching `goal`.
pub fn astar<W, H>(
    graph: &TerrainGraph,
    start: NodeId,
    goal: NodeId,
    mut weight: W,
    mut heuristic: H,
) -> Option<SearchTree>
where
    W: FnMut(&EdgeInfo) -> f32,
    H: FnMut(NodeId) -> f32,
{
    let n = graph.node_count();
    let mut g_score = vec![f32::INFINITY; n];
    let mut predecessors: Vec<NodeId> = graph.node_ids().collect();
    let mut expanded = 0;

    g_score[start.index()] = 0.0;
    let mut open = BinaryHeap::new();
    open.push(Frontier {
        node: start,
        g_score: 0.0,
        f_score: heuristic(start),
    });

    while let Some(current) = open.pop() {
        let u = current.node;
        let current_g = g_score[u.index()];
        if current.g_score > current_g {
            continue;
        }
        expanded += 1;

        if u == goal {
            return Some(SearchTree {
                predecessors,
                goal_cost: current_g,
                expanded,
            });
        }

        for edge in graph.out_edges(u) {
            let w = weight(edge);
            debug_assert!(w >= 0.0, "negative edge weight {w} on {u} -> {}", edge.to);
            let tentative = current_g + w;
            let v = edge.to.index();
            if tentative < g_score[v] {
                g_score[v] = tentative;
                predecessors[v] = u;
                open.push(Frontier {
                    node: edge.to,
                    g_score: tentative,
                    f_score: tentative + heuristic(edge.to),
                });
            }
        }
    }

    None
}

/// Dot product of a node's centroid with the goal centroid.
///
/// Not an admissible distance estimate; it is kept because route choices
/// and costs on existing worlds depend on it.
pub fn centroid_dot_heuristic(graph: &TerrainGraph, node: NodeId, goal: Point) -> f32 {
    dot(graph.node(node).centroid, goal)
}

/// Best route from `from` to `to` with caller-supplied cost functions.
///
/// Regions in different subgraphs are rejected with `NoPath` before any
/// search work, so neither `weight` nor `heuristic` is called.
///
/// # Panics
/// Panics if either id is out of range or either region has subgraph id 0.
pub fn compute_route_with<W, H>(
    graph: &TerrainGraph,
    from: NodeId,
    to: NodeId,
    weight: W,
    heuristic: H,
) -> Result<Route, QueryError>
where
    W: FnMut(&EdgeInfo) -> f32,
    H: FnMut(NodeId) -> f32,
{
    let start = graph.node(from);
    let goal = graph.node(to);
    assert!(
        start.subgraph_id != 0 && goal.subgraph_id != 0,
        "path query on a region with subgraph id 0 ({from}: {}, {to}: {})",
        start.subgraph_id,
        goal.subgraph_id
    );

    if start.subgraph_id != goal.subgraph_id {
        tracing::debug!(
            %from,
            %to,
            from_subgraph = start.subgraph_id,
            to_subgraph = goal.subgraph_id,
            "regions in different subgraphs"
        );
        return Err(QueryError::NoPath { from, to });
    }

    match astar(graph, from, to, weight, heuristic) {
        Some(tree) => {
            let nodes = tree.walk_back(to);
            tracing::trace!(
                %from,
                %to,
                hops = nodes.len(),
                expanded = tree.expanded,
                cost = tree.goal_cost,
                "route found"
            );
            Ok(Route {
                nodes,
                cost: tree.goal_cost,
                expanded: tree.expanded,
            })
        }
        None => {
            // Same subgraph yet unreachable: the subgraph labels disagree with
            // the edges, or the agent cannot cross some terrain on the way.
            tracing::warn!(
                %from,
                %to,
                subgraph = start.subgraph_id,
                "search exhausted without reaching the goal"
            );
            Err(QueryError::NoPath { from, to })
        }
    }
}

/// Best route for `agent` under the given weight mode, using the centroid
/// dot-product heuristic.
pub fn compute_route(
    graph: &TerrainGraph,
    agent: &Agent,
    from: NodeId,
    to: NodeId,
    mode: WeightMode,
) -> Result<Route, QueryError> {
    let _span = tracing::debug_span!("compute_route", %from, %to, ?mode).entered();
    let goal_centroid = graph.node(to).centroid;
    compute_route_with(
        graph,
        from,
        to,
        |edge| mode.weight(graph, agent, edge),
        |node| centroid_dot_heuristic(graph, node, goal_centroid),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Navigation;
    use crate::graph::WalkTerrain;
    use glam::Vec2;
    use pathworld_common::{SimplePolygon, Terrain, TerrainType};
    use std::cell::Cell;

    fn add(g: &mut TerrainGraph, x: f32, y: f32, kind: TerrainType, subgraph_id: u16) -> NodeId {
        g.add_node(WalkTerrain {
            terrain: Terrain::new(kind, 0.0),
            centroid: Vec2::new(x, y),
            polygon: SimplePolygon::default(),
            subgraph_id,
        })
    }

    fn walker() -> Agent {
        Agent::new(Navigation::uniform(1.0))
    }

    #[test]
    fn same_start_and_goal() {
        let mut g = TerrainGraph::new();
        let a = add(&mut g, 0.0, 0.0, TerrainType::Sand, 1);
        let route = compute_route(&g, &walker(), a, a, WeightMode::AgentAware).unwrap();
        assert_eq!(route.nodes, vec![a]);
        assert_eq!(route.cost, 0.0);
    }

    #[test]
    fn simple_chain_is_goal_first() {
        let mut g = TerrainGraph::new();
        let a = add(&mut g, 0.0, 0.0, TerrainType::Sand, 1);
        let b = add(&mut g, 5.0, 0.0, TerrainType::Sand, 1);
        let c = add(&mut g, 10.0, 0.0, TerrainType::Sand, 1);
        g.add_edge_pair(a, b, 5.0);
        g.add_edge_pair(b, c, 5.0);

        let route = compute_route(&g, &walker(), a, c, WeightMode::RawDistance).unwrap();
        assert_eq!(route.nodes, vec![c, b, a]);
        assert_eq!(route.cost, 10.0);
        assert_eq!(
            route.waypoints(&g),
            vec![Vec2::new(10.0, 0.0), Vec2::new(5.0, 0.0), Vec2::new(0.0, 0.0)]
        );
    }

    #[test]
    fn chooses_cheaper_detour() {
        let mut g = TerrainGraph::new();
        let a = add(&mut g, 0.0, 0.0, TerrainType::Sand, 1);
        let b = add(&mut g, 5.0, 1.0, TerrainType::Sand, 1);
        let c = add(&mut g, 10.0, 0.0, TerrainType::Sand, 1);
        g.add_edge_pair(a, c, 20.0);
        g.add_edge_pair(a, b, 3.0);
        g.add_edge_pair(b, c, 3.0);

        // Zero heuristic: plain Dijkstra, so the optimum is guaranteed.
        let route = compute_route_with(&g, a, c, |e| e.distance, |_| 0.0).unwrap();
        assert_eq!(route.nodes, vec![c, b, a]);
        assert_eq!(route.cost, 6.0);
    }

    #[test]
    fn agent_speeds_steer_the_route() {
        // Two ways from a to d: through swamp (short) or sand (long).
        let mut g = TerrainGraph::new();
        let a = add(&mut g, 0.0, 0.0, TerrainType::Sand, 1);
        let swamp = add(&mut g, 0.0, 0.0, TerrainType::Swamp, 1);
        let sand = add(&mut g, 0.0, 0.0, TerrainType::Sand, 1);
        let d = add(&mut g, 0.0, 0.0, TerrainType::Sand, 1);
        g.add_edge_pair(a, swamp, 10.0);
        g.add_edge_pair(swamp, d, 10.0);
        g.add_edge_pair(a, sand, 15.0);
        g.add_edge_pair(sand, d, 15.0);

        let mut nav = Navigation::uniform(10.0);
        nav.speed[TerrainType::Swamp.index()] = 1.0;
        let agent = Agent::new(nav);

        let by_time = compute_route(&g, &agent, a, d, WeightMode::AgentAware).unwrap();
        assert_eq!(by_time.nodes, vec![d, sand, a]);

        let by_length = compute_route(&g, &agent, a, d, WeightMode::RawDistance).unwrap();
        assert_eq!(by_length.nodes, vec![d, swamp, a]);
        assert_eq!(by_length.cost, 20.0);
    }

    #[test]
    fn different_subgraphs_skip_the_search() {
        let mut g = TerrainGraph::new();
        let a = add(&mut g, 0.0, 0.0, TerrainType::Sand, 1);
        let b = add(&mut g, 5.0, 0.0, TerrainType::Sand, 2);

        let heuristic_calls = Cell::new(0);
        let weight_calls = Cell::new(0);
        let result = compute_route_with(
            &g,
            a,
            b,
            |e| {
                weight_calls.set(weight_calls.get() + 1);
                e.distance
            },
            |_| {
                heuristic_calls.set(heuristic_calls.get() + 1);
                0.0
            },
        );
        assert_eq!(result, Err(QueryError::NoPath { from: a, to: b }));
        assert_eq!(heuristic_calls.get(), 0);
        assert_eq!(weight_calls.get(), 0);
    }

    #[test]
    fn search_stops_once_goal_is_popped() {
        // Long tail behind the goal must never be expanded.
        let mut g = TerrainGraph::new();
        let start = add(&mut g, 0.0, 0.0, TerrainType::Sand, 1);
        let goal = add(&mut g, 1.0, 0.0, TerrainType::Sand, 1);
        g.add_edge_pair(start, goal, 1.0);
        let mut prev = goal;
        for i in 0..50 {
            let n = add(&mut g, 2.0 + i as f32, 0.0, TerrainType::Sand, 1);
            g.add_edge_pair(prev, n, 1.0);
            prev = n;
        }

        let route = compute_route_with(&g, start, goal, |e| e.distance, |_| 0.0).unwrap();
        assert_eq!(route.expanded, 2);
    }

    #[test]
    fn impassable_terrain_yields_no_path() {
        let mut g = TerrainGraph::new();
        let a = add(&mut g, 0.0, 0.0, TerrainType::Sand, 1);
        let b = add(&mut g, 1.0, 0.0, TerrainType::Swamp, 1);
        let c = add(&mut g, 2.0, 0.0, TerrainType::Sand, 1);
        g.add_edge_pair(a, b, 1.0);
        g.add_edge_pair(b, c, 1.0);

        let mut nav = Navigation::uniform(5.0);
        nav.speed[TerrainType::Swamp.index()] = 0.0;
        let agent = Agent::new(nav);

        assert_eq!(
            compute_route(&g, &agent, a, c, WeightMode::AgentAware),
            Err(QueryError::NoPath { from: a, to: c })
        );
        // Distance mode ignores the agent and still finds it.
        assert!(compute_route(&g, &agent, a, c, WeightMode::RawDistance).is_ok());
    }

    #[test]
    fn disconnected_in_same_subgraph_is_no_path() {
        let mut g = TerrainGraph::new();
        let a = add(&mut g, 0.0, 0.0, TerrainType::Sand, 1);
        let b = add(&mut g, 1.0, 0.0, TerrainType::Sand, 1);
        assert!(astar(&g, a, b, |e| e.distance, |_| 0.0).is_none());
        assert_eq!(
            compute_route(&g, &walker(), a, b, WeightMode::RawDistance),
            Err(QueryError::NoPath { from: a, to: b })
        );
    }

    #[test]
    #[should_panic(expected = "subgraph id 0")]
    fn subgraph_zero_is_a_caller_bug() {
        let mut g = TerrainGraph::new();
        let a = add(&mut g, 0.0, 0.0, TerrainType::Sand, 0);
        let b = add(&mut g, 1.0, 0.0, TerrainType::Sand, 1);
        let _ = compute_route(&g, &walker(), a, b, WeightMode::RawDistance);
    }

    #[test]
    fn heuristic_is_centroid_dot_product() {
        let mut g = TerrainGraph::new();
        let a = add(&mut g, 2.0, 3.0, TerrainType::Sand, 1);
        assert_eq!(centroid_dot_heuristic(&g, a, Vec2::new(4.0, 5.0)), 23.0);
    }

    #[test]
    fn predecessor_tree_roots_at_start() {
        let mut g = TerrainGraph::new();
        let a = add(&mut g, 0.0, 0.0, TerrainType::Sand, 1);
        let b = add(&mut g, 1.0, 0.0, TerrainType::Sand, 1);
        let c = add(&mut g, 2.0, 0.0, TerrainType::Sand, 1);
        g.add_edge_pair(a, b, 1.0);
        g.add_edge_pair(b, c, 1.0);

        let tree = astar(&g, a, c, |e| e.distance, |_| 0.0).unwrap();
        assert_eq!(tree.predecessors[a.index()], a);
        assert_eq!(tree.predecessors[c.index()], b);
        assert_eq!(tree.walk_back(c), vec![c, b, a]);
        assert_eq!(tree.goal_cost, 2.0);
    }

    #[test]
    fn search_is_deterministic() {
        let mut g = TerrainGraph::new();
        let a = add(&mut g, 0.0, 0.0, TerrainType::Sand, 1);
        let b = add(&mut g, 3.0, 0.0, TerrainType::Sand, 1);
        let c = add(&mut g, 6.0, 0.0, TerrainType::Sand, 1);
        let d = add(&mut g, 3.0, 3.0, TerrainType::Sand, 1);
        g.add_edge_pair(a, b, 3.0);
        g.add_edge_pair(b, c, 3.0);
        g.add_edge_pair(a, d, 3.0);
        g.add_edge_pair(d, c, 3.0);

        let r1 = compute_route(&g, &walker(), a, c, WeightMode::AgentAware).unwrap();
        let r2 = compute_route(&g, &walker(), a, c, WeightMode::AgentAware).unwrap();
        assert_eq!(r1, r2);
    }
}
