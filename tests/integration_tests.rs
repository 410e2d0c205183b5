//! Integration tests for butterfly-grid
//!
//! Checks the public search API against brute-force enumeration on small
//! grids, and drives the built binary end to end on scenario files.

use butterfly_grid::{
    find_routes, k_shortest_paths, search_path, CandidateStore, Coord, Criterion, Edge,
    GridConfig, Manhattan, Metrics, Scenario, StreetNetwork, Traversal, VpTree,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};
use std::process::Command;

/// Random blocked streets and integer weights on a small grid
struct RandomMap {
    grid: GridConfig,
    blocked: HashSet<Edge>,
    weights: HashMap<Edge, u32>,
}

impl RandomMap {
    fn new(rng: &mut StdRng, rows: u32, cols: u32, block_ratio: f64) -> Self {
        let grid = GridConfig::new(rows, cols);
        let mut blocked = HashSet::new();
        let mut weights = HashMap::new();
        for edge in grid.all_edges() {
            if rng.gen_bool(block_ratio) {
                blocked.insert(edge);
            }
            weights.insert(edge, rng.gen_range(1..=4));
        }
        Self {
            grid,
            blocked,
            weights,
        }
    }
}

impl Traversal for RandomMap {
    fn is_edge_blocked(&self, from: Coord, to: Coord) -> bool {
        self.blocked.contains(&Edge::new(from, to))
    }

    fn step_cost(&self, from: Coord, to: Coord) -> f64 {
        f64::from(self.weights[&Edge::new(from, to)])
    }
}

/// Costs of every loop-free path from `start` to `goal`, ascending
fn all_simple_path_costs(map: &RandomMap, start: Coord, goal: Coord) -> Vec<f64> {
    fn walk(
        map: &RandomMap,
        node: Coord,
        goal: Coord,
        cost: f64,
        on_path: &mut HashSet<Coord>,
        out: &mut Vec<f64>,
    ) {
        if node == goal {
            out.push(cost);
            return;
        }
        for next in map.grid.neighbors4(node) {
            if on_path.contains(&next) || map.is_edge_blocked(node, next) {
                continue;
            }
            on_path.insert(next);
            walk(map, next, goal, cost + map.step_cost(node, next), on_path, out);
            on_path.remove(&next);
        }
    }

    let mut out = Vec::new();
    let mut on_path = HashSet::from([start]);
    walk(map, start, goal, 0.0, &mut on_path, &mut out);
    out.sort_by(f64::total_cmp);
    out
}

fn assert_valid_path(map: &RandomMap, path: &[Coord], start: Coord, goal: Coord) {
    assert_eq!(path.first(), Some(&start));
    assert_eq!(path.last(), Some(&goal));
    for w in path.windows(2) {
        assert!(w[0].is_adjacent(w[1]), "{} and {} are not adjacent", w[0], w[1]);
        assert!(!map.is_edge_blocked(w[0], w[1]), "street {} - {} is blocked", w[0], w[1]);
    }
}

fn flat_metrics() -> Metrics<impl Fn(Coord, Coord) -> f64, impl Fn(&[Coord]) -> u64> {
    Metrics {
        time: |_: Coord, _: Coord| 1.0,
        risk: |_: &[Coord]| 0u64,
    }
}

#[test]
fn test_astar_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(2024);
    for _ in 0..60 {
        let map = RandomMap::new(&mut rng, 3, 4, 0.25);
        let start = Coord::new(rng.gen_range(0..3), rng.gen_range(0..4));
        let goal = Coord::new(rng.gen_range(0..3), rng.gen_range(0..4));

        let expected = all_simple_path_costs(&map, start, goal);
        let found = search_path(map.grid, start, goal, &map).unwrap();

        match (expected.first(), found) {
            (None, None) => {}
            (Some(&best), Some(result)) => {
                assert_eq!(result.cost, best, "{start} -> {goal}");
                assert_valid_path(&map, &result.path, start, goal);
                let cost: f64 = result
                    .path
                    .windows(2)
                    .map(|w| map.step_cost(w[0], w[1]))
                    .sum();
                assert_eq!(cost, result.cost);
            }
            (expected, found) => panic!("{start} -> {goal}: expected {expected:?}, found {found:?}"),
        }
    }
}

#[test]
fn test_yen_matches_brute_force_ranking() {
    let mut rng = StdRng::seed_from_u64(77);
    for _ in 0..25 {
        let map = RandomMap::new(&mut rng, 3, 3, 0.15);
        let start = Coord::new(0, 0);
        let goal = Coord::new(2, 2);
        let k = 8;

        let expected = all_simple_path_costs(&map, start, goal);
        let routes = k_shortest_paths(map.grid, start, goal, &map, &flat_metrics(), k).unwrap();

        assert_eq!(routes.len(), expected.len().min(k));
        let costs: Vec<f64> = routes.iter().map(|r| r.cost).collect();
        assert_eq!(costs, expected[..routes.len()].to_vec());

        let unique: HashSet<&Vec<Coord>> = routes.iter().map(|r| &r.path).collect();
        assert_eq!(unique.len(), routes.len());
        for (idx, route) in routes.iter().enumerate() {
            assert_eq!(route.route_id, idx + 1);
            assert_valid_path(&map, &route.path, start, goal);
            let nodes: HashSet<&Coord> = route.path.iter().collect();
            assert_eq!(nodes.len(), route.path.len());
        }
    }
}

#[test]
fn test_yen_costs_never_decrease() {
    let mut rng = StdRng::seed_from_u64(5);
    let map = RandomMap::new(&mut rng, 5, 5, 0.1);
    let routes = k_shortest_paths(
        map.grid,
        Coord::new(0, 0),
        Coord::new(4, 4),
        &map,
        &flat_metrics(),
        30,
    )
    .unwrap();
    assert!(routes.windows(2).all(|w| w[0].cost <= w[1].cost));
}

#[test]
fn test_vptree_matches_linear_scan() {
    let mut rng = StdRng::seed_from_u64(11);
    let grid = GridConfig::new(30, 30);
    let edges = grid.all_edges();
    let blocked: Vec<Edge> = edges.into_iter().filter(|_| rng.gen_bool(0.1)).collect();
    let midpoints: Vec<Coord> = blocked.iter().map(Edge::midpoint).collect();
    let tree = VpTree::build(midpoints.clone(), Manhattan);

    for row in 0..30 {
        for col in 0..30 {
            let q = Coord::new(row, col).doubled();
            let expected = midpoints.iter().map(|m| m.manhattan(q)).min().unwrap();
            assert_eq!(tree.nearest(&q).1, expected);
        }
    }
}

#[test]
fn test_candidate_store_orders_random_keys() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut store = CandidateStore::new();
    for i in 0..300u32 {
        store.insert(f64::from(rng.gen_range(0..50u32)), i);
    }
    let mut previous = f64::NEG_INFINITY;
    for taken in 1..=100 {
        let (key, _) = store.extract_min().unwrap();
        assert!(key >= previous);
        previous = key;
        assert_eq!(store.len(), 300 - taken);
    }
}

#[test]
fn test_open_3x3_has_six_shortest_routes() {
    let network = StreetNetwork::new(GridConfig::new(3, 3), HashSet::new(), HashMap::new());
    let routes = find_routes(
        &network,
        Coord::new(0, 0),
        Coord::new(2, 2),
        10,
        Criterion::Distance,
    )
    .unwrap();
    assert_eq!(routes[0].cost, 4.0);
    assert_eq!(routes[0].distance, 4);
    assert_eq!(routes.iter().filter(|r| r.cost == 4.0).count(), 6);
    // no blocked streets: risk is rows + cols
    assert!(routes.iter().all(|r| r.risk == 6));
}

#[test]
fn test_cut_off_start_has_no_route() {
    let start = Coord::new(0, 0);
    let goal = Coord::new(0, 1);
    let blocked: HashSet<Edge> = [
        Edge::new(start, goal),
        Edge::new(start, Coord::new(1, 0)),
    ]
    .into_iter()
    .collect();
    let network = StreetNetwork::new(GridConfig::new(2, 2), blocked, HashMap::new());

    assert!(butterfly_grid::best_route(&network, start, goal, Criterion::Distance)
        .unwrap()
        .is_none());
    assert!(find_routes(&network, start, goal, 5, Criterion::Distance)
        .unwrap()
        .is_empty());
}

#[test]
fn test_single_street_blocked_has_no_route() {
    let start = Coord::new(0, 0);
    let goal = Coord::new(0, 1);
    let blocked: HashSet<Edge> = [Edge::new(start, goal)].into_iter().collect();
    let network = StreetNetwork::new(GridConfig::new(1, 2), blocked, HashMap::new());
    assert!(find_routes(&network, start, goal, 3, Criterion::Time)
        .unwrap()
        .is_empty());
}

#[test]
fn test_start_equals_goal_route() {
    let network = StreetNetwork::new(GridConfig::new(4, 4), HashSet::new(), HashMap::new());
    let c = Coord::new(2, 1);
    let routes = find_routes(&network, c, c, 5, Criterion::Time).unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].path, vec![c]);
    assert_eq!(routes[0].distance, 0);
    assert_eq!(routes[0].time, 0);
    assert_eq!(routes[0].cost, 0.0);
}

#[test]
fn test_time_ranking_uses_crossing_times() {
    let scenario = Scenario::from_json(
        r#"{
            "rows": 2,
            "cols": 2,
            "crossing_times": [
                [[[0, 0], [0, 1]], 9],
                [[[0, 0], [1, 0]], 1],
                [[[1, 0], [1, 1]], 1],
                [[[0, 1], [1, 1]], 1]
            ]
        }"#,
    )
    .unwrap();
    let network = scenario.into_network();
    let routes = find_routes(
        &network,
        Coord::new(0, 0),
        Coord::new(0, 1),
        2,
        Criterion::Time,
    )
    .unwrap();
    assert_eq!(routes.len(), 2);
    assert_eq!(routes[0].distance, 3);
    assert_eq!(routes[0].time, 3);
    assert_eq!(routes[1].distance, 1);
    assert_eq!(routes[1].time, 9);
}

fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_butterfly-grid"))
}

#[test]
fn test_cli_generate_then_route_to_csv() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = dir.path().join("city.json");
    let csv = dir.path().join("out").join("routes.csv");

    let status = binary()
        .args(["generate", "--rows", "6", "--cols", "6", "--seed", "7", "--output"])
        .arg(&scenario)
        .status()
        .unwrap();
    assert!(status.success());
    assert!(Scenario::load(&scenario).is_ok());

    let output = binary()
        .args(["route", "--from", "0,0", "--to", "5,5", "--k", "3", "--criterion", "time"])
        .arg("--scenario")
        .arg(&scenario)
        .arg("--csv")
        .arg(&csv)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let text = std::fs::read_to_string(&csv).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("route_id,distance,time,risk,cost"));
    let rows: Vec<&str> = lines.collect();
    assert!(!rows.is_empty() && rows.len() <= 3);
    assert!(rows[0].starts_with("1,"));
}

#[test]
fn test_cli_out_of_bounds_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = dir.path().join("small.json");
    std::fs::write(&scenario, r#"{"rows": 2, "cols": 2}"#).unwrap();

    let output = binary()
        .args(["route", "--from", "0,0", "--to", "5,5"])
        .arg("--scenario")
        .arg(&scenario)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_cli_unreachable_goal_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = dir.path().join("closed.json");
    std::fs::write(
        &scenario,
        r#"{"rows": 1, "cols": 2, "blocked": [[[0, 0], [0, 1]]]}"#,
    )
    .unwrap();

    let output = binary()
        .args(["route", "--from", "0,0", "--to", "0,1", "--zones"])
        .arg("--scenario")
        .arg(&scenario)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No route"));
}

#[test]
fn test_cli_missing_scenario_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = binary()
        .args(["route", "--from", "0,0", "--to", "1,1", "--scenario"])
        .arg(dir.path().join("absent.json"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
}
