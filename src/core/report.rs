//! Route records for CSV export and terminal display

use butterfly_common::{Error, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::core::grid::Coord;
use crate::core::yen::Route;

/// Path points shown before the middle of a long route is elided
const PATH_PREVIEW: usize = 3;

/// One exported row. `cost` is pre-formatted to six decimals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteRecord {
    pub route_id: usize,
    pub distance: usize,
    pub time: u64,
    pub risk: u64,
    pub cost: String,
}

impl From<&Route> for RouteRecord {
    fn from(route: &Route) -> Self {
        Self {
            route_id: route.route_id,
            distance: route.distance,
            time: route.time,
            risk: route.risk,
            cost: format!("{:.6}", route.cost),
        }
    }
}

pub fn to_records(routes: &[Route]) -> Vec<RouteRecord> {
    routes.iter().map(RouteRecord::from).collect()
}

/// Write `routes` as CSV with a header row, creating missing parent
/// directories. An empty route list still produces the header.
pub fn export_csv<P: AsRef<Path>>(routes: &[Route], path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| Error::ExportFailed(format!("{}: {e}", path.display())))?;
    if routes.is_empty() {
        writer
            .write_record(["route_id", "distance", "time", "risk", "cost"])
            .map_err(|e| Error::ExportFailed(e.to_string()))?;
    }
    for record in to_records(routes) {
        writer
            .serialize(&record)
            .map_err(|e| Error::ExportFailed(e.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

/// Abbreviated path such as `(0, 0) -> (0, 1) -> ... -> (2, 2)`
pub fn format_path(path: &[Coord]) -> String {
    let show = |cs: &[Coord]| {
        cs.iter()
            .map(Coord::to_string)
            .collect::<Vec<_>>()
            .join(" -> ")
    };
    if path.len() <= 2 * PATH_PREVIEW {
        show(path)
    } else {
        format!(
            "{} -> ... -> {}",
            show(&path[..PATH_PREVIEW]),
            show(&path[path.len() - PATH_PREVIEW..])
        )
    }
}

/// Fixed-width table of routes for the terminal
pub fn render_table(routes: &[Route]) -> String {
    let mut out = format!(
        "{:>5}  {:>8}  {:>6}  {:>5}  {:>14}  path\n",
        "route", "distance", "time", "risk", "cost"
    );
    for route in routes {
        let record = RouteRecord::from(route);
        out.push_str(&format!(
            "{:>5}  {:>8}  {:>6}  {:>5}  {:>14}  {}\n",
            record.route_id,
            record.distance,
            record.time,
            record.risk,
            record.cost,
            format_path(&route.path)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(route_id: usize, cost: f64, path: Vec<Coord>) -> Route {
        Route {
            route_id,
            distance: path.len() - 1,
            time: 7,
            risk: 3,
            cost,
            path,
        }
    }

    fn corridor(n: i32) -> Vec<Coord> {
        (0..n).map(|c| Coord::new(0, c)).collect()
    }

    #[test]
    fn test_record_formats_cost() {
        let record = RouteRecord::from(&route(1, 4.0, corridor(5)));
        assert_eq!(record.cost, "4.000000");
        assert_eq!(record.distance, 4);
    }

    #[test]
    fn test_export_csv_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("routes.csv");
        let routes = vec![route(1, 4.0, corridor(5)), route(2, 6.5, corridor(7))];
        export_csv(&routes, &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "route_id,distance,time,risk,cost",
                "1,4,7,3,4.000000",
                "2,6,7,3,6.500000"
            ]
        );
    }

    #[test]
    fn test_export_empty_keeps_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        export_csv(&[], &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.trim_end(), "route_id,distance,time,risk,cost");
    }

    #[test]
    fn test_format_path_elides_middle() {
        assert_eq!(format_path(&corridor(2)), "(0, 0) -> (0, 1)");
        let long = format_path(&corridor(10));
        assert_eq!(
            long,
            "(0, 0) -> (0, 1) -> (0, 2) -> ... -> (0, 7) -> (0, 8) -> (0, 9)"
        );
    }

    #[test]
    fn test_render_table_has_row_per_route() {
        let table = render_table(&[route(1, 4.0, corridor(5)), route(2, 6.0, corridor(7))]);
        assert_eq!(table.lines().count(), 3);
        assert!(table.lines().nth(1).unwrap().contains("4.000000"));
        assert!(table.ends_with('\n'));
        assert!(table.starts_with("route  distance"));
        assert_eq!(render_table(&[]).lines().count(), 1);
    }
}
