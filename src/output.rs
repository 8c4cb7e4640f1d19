//! Output formatting and persistence for difficulty scores.
//!
//! Supports box-drawn console tables, CSV append, and a JSON report.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::Path;
use tracing::{debug, info};

use crate::dataset::{PickupId, RouteId};
use crate::scoring::{PickupScores, RouteScores, ScoredPickup, ScoredRoute, Scores};

pub const CELL_SIZE: usize = 30;

/// Renders a table with a label column followed by one column per indicator.
/// Missing scores render as `-`.
pub fn render_table(
    group_name: &str,
    columns: &[String],
    rows: &[(String, Vec<Option<f64>>)],
    cell_size: usize,
) -> String {
    let width = columns.len() + 1;
    let rule = |left: char, fill: char, cross: char, right: char| {
        let bar: String = std::iter::repeat_n(fill, cell_size).collect();
        let mut line = String::new();
        line.push(left);
        for i in 0..width {
            if i > 0 {
                line.push(cross);
            }
            line.push_str(&bar);
        }
        line.push(right);
        line.push('\n');
        line
    };

    let mut out = rule('┏', '━', '┳', '┓');
    out.push_str(&format!("┃{group_name:^cell_size$}"));
    for column in columns {
        out.push_str(&format!("┃{column:^cell_size$}"));
    }
    out.push_str("┃\n");
    out.push_str(&rule('┡', '━', '╇', '┩'));

    for (label, values) in rows {
        out.push_str(&format!("│{label:^cell_size$}"));
        for value in values {
            let cell = match value {
                Some(v) => format!("│{v:^cell_size$.4}"),
                None => format!("│{:^cell_size$}", "-"),
            };
            out.push_str(&cell);
        }
        out.push_str("│\n");
    }
    out.push_str(&rule('└', '━', '┴', '┘'));
    out
}

fn route_row(route: &ScoredRoute, indicators: &[String]) -> (String, Vec<Option<f64>>) {
    let values = indicators.iter().map(|i| route.score(i)).collect();
    (route.name.clone(), values)
}

fn pickup_row(pickup: &ScoredPickup, indicators: &[String]) -> (String, Vec<Option<f64>>) {
    let values = indicators.iter().map(|i| pickup.score(i)).collect();
    (pickup.label.clone(), values)
}

/// Route names with their average scores.
pub fn route_table(scores: &RouteScores) -> String {
    let rows: Vec<_> = scores
        .routes
        .iter()
        .map(|r| route_row(r, &scores.indicators))
        .collect();
    render_table("route name", &scores.indicators, &rows, CELL_SIZE)
}

/// Every pickup, labelled `house_number street`.
pub fn pickup_table(scores: &PickupScores) -> String {
    let rows: Vec<_> = scores
        .pickups
        .iter()
        .map(|p| pickup_row(p, &scores.indicators))
        .collect();
    render_table("pickup name", &scores.indicators, &rows, CELL_SIZE)
}

/// Appends one row per scored route to a CSV file.
///
/// Creates the file with headers if it does not already exist. The indicator
/// columns follow the order of [`RouteScores::indicators`].
pub fn append_route_records(path: &str, scores: &RouteScores) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending route records");

    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .with_context(|| format!("failed to open '{path}'"))?;

    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

    if !file_exists {
        let mut header = vec![
            "scored_at".to_string(),
            "route_id".to_string(),
            "route_name".to_string(),
            "destination".to_string(),
            "num_pickups".to_string(),
        ];
        header.extend(scores.indicators.iter().cloned());
        writer.write_record(&header)?;
    }

    let scored_at = Utc::now().to_rfc3339();
    for route in &scores.routes {
        let mut record = vec![
            scored_at.clone(),
            route.id.to_string(),
            route.name.clone(),
            route.destination.clone(),
            route.num_pickups.to_string(),
        ];
        record.extend(
            scores
                .indicators
                .iter()
                .map(|i| route.score(i).map(|s| s.to_string()).unwrap_or_default()),
        );
        writer.write_record(&record)?;
    }
    writer.flush()?;

    Ok(())
}

#[derive(Serialize)]
struct Report<'a> {
    generated_at: DateTime<Utc>,
    indicators: &'a [String],
    routes: &'a [ScoredRoute],
    dropped_routes: &'a [RouteId],
    pickups: &'a [ScoredPickup],
    unscored_pickups: Vec<&'a PickupId>,
}

pub fn report_json(scores: &Scores) -> Result<String> {
    let report = Report {
        generated_at: Utc::now(),
        indicators: scores.indicators(),
        routes: &scores.routes.routes,
        dropped_routes: &scores.routes.dropped,
        pickups: &scores.pickups.pickups,
        unscored_pickups: scores.pickups.unscored().collect(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Writes the full scoring run as pretty-printed JSON, replacing `path`.
pub fn write_json_report(path: &str, scores: &Scores) -> Result<()> {
    let json = report_json(scores)?;
    std::fs::write(path, json).with_context(|| format!("failed to write '{path}'"))?;
    info!(path, "JSON report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::Difficulty;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn difficulty(pairs: &[(&str, f64)]) -> Difficulty {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn sample_scores() -> Scores {
        let indicators = vec!["ascent".to_string(), "distance".to_string()];
        Scores {
            pickups: PickupScores {
                indicators: indicators.clone(),
                pickups: vec![
                    ScoredPickup {
                        id: PickupId("P1".into()),
                        route_id: RouteId("R1".into()),
                        label: "12 Main St".into(),
                        difficulty: Some(difficulty(&[("ascent", 0.0), ("distance", 1.0)])),
                    },
                    ScoredPickup {
                        id: PickupId("P2".into()),
                        route_id: RouteId("R2".into()),
                        label: "7 Elm St".into(),
                        difficulty: None,
                    },
                ],
            },
            routes: RouteScores {
                indicators,
                routes: vec![ScoredRoute {
                    id: RouteId("R1".into()),
                    name: "North".into(),
                    destination: "Locust".into(),
                    num_pickups: 1,
                    difficulty: difficulty(&[("ascent", 0.0), ("distance", 1.0)]),
                }],
                dropped: vec![RouteId("R2".into())],
            },
        }
    }

    #[test]
    fn test_render_table_layout() {
        let columns = vec!["ascent".to_string()];
        let rows = vec![("North".to_string(), vec![Some(0.5)])];
        let table = render_table("route name", &columns, &rows, 8);

        let lines: Vec<_> = table.lines().collect();
        assert_eq!(
            lines,
            [
                "┏━━━━━━━━┳━━━━━━━━┓",
                "┃route name┃ ascent ┃",
                "┡━━━━━━━━╇━━━━━━━━┩",
                "│ North  │ 0.5000 │",
                "└━━━━━━━━┴━━━━━━━━┘",
            ]
        );
    }

    #[test]
    fn test_route_table_lists_reported_routes() {
        let table = route_table(&sample_scores().routes);
        assert!(table.contains("route name"));
        assert!(table.contains("North"));
        assert!(table.contains("1.0000"));
        assert_eq!(table.lines().count(), 5);
    }

    #[test]
    fn test_pickup_table_marks_unscored() {
        let table = pickup_table(&sample_scores().pickups);
        let elm = table.lines().find(|l| l.contains("7 Elm St")).unwrap();
        assert_eq!(elm.matches('-').count(), 2);
        assert!(table.contains("12 Main St"));
    }

    #[test]
    fn test_render_missing_and_negative_cells() {
        let columns = vec!["ascent".to_string(), "descent".to_string()];
        let rows = vec![("1 Oak St".to_string(), vec![None, Some(-0.25)])];
        let table = render_table("pickup", &columns, &rows, 9);

        assert_eq!(table.lines().nth(3), Some("│1 Oak St │    -    │ -0.2500 │"));
    }

    #[test]
    fn test_render_empty_table() {
        let table = render_table("route name", &["ascent".to_string()], &[], CELL_SIZE);
        assert_eq!(table.lines().count(), 4);
    }

    #[test]
    fn test_append_route_records_writes_header_once() {
        let path = temp_path("route_fairness_test_routes.csv");
        let _ = fs::remove_file(&path);

        let scores = sample_scores();
        append_route_records(&path, &scores.routes).unwrap();
        append_route_records(&path, &scores.routes).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "scored_at,route_id,route_name,destination,num_pickups,ascent,distance"
        );
        assert!(lines[1].ends_with(",R1,North,Locust,1,0,1"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_report_json() {
        let json = report_json(&sample_scores()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["indicators"], serde_json::json!(["ascent", "distance"]));
        assert_eq!(value["routes"][0]["id"], "R1");
        assert_eq!(value["routes"][0]["difficulty"]["distance"], 1.0);
        assert_eq!(value["dropped_routes"], serde_json::json!(["R2"]));
        assert_eq!(value["unscored_pickups"], serde_json::json!(["P2"]));
        assert!(value["pickups"][1]["difficulty"].is_null());
        assert!(value["generated_at"].is_string());
    }

    #[test]
    fn test_write_json_report() {
        let path = temp_path("route_fairness_test_report.json");
        write_json_report(&path, &sample_scores()).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("\"North\""));
        fs::remove_file(&path).unwrap();
    }
}
