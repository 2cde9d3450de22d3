// src/report/mod.rs
//! Console rendering of a finished simulation.

use crate::simulation::SimulationReport;
use anyhow::{Context, Result};

const HEADERS: [&str; 7] = [
    "invoker", "static", "effective", "current", "selected", "share", "failed",
];

pub fn render_table(report: &SimulationReport) -> String {
    let selected_total: u64 = report.invokers.iter().map(|i| i.tally.selections).sum();

    let rows: Vec<[String; 7]> = report
        .invokers
        .iter()
        .map(|i| {
            [
                i.weights.id.clone(),
                i.weights.static_weight.to_string(),
                i.weights.effective_weight.to_string(),
                i.weights.current_weight.to_string(),
                i.tally.selections.to_string(),
                format!("{:.2}%", share(i.tally.selections, selected_total)),
                i.tally.failures.to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();

    let mut lines = vec![
        format!("{} ({} dispatches)", report.balancer, report.dispatched),
        format_row(&HEADERS.map(String::from), &widths),
        rule.join("-+-"),
    ];
    lines.extend(rows.iter().map(|row| format_row(row, &widths)));
    lines.push(format!("dropped (no invoker available): {}", report.dropped));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

pub fn render_json(report: &SimulationReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize simulation report")
}

fn format_row(cells: &[String; 7], widths: &[usize; 7]) -> String {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(column, (cell, width))| {
            // Left-align the id, right-align the numbers.
            if column == 0 {
                format!("{:<width$}", cell, width = *width)
            } else {
                format!("{:>width$}", cell, width = *width)
            }
        })
        .collect();
    line.join(" | ").trim_end().to_string()
}

fn share(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_balancer::WeightSnapshot;
    use crate::simulation::{InvokerReport, InvokerTally};

    fn report() -> SimulationReport {
        SimulationReport {
            balancer: "smooth_weighted_round_robin".into(),
            dispatched: 4,
            dropped: 1,
            invokers: vec![
                InvokerReport {
                    weights: WeightSnapshot {
                        id: "alpha:80".into(),
                        static_weight: 2,
                        effective_weight: 1,
                        current_weight: -1,
                    },
                    tally: InvokerTally {
                        selections: 2,
                        successes: 1,
                        failures: 1,
                    },
                },
                InvokerReport {
                    weights: WeightSnapshot {
                        id: "b:80".into(),
                        static_weight: 1,
                        effective_weight: 1,
                        current_weight: 1,
                    },
                    tally: InvokerTally {
                        selections: 1,
                        successes: 1,
                        failures: 0,
                    },
                },
            ],
        }
    }

    #[test]
    fn test_table_layout() {
        let table = render_table(&report());
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "smooth_weighted_round_robin (4 dispatches)");
        assert!(lines[1].starts_with("invoker  | static | effective"));
        assert!(lines[3].starts_with("alpha:80 |      2 |         1 |      -1 |"));
        assert!(lines[3].contains("66.67%"));
        assert!(lines[4].starts_with("b:80     |"));
        assert!(lines[4].contains("33.33%"));
        assert_eq!(lines[5], "dropped (no invoker available): 1");
        assert_eq!(lines.len(), 6);
        assert!(table.ends_with("available): 1\n"));
    }

    #[test]
    fn test_table_without_invokers() {
        let mut empty = report();
        empty.invokers.clear();

        let table = render_table(&empty);
        assert_eq!(
            table,
            "smooth_weighted_round_robin (4 dispatches)\n\
             invoker | static | effective | current | selected | share | failed\n\
             --------+--------+-----------+---------+----------+-------+-------\n\
             dropped (no invoker available): 1\n"
        );
    }

    #[test]
    fn test_share_of_nothing() {
        assert_eq!(share(0, 0), 0.0);
        assert_eq!(share(1, 4), 25.0);
    }

    #[test]
    fn test_json_is_flat_per_invoker() {
        let json = render_json(&report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["dropped"], 1);
        assert_eq!(value["invokers"][0]["id"], "alpha:80");
        assert_eq!(value["invokers"][0]["effective_weight"], 1);
        assert_eq!(value["invokers"][0]["failures"], 1);
    }
}
