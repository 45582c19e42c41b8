// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use super::runner::RunResult;
use crate::scene::{CommandOutput, EdgeListing, FacetListing, SceneState, VertexListing};
use colored::*;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// Print a command's output as colored text
    pub fn report_output(output: &CommandOutput) {
        match output {
            CommandOutput::Done => {}
            CommandOutput::Vertices(rows) => Self::print_vertices(rows),
            CommandOutput::Edges(rows) => Self::print_edges(rows),
            CommandOutput::Faces(rows) => Self::print_faces(rows),
        }
    }

    /// Print a command's output as pretty JSON
    pub fn report_json(output: &CommandOutput) -> serde_json::Result<()> {
        println!("{}", serde_json::to_string_pretty(output)?);
        Ok(())
    }

    /// Summary after a script run
    pub fn report_run(script: &str, result: &RunResult) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {}", "Script:".bold(), script.cyan());
        println!("{}", "━".repeat(80).bright_black());
        println!(
            "  {} {}",
            "Commands:".bright_black(),
            result.outputs.len().to_string().cyan()
        );
        let state = match result.state {
            SceneState::Empty => "empty".yellow(),
            SceneState::Populated => "populated".green(),
        };
        println!("  {} {}", "Scene:".bright_black(), state);
        println!(
            "  {} {}",
            "Time:".bright_black(),
            Self::format_duration(result.duration).yellow()
        );
        println!("{}", "━".repeat(80).bright_black());
    }

    fn print_vertices(rows: &[VertexListing]) {
        println!("{} {}", "Vertices:".bold(), rows.len().to_string().cyan());
        for row in rows {
            println!("  {:>5} {}", row.index.to_string().bright_black(), row.point);
        }
    }

    fn print_edges(rows: &[EdgeListing]) {
        println!("{} {}", "Edges:".bold(), rows.len().to_string().cyan());
        for row in rows {
            println!(
                "  {:>5} {} -> {}  {} {}  {} {}",
                row.half_edge.to_string().bright_black(),
                row.source,
                row.target,
                "twin".bright_black(),
                Self::optional(row.twin),
                "faces".bright_black(),
                match row.neighbour_facet {
                    Some(other) => format!("{}|{}", row.facet, other).normal(),
                    None => format!("{}|-", row.facet).yellow(),
                }
            );
        }
    }

    fn print_faces(rows: &[FacetListing]) {
        println!("{} {}", "Faces:".bold(), rows.len().to_string().cyan());
        for row in rows {
            let loops: Vec<String> = row
                .loops
                .iter()
                .map(|indices| {
                    let indices: Vec<String> = indices.iter().map(|i| i.to_string()).collect();
                    format!("[{}]", indices.join(" "))
                })
                .collect();
            let side = if row.outward { "outward".green() } else { "inward".yellow() };
            println!(
                "  {:>5} {}  {} {}  {}",
                row.index.to_string().bright_black(),
                loops.join(" "),
                "twin".bright_black(),
                Self::optional(row.twin),
                side
            );
        }
    }

    fn optional(index: Option<usize>) -> ColoredString {
        match index {
            Some(i) => i.to_string().green(),
            None => "none".yellow(),
        }
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report info
    pub fn report_info(message: &str) {
        println!("{} {}", "ℹ️".bright_blue(), message);
    }

    /// Print success message
    pub fn success(message: &str) {
        println!("{} {}", "✅".green(), message.green());
    }

    /// Format duration for display
    fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }
}
