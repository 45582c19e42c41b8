// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! polyset CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use polyset::cli::{init_logging, Reporter, Runner};
use polyset::{Command, SceneConfig};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "polyset")]
#[command(about = "Exact polyhedral sets: extrusion, Boolean CSG and topology queries", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./polyset.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a command script against a fresh scene
    Run {
        /// Script with one command per line
        script: PathBuf,

        /// Print listings as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert a mesh file to another format
    Convert {
        /// Input mesh (.off, .obj, .stl)
        input: PathBuf,

        /// Output mesh; format from the extension
        output: PathBuf,
    },

    /// Load a solid as target and list its topology
    List {
        /// Target mesh file
        target: PathBuf,

        /// List vertices
        #[arg(long)]
        vertices: bool,

        /// List edges
        #[arg(long)]
        edges: bool,

        /// List faces
        #[arg(long)]
        faces: bool,

        /// Print listings as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    if let Err(err) = try_main() {
        Reporter::report_error(&format!("{err:#}"));
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            let mut config = SceneConfig::from_file(path)?;
            config.apply_overrides(|key| std::env::var(key).ok())?;
            config
        }
        None => SceneConfig::load()?,
    };
    init_logging(&config, cli.verbose);

    match cli.command {
        Commands::Run { script, json } => run_command(&script, json, config),
        Commands::Convert { input, output } => {
            let runner = Runner::new(config);
            runner
                .scene()
                .convert(&input, &output)
                .with_context(|| format!("Failed to convert {}", input.display()))?;
            Reporter::success(&format!("{} -> {}", input.display(), output.display()));
            Ok(())
        }
        Commands::List {
            target,
            vertices,
            edges,
            faces,
            json,
        } => {
            let all = !(vertices || edges || faces);
            let mut listings = Vec::new();
            if vertices || all {
                listings.push(Command::Vertices);
            }
            if edges || all {
                listings.push(Command::Edges);
            }
            if faces || all {
                listings.push(Command::Faces);
            }
            list_command(&target, listings, json, config)
        }
        Commands::Version => {
            println!("polyset v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn run_command(script: &Path, json: bool, config: SceneConfig) -> Result<()> {
    let mut runner = Runner::new(config);
    let result = runner.run_script(script)?;
    for (_, output) in &result.outputs {
        if json {
            Reporter::report_json(output)?;
        } else {
            Reporter::report_output(output);
        }
    }
    if !json {
        Reporter::report_run(&script.display().to_string(), &result);
    }
    Ok(())
}

fn list_command(target: &Path, listings: Vec<Command>, json: bool, config: SceneConfig) -> Result<()> {
    let mut runner = Runner::new(config);
    for output in runner.list_target(target, &listings)? {
        if json {
            Reporter::report_json(&output)?;
        } else {
            Reporter::report_output(&output);
        }
    }
    Ok(())
}
