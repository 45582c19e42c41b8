// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Script runner driving a scene from command files

use crate::command::Command;
use crate::config::SceneConfig;
use crate::scene::{CommandOutput, Scene, SceneState};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Result of running a batch of commands
#[derive(Debug)]
pub struct RunResult {
    pub outputs: Vec<(Command, CommandOutput)>,
    pub state: SceneState,
    pub duration: Duration,
}

/// Runner executing commands against one scene
pub struct Runner {
    scene: Scene,
}

impl Runner {
    pub fn new(config: SceneConfig) -> Self {
        Self {
            scene: Scene::with_config(config),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Run a command script. Relative paths inside the script are taken
    /// relative to the script's directory.
    pub fn run_script(&mut self, path: &Path) -> Result<RunResult> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script: {}", path.display()))?;
        let commands = Command::parse_script(&source)
            .with_context(|| format!("Failed to parse script: {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        let commands: Vec<Command> = commands.iter().map(|c| rebase(c, base)).collect();
        self.run_commands(&commands)
    }

    /// Execute commands in order, stopping at the first failure
    pub fn run_commands(&mut self, commands: &[Command]) -> Result<RunResult> {
        let start = Instant::now();
        let mut outputs = Vec::with_capacity(commands.len());
        for (i, command) in commands.iter().enumerate() {
            let output = self
                .scene
                .execute(command)
                .with_context(|| format!("Command {} failed: {command}", i + 1))?;
            outputs.push((command.clone(), output));
        }
        Ok(RunResult {
            outputs,
            state: self.scene.state(),
            duration: start.elapsed(),
        })
    }

    /// Load `target` and run listing commands against it
    pub fn list_target(&mut self, target: &Path, listings: &[Command]) -> Result<Vec<CommandOutput>> {
        self.scene
            .load_target(target)
            .with_context(|| format!("Failed to load target: {}", target.display()))?;
        listings
            .iter()
            .map(|listing| Ok(self.scene.execute(listing)?))
            .collect()
    }
}

fn rebase(command: &Command, base: &Path) -> Command {
    let join = |p: &PathBuf| if p.is_relative() { base.join(p) } else { p.clone() };
    match command {
        Command::Load(p) => Command::Load(join(p)),
        Command::Target(p) => Command::Target(join(p)),
        Command::Save(p) => Command::Save(join(p)),
        Command::Convert { input, output } => Command::Convert {
            input: join(input),
            output: join(output),
        },
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_script_paths_are_relative_to_script() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("build.txt");
        std::fs::write(
            &script,
            "extrude 0 0 0 1 0 0 1 1 0 0 1 0 0 0 1 +\nsave cube.off\ntarget cube.off\nedges\n",
        )
        .unwrap();

        let mut runner = Runner::new(SceneConfig::default());
        let result = runner.run_script(&script).unwrap();
        assert!(dir.path().join("cube.off").exists());
        assert_eq!(result.state, SceneState::Populated);
        assert_eq!(result.outputs.len(), 4);
        assert!(matches!(&result.outputs[3].1, CommandOutput::Edges(edges) if edges.len() == 12));
    }

    #[test]
    fn test_failure_names_the_command() {
        let mut runner = Runner::new(SceneConfig::default());
        let err = runner.run_commands(&[Command::Faces]).unwrap_err();
        assert!(format!("{err:#}").contains("Command 1 failed: faces"));
    }
}
