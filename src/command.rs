// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Textual scene commands
//!
//! One command per line, `#` starts a comment:
//!
//! ```text
//! load <path>            target <path>
//! save <path>            convert <in> <out>
//! vertices | edges | faces
//! extrude x1 y1 z1 ... xn yn zn dx dy dz <+|-|*>
//! ```

use crate::error::{Error, Result};
use crate::geometry::exact::{display_scalar, parse_scalar};
use crate::geometry::{BooleanOp, Point3, Scalar, Vector3};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// A single scene command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Load(PathBuf),
    Target(PathBuf),
    Save(PathBuf),
    Convert { input: PathBuf, output: PathBuf },
    Vertices,
    Edges,
    Faces,
    Extrude {
        polygon: Vec<Point3>,
        direction: Vector3,
        op: BooleanOp,
    },
}

impl Command {
    /// Parse a script, skipping blank and comment-only lines. Errors name the
    /// offending line.
    pub fn parse_script(script: &str) -> Result<Vec<Command>> {
        let mut commands = Vec::new();
        for (number, line) in script.lines().enumerate() {
            let line = strip_comment(line);
            if line.trim().is_empty() {
                continue;
            }
            let command = line.parse().map_err(|e| match e {
                Error::InvalidCommand(message) => Error::InvalidCommand(format!("line {}: {message}", number + 1)),
                other => other,
            })?;
            commands.push(command);
        }
        Ok(commands)
    }

    /// Whether running the command changes the scene
    pub fn mutates(&self) -> bool {
        matches!(self, Command::Load(_) | Command::Target(_) | Command::Extrude { .. })
    }
}

fn strip_comment(line: &str) -> &str {
    line.split_once('#').map_or(line, |(code, _)| code)
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut words = strip_comment(s).split_whitespace();
        let keyword = words
            .next()
            .ok_or_else(|| Error::InvalidCommand("empty command".to_string()))?;
        let args: Vec<&str> = words.collect();

        let arity = |n: usize| -> Result<()> {
            if args.len() == n {
                Ok(())
            } else {
                Err(Error::InvalidCommand(format!(
                    "'{keyword}' takes {n} argument(s), got {}",
                    args.len()
                )))
            }
        };

        match keyword.to_ascii_lowercase().as_str() {
            "load" => arity(1).map(|_| Command::Load(PathBuf::from(args[0]))),
            "target" => arity(1).map(|_| Command::Target(PathBuf::from(args[0]))),
            "save" => arity(1).map(|_| Command::Save(PathBuf::from(args[0]))),
            "convert" => arity(2).map(|_| Command::Convert {
                input: PathBuf::from(args[0]),
                output: PathBuf::from(args[1]),
            }),
            "vertices" => arity(0).map(|_| Command::Vertices),
            "edges" => arity(0).map(|_| Command::Edges),
            "faces" => arity(0).map(|_| Command::Faces),
            "extrude" => parse_extrude(&args),
            other => Err(Error::InvalidCommand(format!("unknown command '{other}'"))),
        }
    }
}

fn parse_extrude(args: &[&str]) -> Result<Command> {
    let (symbol, numbers) = args
        .split_last()
        .ok_or_else(|| Error::InvalidCommand("extrude needs a polygon, a direction and an operator".to_string()))?;

    let mut chars = symbol.chars();
    let op = match (chars.next(), chars.next()) {
        (Some(c), None) => BooleanOp::from_symbol(c)?,
        _ => return Err(Error::UnsupportedOperator(symbol.to_string())),
    };

    if numbers.len() % 3 != 0 || numbers.len() < 12 {
        return Err(Error::InvalidCommand(format!(
            "extrude needs at least three points and a direction as coordinate triples, got {} numbers",
            numbers.len()
        )));
    }
    let values = numbers
        .iter()
        .map(|n| parse_scalar(n).map_err(|e| Error::InvalidCommand(e.to_string())))
        .collect::<Result<Vec<Scalar>>>()?;

    let mut triples: Vec<[Scalar; 3]> = values
        .chunks_exact(3)
        .map(|c| [c[0].clone(), c[1].clone(), c[2].clone()])
        .collect();
    let [dx, dy, dz] = triples
        .pop()
        .ok_or_else(|| Error::InvalidCommand("extrude is missing its direction".to_string()))?;
    let polygon = triples.into_iter().map(|[x, y, z]| Point3::new(x, y, z)).collect();

    Ok(Command::Extrude {
        polygon,
        direction: Vector3::new(dx, dy, dz),
        op,
    })
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Load(path) => write!(f, "load {}", path.display()),
            Command::Target(path) => write!(f, "target {}", path.display()),
            Command::Save(path) => write!(f, "save {}", path.display()),
            Command::Convert { input, output } => write!(f, "convert {} {}", input.display(), output.display()),
            Command::Vertices => f.write_str("vertices"),
            Command::Edges => f.write_str("edges"),
            Command::Faces => f.write_str("faces"),
            Command::Extrude { polygon, direction, op } => {
                f.write_str("extrude")?;
                for p in polygon {
                    write!(f, " {} {} {}", display_scalar(&p.x), display_scalar(&p.y), display_scalar(&p.z))?;
                }
                write!(
                    f,
                    " {} {} {} {}",
                    display_scalar(&direction.x),
                    display_scalar(&direction.y),
                    display_scalar(&direction.z),
                    op.symbol()
                )
            }
        }
    }
}
