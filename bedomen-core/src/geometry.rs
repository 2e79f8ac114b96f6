//! Cell coordinates, agent positions and the distance between them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A discrete world cell. Used as a map key; equality is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 3]", into = "[i32; 3]")]
pub struct CellCoordinate {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl CellCoordinate {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Center of the cell in continuous coordinates.
    pub fn center(&self) -> AgentPosition {
        AgentPosition::new(
            f64::from(self.x) + 0.5,
            f64::from(self.y) + 0.5,
            f64::from(self.z) + 0.5,
        )
    }
}

impl From<[i32; 3]> for CellCoordinate {
    fn from([x, y, z]: [i32; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<CellCoordinate> for [i32; 3] {
    fn from(cell: CellCoordinate) -> Self {
        [cell.x, cell.y, cell.z]
    }
}

impl fmt::Display for CellCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Continuous agent position, sampled fresh whenever a decision needs it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct AgentPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl AgentPosition {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl From<[f64; 3]> for AgentPosition {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<AgentPosition> for [f64; 3] {
    fn from(pos: AgentPosition) -> Self {
        [pos.x, pos.y, pos.z]
    }
}

/// Euclidean distance from `agent` to the center of `cell`.
pub fn distance_to_cell_center(agent: AgentPosition, cell: CellCoordinate) -> f64 {
    let center = cell.center();
    let dx = agent.x - center.x;
    let dy = agent.y - center.y;
    let dz = agent.z - center.z;
    (dx * dx + dy * dy + dz * dz).sqrt()
}
