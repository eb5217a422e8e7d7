// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

use serde::{Deserialize, Serialize};

/// Nodes per row of the initial ontology grid.
pub const GRID_COLUMNS: usize = 3;

const GRID_MARGIN: f64 = 0.2;
const GRID_PITCH: f64 = 0.3;
const RADIUS_DIVISOR: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The drawing area an editor renders into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
}

impl Default for Surface {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

impl Surface {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Visual radius of an ontology node on this surface.
    pub fn node_radius(&self) -> f64 {
        self.width / RADIUS_DIVISOR
    }

    /// Keeps a node centre at least one radius inside the surface, per axis.
    pub fn clamp(&self, point: Point) -> Point {
        let r = self.node_radius();
        Point {
            x: clamp_axis(point.x, r, self.width - r),
            y: clamp_axis(point.y, r, self.height - r),
        }
    }

    /// Initial placement for the node at dense index `index`.
    ///
    /// Three columns per row; rows continue below the surface for large ontologies, so
    /// distinct indices never share a centre.
    pub fn grid_position(&self, index: usize) -> Point {
        let col = (index % GRID_COLUMNS) as f64;
        let row = (index / GRID_COLUMNS) as f64;
        Point {
            x: GRID_MARGIN * self.width + col * GRID_PITCH * self.width,
            y: GRID_MARGIN * self.height + row * GRID_PITCH * self.height,
        }
    }
}

fn clamp_axis(value: f64, min: f64, max: f64) -> f64 {
    if max < min {
        return (min + max) / 2.0;
    }
    value.max(min).min(max)
}
