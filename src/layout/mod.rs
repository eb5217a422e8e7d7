// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

//! Layout for the editors.
//!
//! Placement is a presentation concern, but it is deterministic so that reloading a document
//! always reproduces the same picture.

pub mod linkograph;
pub mod ontology;

pub use linkograph::{
    layout_linkograph, LinkPlacement, LinkographLayout, LinkographStyle, NodePlacement, Segment,
};
pub use ontology::{Point, Surface, GRID_COLUMNS};
