// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

use crate::backend::Refinement;
use crate::graph::{GraphError, OntologyGraph};
use crate::layout::Surface;

/// Read-only display of a refined ontology and the accuracy it reaches.
#[derive(Debug, Clone, PartialEq)]
pub struct RefinementView {
    graph: OntologyGraph,
    accuracy: f64,
}

impl RefinementView {
    pub fn new(refinement: &Refinement, surface: Surface) -> Result<Self, GraphError> {
        Ok(Self {
            graph: OntologyGraph::from_document(&refinement.o_prime, surface)?,
            accuracy: refinement.accuracy_prime,
        })
    }

    pub fn graph(&self) -> &OntologyGraph {
        &self.graph
    }

    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    /// The accuracy as shown to the user: the value as received, without rounding.
    pub fn accuracy_text(&self) -> String {
        self.accuracy.to_string()
    }
}
