// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Directed label ontology: node name -> ordered outgoing target names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OntologyDocument {
    nodes: BTreeMap<String, Vec<String>>,
}

impl OntologyDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &BTreeMap<String, Vec<String>> {
        &self.nodes
    }

    pub fn targets(&self, name: &str) -> Option<&[String]> {
        self.nodes.get(name).map(Vec::as_slice)
    }

    pub fn insert_node(&mut self, name: impl Into<String>) {
        self.nodes.entry(name.into()).or_default();
    }

    /// Appends `source -> target`, creating `source` if needed. Returns `false` if the edge
    /// was already present.
    pub fn push_edge(&mut self, source: impl Into<String>, target: impl Into<String>) -> bool {
        let target = target.into();
        let targets = self.nodes.entry(source.into()).or_default();
        if targets.contains(&target) {
            return false;
        }
        targets.push(target);
        true
    }

    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        self.nodes
            .get(source)
            .is_some_and(|targets| targets.iter().any(|t| t == target))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(Vec::len).sum()
    }

    /// Checks that every target names an existing node and no ordered pair repeats.
    pub fn validate(&self) -> Result<(), OntologyDocumentError> {
        for (source, targets) in &self.nodes {
            for (idx, target) in targets.iter().enumerate() {
                if !self.nodes.contains_key(target) {
                    return Err(OntologyDocumentError::UnknownTarget {
                        source: source.clone(),
                        target: target.clone(),
                    });
                }
                if targets[..idx].contains(target) {
                    return Err(OntologyDocumentError::DuplicateEdge {
                        source: source.clone(),
                        target: target.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OntologyDocumentError {
    UnknownTarget { source: String, target: String },
    DuplicateEdge { source: String, target: String },
}

impl fmt::Display for OntologyDocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTarget { source, target } => {
                write!(f, "edge {source:?} -> {target:?} references an unknown node")
            }
            Self::DuplicateEdge { source, target } => {
                write!(f, "edge {source:?} -> {target:?} appears more than once")
            }
        }
    }
}

impl std::error::Error for OntologyDocumentError {}
