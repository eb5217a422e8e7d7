// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

//! Editable node/link view of an ontology document.
//!
//! Nodes are identified by stable keys. The dense 0-based index of a node is its position in
//! the display order and is recomputed after every removal; edges reference keys, so they stay
//! valid across renumbering and renames.

use std::collections::BTreeMap;
use std::fmt;

use crate::layout::{Point, Surface};
use crate::model::ids::{OntologyEdgeKeyTag, OntologyNodeKeyTag};
use crate::model::{IdAllocator, OntologyDocument, OntologyEdgeKey, OntologyNodeKey};

pub mod editor;

pub use editor::{EditorEvent, EditorState, GraphEditor, PointerTarget};

const DEFAULT_NAME_PREFIX: &str = "Node ";

#[derive(Debug, Clone, PartialEq)]
pub struct OntologyNode {
    name: String,
    position: Point,
}

impl OntologyNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Point {
        self.position
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OntologyEdge {
    source: OntologyNodeKey,
    target: OntologyNodeKey,
}

impl OntologyEdge {
    pub fn source(&self) -> OntologyNodeKey {
        self.source
    }

    pub fn target(&self) -> OntologyNodeKey {
        self.target
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    fn touches(&self, key: OntologyNodeKey) -> bool {
        self.source == key || self.target == key
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    UnknownNode { name: String },
    NodeNotFound { key: OntologyNodeKey },
    EmptyName,
    DuplicateName { name: String },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownNode { name } => write!(f, "edge references unknown node {name:?}"),
            Self::NodeNotFound { key } => write!(f, "ontology node not found (key={key})"),
            Self::EmptyName => f.write_str("node name must not be empty"),
            Self::DuplicateName { name } => write!(f, "node name {name:?} is already in use"),
        }
    }
}

impl std::error::Error for GraphError {}

#[derive(Debug, Clone, PartialEq)]
pub struct OntologyGraph {
    surface: Surface,
    order: Vec<OntologyNodeKey>,
    nodes: BTreeMap<OntologyNodeKey, OntologyNode>,
    edges: BTreeMap<OntologyEdgeKey, OntologyEdge>,
    node_keys: IdAllocator<OntologyNodeKeyTag>,
    edge_keys: IdAllocator<OntologyEdgeKeyTag>,
}

impl OntologyGraph {
    pub fn new(surface: Surface) -> Self {
        Self {
            surface,
            order: Vec::new(),
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
            node_keys: IdAllocator::default(),
            edge_keys: IdAllocator::default(),
        }
    }

    /// One node per document key on the initial grid, one edge per listed target.
    pub fn from_document(document: &OntologyDocument, surface: Surface) -> Result<Self, GraphError> {
        let mut graph = Self::new(surface);
        let mut by_name = BTreeMap::new();
        for (index, name) in document.nodes().keys().enumerate() {
            let key = graph.insert_node(name.clone(), surface.grid_position(index));
            by_name.insert(name.as_str(), key);
        }
        for (source, targets) in document.nodes() {
            let source_key = by_name[source.as_str()];
            for target in targets {
                let Some(&target_key) = by_name.get(target.as_str()) else {
                    return Err(GraphError::UnknownNode {
                        name: target.clone(),
                    });
                };
                graph.add_edge(source_key, target_key)?;
            }
        }
        Ok(graph)
    }

    /// Regenerates the document from current names, appending targets in edge-creation order.
    pub fn to_document(&self) -> OntologyDocument {
        let mut document = OntologyDocument::new();
        for node in self.nodes_in_order() {
            document.insert_node(node.1.name.clone());
        }
        for edge in self.edges.values() {
            if let (Some(source), Some(target)) =
                (self.nodes.get(&edge.source), self.nodes.get(&edge.target))
            {
                document.push_edge(source.name.clone(), target.name.clone());
            }
        }
        document
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn node_count(&self) -> usize {
        self.order.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, key: OntologyNodeKey) -> Option<&OntologyNode> {
        self.nodes.get(&key)
    }

    pub fn contains(&self, key: OntologyNodeKey) -> bool {
        self.nodes.contains_key(&key)
    }

    /// Dense display index of a node.
    pub fn index_of(&self, key: OntologyNodeKey) -> Option<usize> {
        self.order.iter().position(|&k| k == key)
    }

    pub fn key_at(&self, index: usize) -> Option<OntologyNodeKey> {
        self.order.get(index).copied()
    }

    pub fn find(&self, name: &str) -> Option<OntologyNodeKey> {
        self.order
            .iter()
            .copied()
            .find(|key| self.nodes.get(key).is_some_and(|node| node.name == name))
    }

    /// Nodes in dense index order.
    pub fn nodes_in_order(&self) -> impl Iterator<Item = (OntologyNodeKey, &OntologyNode)> + '_ {
        self.order
            .iter()
            .filter_map(|key| self.nodes.get(key).map(|node| (*key, node)))
    }

    /// Edges in creation order.
    pub fn edges(&self) -> impl Iterator<Item = &OntologyEdge> + '_ {
        self.edges.values()
    }

    pub fn has_edge(&self, source: OntologyNodeKey, target: OntologyNodeKey) -> bool {
        self.find_edge(source, target).is_some()
    }

    /// Adds a node named `Node N` (N = node count + 1, bumped past names already in use).
    ///
    /// Without a position the node goes to the next grid slot.
    pub fn add_node(&mut self, position: Option<Point>) -> OntologyNodeKey {
        let mut n = self.order.len() + 1;
        let mut name = format!("{DEFAULT_NAME_PREFIX}{n}");
        while self.find(&name).is_some() {
            n += 1;
            name = format!("{DEFAULT_NAME_PREFIX}{n}");
        }
        let position = match position {
            Some(point) => self.surface.clamp(point),
            None => self.surface.grid_position(self.order.len()),
        };
        self.insert_node(name, position)
    }

    pub fn add_named_node(
        &mut self,
        name: &str,
        position: Option<Point>,
    ) -> Result<OntologyNodeKey, GraphError> {
        self.check_name(name, None)?;
        let position = match position {
            Some(point) => self.surface.clamp(point),
            None => self.surface.grid_position(self.order.len()),
        };
        Ok(self.insert_node(name.to_owned(), position))
    }

    /// Removes every edge touching the node, then the node itself. Indices of later nodes
    /// shift down by one.
    pub fn remove_node(&mut self, key: OntologyNodeKey) -> Result<Vec<OntologyEdge>, GraphError> {
        let Some(index) = self.index_of(key) else {
            return Err(GraphError::NodeNotFound { key });
        };
        let mut removed = Vec::new();
        while let Some(edge_key) = self
            .edges
            .iter()
            .find(|(_, edge)| edge.touches(key))
            .map(|(edge_key, _)| *edge_key)
        {
            if let Some(edge) = self.edges.remove(&edge_key) {
                removed.push(edge);
            }
        }
        self.order.remove(index);
        self.nodes.remove(&key);
        Ok(removed)
    }

    /// Adds `source -> target`; an existing edge is left alone. Returns whether an edge was
    /// added.
    pub fn add_edge(
        &mut self,
        source: OntologyNodeKey,
        target: OntologyNodeKey,
    ) -> Result<bool, GraphError> {
        self.check_node(source)?;
        self.check_node(target)?;
        if self.has_edge(source, target) {
            return Ok(false);
        }
        let key = self.edge_keys.allocate();
        self.edges.insert(key, OntologyEdge { source, target });
        Ok(true)
    }

    pub fn remove_edge(
        &mut self,
        source: OntologyNodeKey,
        target: OntologyNodeKey,
    ) -> Result<bool, GraphError> {
        self.check_node(source)?;
        self.check_node(target)?;
        Ok(match self.find_edge(source, target) {
            Some(key) => self.edges.remove(&key).is_some(),
            None => false,
        })
    }

    /// Adds the edge if absent, removes it if present. Returns whether it exists afterwards.
    pub fn toggle_edge(
        &mut self,
        source: OntologyNodeKey,
        target: OntologyNodeKey,
    ) -> Result<bool, GraphError> {
        if self.remove_edge(source, target)? {
            return Ok(false);
        }
        self.add_edge(source, target)
    }

    /// Renames a node. Names must be non-empty and unique across the graph.
    pub fn rename(&mut self, key: OntologyNodeKey, name: &str) -> Result<(), GraphError> {
        self.check_name(name, Some(key))?;
        let node = self
            .nodes
            .get_mut(&key)
            .ok_or(GraphError::NodeNotFound { key })?;
        node.name = name.to_owned();
        Ok(())
    }

    /// Moves a node, clamped to the surface. Returns the position actually applied.
    pub fn reposition(&mut self, key: OntologyNodeKey, point: Point) -> Result<Point, GraphError> {
        let clamped = self.surface.clamp(point);
        let node = self
            .nodes
            .get_mut(&key)
            .ok_or(GraphError::NodeNotFound { key })?;
        node.position = clamped;
        Ok(clamped)
    }

    fn insert_node(&mut self, name: String, position: Point) -> OntologyNodeKey {
        let key = self.node_keys.allocate();
        self.nodes.insert(key, OntologyNode { name, position });
        self.order.push(key);
        key
    }

    fn find_edge(&self, source: OntologyNodeKey, target: OntologyNodeKey) -> Option<OntologyEdgeKey> {
        self.edges
            .iter()
            .find(|(_, edge)| edge.source == source && edge.target == target)
            .map(|(key, _)| *key)
    }

    fn check_node(&self, key: OntologyNodeKey) -> Result<(), GraphError> {
        if !self.nodes.contains_key(&key) {
            return Err(GraphError::NodeNotFound { key });
        }
        Ok(())
    }

    fn check_name(&self, name: &str, renaming: Option<OntologyNodeKey>) -> Result<(), GraphError> {
        if name.is_empty() {
            return Err(GraphError::EmptyName);
        }
        match self.find(name) {
            Some(existing) if Some(existing) != renaming => Err(GraphError::DuplicateName {
                name: name.to_owned(),
            }),
            _ => Ok(()),
        }
    }
}
