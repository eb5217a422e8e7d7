// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

//! Edit operations over the three editable documents.
//!
//! Operations are applied with optimistic concurrency (revision checks) to a copy of the
//! documents; the copy replaces the originals only when every op in the batch succeeded.
//! The result carries a coarse delta the UI can use to refresh derived state.

use std::collections::BTreeSet;
use std::fmt;

use crate::graph::{GraphError, OntologyGraph};
use crate::layout::{Point, Surface};
use crate::model::{
    AbstractionDocument, CommandEntry, Linkograph, LinkographError, OntologyDocument,
    OntologyNodeKey, TreeNodeKey,
};
use crate::tree::{AbstractionTree, TreeEditError, ARGUMENTS_FIELD};

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Abstraction(AbstractionOp),
    Ontology(OntologyOp),
    Linkograph(LinkographOp),
}

/// Abstraction edits address classes by name and entries by their position in the class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbstractionOp {
    AddClass {
        name: String,
        first: CommandEntry,
    },
    AddEntry {
        class: String,
        entry: CommandEntry,
    },
    /// Edit-mode save. Without `in_place` the entry moves to the end of its class.
    ReplaceEntry {
        class: String,
        index: usize,
        entry: CommandEntry,
        in_place: bool,
    },
    RemoveClass {
        class: String,
    },
    RemoveEntry {
        class: String,
        index: usize,
    },
    RemoveArguments {
        class: String,
        index: usize,
    },
}

/// Ontology edits address nodes by their current name.
#[derive(Debug, Clone, PartialEq)]
pub enum OntologyOp {
    AddNode {
        name: Option<String>,
        position: Option<Point>,
    },
    RemoveNode {
        name: String,
    },
    RenameNode {
        from: String,
        to: String,
    },
    MoveNode {
        name: String,
        position: Point,
    },
    AddEdge {
        source: String,
        target: String,
    },
    RemoveEdge {
        source: String,
        target: String,
    },
    ToggleEdge {
        source: String,
        target: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkographOp {
    AddLink { source: usize, target: usize },
    RemoveLink { source: usize, target: usize },
    ToggleLink { source: usize, target: usize },
}

/// What an op touched, named the way documents name things.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObjectRef {
    Class(String),
    Entry { class: String, index: usize },
    OntologyNode(String),
    OntologyEdge { source: String, target: String },
    Link { source: usize, target: usize },
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(name) => write!(f, "class/{name}"),
            Self::Entry { class, index } => write!(f, "class/{class}/{index}"),
            Self::OntologyNode(name) => write!(f, "ontology/{name}"),
            Self::OntologyEdge { source, target } => write!(f, "ontology/{source}->{target}"),
            Self::Link { source, target } => write!(f, "link/{source}->{target}"),
        }
    }
}

/// The documents a client edits, plus their shared revision.
#[derive(Debug, Clone, PartialEq)]
pub struct Documents {
    rev: u64,
    abstraction: AbstractionTree,
    ontology: OntologyGraph,
    linkograph: Linkograph,
}

impl Documents {
    pub fn new(surface: Surface) -> Self {
        Self {
            rev: 0,
            abstraction: AbstractionTree::default(),
            ontology: OntologyGraph::new(surface),
            linkograph: Linkograph::default(),
        }
    }

    pub fn rev(&self) -> u64 {
        self.rev
    }

    pub fn abstraction(&self) -> &AbstractionTree {
        &self.abstraction
    }

    /// Visibility state only; structural edits go through [`apply_ops`].
    pub fn abstraction_mut(&mut self) -> &mut AbstractionTree {
        &mut self.abstraction
    }

    pub fn ontology(&self) -> &OntologyGraph {
        &self.ontology
    }

    pub fn ontology_mut(&mut self) -> &mut OntologyGraph {
        &mut self.ontology
    }

    pub fn linkograph(&self) -> &Linkograph {
        &self.linkograph
    }

    pub fn linkograph_mut(&mut self) -> &mut Linkograph {
        &mut self.linkograph
    }

    /// Replaces the abstraction with a freshly loaded document.
    pub fn load_abstraction(&mut self, document: &AbstractionDocument) {
        self.abstraction = AbstractionTree::from_document(document);
        self.bump_rev();
    }

    pub fn load_ontology(&mut self, document: &OntologyDocument) -> Result<(), GraphError> {
        self.ontology = OntologyGraph::from_document(document, self.ontology.surface())?;
        self.bump_rev();
        Ok(())
    }

    pub fn load_linkograph(&mut self, linkograph: Linkograph) {
        self.linkograph = linkograph;
        self.bump_rev();
    }

    pub fn bump_rev(&mut self) {
        self.rev = self.rev.saturating_add(1);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyResult {
    pub new_rev: u64,
    pub applied: usize,
    pub delta: Delta,
}

/// Minimal delta describing which objects changed as the result of applying ops.
///
/// Coarse on purpose: only added/removed/updated references, each sorted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delta {
    pub added: Vec<ObjectRef>,
    pub removed: Vec<ObjectRef>,
    pub updated: Vec<ObjectRef>,
}

#[derive(Debug, Default)]
struct DeltaBuilder {
    added: BTreeSet<ObjectRef>,
    removed: BTreeSet<ObjectRef>,
    updated: BTreeSet<ObjectRef>,
}

impl DeltaBuilder {
    fn record_added(&mut self, object_ref: ObjectRef) {
        self.removed.remove(&object_ref);
        self.updated.remove(&object_ref);
        self.added.insert(object_ref);
    }

    fn record_removed(&mut self, object_ref: ObjectRef) {
        self.added.remove(&object_ref);
        self.updated.remove(&object_ref);
        self.removed.insert(object_ref);
    }

    fn record_updated(&mut self, object_ref: ObjectRef) {
        if self.added.contains(&object_ref) || self.removed.contains(&object_ref) {
            return;
        }
        self.updated.insert(object_ref);
    }

    fn finish(self) -> Delta {
        Delta {
            added: self.added.into_iter().collect(),
            removed: self.removed.into_iter().collect(),
            updated: self.updated.into_iter().collect(),
        }
    }
}

pub fn apply_ops(
    documents: &mut Documents,
    base_rev: u64,
    ops: &[Op],
) -> Result<ApplyResult, ApplyError> {
    let current_rev = documents.rev();
    if base_rev != current_rev {
        return Err(ApplyError::Conflict {
            base_rev,
            current_rev,
        });
    }

    if ops.is_empty() {
        return Ok(ApplyResult {
            new_rev: current_rev,
            applied: 0,
            delta: Delta::default(),
        });
    }

    let mut next = documents.clone();
    let mut delta = DeltaBuilder::default();

    for op in ops {
        match op {
            Op::Abstraction(op) => apply_abstraction_op(&mut next.abstraction, op, &mut delta)?,
            Op::Ontology(op) => apply_ontology_op(&mut next.ontology, op, &mut delta)?,
            Op::Linkograph(op) => apply_linkograph_op(&mut next.linkograph, *op, &mut delta)?,
        }
    }

    next.bump_rev();
    *documents = next;
    let new_rev = documents.rev();

    Ok(ApplyResult {
        new_rev,
        applied: ops.len(),
        delta: delta.finish(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Class,
    Entry,
    Arguments,
    OntologyNode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    Conflict { base_rev: u64, current_rev: u64 },
    NotFound { kind: ObjectKind, name: String },
    Tree(TreeEditError),
    Graph(GraphError),
    Linkograph(LinkographError),
}

impl fmt::Display for ApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conflict {
                base_rev,
                current_rev,
            } => {
                write!(f, "stale base_rev (base_rev={base_rev}, current_rev={current_rev})")
            }
            Self::NotFound { kind, name } => write!(f, "{kind:?} not found ({name})"),
            Self::Tree(err) => write!(f, "abstraction edit failed: {err}"),
            Self::Graph(err) => write!(f, "ontology edit failed: {err}"),
            Self::Linkograph(err) => write!(f, "linkograph edit failed: {err}"),
        }
    }
}

impl std::error::Error for ApplyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Tree(err) => Some(err),
            Self::Graph(err) => Some(err),
            Self::Linkograph(err) => Some(err),
            Self::Conflict { .. } | Self::NotFound { .. } => None,
        }
    }
}

impl From<TreeEditError> for ApplyError {
    fn from(err: TreeEditError) -> Self {
        Self::Tree(err)
    }
}

impl From<GraphError> for ApplyError {
    fn from(err: GraphError) -> Self {
        Self::Graph(err)
    }
}

impl From<LinkographError> for ApplyError {
    fn from(err: LinkographError) -> Self {
        Self::Linkograph(err)
    }
}

include!("ops_impl.rs");
