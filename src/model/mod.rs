// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

//! Plain documents and identifiers.
//!
//! Abstraction and ontology documents are the persisted JSON shapes; the linkograph is the
//! typed node/link document that replaces the rendered-markup storage format.

pub mod abstraction;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod ids;
pub mod linkograph;
pub mod ontology;

pub use abstraction::{
    AbstractionDocument, CommandEntry, Pattern, PatternKind, DEFAULT_ARGUMENTS_TYPE,
};
pub use ids::{Id, IdAllocator, OntologyEdgeKey, OntologyNodeKey, TreeNodeKey};
pub use linkograph::{forward_adjacency_value, Link, Linkograph, LinkographError, LinkographNode};
pub use ontology::{OntologyDocument, OntologyDocumentError};
