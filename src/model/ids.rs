// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

use std::fmt;
use std::marker::PhantomData;

/// A stable, opaque identifier for an editable entity.
///
/// Keys are never reused within one editor instance and never change when the entity is
/// renamed or moved. Display names and ordinal positions (`"0"`, `"1"`, ... entry names,
/// dense ontology indices) are derived separately and may be renumbered freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T> {
    value: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    pub const fn new(value: u64) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    pub const fn get(self) -> u64 {
        self.value
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.value)
    }
}

/// Hands out fresh keys in increasing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator<T> {
    next: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Default for IdAllocator<T> {
    fn default() -> Self {
        Self {
            next: 0,
            _marker: PhantomData,
        }
    }
}

impl<T> IdAllocator<T> {
    pub fn allocate(&mut self) -> Id<T> {
        let id = Id::new(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TreeNodeKeyTag {}
pub type TreeNodeKey = Id<TreeNodeKeyTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OntologyNodeKeyTag {}
pub type OntologyNodeKey = Id<OntologyNodeKeyTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OntologyEdgeKeyTag {}
pub type OntologyEdgeKey = Id<OntologyEdgeKeyTag>;
