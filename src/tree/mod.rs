// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

//! Editable, collapsible tree view of an abstraction document.
//!
//! Nodes live in an arena keyed by [`TreeNodeKey`]. Each node owns one ordered child list and
//! an `expanded` flag; collapsing never moves children, so conversion back to a document is
//! independent of what is currently visible.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::input::Modifiers;
use crate::model::ids::TreeNodeKeyTag;
use crate::model::{
    AbstractionDocument, CommandEntry, IdAllocator, Pattern, TreeNodeKey, DEFAULT_ARGUMENTS_TYPE,
};

/// Name of the synthetic root above the classes.
pub const ROOT_NAME: &str = "commands";

pub const COMMAND_FIELD: &str = "command";
pub const ARGUMENTS_FIELD: &str = "arguments";

/// Structural level of a node, counted from the synthetic root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TreeLevel {
    Root,
    Class,
    Entry,
    Field,
    Slot,
    Value,
}

impl TreeLevel {
    fn from_depth(depth: usize) -> Self {
        match depth {
            0 => Self::Root,
            1 => Self::Class,
            2 => Self::Entry,
            3 => Self::Field,
            4 => Self::Slot,
            _ => Self::Value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    name: String,
    parent: Option<TreeNodeKey>,
    children: Vec<TreeNodeKey>,
    expanded: bool,
}

impl TreeNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<TreeNodeKey> {
        self.parent
    }

    pub fn children(&self) -> &[TreeNodeKey] {
        &self.children
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// One row of the rendered tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleRow {
    pub key: TreeNodeKey,
    pub depth: usize,
    pub name: String,
    pub has_children: bool,
    pub expanded: bool,
}

/// Editable field values of one command entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryForm {
    pub command_expression: String,
    pub command_type: String,
    pub arguments_enabled: bool,
    pub arguments_expression: String,
    pub arguments_type: String,
}

impl Default for EntryForm {
    fn default() -> Self {
        Self {
            command_expression: String::new(),
            command_type: String::new(),
            arguments_enabled: false,
            arguments_expression: String::new(),
            arguments_type: DEFAULT_ARGUMENTS_TYPE.to_owned(),
        }
    }
}

impl EntryForm {
    pub fn from_entry(entry: &CommandEntry) -> Self {
        let mut form = Self {
            command_expression: entry.command.expression.clone(),
            command_type: entry.command.pattern_type.clone(),
            ..Self::default()
        };
        if let Some(arguments) = &entry.arguments {
            form.arguments_enabled = true;
            form.arguments_expression = arguments.expression.clone();
            form.arguments_type = arguments.pattern_type.clone();
        }
        form
    }

    /// Validates the form and builds the entry it describes.
    pub fn to_entry(&self) -> Result<CommandEntry, TreeEditError> {
        require(&self.command_expression, "command expression")?;
        require(&self.command_type, "command type")?;
        let command = Pattern::new(&self.command_expression, &self.command_type);
        if !self.arguments_enabled {
            return Ok(CommandEntry::new(command));
        }
        require(&self.arguments_expression, "arguments expression")?;
        require(&self.arguments_type, "arguments type")?;
        Ok(CommandEntry::new(command)
            .with_arguments(Pattern::new(&self.arguments_expression, &self.arguments_type)))
    }
}

fn require(value: &str, field: &'static str) -> Result<(), TreeEditError> {
    if value.is_empty() {
        return Err(TreeEditError::MissingInput { field });
    }
    Ok(())
}

/// What a click on a tree node did, or asks the caller to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeClick {
    Toggled { expanded: bool },
    ExpandedAll,
    CollapsedAll,
    Deleted,
    OpenNewClassForm,
    OpenNewEntryForm { class: TreeNodeKey },
    OpenEditEntryForm { entry: TreeNodeKey, form: EntryForm },
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEditError {
    NotFound { key: TreeNodeKey },
    MissingInput { field: &'static str },
    DuplicateClass { name: String },
    WrongLevel {
        key: TreeNodeKey,
        expected: TreeLevel,
        found: TreeLevel,
    },
    NotDeletable { key: TreeNodeKey, level: TreeLevel },
    MalformedEntry { key: TreeNodeKey },
}

impl fmt::Display for TreeEditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { key } => write!(f, "tree node not found (key={key})"),
            Self::MissingInput { field } => write!(f, "please enter a valid {field}"),
            Self::DuplicateClass { name } => {
                write!(f, "abstraction class {name:?} already exists")
            }
            Self::WrongLevel {
                key,
                expected,
                found,
            } => write!(
                f,
                "tree node {key} is at level {found:?}, expected {expected:?}"
            ),
            Self::NotDeletable { key, level } => {
                write!(f, "tree node {key} cannot be deleted at level {level:?}")
            }
            Self::MalformedEntry { key } => {
                write!(f, "command entry {key} is missing an expression/type pair")
            }
        }
    }
}

impl std::error::Error for TreeEditError {}

/// Leaf names gathered from one entry before normalization.
#[derive(Debug, Default)]
struct RawEntry {
    command: Vec<String>,
    arguments: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbstractionTree {
    nodes: BTreeMap<TreeNodeKey, TreeNode>,
    root: TreeNodeKey,
    keys: IdAllocator<TreeNodeKeyTag>,
}

impl Default for AbstractionTree {
    fn default() -> Self {
        Self::with_root(ROOT_NAME)
    }
}

impl AbstractionTree {
    fn with_root(name: &str) -> Self {
        let mut keys = IdAllocator::default();
        let root = keys.allocate();
        let mut nodes = BTreeMap::new();
        nodes.insert(
            root,
            TreeNode {
                name: name.to_owned(),
                parent: None,
                children: Vec::new(),
                expanded: true,
            },
        );
        Self { nodes, root, keys }
    }

    /// Generic conversion of a nested JSON value.
    ///
    /// Lists become one child per element named by index, maps one child per key, scalars a
    /// single leaf named by the scalar. Returns `None` for a scalar or null input.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !matches!(value, Value::Array(_) | Value::Object(_)) {
            return None;
        }
        let mut tree = Self::with_root(ROOT_NAME);
        let root = tree.root;
        tree.graft_value(root, value);
        Some(tree)
    }

    /// Builds the tree for a loaded document: root expanded, every class fully collapsed.
    pub fn from_document(document: &AbstractionDocument) -> Self {
        let mut tree = match Self::from_value(&document.to_value()) {
            Some(tree) => tree,
            None => Self::default(),
        };
        let classes = tree.root_node().children.clone();
        for class in classes {
            tree.set_expanded_recursive(class, false);
        }
        tree
    }

    /// Converts back to a document, reading collapsed subtrees as well as expanded ones.
    ///
    /// Returns `None` when an entry lacks a complete expression/type pair.
    pub fn to_document(&self) -> Option<AbstractionDocument> {
        let raw = self.collect_raw();
        let mut document = AbstractionDocument::new();
        for (class, entries) in raw {
            let entries = entries
                .into_iter()
                .map(normalize_entry)
                .collect::<Option<Vec<_>>>()?;
            document.insert_class(class, entries);
        }
        Some(document)
    }

    pub fn root(&self) -> TreeNodeKey {
        self.root
    }

    pub fn node(&self, key: TreeNodeKey) -> Option<&TreeNode> {
        self.nodes.get(&key)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root_node().children.is_empty()
    }

    pub fn depth(&self, key: TreeNodeKey) -> Option<usize> {
        let mut node = self.nodes.get(&key)?;
        let mut depth = 0;
        while let Some(parent) = node.parent {
            node = self.nodes.get(&parent)?;
            depth += 1;
        }
        Some(depth)
    }

    pub fn level(&self, key: TreeNodeKey) -> Option<TreeLevel> {
        self.depth(key).map(TreeLevel::from_depth)
    }

    /// Ordinal of `key` among its siblings.
    pub fn position(&self, key: TreeNodeKey) -> Option<usize> {
        let parent = self.nodes.get(&key)?.parent?;
        self.nodes.get(&parent)?.children.iter().position(|&c| c == key)
    }

    pub fn find_class(&self, name: &str) -> Option<TreeNodeKey> {
        self.root_node()
            .children
            .iter()
            .copied()
            .find(|key| self.nodes.get(key).is_some_and(|node| node.name == name))
    }

    pub fn class_names(&self) -> Vec<&str> {
        self.root_node()
            .children
            .iter()
            .filter_map(|key| self.nodes.get(key))
            .map(|node| node.name.as_str())
            .collect()
    }

    pub fn entry_key(&self, class: TreeNodeKey, position: usize) -> Option<TreeNodeKey> {
        self.nodes.get(&class)?.children.get(position).copied()
    }

    /// The command entry held by an entry node.
    pub fn entry(&self, key: TreeNodeKey) -> Result<CommandEntry, TreeEditError> {
        self.expect_level(key, TreeLevel::Entry)?;
        normalize_entry(self.collect_entry(key)).ok_or(TreeEditError::MalformedEntry { key })
    }

    pub fn entry_form(&self, key: TreeNodeKey) -> Result<EntryForm, TreeEditError> {
        self.entry(key).map(|entry| EntryForm::from_entry(&entry))
    }

    /// Pre-order listing of the nodes currently visible.
    pub fn visible_rows(&self) -> Vec<VisibleRow> {
        let mut rows = Vec::new();
        let mut stack = vec![(self.root, 0usize)];
        while let Some((key, depth)) = stack.pop() {
            let Some(node) = self.nodes.get(&key) else {
                continue;
            };
            rows.push(VisibleRow {
                key,
                depth,
                name: node.name.clone(),
                has_children: !node.children.is_empty(),
                expanded: node.expanded,
            });
            if node.expanded {
                for &child in node.children.iter().rev() {
                    stack.push((child, depth + 1));
                }
            }
        }
        rows
    }

    /// Flips one node's expansion. Leaves have nothing to show and stay unchanged.
    pub fn toggle(&mut self, key: TreeNodeKey) -> Result<bool, TreeEditError> {
        let node = self.node_mut(key)?;
        if node.children.is_empty() {
            return Ok(node.expanded);
        }
        node.expanded = !node.expanded;
        Ok(node.expanded)
    }

    pub fn expand_all(&mut self, key: TreeNodeKey) -> Result<(), TreeEditError> {
        self.node_mut(key)?;
        self.set_expanded_recursive(key, true);
        Ok(())
    }

    pub fn collapse_all(&mut self, key: TreeNodeKey) -> Result<(), TreeEditError> {
        self.node_mut(key)?;
        self.set_expanded_recursive(key, false);
        Ok(())
    }

    /// Appends a class holding `first` as its only entry and expands the root.
    pub fn add_class(
        &mut self,
        name: &str,
        first: &CommandEntry,
    ) -> Result<TreeNodeKey, TreeEditError> {
        require(name, "class name")?;
        if self.find_class(name).is_some() {
            return Err(TreeEditError::DuplicateClass {
                name: name.to_owned(),
            });
        }
        let root = self.root;
        self.node_mut(root)?.expanded = true;
        let class = self.push_child(root, name.to_owned());
        let entry = self.push_child(class, "0".to_owned());
        self.graft_value(entry, &first.to_value());
        Ok(class)
    }

    /// Appends an entry named by the class's current entry count and expands the class.
    pub fn add_entry(
        &mut self,
        class: TreeNodeKey,
        entry: &CommandEntry,
    ) -> Result<TreeNodeKey, TreeEditError> {
        self.expect_level(class, TreeLevel::Class)?;
        let node = self.node_mut(class)?;
        node.expanded = true;
        let name = node.children.len().to_string();
        let key = self.push_child(class, name);
        self.graft_value(key, &entry.to_value());
        Ok(key)
    }

    /// Edit-mode replacement: removes the entry, renumbers the following siblings and appends
    /// the replacement at the end of the class.
    pub fn replace_entry(
        &mut self,
        key: TreeNodeKey,
        entry: &CommandEntry,
    ) -> Result<TreeNodeKey, TreeEditError> {
        self.expect_level(key, TreeLevel::Entry)?;
        let class = self.parent_of(key)?;
        self.detach(key)?;
        self.add_entry(class, entry)
    }

    /// Replaces an entry's content while keeping its key and ordinal position.
    pub fn replace_entry_in_place(
        &mut self,
        key: TreeNodeKey,
        entry: &CommandEntry,
    ) -> Result<(), TreeEditError> {
        self.expect_level(key, TreeLevel::Entry)?;
        let children = std::mem::take(&mut self.node_mut(key)?.children);
        for child in children {
            self.remove_subtree(child);
        }
        self.graft_value(key, &entry.to_value());
        Ok(())
    }

    /// Deletes a class, an entry (only while the class keeps another entry) or an
    /// `arguments` field. Entries after a deleted entry are renumbered.
    pub fn delete(&mut self, key: TreeNodeKey) -> Result<(), TreeEditError> {
        let level = self.level(key).ok_or(TreeEditError::NotFound { key })?;
        let allowed = match level {
            TreeLevel::Class => true,
            TreeLevel::Entry => {
                let parent = self.parent_of(key)?;
                self.nodes.get(&parent).is_some_and(|p| p.children.len() > 1)
            }
            TreeLevel::Field => self.nodes.get(&key).is_some_and(|n| n.name == ARGUMENTS_FIELD),
            TreeLevel::Root | TreeLevel::Slot | TreeLevel::Value => false,
        };
        if !allowed {
            return Err(TreeEditError::NotDeletable { key, level });
        }
        self.detach(key)
    }

    /// Dispatches a click gesture. Modifiers are checked in order shift, ctrl, alt.
    pub fn handle_click(
        &mut self,
        key: TreeNodeKey,
        modifiers: Modifiers,
    ) -> Result<TreeClick, TreeEditError> {
        let level = self.level(key).ok_or(TreeEditError::NotFound { key })?;

        if modifiers.shift {
            let expanded = self.nodes.get(&key).is_some_and(|n| n.expanded);
            return if expanded {
                self.collapse_all(key)?;
                Ok(TreeClick::CollapsedAll)
            } else {
                self.expand_all(key)?;
                Ok(TreeClick::ExpandedAll)
            };
        }

        if modifiers.ctrl {
            return match level {
                TreeLevel::Root => Ok(TreeClick::OpenNewClassForm),
                TreeLevel::Class => Ok(TreeClick::OpenNewEntryForm { class: key }),
                TreeLevel::Entry => {
                    self.expand_all(key)?;
                    let form = self.entry_form(key)?;
                    Ok(TreeClick::OpenEditEntryForm { entry: key, form })
                }
                _ => Ok(TreeClick::Ignored),
            };
        }

        if modifiers.alt {
            return match self.delete(key) {
                Ok(()) => Ok(TreeClick::Deleted),
                Err(TreeEditError::NotDeletable { .. }) => Ok(TreeClick::Ignored),
                Err(err) => Err(err),
            };
        }

        let expanded = self.toggle(key)?;
        Ok(TreeClick::Toggled { expanded })
    }

    fn root_node(&self) -> &TreeNode {
        // The root is inserted at construction and never removed.
        &self.nodes[&self.root]
    }

    fn node_mut(&mut self, key: TreeNodeKey) -> Result<&mut TreeNode, TreeEditError> {
        self.nodes.get_mut(&key).ok_or(TreeEditError::NotFound { key })
    }

    fn parent_of(&self, key: TreeNodeKey) -> Result<TreeNodeKey, TreeEditError> {
        self.nodes
            .get(&key)
            .ok_or(TreeEditError::NotFound { key })?
            .parent
            .ok_or(TreeEditError::NotDeletable {
                key,
                level: TreeLevel::Root,
            })
    }

    fn expect_level(&self, key: TreeNodeKey, expected: TreeLevel) -> Result<(), TreeEditError> {
        let found = self.level(key).ok_or(TreeEditError::NotFound { key })?;
        if found != expected {
            return Err(TreeEditError::WrongLevel {
                key,
                expected,
                found,
            });
        }
        Ok(())
    }

    fn push_child(&mut self, parent: TreeNodeKey, name: String) -> TreeNodeKey {
        let key = self.keys.allocate();
        self.nodes.insert(
            key,
            TreeNode {
                name,
                parent: Some(parent),
                children: Vec::new(),
                expanded: true,
            },
        );
        if let Some(parent) = self.nodes.get_mut(&parent) {
            parent.children.push(key);
        }
        key
    }

    fn graft_value(&mut self, parent: TreeNodeKey, value: &Value) {
        match value {
            Value::Array(items) => {
                for (idx, item) in items.iter().enumerate() {
                    let child = self.push_child(parent, idx.to_string());
                    self.graft_value(child, item);
                }
            }
            Value::Object(map) => {
                for (name, item) in map {
                    let child = self.push_child(parent, name.clone());
                    self.graft_value(child, item);
                }
            }
            Value::Null => {}
            Value::String(text) => {
                self.push_child(parent, text.clone());
            }
            scalar => {
                self.push_child(parent, scalar.to_string());
            }
        }
    }

    /// Unlinks `key` from its parent, drops its subtree and renumbers entry siblings.
    fn detach(&mut self, key: TreeNodeKey) -> Result<(), TreeEditError> {
        let parent = self.parent_of(key)?;
        let renumber = self.level(key) == Some(TreeLevel::Entry);
        let siblings = &mut self.node_mut(parent)?.children;
        let Some(position) = siblings.iter().position(|&c| c == key) else {
            return Err(TreeEditError::NotFound { key });
        };
        siblings.remove(position);
        self.remove_subtree(key);
        if renumber {
            self.renumber_from(parent, position);
        }
        Ok(())
    }

    fn renumber_from(&mut self, parent: TreeNodeKey, start: usize) {
        let Some(children) = self.nodes.get(&parent).map(|p| p.children.clone()) else {
            return;
        };
        for (idx, child) in children.into_iter().enumerate().skip(start) {
            if let Some(node) = self.nodes.get_mut(&child) {
                node.name = idx.to_string();
            }
        }
    }

    fn remove_subtree(&mut self, key: TreeNodeKey) {
        let mut stack = vec![key];
        while let Some(key) = stack.pop() {
            if let Some(node) = self.nodes.remove(&key) {
                stack.extend(node.children);
            }
        }
    }

    fn set_expanded_recursive(&mut self, key: TreeNodeKey, expanded: bool) {
        let mut stack = vec![key];
        while let Some(key) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(&key) {
                node.expanded = expanded;
                stack.extend(node.children.iter().copied());
            }
        }
    }

    /// Leaf names strictly below `key`, in document order.
    fn leaf_names(&self, key: TreeNodeKey) -> Vec<String> {
        let mut out = Vec::new();
        let mut stack: Vec<TreeNodeKey> = match self.nodes.get(&key) {
            Some(node) => node.children.iter().rev().copied().collect(),
            None => Vec::new(),
        };
        while let Some(key) = stack.pop() {
            let Some(node) = self.nodes.get(&key) else {
                continue;
            };
            if node.children.is_empty() {
                out.push(node.name.clone());
            } else {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    fn collect_entry(&self, key: TreeNodeKey) -> RawEntry {
        let mut raw = RawEntry::default();
        let Some(entry) = self.nodes.get(&key) else {
            return raw;
        };
        for &field in &entry.children {
            let Some(field_node) = self.nodes.get(&field) else {
                continue;
            };
            match field_node.name.as_str() {
                COMMAND_FIELD => raw.command = self.leaf_names(field),
                ARGUMENTS_FIELD => raw.arguments = Some(self.leaf_names(field)),
                _ => {}
            }
        }
        raw
    }

    fn collect_raw(&self) -> BTreeMap<String, Vec<RawEntry>> {
        let mut out = BTreeMap::new();
        for &class in &self.root_node().children {
            let Some(class_node) = self.nodes.get(&class) else {
                continue;
            };
            let entries = class_node
                .children
                .iter()
                .map(|&entry| self.collect_entry(entry))
                .collect();
            out.insert(class_node.name.clone(), entries);
        }
        out
    }
}

fn leaf_pair(leaves: &[String]) -> Option<Pattern> {
    match leaves {
        [expression, pattern_type, ..] => Some(Pattern::new(expression, pattern_type)),
        _ => None,
    }
}

fn normalize_entry(raw: RawEntry) -> Option<CommandEntry> {
    let command = leaf_pair(&raw.command)?;
    let arguments = match raw.arguments {
        Some(leaves) if !leaves.is_empty() => Some(leaf_pair(&leaves)?),
        _ => None,
    };
    Some(CommandEntry { command, arguments })
}
