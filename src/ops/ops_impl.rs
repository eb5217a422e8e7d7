// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

/// Per-document mutation helpers used by `apply_ops`.
/// Keeps `ops::mod` focused on public op types and orchestration.
fn apply_abstraction_op(
    tree: &mut AbstractionTree,
    op: &AbstractionOp,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    match op {
        AbstractionOp::AddClass { name, first } => {
            tree.add_class(name, first)?;
            delta.record_added(ObjectRef::Class(name.clone()));
            delta.record_added(entry_ref(name, 0));
            Ok(())
        }
        AbstractionOp::AddEntry { class, entry } => {
            let class_key = find_class(tree, class)?;
            let key = tree.add_entry(class_key, entry)?;
            let index = tree.position(key).unwrap_or_default();
            delta.record_added(entry_ref(class, index));
            Ok(())
        }
        AbstractionOp::ReplaceEntry {
            class,
            index,
            entry,
            in_place,
        } => {
            let class_key = find_class(tree, class)?;
            let key = find_entry(tree, class_key, class, *index)?;
            if *in_place {
                tree.replace_entry_in_place(key, entry)?;
                delta.record_updated(entry_ref(class, *index));
                return Ok(());
            }
            let count = entry_count(tree, class_key);
            tree.replace_entry(key, entry)?;
            for moved in *index..count {
                delta.record_updated(entry_ref(class, moved));
            }
            Ok(())
        }
        AbstractionOp::RemoveClass { class } => {
            let class_key = find_class(tree, class)?;
            tree.delete(class_key)?;
            delta.record_removed(ObjectRef::Class(class.clone()));
            Ok(())
        }
        AbstractionOp::RemoveEntry { class, index } => {
            let class_key = find_class(tree, class)?;
            let key = find_entry(tree, class_key, class, *index)?;
            let count = entry_count(tree, class_key);
            tree.delete(key)?;
            delta.record_removed(entry_ref(class, *index));
            for renumbered in *index + 1..count {
                delta.record_updated(entry_ref(class, renumbered - 1));
            }
            Ok(())
        }
        AbstractionOp::RemoveArguments { class, index } => {
            let class_key = find_class(tree, class)?;
            let key = find_entry(tree, class_key, class, *index)?;
            let arguments = tree
                .node(key)
                .into_iter()
                .flat_map(|node| node.children().iter().copied())
                .find(|child| {
                    tree.node(*child)
                        .is_some_and(|node| node.name() == ARGUMENTS_FIELD)
                })
                .ok_or_else(|| ApplyError::NotFound {
                    kind: ObjectKind::Arguments,
                    name: format!("{class}/{index}"),
                })?;
            tree.delete(arguments)?;
            delta.record_updated(entry_ref(class, *index));
            Ok(())
        }
    }
}

fn entry_ref(class: &str, index: usize) -> ObjectRef {
    ObjectRef::Entry {
        class: class.to_owned(),
        index,
    }
}

fn find_class(tree: &AbstractionTree, class: &str) -> Result<TreeNodeKey, ApplyError> {
    tree.find_class(class).ok_or_else(|| ApplyError::NotFound {
        kind: ObjectKind::Class,
        name: class.to_owned(),
    })
}

fn find_entry(
    tree: &AbstractionTree,
    class_key: TreeNodeKey,
    class: &str,
    index: usize,
) -> Result<TreeNodeKey, ApplyError> {
    tree.entry_key(class_key, index)
        .ok_or_else(|| ApplyError::NotFound {
            kind: ObjectKind::Entry,
            name: format!("{class}/{index}"),
        })
}

fn entry_count(tree: &AbstractionTree, class_key: TreeNodeKey) -> usize {
    tree.node(class_key)
        .map(|node| node.children().len())
        .unwrap_or_default()
}

fn apply_ontology_op(
    graph: &mut OntologyGraph,
    op: &OntologyOp,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    match op {
        OntologyOp::AddNode { name, position } => {
            let key = match name {
                Some(name) => graph.add_named_node(name, *position)?,
                None => graph.add_node(*position),
            };
            if let Some(node) = graph.node(key) {
                delta.record_added(ObjectRef::OntologyNode(node.name().to_owned()));
            }
            Ok(())
        }
        OntologyOp::RemoveNode { name } => {
            let key = find_node(graph, name)?;
            let edges = graph.remove_node(key)?;
            let name_of = |other: OntologyNodeKey| {
                if other == key {
                    name.clone()
                } else {
                    graph
                        .node(other)
                        .map(|node| node.name().to_owned())
                        .unwrap_or_default()
                }
            };
            for edge in edges {
                delta.record_removed(ObjectRef::OntologyEdge {
                    source: name_of(edge.source()),
                    target: name_of(edge.target()),
                });
            }
            delta.record_removed(ObjectRef::OntologyNode(name.clone()));
            Ok(())
        }
        OntologyOp::RenameNode { from, to } => {
            let key = find_node(graph, from)?;
            graph.rename(key, to)?;
            if from != to {
                delta.record_removed(ObjectRef::OntologyNode(from.clone()));
                delta.record_added(ObjectRef::OntologyNode(to.clone()));
            }
            Ok(())
        }
        OntologyOp::MoveNode { name, position } => {
            let key = find_node(graph, name)?;
            graph.reposition(key, *position)?;
            delta.record_updated(ObjectRef::OntologyNode(name.clone()));
            Ok(())
        }
        OntologyOp::AddEdge { source, target } => {
            let (s, t) = (find_node(graph, source)?, find_node(graph, target)?);
            if graph.add_edge(s, t)? {
                delta.record_added(edge_ref(source, target));
            }
            Ok(())
        }
        OntologyOp::RemoveEdge { source, target } => {
            let (s, t) = (find_node(graph, source)?, find_node(graph, target)?);
            if graph.remove_edge(s, t)? {
                delta.record_removed(edge_ref(source, target));
            }
            Ok(())
        }
        OntologyOp::ToggleEdge { source, target } => {
            let (s, t) = (find_node(graph, source)?, find_node(graph, target)?);
            if graph.toggle_edge(s, t)? {
                delta.record_added(edge_ref(source, target));
            } else {
                delta.record_removed(edge_ref(source, target));
            }
            Ok(())
        }
    }
}

fn find_node(graph: &OntologyGraph, name: &str) -> Result<OntologyNodeKey, ApplyError> {
    graph.find(name).ok_or_else(|| ApplyError::NotFound {
        kind: ObjectKind::OntologyNode,
        name: name.to_owned(),
    })
}

fn edge_ref(source: &str, target: &str) -> ObjectRef {
    ObjectRef::OntologyEdge {
        source: source.to_owned(),
        target: target.to_owned(),
    }
}

fn apply_linkograph_op(
    linkograph: &mut Linkograph,
    op: LinkographOp,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    match op {
        LinkographOp::AddLink { source, target } => {
            if linkograph.add_link(source, target)? {
                delta.record_added(ObjectRef::Link { source, target });
            }
        }
        LinkographOp::RemoveLink { source, target } => {
            if linkograph.remove_link(source, target) {
                delta.record_removed(ObjectRef::Link { source, target });
            }
        }
        LinkographOp::ToggleLink { source, target } => {
            if linkograph.toggle_link(source, target)? {
                delta.record_added(ObjectRef::Link { source, target });
            } else {
                delta.record_removed(ObjectRef::Link { source, target });
            }
        }
    }
    Ok(())
}
