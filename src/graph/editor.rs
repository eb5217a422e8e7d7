// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

use crate::input::{Key, Modifiers};
use crate::layout::Point;
use crate::model::OntologyNodeKey;

use super::{GraphError, OntologyGraph};

/// Selection and inline-editing state of the ontology editor.
///
/// A second node chosen while one is selected is consumed immediately (the edge between them
/// is toggled) and the editor returns to `Idle`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditorState {
    #[default]
    Idle,
    Selected {
        node: OntologyNodeKey,
    },
    Editing {
        node: OntologyNodeKey,
        buffer: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerTarget {
    Node(OntologyNodeKey),
    Background(Point),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    Nothing,
    Selected(OntologyNodeKey),
    Deselected,
    NodeAdded(OntologyNodeKey),
    NodeRemoved(OntologyNodeKey),
    EdgeToggled {
        source: OntologyNodeKey,
        target: OntologyNodeKey,
        present: bool,
    },
    EditStarted(OntologyNodeKey),
    BufferChanged(String),
    Renamed {
        node: OntologyNodeKey,
        name: String,
    },
    EditCancelled(OntologyNodeKey),
    Moved {
        node: OntologyNodeKey,
        position: Point,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphEditor {
    state: EditorState,
}

impl GraphEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// The node the next gesture applies to, whether selected or being edited.
    pub fn focus(&self) -> Option<OntologyNodeKey> {
        match &self.state {
            EditorState::Idle => None,
            EditorState::Selected { node } | EditorState::Editing { node, .. } => Some(*node),
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditorState::Editing { .. })
    }

    /// Pointer click.
    ///
    /// - shift on the background with nothing selected adds a node there
    /// - shift on a node selects it, or with another node already selected toggles the edge
    ///   from the selected node to this one (the same node twice just deselects)
    /// - ctrl on a node selects it and toggles its self-loop
    /// - a plain click selects a node, or deselects on the background
    ///
    /// Any pending inline edit on a different node is committed first.
    pub fn click(
        &mut self,
        graph: &mut OntologyGraph,
        target: PointerTarget,
        modifiers: Modifiers,
    ) -> Result<EditorEvent, GraphError> {
        match target {
            PointerTarget::Background(point) => {
                self.commit(graph)?;
                if modifiers.shift && self.focus().is_none() {
                    let key = graph.add_node(Some(point));
                    return Ok(EditorEvent::NodeAdded(key));
                }
                if modifiers.shift {
                    return Ok(EditorEvent::Nothing);
                }
                self.state = EditorState::Idle;
                Ok(EditorEvent::Deselected)
            }
            PointerTarget::Node(node) => {
                if !graph.contains(node) {
                    return Err(GraphError::NodeNotFound { key: node });
                }
                if self.is_editing() && self.focus() == Some(node) && !modifiers.shift {
                    return Ok(EditorEvent::Nothing);
                }
                self.commit(graph)?;

                if modifiers.ctrl {
                    let present = graph.toggle_edge(node, node)?;
                    self.state = EditorState::Selected { node };
                    return Ok(EditorEvent::EdgeToggled {
                        source: node,
                        target: node,
                        present,
                    });
                }

                if modifiers.shift {
                    return match self.focus() {
                        Some(source) if source == node => {
                            self.state = EditorState::Idle;
                            Ok(EditorEvent::Deselected)
                        }
                        Some(source) => {
                            let present = graph.toggle_edge(source, node)?;
                            self.state = EditorState::Idle;
                            Ok(EditorEvent::EdgeToggled {
                                source,
                                target: node,
                                present,
                            })
                        }
                        None => {
                            self.state = EditorState::Selected { node };
                            Ok(EditorEvent::Selected(node))
                        }
                    };
                }

                self.state = EditorState::Selected { node };
                Ok(EditorEvent::Selected(node))
            }
        }
    }

    /// Key press.
    ///
    /// With a node selected: Enter starts editing its name, Backspace removes it, Escape
    /// deselects and ctrl toggles its self-loop. While editing: characters and Backspace edit
    /// the buffer, Enter commits the name and Escape discards the edit.
    pub fn key(
        &mut self,
        graph: &mut OntologyGraph,
        key: Key,
        modifiers: Modifiers,
    ) -> Result<EditorEvent, GraphError> {
        match &mut self.state {
            EditorState::Idle => Ok(EditorEvent::Nothing),
            EditorState::Editing { node, buffer } => match key {
                Key::Enter => {
                    let node = *node;
                    self.commit(graph)?;
                    self.state = EditorState::Idle;
                    let name = graph
                        .node(node)
                        .map(|n| n.name().to_owned())
                        .unwrap_or_default();
                    Ok(EditorEvent::Renamed { node, name })
                }
                Key::Backspace => {
                    buffer.pop();
                    Ok(EditorEvent::BufferChanged(buffer.clone()))
                }
                Key::Escape => {
                    let node = *node;
                    self.state = EditorState::Selected { node };
                    Ok(EditorEvent::EditCancelled(node))
                }
                Key::Char(ch) if !ch.is_control() => {
                    buffer.push(ch);
                    Ok(EditorEvent::BufferChanged(buffer.clone()))
                }
                Key::Char(_) => Ok(EditorEvent::Nothing),
            },
            EditorState::Selected { node } => {
                let node = *node;
                if modifiers.ctrl {
                    let present = graph.toggle_edge(node, node)?;
                    return Ok(EditorEvent::EdgeToggled {
                        source: node,
                        target: node,
                        present,
                    });
                }
                match key {
                    Key::Enter => {
                        let buffer = graph
                            .node(node)
                            .map(|n| n.name().to_owned())
                            .ok_or(GraphError::NodeNotFound { key: node })?;
                        self.state = EditorState::Editing { node, buffer };
                        Ok(EditorEvent::EditStarted(node))
                    }
                    Key::Backspace => {
                        graph.remove_node(node)?;
                        self.state = EditorState::Idle;
                        Ok(EditorEvent::NodeRemoved(node))
                    }
                    Key::Escape => {
                        self.state = EditorState::Idle;
                        Ok(EditorEvent::Deselected)
                    }
                    Key::Char(_) => Ok(EditorEvent::Nothing),
                }
            }
        }
    }

    /// Drag a node; the position is clamped to the surface.
    pub fn drag(
        &mut self,
        graph: &mut OntologyGraph,
        node: OntologyNodeKey,
        point: Point,
    ) -> Result<EditorEvent, GraphError> {
        let position = graph.reposition(node, point)?;
        Ok(EditorEvent::Moved { node, position })
    }

    /// Writes a pending edit to the graph and leaves the node selected. On a rejected name
    /// the editor stays in `Editing`.
    pub fn commit(&mut self, graph: &mut OntologyGraph) -> Result<(), GraphError> {
        let EditorState::Editing { node, buffer } = &self.state else {
            return Ok(());
        };
        let node = *node;
        graph.rename(node, buffer)?;
        self.state = EditorState::Selected { node };
        Ok(())
    }

    /// Drops a selection whose node no longer exists.
    pub fn forget_missing(&mut self, graph: &OntologyGraph) {
        if self.focus().is_some_and(|node| !graph.contains(node)) {
            self.state = EditorState::Idle;
        }
    }
}
