// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

//! Editor state of one client.
//!
//! A [`Workspace`] owns the three documents and the per-editor state around them (graph editor,
//! range selection, sub-linkograph board, refinement view). Relay envelopes are applied with
//! [`Workspace::apply`], which returns the follow-up requests the client sends next; failures
//! surface as [`Notice`]s and never abort.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::graph::{EditorEvent, GraphEditor, GraphError, PointerTarget};
use crate::input::{Key, Modifiers};
use crate::layout::{LinkographStyle, Point, Surface};
use crate::model::{
    forward_adjacency_value, AbstractionDocument, LinkographError, OntologyDocument,
    OntologyNodeKey, TreeNodeKey,
};
use crate::ops::{apply_ops, ApplyError, ApplyResult, Documents, Op};
use crate::relay::{ClientMessage, Command, FileLists, ServerMessage};
use crate::store::FileType;
use crate::sublinkograph::{
    BoardError, RangeSelection, SelectionChange, SubLinkograph, SubLinkographBoard,
};
use crate::tree::TreeEditError;

pub mod refinement;

pub use refinement::RefinementView;

/// Pending notices kept before the oldest are dropped.
pub const MAX_NOTICES: usize = 16;

/// Command name carried by notices of local sub-linkograph exports.
const EXPORT: &str = "export";

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error { command: String, message: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info(message) => write!(f, "Info: {message}"),
            Self::Error { message, .. } => write!(f, "Error: {message}"),
        }
    }
}

/// The file chosen in each list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chosen {
    pub commands: Option<String>,
    pub ontology: Option<String>,
    pub abstraction: Option<String>,
    pub linkograph: Option<String>,
}

impl Chosen {
    pub fn get(&self, file_type: FileType) -> Option<&str> {
        match file_type {
            FileType::Commands => self.commands.as_deref(),
            FileType::Ontology => self.ontology.as_deref(),
            FileType::Abstraction => self.abstraction.as_deref(),
            FileType::Linkograph => self.linkograph.as_deref(),
        }
    }

    fn slot_mut(&mut self, file_type: FileType) -> &mut Option<String> {
        match file_type {
            FileType::Commands => &mut self.commands,
            FileType::Ontology => &mut self.ontology,
            FileType::Abstraction => &mut self.abstraction,
            FileType::Linkograph => &mut self.linkograph,
        }
    }
}

#[derive(Debug)]
pub enum WorkspaceError {
    NoLinkograph,
    /// The abstraction tree no longer has the shape of an abstraction document.
    Unconvertible,
    Board(BoardError),
    Encode(serde_json::Error),
}

impl fmt::Display for WorkspaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoLinkograph => f.write_str("no linkograph is loaded"),
            Self::Unconvertible => f.write_str("the abstraction tree cannot be converted"),
            Self::Board(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "cannot encode document: {err}"),
        }
    }
}

impl std::error::Error for WorkspaceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Board(err) => Some(err),
            Self::Encode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BoardError> for WorkspaceError {
    fn from(err: BoardError) -> Self {
        Self::Board(err)
    }
}

#[derive(Debug, Clone)]
pub struct Workspace {
    documents: Documents,
    graph_editor: GraphEditor,
    selection: RangeSelection,
    board: SubLinkographBoard,
    style: LinkographStyle,
    lists: FileLists,
    chosen: Chosen,
    /// Name of the linkograph on display, when known.
    linkograph_name: Option<String>,
    pending_create: Option<String>,
    refinement: Option<RefinementView>,
    notices: Vec<Notice>,
}

impl Workspace {
    pub fn new(surface: Surface) -> Self {
        Self {
            documents: Documents::new(surface),
            graph_editor: GraphEditor::new(),
            selection: RangeSelection::default(),
            board: SubLinkographBoard::new(),
            style: LinkographStyle::default(),
            lists: FileLists::default(),
            chosen: Chosen::default(),
            linkograph_name: None,
            pending_create: None,
            refinement: None,
            notices: Vec::new(),
        }
    }

    pub fn with_style(mut self, style: LinkographStyle) -> Self {
        self.style = style;
        self
    }

    pub fn documents(&self) -> &Documents {
        &self.documents
    }

    pub fn graph_editor(&self) -> &GraphEditor {
        &self.graph_editor
    }

    pub fn selection(&self) -> &RangeSelection {
        &self.selection
    }

    pub fn board(&self) -> &SubLinkographBoard {
        &self.board
    }

    pub fn lists(&self) -> &FileLists {
        &self.lists
    }

    pub fn chosen(&self) -> &Chosen {
        &self.chosen
    }

    pub fn linkograph_name(&self) -> Option<&str> {
        self.linkograph_name.as_deref()
    }

    pub fn refinement(&self) -> Option<&RefinementView> {
        self.refinement.as_ref()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Chooses a file from one of the lists and returns the request that shows it, if any.
    pub fn choose(&mut self, file_type: FileType, name: &str) -> Option<ClientMessage> {
        *self.chosen.slot_mut(file_type) = Some(name.to_owned());
        self.show_request(file_type)
    }

    /// Applies one relay envelope. Returns the requests the client sends in response.
    pub fn apply(&mut self, message: &ServerMessage) -> Vec<ClientMessage> {
        match message {
            ServerMessage::Lists {
                err, res, lists, ..
            } => {
                if !err.is_empty() {
                    self.notify_error(Command::SaveFile.as_str(), err);
                    return Vec::new();
                }
                if !res.is_empty() {
                    self.notify(Notice::Info(res.clone()));
                }
                self.refresh_lists(lists.clone());
                [FileType::Ontology, FileType::Abstraction, FileType::Linkograph]
                    .into_iter()
                    .filter_map(|file_type| self.show_request(file_type))
                    .collect()
            }
            ServerMessage::Loaded {
                err,
                data,
                file_type,
                ..
            } => {
                if !err.is_empty() {
                    self.notify_error(Command::LoadFile.as_str(), err);
                } else {
                    self.load(file_type, data);
                }
                Vec::new()
            }
            ServerMessage::Linkograph { command, data } => {
                let name = match command {
                    Command::CreateLinko => self.pending_create.take(),
                    _ => self.chosen.linkograph.clone(),
                };
                debug!(nodes = data.len(), name = ?name, "linkograph received");
                self.documents.load_linkograph(data.clone());
                self.selection.clear();
                self.linkograph_name = name;
                Vec::new()
            }
            ServerMessage::Refinement { data, .. } => {
                match RefinementView::new(data, self.documents.ontology().surface()) {
                    Ok(view) => self.refinement = Some(view),
                    Err(err) => self.notify_error(
                        Command::PerformOntologyRefinement.as_str(),
                        &err.to_string(),
                    ),
                }
                Vec::new()
            }
            ServerMessage::Stats { err, data, .. } => {
                if !err.is_empty() {
                    self.notify_error(Command::GetStats.as_str(), err);
                } else {
                    self.attach_stats(data);
                }
                Vec::new()
            }
            ServerMessage::Error { command, err } => {
                self.notify_error(command, err);
                Vec::new()
            }
        }
    }

    pub fn save_file_request(&self, name: &str, data: &str) -> ClientMessage {
        ClientMessage::SaveFile {
            name: Some(name.to_owned()),
            data: Some(data.to_owned()),
        }
    }

    /// Saves the edited ontology under `name`.
    pub fn save_ontology_request(&self, name: &str) -> Result<ClientMessage, WorkspaceError> {
        let document = self.documents.ontology().to_document();
        let data = serde_json::to_string(&document).map_err(WorkspaceError::Encode)?;
        Ok(self.save_file_request(name, &data))
    }

    /// Saves the edited abstraction under `name`.
    pub fn save_abstraction_request(&self, name: &str) -> Result<ClientMessage, WorkspaceError> {
        let document = self
            .documents
            .abstraction()
            .to_document()
            .ok_or(WorkspaceError::Unconvertible)?;
        let data = serde_json::to_string(&document).map_err(WorkspaceError::Encode)?;
        Ok(self.save_file_request(name, &data))
    }

    /// Builds a linkograph from the chosen inputs, stored under `output` or a derived name.
    pub fn create_linko_request(&mut self, output: Option<&str>) -> ClientMessage {
        let commands = self.chosen.commands.clone();
        let ontology = self.chosen.ontology.clone();
        let abstraction = self.chosen.abstraction.clone();
        self.pending_create = match (output, &commands, &ontology, &abstraction) {
            (Some(name), ..) if !name.is_empty() => Some(name.to_owned()),
            (_, Some(c), Some(o), Some(a)) => Some(format!("{c}{o}{a}")),
            _ => None,
        };
        ClientMessage::CreateLinko {
            commands,
            ontology,
            abstraction,
            linkograph: output.map(str::to_owned),
        }
    }

    pub fn draw_linko_request(&self) -> ClientMessage {
        ClientMessage::DrawLinko {
            linkograph: self.chosen.linkograph.clone(),
        }
    }

    /// Refines the chosen ontology against the linkograph on display, sent in its
    /// forward-adjacency form.
    pub fn refinement_request(&self, max_changes: u64) -> Result<ClientMessage, WorkspaceError> {
        let linkograph = self.documents.linkograph();
        if linkograph.is_empty() {
            return Err(WorkspaceError::NoLinkograph);
        }
        let adjacency = serde_json::to_string(&forward_adjacency_value(linkograph))
            .map_err(WorkspaceError::Encode)?;
        Ok(ClientMessage::PerformOntologyRefinement {
            linkograph: Some(adjacency),
            ontology: self.chosen.ontology.clone(),
            max_changes: Some(Value::from(max_changes)),
        })
    }

    /// Statistics for the sub-linkograph in `slot`.
    pub fn stats_request(&self, slot: usize) -> Result<ClientMessage, WorkspaceError> {
        let entry = self
            .board
            .get(slot)
            .ok_or(BoardError::SlotNotFound { slot })?;
        Ok(ClientMessage::GetStats {
            file_name: Some(entry.source().to_owned()),
            start_range: Some(Value::from(entry.range().low())),
            stop_range: Some(Value::from(entry.range().high())),
        })
    }

    pub fn apply_ops(&mut self, base_rev: u64, ops: &[Op]) -> Result<ApplyResult, ApplyError> {
        let result = apply_ops(&mut self.documents, base_rev, ops)?;
        self.graph_editor.forget_missing(self.documents.ontology());
        let len = self.documents.linkograph().len();
        if self.selection.range().is_some_and(|range| range.high() >= len) {
            self.selection.clear();
        }
        Ok(result)
    }

    pub fn toggle_tree_node(&mut self, key: TreeNodeKey) -> Result<bool, TreeEditError> {
        self.documents.abstraction_mut().toggle(key)
    }

    pub fn ontology_click(
        &mut self,
        target: PointerTarget,
        modifiers: Modifiers,
    ) -> Result<EditorEvent, GraphError> {
        let event = self
            .graph_editor
            .click(self.documents.ontology_mut(), target, modifiers)?;
        self.after_graph_event(&event);
        Ok(event)
    }

    pub fn ontology_key(
        &mut self,
        key: Key,
        modifiers: Modifiers,
    ) -> Result<EditorEvent, GraphError> {
        let event = self
            .graph_editor
            .key(self.documents.ontology_mut(), key, modifiers)?;
        self.after_graph_event(&event);
        Ok(event)
    }

    pub fn ontology_drag(
        &mut self,
        node: OntologyNodeKey,
        point: Point,
    ) -> Result<EditorEvent, GraphError> {
        let event = self
            .graph_editor
            .drag(self.documents.ontology_mut(), node, point)?;
        self.after_graph_event(&event);
        Ok(event)
    }

    /// A click on linkograph node `index`, or on anything else when `None`.
    pub fn linkograph_click(&mut self, index: Option<usize>) -> SelectionChange {
        self.linkograph_click_with(index, Modifiers::NONE)
    }

    /// Shift-clicking the anchor selects that node alone.
    pub fn linkograph_click_with(
        &mut self,
        index: Option<usize>,
        modifiers: Modifiers,
    ) -> SelectionChange {
        let index = index.filter(|&index| index < self.documents.linkograph().len());
        self.selection.click_with(index, modifiers)
    }

    /// Adds or removes the link between the ends of the selected range.
    pub fn toggle_selected_link(&mut self) -> Option<Result<bool, LinkographError>> {
        let result = self.selection.toggle_link(self.documents.linkograph_mut());
        if matches!(result, Some(Ok(_))) {
            self.documents.bump_rev();
        }
        result
    }

    /// Exports the selected range to the next free slot of the board.
    pub fn export_selection(&mut self, name: &str) -> Result<usize, WorkspaceError> {
        let source = self.linkograph_name.clone().unwrap_or_default();
        let exported = self.board.export(
            name,
            &source,
            self.documents.linkograph(),
            self.selection.range(),
            &self.style,
        );
        match exported {
            Ok(slot) => {
                self.notify(Notice::Info(format!("{name} created on the analyze tab.")));
                Ok(slot)
            }
            Err(err) => {
                self.notify_error(EXPORT, &err.to_string());
                Err(err.into())
            }
        }
    }

    pub fn remove_sublinkograph(&mut self, slot: usize) -> Result<SubLinkograph, WorkspaceError> {
        Ok(self.board.remove(slot)?)
    }

    fn show_request(&self, file_type: FileType) -> Option<ClientMessage> {
        let name = self.chosen.get(file_type)?.to_owned();
        match file_type {
            FileType::Ontology | FileType::Abstraction => Some(ClientMessage::LoadFile {
                file_name: Some(name),
                file_type: Some(file_type.as_str().to_owned()),
            }),
            FileType::Linkograph => Some(ClientMessage::DrawLinko {
                linkograph: Some(name),
            }),
            FileType::Commands => None,
        }
    }

    /// Keeps each choice that is still listed; otherwise falls back to the first name.
    fn refresh_lists(&mut self, lists: FileLists) {
        for (file_type, names) in [
            (FileType::Commands, &lists.commands),
            (FileType::Ontology, &lists.ontology),
            (FileType::Abstraction, &lists.abstraction),
            (FileType::Linkograph, &lists.linkograph),
        ] {
            let slot = self.chosen.slot_mut(file_type);
            let keep = slot.as_ref().is_some_and(|name| names.contains(name));
            if !keep {
                *slot = names.first().cloned();
            }
        }
        self.lists = lists;
    }

    fn load(&mut self, file_type: &str, data: &str) {
        let command = Command::LoadFile.as_str();
        match file_type.parse::<FileType>() {
            Ok(FileType::Ontology) => {
                let result = parse::<OntologyDocument>(data).and_then(|document| {
                    self.documents
                        .load_ontology(&document)
                        .map_err(|err| err.to_string())
                });
                match result {
                    Ok(()) => self.graph_editor = GraphEditor::new(),
                    Err(message) => self.notify_error(command, &message),
                }
            }
            Ok(FileType::Abstraction) => match parse::<AbstractionDocument>(data) {
                Ok(document) => self.documents.load_abstraction(&document),
                Err(message) => self.notify_error(command, &message),
            },
            // Commands and linkographs are not edited as loaded text.
            _ => {}
        }
    }

    fn attach_stats(&mut self, data: &Value) {
        let source = data.get("fileName").and_then(Value::as_str);
        let low = data.get("startRange").and_then(Value::as_u64);
        let high = data.get("stopRange").and_then(Value::as_u64);
        let (Some(source), Some(low), Some(high)) = (source, low, high) else {
            self.notify_error(Command::GetStats.as_str(), "statistics without a range");
            return;
        };
        let (Ok(low), Ok(high)) = (usize::try_from(low), usize::try_from(high)) else {
            return;
        };
        let updated = self.board.attach_stats(source, low, high, data);
        debug!(source, low, high, updated, "statistics attached");
    }

    fn after_graph_event(&mut self, event: &EditorEvent) {
        let changed = matches!(
            event,
            EditorEvent::NodeAdded(_)
                | EditorEvent::NodeRemoved(_)
                | EditorEvent::EdgeToggled { .. }
                | EditorEvent::Renamed { .. }
                | EditorEvent::Moved { .. }
        );
        if changed {
            self.documents.bump_rev();
        }
    }

    fn notify_error(&mut self, command: &str, message: &str) {
        self.notify(Notice::Error {
            command: command.to_owned(),
            message: message.to_owned(),
        });
    }

    /// Oldest notices fall off once [`MAX_NOTICES`] are pending.
    fn notify(&mut self, notice: Notice) {
        if self.notices.len() >= MAX_NOTICES {
            let overflow = self.notices.len() + 1 - MAX_NOTICES;
            self.notices.drain(..overflow);
        }
        self.notices.push(notice);
    }
}

fn parse<T: DeserializeOwned>(data: &str) -> Result<T, String> {
    serde_json::from_str(data).map_err(|err| err.to_string())
}
