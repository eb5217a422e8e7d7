// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

//! JSON envelopes exchanged with browser clients. Every envelope carries a `command` tag.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backend::Refinement;
use crate::model::Linkograph;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Command {
    SaveFile,
    LoadFile,
    CreateLinko,
    DrawLinko,
    PerformOntologyRefinement,
    GetStats,
}

impl Command {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SaveFile => "saveFile",
            Self::LoadFile => "loadFile",
            Self::CreateLinko => "createLinko",
            Self::DrawLinko => "drawLinko",
            Self::PerformOntologyRefinement => "performOntologyRefinement",
            Self::GetStats => "getStats",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client requests. Fields are optional on the wire; the session validates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command")]
pub enum ClientMessage {
    #[serde(rename = "saveFile")]
    SaveFile {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<String>,
    },
    #[serde(rename = "loadFile", rename_all = "camelCase")]
    LoadFile {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_type: Option<String>,
    },
    #[serde(rename = "createLinko")]
    CreateLinko {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        commands: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ontology: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        abstraction: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        linkograph: Option<String>,
    },
    #[serde(rename = "drawLinko")]
    DrawLinko {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        linkograph: Option<String>,
    },
    #[serde(rename = "performOntologyRefinement")]
    PerformOntologyRefinement {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        linkograph: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ontology: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_changes: Option<Value>,
    },
    #[serde(rename = "getStats", rename_all = "camelCase")]
    GetStats {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start_range: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stop_range: Option<Value>,
    },
}

impl ClientMessage {
    pub fn command(&self) -> Command {
        match self {
            Self::SaveFile { .. } => Command::SaveFile,
            Self::LoadFile { .. } => Command::LoadFile,
            Self::CreateLinko { .. } => Command::CreateLinko,
            Self::DrawLinko { .. } => Command::DrawLinko,
            Self::PerformOntologyRefinement { .. } => Command::PerformOntologyRefinement,
            Self::GetStats { .. } => Command::GetStats,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// The four file name lists, sent as a `saveFile` envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileLists {
    pub commands: Vec<String>,
    pub ontology: Vec<String>,
    pub abstraction: Vec<String>,
    pub linkograph: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ServerMessage {
    Lists {
        command: Command,
        err: String,
        res: String,
        #[serde(flatten)]
        lists: FileLists,
    },
    Loaded {
        command: Command,
        err: String,
        res: String,
        data: String,
        #[serde(rename = "type")]
        file_type: String,
    },
    Linkograph {
        command: Command,
        data: Linkograph,
    },
    Refinement {
        command: Command,
        data: Refinement,
    },
    Stats {
        command: Command,
        err: String,
        res: String,
        data: Value,
    },
    /// `command` is whatever the client sent, so unknown commands can be echoed back.
    Error {
        command: String,
        err: String,
    },
}

impl ServerMessage {
    pub fn lists(res: impl Into<String>, lists: FileLists) -> Self {
        Self::Lists {
            command: Command::SaveFile,
            err: String::new(),
            res: res.into(),
            lists,
        }
    }

    pub fn error(command: impl Into<String>, err: impl Into<String>) -> Self {
        Self::Error {
            command: command.into(),
            err: err.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
