// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

//! The analysis service the relay forwards requests to.
//!
//! [`Backend`] is the seam; [`FolderBackend`] implements the file operations and linkograph
//! construction on top of a [`crate::store::FileStore`]. Ontology refinement and statistics
//! are left to other implementations.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::format::MarkupParseError;
use crate::model::{Linkograph, LinkographError, OntologyDocument};
use crate::store::{FileType, StoreError};

pub mod folder;
pub mod labels;

pub use folder::{link_by_ontology, FolderBackend};
pub use labels::{LabelError, Labeler, DEFAULT_LABEL};

/// One recorded shell command as stored in a commands file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRecord {
    #[serde(default)]
    pub ts: Value,
    pub cmd: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedFile {
    pub name: String,
    pub file_type: FileType,
    pub content: String,
}

/// Inputs of a linkograph build, all file names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkoRequest {
    pub commands: String,
    pub ontology: String,
    pub abstraction: String,
    /// Name for the result; empty or absent derives one from the inputs.
    pub linkograph: Option<String>,
}

impl LinkoRequest {
    pub fn output_name(&self) -> String {
        match self.linkograph.as_deref() {
            Some(name) if !name.is_empty() => name.to_owned(),
            _ => format!("{}{}{}", self.commands, self.ontology, self.abstraction),
        }
    }
}

/// A refined ontology and the accuracy it reaches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Refinement {
    pub o_prime: OntologyDocument,
    pub accuracy_prime: f64,
}

pub trait Backend: Send + Sync {
    fn file_list(&self, file_type: FileType) -> Result<Vec<String>, BackendError>;

    /// Stores a file under its detected type and returns a human-readable outcome.
    fn save_file(&self, name: &str, content: &str) -> Result<String, BackendError>;

    fn load_file(&self, name: &str, file_type: &str) -> Result<LoadedFile, BackendError>;

    /// Builds and stores a linkograph; returns the name it was stored under.
    fn create_linko(&self, request: &LinkoRequest) -> Result<String, BackendError>;

    fn draw_linko(&self, name: &str) -> Result<Linkograph, BackendError>;

    fn perform_ontology_refinement(
        &self,
        _linkograph: &str,
        _ontology: &str,
        _max_changes: Option<u64>,
    ) -> Result<Refinement, BackendError> {
        Err(BackendError::Unsupported {
            operation: "performOntologyRefinement",
        })
    }

    /// Statistics for `[low, high]` of a stored linkograph. The payload echoes `fileName`,
    /// `startRange` and `stopRange`.
    fn get_stats(&self, _name: &str, _low: usize, _high: usize) -> Result<Value, BackendError> {
        Err(BackendError::Unsupported {
            operation: "getStats",
        })
    }
}

#[derive(Debug)]
pub enum BackendError {
    Store(StoreError),
    Label(LabelError),
    Parse {
        name: String,
        file_type: FileType,
        source: serde_json::Error,
    },
    Linkograph {
        name: String,
        source: LinkographError,
    },
    Markup {
        name: String,
        source: MarkupParseError,
    },
    Unsupported {
        operation: &'static str,
    },
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Label(err) => write!(f, "labeling failed: {err}"),
            Self::Parse {
                name,
                file_type,
                source,
            } => write!(f, "cannot parse {file_type} file {name}: {source}"),
            Self::Linkograph { name, source } => {
                write!(f, "linkograph {name} is invalid: {source}")
            }
            Self::Markup { name, source } => {
                write!(f, "cannot read linkograph markup {name}: {source}")
            }
            Self::Unsupported { operation } => {
                write!(f, "{operation} is not provided by this backend")
            }
        }
    }
}

impl std::error::Error for BackendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Label(err) => Some(err),
            Self::Parse { source, .. } => Some(source),
            Self::Linkograph { source, .. } => Some(source),
            Self::Markup { source, .. } => Some(source),
            Self::Unsupported { .. } => None,
        }
    }
}

impl From<StoreError> for BackendError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<LabelError> for BackendError {
    fn from(err: LabelError) -> Self {
        Self::Label(err)
    }
}
