// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

use std::fmt;

use super::protocol::{Command, ServerMessage};
use crate::backend::BackendError;

pub const FILES_MISSING: &str = "Files missing!";
pub const FILE_MISSING: &str = "File missing!";
pub const INVALID_RANGE: &str = "Invalid range!";

/// Request failures. None of them ends the connection; each becomes an error envelope.
#[derive(Debug)]
pub enum RelayError {
    MissingInput {
        command: Command,
        message: &'static str,
    },
    InvalidRange {
        command: Command,
    },
    Backend {
        command: Command,
        source: BackendError,
    },
    UnknownCommand {
        name: String,
    },
    Malformed {
        command: String,
        source: serde_json::Error,
    },
}

impl RelayError {
    pub fn files_missing(command: Command) -> Self {
        Self::MissingInput {
            command,
            message: FILES_MISSING,
        }
    }

    pub fn file_missing(command: Command) -> Self {
        Self::MissingInput {
            command,
            message: FILE_MISSING,
        }
    }

    /// The command the error envelope is tagged with.
    pub fn command_name(&self) -> &str {
        match self {
            Self::MissingInput { command, .. }
            | Self::InvalidRange { command }
            | Self::Backend { command, .. } => command.as_str(),
            Self::UnknownCommand { name } | Self::Malformed { command: name, .. } => {
                name.as_str()
            }
        }
    }

    pub fn to_message(&self) -> ServerMessage {
        ServerMessage::error(self.command_name(), self.to_string())
    }
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInput { message, .. } => f.write_str(message),
            Self::InvalidRange { .. } => f.write_str(INVALID_RANGE),
            Self::Backend { source, .. } => write!(f, "{source}"),
            Self::UnknownCommand { name } => write!(f, "Command '{name}' unknown"),
            Self::Malformed { source, .. } => write!(f, "malformed message: {source}"),
        }
    }
}

impl std::error::Error for RelayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Backend { source, .. } => Some(source),
            Self::Malformed { source, .. } => Some(source),
            _ => None,
        }
    }
}
