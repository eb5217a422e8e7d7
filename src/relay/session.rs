// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::error::RelayError;
use super::protocol::{ClientMessage, Command, FileLists, ServerMessage};
use crate::backend::{Backend, LinkoRequest};
use crate::store::FileType;

const KNOWN_COMMANDS: [Command; 6] = [
    Command::SaveFile,
    Command::LoadFile,
    Command::CreateLinko,
    Command::DrawLinko,
    Command::PerformOntologyRefinement,
    Command::GetStats,
];

/// One client connection. Requests run in arrival order; every request yields the envelopes
/// to send back, in order.
#[derive(Clone)]
pub struct RelaySession {
    backend: Arc<dyn Backend>,
}

impl RelaySession {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    /// What a freshly connected client receives.
    pub fn greeting(&self) -> Vec<ServerMessage> {
        vec![self.lists("")]
    }

    pub fn handle(&self, text: &str) -> Vec<ServerMessage> {
        match parse_request(text) {
            Ok(message) => self.dispatch(message),
            Err(err @ RelayError::UnknownCommand { .. }) => {
                warn!(command = err.command_name(), "unknown command");
                vec![err.to_message(), self.lists("")]
            }
            Err(err) => {
                warn!(error = %err, "rejected request");
                vec![err.to_message()]
            }
        }
    }

    pub fn dispatch(&self, message: ClientMessage) -> Vec<ServerMessage> {
        let command = message.command();
        info!(command = %command, "request received");
        let result = match message {
            ClientMessage::SaveFile { name, data } => self.save_file(name, data),
            ClientMessage::LoadFile {
                file_name,
                file_type,
            } => self.load_file(file_name, file_type),
            ClientMessage::CreateLinko {
                commands,
                ontology,
                abstraction,
                linkograph,
            } => self.create_linko(commands, ontology, abstraction, linkograph),
            ClientMessage::DrawLinko { linkograph } => self.draw_linko(linkograph),
            ClientMessage::PerformOntologyRefinement {
                linkograph,
                ontology,
                max_changes,
            } => self.refine(linkograph, ontology, max_changes),
            ClientMessage::GetStats {
                file_name,
                start_range,
                stop_range,
            } => self.stats(file_name, start_range, stop_range),
        };
        result.unwrap_or_else(|err| {
            warn!(command = %command, error = %err, "request failed");
            vec![err.to_message()]
        })
    }

    /// The four name lists as a `saveFile` envelope. A listing failure turns into an error
    /// envelope instead.
    pub fn lists(&self, res: &str) -> ServerMessage {
        match self.file_lists() {
            Ok(lists) => ServerMessage::lists(res, lists),
            Err(source) => {
                let err = RelayError::Backend {
                    command: Command::SaveFile,
                    source,
                };
                warn!(error = %err, "file listing failed");
                err.to_message()
            }
        }
    }

    fn file_lists(&self) -> Result<FileLists, crate::backend::BackendError> {
        let mut lists = FileLists::default();
        for file_type in FileType::ALL {
            let names = self.backend.file_list(file_type)?;
            match file_type {
                FileType::Commands => lists.commands = names,
                FileType::Ontology => lists.ontology = names,
                FileType::Abstraction => lists.abstraction = names,
                FileType::Linkograph => lists.linkograph = names,
            }
        }
        Ok(lists)
    }

    fn save_file(
        &self,
        name: Option<String>,
        data: Option<String>,
    ) -> Result<Vec<ServerMessage>, RelayError> {
        let command = Command::SaveFile;
        let name = required(name).ok_or(RelayError::file_missing(command))?;
        let data = data.ok_or(RelayError::file_missing(command))?;
        let res = self
            .backend
            .save_file(&name, &data)
            .map_err(|source| RelayError::Backend { command, source })?;
        debug!(name = %name, res = %res, "saveFile answered");
        Ok(vec![self.lists(&res)])
    }

    fn load_file(
        &self,
        name: Option<String>,
        file_type: Option<String>,
    ) -> Result<Vec<ServerMessage>, RelayError> {
        let command = Command::LoadFile;
        let name = required(name).ok_or(RelayError::file_missing(command))?;
        let file_type = required(file_type).ok_or(RelayError::file_missing(command))?;
        let loaded = self
            .backend
            .load_file(&name, &file_type)
            .map_err(|source| RelayError::Backend { command, source })?;
        Ok(vec![ServerMessage::Loaded {
            command,
            err: String::new(),
            res: format!("{} of type {} loaded", loaded.name, loaded.file_type),
            data: loaded.content,
            file_type: loaded.file_type.to_string(),
        }])
    }

    /// Builds, draws and then refreshes the lists. The refresh goes out even when the build
    /// fails.
    fn create_linko(
        &self,
        commands: Option<String>,
        ontology: Option<String>,
        abstraction: Option<String>,
        linkograph: Option<String>,
    ) -> Result<Vec<ServerMessage>, RelayError> {
        let command = Command::CreateLinko;
        let missing = || RelayError::files_missing(command);
        let request = LinkoRequest {
            commands: required(commands).ok_or_else(missing)?,
            ontology: required(ontology).ok_or_else(missing)?,
            abstraction: required(abstraction).ok_or_else(missing)?,
            linkograph,
        };

        let built = self
            .backend
            .create_linko(&request)
            .and_then(|name| self.backend.draw_linko(&name));
        let first = match built {
            Ok(data) => ServerMessage::Linkograph { command, data },
            Err(source) => {
                let err = RelayError::Backend { command, source };
                warn!(error = %err, "createLinko failed");
                err.to_message()
            }
        };
        Ok(vec![first, self.lists("")])
    }

    fn draw_linko(&self, linkograph: Option<String>) -> Result<Vec<ServerMessage>, RelayError> {
        let command = Command::DrawLinko;
        let name = required(linkograph).ok_or(RelayError::files_missing(command))?;
        let data = self
            .backend
            .draw_linko(&name)
            .map_err(|source| RelayError::Backend { command, source })?;
        Ok(vec![ServerMessage::Linkograph { command, data }])
    }

    fn refine(
        &self,
        linkograph: Option<String>,
        ontology: Option<String>,
        max_changes: Option<Value>,
    ) -> Result<Vec<ServerMessage>, RelayError> {
        let command = Command::PerformOntologyRefinement;
        let missing = || RelayError::files_missing(command);
        let linkograph = required(linkograph).ok_or_else(missing)?;
        let ontology = required(ontology).ok_or_else(missing)?;
        let data = self
            .backend
            .perform_ontology_refinement(
                &linkograph,
                &ontology,
                max_changes.as_ref().and_then(change_budget),
            )
            .map_err(|source| RelayError::Backend { command, source })?;
        Ok(vec![ServerMessage::Refinement { command, data }])
    }

    fn stats(
        &self,
        file_name: Option<String>,
        start_range: Option<Value>,
        stop_range: Option<Value>,
    ) -> Result<Vec<ServerMessage>, RelayError> {
        let command = Command::GetStats;
        let name = required(file_name).ok_or(RelayError::file_missing(command))?;
        let invalid = || RelayError::InvalidRange { command };
        let low = start_range.as_ref().and_then(Value::as_u64).ok_or_else(invalid)?;
        let high = stop_range.as_ref().and_then(Value::as_u64).ok_or_else(invalid)?;
        if low > high {
            return Err(invalid());
        }
        let low = usize::try_from(low).map_err(|_| invalid())?;
        let high = usize::try_from(high).map_err(|_| invalid())?;

        let data = self
            .backend
            .get_stats(&name, low, high)
            .map_err(|source| RelayError::Backend { command, source })?;
        Ok(vec![ServerMessage::Stats {
            command,
            err: String::new(),
            res: String::new(),
            data,
        }])
    }
}

/// Parses one text frame. The `command` tag is read first so unknown commands are told apart
/// from malformed known ones.
pub fn parse_request(text: &str) -> Result<ClientMessage, RelayError> {
    let value: Value = serde_json::from_str(text).map_err(|source| RelayError::Malformed {
        command: String::new(),
        source,
    })?;
    let name = match value.get("command") {
        Some(Value::String(name)) => name.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };
    if !KNOWN_COMMANDS.iter().any(|command| command.as_str() == name) {
        return Err(RelayError::UnknownCommand { name });
    }
    serde_json::from_value(value).map_err(|source| RelayError::Malformed {
        command: name,
        source,
    })
}

/// Absent and empty both count as missing.
fn required(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

/// Accepts a non-negative integer or its decimal text.
fn change_budget(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests;
