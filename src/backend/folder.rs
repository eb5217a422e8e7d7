// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

use std::collections::BTreeSet;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use super::{Backend, BackendError, CommandRecord, Labeler, LinkoRequest, LoadedFile};
use crate::format::MarkupReader;
use crate::model::{
    AbstractionDocument, Link, Linkograph, LinkographError, LinkographNode, OntologyDocument,
};
use crate::store::{FileStore, FileType};

/// Links `i -> j` (`i < j`) whenever the ontology has an edge from one of `i`'s labels to one
/// of `j`'s labels.
pub fn link_by_ontology(
    labels: Vec<BTreeSet<String>>,
    ontology: &OntologyDocument,
) -> Result<Linkograph, LinkographError> {
    let mut links = Vec::new();
    for (target, target_labels) in labels.iter().enumerate() {
        for (source, source_labels) in labels[..target].iter().enumerate() {
            let linked = source_labels
                .iter()
                .any(|from| target_labels.iter().any(|to| ontology.has_edge(from, to)));
            if linked {
                links.push(Link::new(source, target)?);
            }
        }
    }
    let nodes = labels
        .into_iter()
        .map(|labels| LinkographNode::new(labels.into_iter().collect()))
        .collect();
    Linkograph::from_parts(nodes, links)
}

/// [`Backend`] over a [`FileStore`].
#[derive(Debug, Clone)]
pub struct FolderBackend {
    store: FileStore,
}

impl FolderBackend {
    pub fn new(store: FileStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    fn load_json<T: DeserializeOwned>(
        &self,
        name: &str,
        file_type: FileType,
    ) -> Result<T, BackendError> {
        let record = self.store.load(name, file_type)?;
        serde_json::from_str(&record.content).map_err(|source| BackendError::Parse {
            name: name.to_owned(),
            file_type,
            source,
        })
    }

    fn load_command_lines(&self, name: &str) -> Result<Vec<String>, BackendError> {
        let records: Vec<CommandRecord> = self.load_json(name, FileType::Commands)?;
        Ok(records.into_iter().map(|record| record.cmd).collect())
    }
}

impl Backend for FolderBackend {
    fn file_list(&self, file_type: FileType) -> Result<Vec<String>, BackendError> {
        Ok(self.store.list(file_type)?)
    }

    fn save_file(&self, name: &str, content: &str) -> Result<String, BackendError> {
        let saved = self.store.save(name, content, None, None)?;
        info!(
            name = saved.name(),
            file_type = %saved.file_type(),
            already_stored = saved.already_stored(),
            "file saved"
        );
        Ok(saved.to_string())
    }

    fn load_file(&self, name: &str, file_type: &str) -> Result<LoadedFile, BackendError> {
        let file_type: FileType = file_type.parse()?;
        let record = self.store.load(name, file_type)?;
        Ok(LoadedFile {
            name: record.name,
            file_type,
            content: record.content,
        })
    }

    fn create_linko(&self, request: &LinkoRequest) -> Result<String, BackendError> {
        let name = request.output_name();
        let lines = self.load_command_lines(&request.commands)?;
        let ontology: OntologyDocument = self.load_json(&request.ontology, FileType::Ontology)?;
        let abstraction: AbstractionDocument =
            self.load_json(&request.abstraction, FileType::Abstraction)?;

        let labeler = Labeler::new(&abstraction)?;
        let labels = labeler.label_all(lines.iter().map(String::as_str))?;
        let linkograph =
            link_by_ontology(labels, &ontology).map_err(|source| BackendError::Linkograph {
                name: name.clone(),
                source,
            })?;
        debug!(
            name = %name,
            nodes = linkograph.len(),
            links = linkograph.link_count(),
            "linkograph built"
        );

        let content = serde_json::to_string_pretty(&linkograph.to_legacy_value()).map_err(
            |source| BackendError::Parse {
                name: name.clone(),
                file_type: FileType::Linkograph,
                source,
            },
        )?;
        let saved = self.store.save(
            &name,
            &content,
            Some(FileType::Linkograph),
            Some(&request.commands),
        )?;
        info!(name = saved.name(), commands = %request.commands, "linkograph stored");
        Ok(saved.name().to_owned())
    }

    fn draw_linko(&self, name: &str) -> Result<Linkograph, BackendError> {
        let record = self.store.load(name, FileType::Linkograph)?;
        let mut linkograph = read_linkograph(name, &record.content)?;
        if let Some(commands) = record.commands.as_deref() {
            linkograph.attach_commands(self.load_command_lines(commands)?);
        }
        Ok(linkograph)
    }
}

/// Reads any stored linkograph form: backend array, typed document, or markup.
fn read_linkograph(name: &str, content: &str) -> Result<Linkograph, BackendError> {
    let linkograph_err = |source| BackendError::Linkograph {
        name: name.to_owned(),
        source,
    };
    match serde_json::from_str::<Value>(content) {
        Ok(value @ Value::Object(_)) => {
            serde_json::from_value(value).map_err(|source| BackendError::Parse {
                name: name.to_owned(),
                file_type: FileType::Linkograph,
                source,
            })
        }
        Ok(value) => Linkograph::from_legacy_value(&value).map_err(linkograph_err),
        Err(_) => {
            let markup_err = |source| BackendError::Markup {
                name: name.to_owned(),
                source,
            };
            MarkupReader::new()
                .map_err(markup_err)?
                .read(content, false)
                .map_err(markup_err)
        }
    }
}
