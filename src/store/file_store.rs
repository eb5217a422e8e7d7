// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::format::MarkupReader;
use crate::model::Linkograph;

/// What detection reports for content it cannot classify.
pub const UNKNOWN_FILE: &str = "Unknown file";

const RECORD_EXTENSION: &str = "json";
const TEMP_PREFIX: &str = ".linkshop.tmp.";

/// The four collections a store keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileType {
    Commands,
    Ontology,
    Abstraction,
    Linkograph,
}

impl FileType {
    pub const ALL: [FileType; 4] = [
        FileType::Commands,
        FileType::Ontology,
        FileType::Abstraction,
        FileType::Linkograph,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Commands => "commands",
            Self::Ontology => "ontology",
            Self::Abstraction => "abstraction",
            Self::Linkograph => "linkograph",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = StoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|file_type| file_type.as_str() == raw)
            .ok_or_else(|| StoreError::FileTypeNotFound {
                file_type: raw.to_owned(),
            })
    }
}

/// One stored file. Linkographs remember the commands file they were built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub name: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands: Option<String>,
}

/// Outcome of a successful [`FileStore::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Saved {
    name: String,
    file_type: FileType,
    already_stored: bool,
}

impl Saved {
    /// The name the content ended up under; may differ from the requested one.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn already_stored(&self) -> bool {
        self.already_stored
    }
}

impl fmt::Display for Saved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.already_stored {
            return write!(f, "We already have {}", self.name);
        }
        match self.file_type {
            FileType::Linkograph => write!(f, "File {} is saved as type linkograph", self.name),
            file_type => write!(f, "File {} saved as type {file_type}", self.name),
        }
    }
}

#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    SymlinkRefused {
        path: PathBuf,
    },
    FileNotFound {
        name: String,
    },
    FileTypeNotFound {
        file_type: String,
    },
    FileTypeMismatch {
        given: String,
        found: String,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::Json { path, source } => write!(f, "json error at {path:?}: {source}"),
            Self::SymlinkRefused { path } => write!(f, "refusing to write through symlink {path:?}"),
            Self::FileNotFound { name } => write!(f, "File {name} not found!"),
            Self::FileTypeNotFound { file_type } => write!(f, "File type {file_type} not found!"),
            Self::FileTypeMismatch { given, found } => write!(f, "Given {given}, but found {found}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::SymlinkRefused { .. }
            | Self::FileNotFound { .. }
            | Self::FileTypeNotFound { .. }
            | Self::FileTypeMismatch { .. } => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Fast, best-effort persistence.
    ///
    /// - Writes a temp file and renames atomically into place.
    /// - Does not perform per-file fsync/sync.
    #[default]
    BestEffort,

    /// Slower, best-effort durability.
    ///
    /// Attempts to flush written file contents and rename operations to stable storage where
    /// possible. Exact guarantees are platform/filesystem-dependent.
    Durable,
}

/// A folder of collections: `<root>/<file type>/<encoded name>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    durability: WriteDurability,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            durability: WriteDurability::default(),
        }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    pub fn collection_dir(&self, file_type: FileType) -> PathBuf {
        self.root.join(file_type.as_str())
    }

    pub fn record_path(&self, file_type: FileType, name: &str) -> PathBuf {
        self.collection_dir(file_type).join(format!(
            "{}.{RECORD_EXTENSION}",
            encode_persisted_name_segment(name)
        ))
    }

    /// Names stored under `file_type`, sorted. A collection nobody wrote to yet is empty.
    pub fn list(&self, file_type: FileType) -> Result<Vec<String>, StoreError> {
        let dir = self.collection_dir(file_type);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Io { path: dir, source }),
        };

        let mut names = BTreeSet::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: dir.clone(),
                source,
            })?;
            let path = entry.path();
            let is_record = path
                .extension()
                .is_some_and(|ext| ext == RECORD_EXTENSION)
                && !entry.file_name().to_string_lossy().starts_with(TEMP_PREFIX);
            if !is_record {
                continue;
            }
            names.insert(read_record_at(&path)?.name);
        }
        Ok(names.into_iter().collect())
    }

    pub fn load(&self, name: &str, file_type: FileType) -> Result<FileRecord, StoreError> {
        self.find(name, file_type)?
            .ok_or_else(|| StoreError::FileNotFound {
                name: name.to_owned(),
            })
    }

    pub fn contains(&self, name: &str, file_type: FileType) -> Result<bool, StoreError> {
        Ok(self.find(name, file_type)?.is_some())
    }

    /// Stores `content` under `name`.
    ///
    /// Without `file_type` the type is detected from the content; with one, detection must
    /// agree. Linkographs must name an existing commands file and replace any record of the
    /// same name. Other types keep what is stored: identical content is reported as already
    /// present, different content is retried under `<name>new`.
    pub fn save(
        &self,
        name: &str,
        content: &str,
        file_type: Option<FileType>,
        commands: Option<&str>,
    ) -> Result<Saved, StoreError> {
        let found = detect_file_type(content);
        let file_type = match (file_type, found) {
            (None, Some(found)) => found,
            (Some(given), Some(found)) if given == found => given,
            (Some(given), found) => {
                return Err(StoreError::FileTypeMismatch {
                    given: given.as_str().to_owned(),
                    found: found.map_or(UNKNOWN_FILE, FileType::as_str).to_owned(),
                })
            }
            (None, None) => {
                return Err(StoreError::FileTypeNotFound {
                    file_type: UNKNOWN_FILE.to_owned(),
                })
            }
        };

        if file_type == FileType::Linkograph {
            let Some(commands) = commands else {
                return Err(StoreError::FileNotFound {
                    name: "commands file".to_owned(),
                });
            };
            self.load(commands, FileType::Commands)?;
            let record = FileRecord {
                name: name.to_owned(),
                content: content.to_owned(),
                commands: Some(commands.to_owned()),
            };
            self.write_record(file_type, &record)?;
            return Ok(Saved {
                name: record.name,
                file_type,
                already_stored: false,
            });
        }

        let mut name = name.to_owned();
        loop {
            match self.find(&name, file_type)? {
                Some(existing) if existing.content == content => {
                    return Ok(Saved {
                        name,
                        file_type,
                        already_stored: true,
                    })
                }
                Some(_) => name.push_str("new"),
                None => break,
            }
        }

        let record = FileRecord {
            name,
            content: content.to_owned(),
            commands: None,
        };
        self.write_record(file_type, &record)?;
        Ok(Saved {
            name: record.name,
            file_type,
            already_stored: false,
        })
    }

    fn find(&self, name: &str, file_type: FileType) -> Result<Option<FileRecord>, StoreError> {
        let path = self.record_path(file_type, name);
        match fs::metadata(&path) {
            Ok(_) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path, source }),
        }
        read_record_at(&path).map(Some)
    }

    fn write_record(&self, file_type: FileType, record: &FileRecord) -> Result<(), StoreError> {
        let path = self.record_path(file_type, &record.name);
        let json = serde_json::to_vec_pretty(record).map_err(|source| StoreError::Json {
            path: path.clone(),
            source,
        })?;
        write_atomic(&path, &json, self.durability)
    }
}

include!("file_store/helpers.rs");
