// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default pattern type offered for a freshly enabled arguments pattern.
pub const DEFAULT_ARGUMENTS_TYPE: &str = "regEx";

/// How a [`Pattern`] expression is matched against command text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternKind {
    Exact,
    Substring,
    RegEx,
}

impl PatternKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "exact" => Some(Self::Exact),
            "substring" => Some(Self::Substring),
            "regEx" => Some(Self::RegEx),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Substring => "substring",
            Self::RegEx => "regEx",
        }
    }
}

/// An expression/type pair.
///
/// The type is kept as raw text so that documents written by other tools survive a load/save
/// cycle unchanged; [`Pattern::kind`] interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    pub expression: String,
    #[serde(rename = "type")]
    pub pattern_type: String,
}

impl Pattern {
    pub fn new(expression: impl Into<String>, pattern_type: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            pattern_type: pattern_type.into(),
        }
    }

    pub fn kind(&self) -> Option<PatternKind> {
        PatternKind::parse(&self.pattern_type)
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("expression".to_owned(), Value::String(self.expression.clone()));
        map.insert("type".to_owned(), Value::String(self.pattern_type.clone()));
        Value::Object(map)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandEntry {
    pub command: Pattern,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Pattern>,
}

impl CommandEntry {
    pub fn new(command: Pattern) -> Self {
        Self {
            command,
            arguments: None,
        }
    }

    pub fn with_arguments(mut self, arguments: Pattern) -> Self {
        self.arguments = Some(arguments);
        self
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("command".to_owned(), self.command.to_value());
        if let Some(arguments) = &self.arguments {
            map.insert("arguments".to_owned(), arguments.to_value());
        }
        Value::Object(map)
    }
}

/// Abstraction classes keyed by name, each holding an ordered list of command entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbstractionDocument {
    classes: BTreeMap<String, Vec<CommandEntry>>,
}

impl AbstractionDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classes(&self) -> &BTreeMap<String, Vec<CommandEntry>> {
        &self.classes
    }

    pub fn classes_mut(&mut self) -> &mut BTreeMap<String, Vec<CommandEntry>> {
        &mut self.classes
    }

    pub fn class(&self, name: &str) -> Option<&[CommandEntry]> {
        self.classes.get(name).map(Vec::as_slice)
    }

    pub fn insert_class(
        &mut self,
        name: impl Into<String>,
        entries: Vec<CommandEntry>,
    ) -> Option<Vec<CommandEntry>> {
        self.classes.insert(name.into(), entries)
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Builds the plain nested JSON form of this document.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        for (name, entries) in &self.classes {
            let list = entries.iter().map(CommandEntry::to_value).collect();
            map.insert(name.clone(), Value::Array(list));
        }
        Value::Object(map)
    }

    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}
