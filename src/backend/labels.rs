// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

//! Labels recorded shell commands with abstraction classes.
//!
//! Each command line splits into a command (first token) and its arguments (the rest,
//! whitespace-normalized). An abstraction entry applies to a line when:
//!
//! - the line has arguments, and both patterns match, or the command pattern matches and the
//!   entry has no arguments pattern at all;
//! - the line has no arguments, the command pattern matches and the entry's arguments pattern
//!   is absent or empty.
//!
//! `regEx` patterns are case-insensitive and anchored at the start of the text.

use std::collections::BTreeSet;
use std::fmt;

use regex::{Regex, RegexBuilder};

use crate::model::{AbstractionDocument, Pattern, PatternKind};

/// Label given to lines no abstraction entry applies to.
pub const DEFAULT_LABEL: &str = "NoLabel";

#[derive(Debug, Clone)]
enum Matcher {
    Exact(String),
    Substring(String),
    RegEx(Regex),
}

impl Matcher {
    fn compile(class: &str, pattern: &Pattern) -> Result<Self, LabelError> {
        let kind = pattern.kind().ok_or_else(|| LabelError::UnknownPatternType {
            class: class.to_owned(),
            pattern_type: pattern.pattern_type.clone(),
        })?;
        Ok(match kind {
            PatternKind::Exact => Self::Exact(pattern.expression.clone()),
            PatternKind::Substring => Self::Substring(pattern.expression.clone()),
            PatternKind::RegEx => Self::RegEx(
                RegexBuilder::new(&format!("^(?:{})", pattern.expression))
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| LabelError::Regex {
                        class: class.to_owned(),
                        source,
                    })?,
            ),
        })
    }

    fn is_match(&self, text: &str) -> bool {
        match self {
            Self::Exact(expression) => text == expression,
            Self::Substring(expression) => text.contains(expression.as_str()),
            Self::RegEx(regex) => regex.is_match(text),
        }
    }
}

#[derive(Debug, Clone)]
enum ArgumentRule {
    Absent,
    Empty,
    Match(Matcher),
}

#[derive(Debug, Clone)]
struct Rule {
    class: String,
    command: Matcher,
    arguments: ArgumentRule,
}

impl Rule {
    fn applies(&self, command: &str, arguments: &str) -> bool {
        if !self.command.is_match(command) {
            return false;
        }
        match (&self.arguments, arguments.is_empty()) {
            (ArgumentRule::Absent, _) => true,
            (ArgumentRule::Empty, no_arguments) => no_arguments,
            (ArgumentRule::Match(matcher), false) => matcher.is_match(arguments),
            (ArgumentRule::Match(_), true) => false,
        }
    }
}

#[derive(Debug)]
pub enum LabelError {
    UnknownPatternType { class: String, pattern_type: String },
    EmptyCommandPattern { class: String },
    Regex { class: String, source: regex::Error },
    EmptyCommand { line: usize },
}

impl fmt::Display for LabelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPatternType {
                class,
                pattern_type,
            } => write!(f, "class {class:?} uses unknown pattern type {pattern_type:?}"),
            Self::EmptyCommandPattern { class } => {
                write!(f, "class {class:?} has an entry without a command expression")
            }
            Self::Regex { class, source } => {
                write!(f, "class {class:?} has an invalid regular expression: {source}")
            }
            Self::EmptyCommand { line } => write!(f, "no command found on line {line}"),
        }
    }
}

impl std::error::Error for LabelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Regex { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Compiled abstraction rules.
#[derive(Debug, Clone)]
pub struct Labeler {
    rules: Vec<Rule>,
}

impl Labeler {
    pub fn new(abstraction: &AbstractionDocument) -> Result<Self, LabelError> {
        let mut rules = Vec::new();
        for (class, entries) in abstraction.classes() {
            for entry in entries {
                if entry.command.expression.is_empty() {
                    return Err(LabelError::EmptyCommandPattern {
                        class: class.clone(),
                    });
                }
                let arguments = match &entry.arguments {
                    None => ArgumentRule::Absent,
                    Some(pattern) if pattern.expression.is_empty() => ArgumentRule::Empty,
                    Some(pattern) => ArgumentRule::Match(Matcher::compile(class, pattern)?),
                };
                rules.push(Rule {
                    class: class.clone(),
                    command: Matcher::compile(class, &entry.command)?,
                    arguments,
                });
            }
        }
        Ok(Self { rules })
    }

    /// Labels for one command line; [`DEFAULT_LABEL`] when nothing applies.
    pub fn label(&self, line: &str) -> Option<BTreeSet<String>> {
        let (command, arguments) = split_command(line)?;
        let mut labels: BTreeSet<String> = self
            .rules
            .iter()
            .filter(|rule| rule.applies(command, &arguments))
            .map(|rule| rule.class.clone())
            .collect();
        if labels.is_empty() {
            labels.insert(DEFAULT_LABEL.to_owned());
        }
        Some(labels)
    }

    pub fn label_all<'a>(
        &self,
        lines: impl IntoIterator<Item = &'a str>,
    ) -> Result<Vec<BTreeSet<String>>, LabelError> {
        lines
            .into_iter()
            .enumerate()
            .map(|(line, text)| self.label(text).ok_or(LabelError::EmptyCommand { line }))
            .collect()
    }
}

fn split_command(line: &str) -> Option<(&str, String)> {
    let mut tokens = line.split_whitespace();
    let command = tokens.next()?;
    let arguments = tokens.collect::<Vec<_>>().join(" ");
    Some((command, arguments))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{split_command, LabelError, Labeler};
    use crate::model::fixtures::abstraction_shell;
    use crate::model::{AbstractionDocument, CommandEntry, Pattern};

    fn set(labels: &[&str]) -> BTreeSet<String> {
        labels.iter().map(|label| (*label).to_owned()).collect()
    }

    #[test]
    fn splits_and_normalizes_arguments() {
        assert_eq!(
            split_command("  vi   src/main.rs \t  notes.md "),
            Some(("vi", "src/main.rs notes.md".to_owned()))
        );
        assert_eq!(split_command("ls"), Some(("ls", String::new())));
        assert_eq!(split_command("   "), None);
    }

    #[test]
    fn labels_shell_commands() {
        let labeler = Labeler::new(&abstraction_shell()).unwrap();
        assert_eq!(labeler.label("cd src"), Some(set(&["Navigate"])));
        assert_eq!(labeler.label("ls"), Some(set(&["Navigate"])));
        assert_eq!(labeler.label("make test"), Some(set(&["Build"])));
        assert_eq!(labeler.label("vim lib.rs"), Some(set(&["Edit"])));
        assert_eq!(labeler.label("git status"), Some(set(&["NoLabel"])));
    }

    #[test]
    fn argument_patterns_must_match_when_present() {
        let labeler = Labeler::new(&abstraction_shell()).unwrap();
        // Edit requires a `.rs` argument.
        assert_eq!(labeler.label("vi notes.md"), Some(set(&["NoLabel"])));
        assert_eq!(labeler.label("vi"), Some(set(&["NoLabel"])));
    }

    #[test]
    fn regex_is_case_insensitive_and_anchored() {
        let mut doc = AbstractionDocument::new();
        doc.insert_class(
            "Git",
            vec![CommandEntry::new(Pattern::new("gi(t|tk)", "regEx"))],
        );
        let labeler = Labeler::new(&doc).unwrap();
        assert_eq!(labeler.label("GIT push"), Some(set(&["Git"])));
        assert_eq!(labeler.label("gitk"), Some(set(&["Git"])));
        assert_eq!(labeler.label("legit"), Some(set(&["NoLabel"])));
    }

    #[test]
    fn empty_arguments_pattern_only_matches_bare_commands() {
        let mut doc = AbstractionDocument::new();
        doc.insert_class(
            "List",
            vec![CommandEntry::new(Pattern::new("ls", "exact"))
                .with_arguments(Pattern::new("", "regEx"))],
        );
        let labeler = Labeler::new(&doc).unwrap();
        assert_eq!(labeler.label("ls"), Some(set(&["List"])));
        assert_eq!(labeler.label("ls -la"), Some(set(&["NoLabel"])));
    }

    #[test]
    fn one_command_can_carry_several_labels() {
        let mut doc = abstraction_shell();
        doc.insert_class("Move", vec![CommandEntry::new(Pattern::new("cd", "exact"))]);
        let labeler = Labeler::new(&doc).unwrap();
        assert_eq!(labeler.label("cd .."), Some(set(&["Move", "Navigate"])));
    }

    #[test]
    fn rejects_bad_rules_and_blank_lines() {
        let mut doc = AbstractionDocument::new();
        doc.insert_class("Odd", vec![CommandEntry::new(Pattern::new("x", "glob"))]);
        assert!(matches!(
            Labeler::new(&doc),
            Err(LabelError::UnknownPatternType { .. })
        ));

        let mut doc = AbstractionDocument::new();
        doc.insert_class("Odd", vec![CommandEntry::new(Pattern::new("(", "regEx"))]);
        assert!(matches!(Labeler::new(&doc), Err(LabelError::Regex { .. })));

        let mut doc = AbstractionDocument::new();
        doc.insert_class("Odd", vec![CommandEntry::new(Pattern::new("", "exact"))]);
        assert!(matches!(
            Labeler::new(&doc),
            Err(LabelError::EmptyCommandPattern { .. })
        ));

        let labeler = Labeler::new(&abstraction_shell()).unwrap();
        let err = labeler.label_all(["ls", " "]).unwrap_err();
        assert!(matches!(err, LabelError::EmptyCommand { line: 1 }));
    }
}
